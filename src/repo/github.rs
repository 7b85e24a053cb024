//! GitHub REST API release source

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_UPSTREAM_URL, FETCH_TIMEOUT_MS};
use crate::repo::error::FetchError;
use crate::repo::source::ReleaseSource;
use crate::repo::types::Release;

/// Largest page size the releases API accepts; only the first page is read
const RELEASES_PER_PAGE: u32 = 100;

/// Response from the GitHub contents API
#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Release source backed by the GitHub releases and contents APIs
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubSource {
    /// Creates a new GitHubSource with a custom base URL and request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("addon-repo")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, url: Url, subject: &str) -> Result<Response, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(subject.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }

    fn url(&self, path: &str) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| FetchError::InvalidResponse(format!("Bad URL {raw}: {e}")))
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM_URL, Duration::from_millis(FETCH_TIMEOUT_MS))
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubSource {
    async fn list_releases(&self, project: &str) -> Result<Vec<Release>, FetchError> {
        let mut url = self.url(&format!("/repos/{}/releases", project))?;
        url.query_pairs_mut()
            .append_pair("per_page", &RELEASES_PER_PAGE.to_string());
        let response = self.get(url, project).await?;

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })
    }

    async fn file_at_ref(
        &self,
        project: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let mut url = self.url(&format!("/repos/{}/contents/{}", project, path))?;
        url.query_pairs_mut().append_pair("ref", reference);

        let subject = format!("{}/{}@{}", project, path, reference);
        let response = self.get(url, &subject).await?;

        let content: Content = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub contents response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        if content.encoding != "base64" {
            return Err(FetchError::Decode(format!(
                "unsupported encoding {:?} for {}",
                content.encoding, subject
            )));
        }

        // GitHub wraps the payload at 60 columns
        let packed: String = content
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        STANDARD
            .decode(packed)
            .map_err(|e| FetchError::Decode(format!("{}: {}", subject, e)))
    }
}
