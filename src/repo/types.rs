//! Upstream release data as fetched from the release source

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: String,
}

/// One published release of an upstream project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "name", default, deserialize_with = "null_as_empty")]
    pub display_name: String,
    #[serde(rename = "body", default, deserialize_with = "null_as_empty")]
    pub changelog_body: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Creates a release without assets or publication date
    pub fn new(tag: &str, changelog_body: &str) -> Self {
        Self {
            tag: tag.to_string(),
            display_name: tag.to_string(),
            changelog_body: changelog_body.to_string(),
            published_at: None,
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, name: &str, download_url: &str) -> Self {
        self.assets.push(Asset {
            name: name.to_string(),
            download_url: download_url.to_string(),
            size: 0,
            content_type: "application/zip".to_string(),
        });
        self
    }
}

/// Everything the aggregator needs from the upstream for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedProject {
    /// Upstream project identifier (e.g. "owner/repo")
    pub project: String,
    /// Releases ordered newest first
    pub releases: Vec<Release>,
    /// Raw manifest template as of the newest release's tag
    pub template: Vec<u8>,
}

impl FetchedProject {
    /// The release that drives version substitution and the default asset set
    pub fn current(&self) -> Option<&Release> {
        self.releases.first()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
