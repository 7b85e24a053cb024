//! Repository aggregation: fetch, render and validate every tracked project
//!
//! Projects are processed concurrently and independently. A failing project
//! is reported and left out of the snapshot; it never aborts the pass.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{error, info};

use crate::config::{FETCH_STAGGER_DELAY_MS, RepoConfig};
use crate::repo::error::{FetchError, IntegrityError, ProjectError};
use crate::repo::fetcher::fetch_project;
use crate::repo::snapshot::{ProjectManifest, RepositorySnapshot};
use crate::repo::source::ReleaseSource;
use crate::repo::template::TemplateRenderer;
use crate::repo::version::version_token;

/// A project left out of a snapshot, with the reason
#[derive(Debug)]
pub struct ProjectFailure {
    pub project: String,
    pub error: ProjectError,
}

/// Outcome of one aggregation pass
#[derive(Debug)]
pub struct AggregationReport {
    pub snapshot: RepositorySnapshot,
    pub failures: Vec<ProjectFailure>,
}

impl AggregationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds repository snapshots from the tracked upstream projects
pub struct Aggregator {
    source: Arc<dyn ReleaseSource>,
    renderer: TemplateRenderer,
    projects: Vec<String>,
    template_path: String,
    fetch_timeout: Duration,
    stagger: Duration,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        renderer: TemplateRenderer,
        projects: Vec<String>,
        template_path: &str,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            renderer,
            projects,
            template_path: template_path.to_string(),
            fetch_timeout,
            stagger: Duration::from_millis(FETCH_STAGGER_DELAY_MS),
        }
    }

    pub fn from_config(config: &RepoConfig, source: Arc<dyn ReleaseSource>) -> Self {
        Self::new(
            source,
            TemplateRenderer::new(&config.template),
            config.repositories.clone(),
            &config.upstream.template_path,
            Duration::from_millis(config.upstream.fetch_timeout_ms),
        )
    }

    /// Tracked upstream projects, in configured order
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Run one aggregation pass over every tracked project
    ///
    /// Fetches are executed in parallel with staggered start times to avoid
    /// rate limiting. When two projects declare the same id, the one listed
    /// first in the configuration is kept.
    pub async fn aggregate(&self) -> AggregationReport {
        let futures = self.projects.iter().enumerate().map(|(i, project)| {
            let delay = self.stagger * i as u32;
            async move {
                sleep(delay).await;
                (project, self.build_project(project).await)
            }
        });
        let results = join_all(futures).await;

        let mut owners: HashMap<String, String> = HashMap::new();
        let mut manifests = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (project, result) in results {
            let result = result.and_then(|manifest| match owners.get(&manifest.id) {
                Some(owner) => Err(IntegrityError::DuplicateId {
                    id: manifest.id.clone(),
                    owner: owner.clone(),
                }
                .into()),
                None => Ok(manifest),
            });

            match result {
                Ok(manifest) => {
                    info!(
                        "{}: {} version {}",
                        project, manifest.id, manifest.declared_version
                    );
                    owners.insert(manifest.id.clone(), project.clone());
                    manifests.push(manifest);
                }
                Err(error) => {
                    error!(
                        project = %project,
                        kind = error.kind(),
                        "Excluding project from snapshot: {}",
                        error
                    );
                    failures.push(ProjectFailure {
                        project: project.clone(),
                        error,
                    });
                }
            }
        }

        let snapshot = RepositorySnapshot::new(manifests);
        info!(
            "Aggregated {} of {} projects, checksum {}",
            snapshot.len(),
            self.projects.len(),
            snapshot.checksum()
        );

        AggregationReport { snapshot, failures }
    }

    async fn build_project(&self, project: &str) -> Result<ProjectManifest, ProjectError> {
        let fetched = timeout(
            self.fetch_timeout,
            fetch_project(self.source.as_ref(), project, &self.template_path),
        )
        .await
        .map_err(|_| FetchError::Timeout(self.fetch_timeout.as_millis() as u64))??;

        let Some(current) = fetched.current() else {
            return Err(FetchError::NoReleases(project.to_string()).into());
        };
        let version = version_token(&current.tag).to_string();
        let tag = current.tag.clone();

        let rendered = self.renderer.render(&fetched.template, &version)?;
        let header = self.renderer.parse_header(&rendered)?;

        if header.version != version {
            return Err(IntegrityError::VersionMismatch {
                id: header.id,
                declared: header.version,
                expected: version,
                tag,
            }
            .into());
        }

        Ok(ProjectManifest::new(
            header.id,
            header.version,
            rendered,
            fetched.project,
            fetched.releases,
        ))
    }
}
