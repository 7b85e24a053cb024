//! Release source trait for fetching upstream release data

#[cfg(test)]
use mockall::automock;

use crate::repo::error::FetchError;
use crate::repo::types::Release;

/// Trait for reading releases and files from an upstream project host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Lists every published release of a project
    ///
    /// # Arguments
    /// * `project` - The upstream project identifier (e.g., "owner/plugin.video.demo")
    ///
    /// # Returns
    /// * `Ok(Vec<Release>)` - Releases in upstream order (callers sort them)
    /// * `Err(FetchError)` - If the request or decoding fails
    async fn list_releases(&self, project: &str) -> Result<Vec<Release>, FetchError>;

    /// Reads a file from the project as of the given ref (tag or branch)
    async fn file_at_ref(
        &self,
        project: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<u8>, FetchError>;
}
