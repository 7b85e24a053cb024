//! In-memory release source for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use addon_repo::repo::error::FetchError;
use addon_repo::repo::source::ReleaseSource;
use addon_repo::repo::types::Release;

#[derive(Clone)]
struct Project {
    releases: Vec<Release>,
    template: Vec<u8>,
}

/// Release source whose upstream data can be changed between reloads
#[derive(Clone, Default)]
pub struct MockSource {
    projects: Arc<Mutex<HashMap<String, Project>>>,
    requested_refs: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: &str, releases: Vec<Release>, template: Vec<u8>) -> Self {
        self.set_project(project, releases, template);
        self
    }

    pub fn set_project(&self, project: &str, releases: Vec<Release>, template: Vec<u8>) {
        self.projects
            .lock()
            .insert(project.to_string(), Project { releases, template });
    }

    pub fn set_releases(&self, project: &str, releases: Vec<Release>) {
        if let Some(entry) = self.projects.lock().get_mut(project) {
            entry.releases = releases;
        }
    }

    /// Make the project unknown upstream
    pub fn remove_project(&self, project: &str) {
        self.projects.lock().remove(project);
    }

    /// (project, ref) pairs requested through `file_at_ref`
    pub fn requested_refs(&self) -> Vec<(String, String)> {
        self.requested_refs.lock().clone()
    }
}

#[async_trait]
impl ReleaseSource for MockSource {
    async fn list_releases(&self, project: &str) -> Result<Vec<Release>, FetchError> {
        match self.projects.lock().get(project) {
            Some(entry) => Ok(entry.releases.clone()),
            None => Err(FetchError::NotFound(project.to_string())),
        }
    }

    async fn file_at_ref(
        &self,
        project: &str,
        _path: &str,
        reference: &str,
    ) -> Result<Vec<u8>, FetchError> {
        self.requested_refs
            .lock()
            .push((project.to_string(), reference.to_string()));
        match self.projects.lock().get(project) {
            Some(entry) => Ok(entry.template.clone()),
            None => Err(FetchError::NotFound(project.to_string())),
        }
    }
}

/// A typical `addon.xml.tpl` for the given add-on id
pub fn addon_template(id: &str) -> Vec<u8> {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<addon id=\"{id}\" name=\"{id}\" version=\"$VERSION\" provider-name=\"tests\">\n\
<extension point=\"xbmc.addon.metadata\"/>\n\
</addon>\n"
    )
    .into_bytes()
}

/// A release of `id` with its versioned archive attached
pub fn release(id: &str, tag: &str, body: &str) -> Release {
    let version = tag.trim_start_matches('v');
    let name = format!("{}-{}.zip", id, version);
    let url = format!("https://github.com/owner/{}/releases/download/{}/{}", id, tag, name);
    Release::new(tag, body).with_asset(&name, &url)
}
