//! Per-project fetch: release list plus the manifest template of the newest release

use tracing::debug;

use crate::repo::error::FetchError;
use crate::repo::source::ReleaseSource;
use crate::repo::types::FetchedProject;
use crate::repo::version::sort_newest_first;

/// Fetch the releases of a project and its manifest template
///
/// The template is read at the newest release's tag rather than the default
/// branch, so the manifest always describes the release it is served with.
pub async fn fetch_project(
    source: &dyn ReleaseSource,
    project: &str,
    template_path: &str,
) -> Result<FetchedProject, FetchError> {
    let mut releases = source.list_releases(project).await?;
    if releases.is_empty() {
        return Err(FetchError::NoReleases(project.to_string()));
    }

    sort_newest_first(&mut releases);
    let newest_tag = releases[0].tag.clone();
    debug!(
        "{}: {} releases, newest {}",
        project,
        releases.len(),
        newest_tag
    );

    let template = source
        .file_at_ref(project, template_path, &newest_tag)
        .await?;

    Ok(FetchedProject {
        project: project.to_string(),
        releases,
        template,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::source::MockReleaseSource;
    use crate::repo::types::Release;

    #[tokio::test]
    async fn fetch_project_reads_template_at_newest_tag() {
        let mut source = MockReleaseSource::new();
        source
            .expect_list_releases()
            .withf(|project| project == "owner/plugin")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Release::new("v1.9.0", "old"),
                    Release::new("v1.10.0", "new"),
                ])
            });
        source
            .expect_file_at_ref()
            .withf(|project, path, reference| {
                project == "owner/plugin" && path == "addon.xml.tpl" && reference == "v1.10.0"
            })
            .times(1)
            .returning(|_, _, _| Ok(b"<addon/>".to_vec()));

        let fetched = fetch_project(&source, "owner/plugin", "addon.xml.tpl")
            .await
            .unwrap();

        assert_eq!(fetched.project, "owner/plugin");
        assert_eq!(fetched.current().unwrap().tag, "v1.10.0");
        assert_eq!(fetched.releases[1].tag, "v1.9.0");
        assert_eq!(fetched.template, b"<addon/>".to_vec());
    }

    #[tokio::test]
    async fn fetch_project_fails_on_empty_release_list() {
        let mut source = MockReleaseSource::new();
        source.expect_list_releases().returning(|_| Ok(Vec::new()));
        source.expect_file_at_ref().times(0);

        let result = fetch_project(&source, "owner/empty", "addon.xml.tpl").await;

        assert!(matches!(result, Err(FetchError::NoReleases(p)) if p == "owner/empty"));
    }

    #[tokio::test]
    async fn fetch_project_propagates_template_errors() {
        let mut source = MockReleaseSource::new();
        source
            .expect_list_releases()
            .returning(|_| Ok(vec![Release::new("v1.0.0", "")]));
        source
            .expect_file_at_ref()
            .returning(|_, _, _| Err(FetchError::NotFound("addon.xml.tpl".to_string())));

        let result = fetch_project(&source, "owner/plugin", "addon.xml.tpl").await;

        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }
}
