//! Static export of a snapshot as a plain directory tree
//!
//! Layout written under the output directory:
//!
//! ```text
//! <out>/addons.xml
//! <out>/addons.xml.md5
//! <out>/index.html
//! <out>/<id>/addon.xml
//! ```
//!
//! Archives are referenced by their upstream URLs and are not downloaded.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use tracing::{debug, info, warn};

use crate::config::RepoConfig;
use crate::repo::aggregator::Aggregator;
use crate::repo::error::StoreError;
use crate::repo::github::GitHubSource;
use crate::repo::index::render_index;
use crate::repo::snapshot::RepositorySnapshot;

/// Prolog written in front of each per-project `addon.xml`
pub const ADDON_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

fn write_file(path: &Path, content: &str) -> Result<(), StoreError> {
    debug!("Writing {:?}", path);
    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// A project id is used as a directory name and must stay inside `out_dir`
fn project_dir(out_dir: &Path, id: &str) -> Result<PathBuf, StoreError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(StoreError::Io {
            path: id.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "project id is not a valid directory name",
            ),
        });
    }
    Ok(out_dir.join(id))
}

/// Write the snapshot's manifest, checksum, index and per-project manifests
pub fn write_static_repo(snapshot: &RepositorySnapshot, out_dir: &Path) -> Result<(), StoreError> {
    create_dir(out_dir)?;

    for project in snapshot.projects() {
        let dir = project_dir(out_dir, &project.id)?;
        create_dir(&dir)?;
        write_file(
            &dir.join("addon.xml"),
            &format!("{}{}", ADDON_PROLOG, project.rendered_xml),
        )?;
    }

    let index = render_index(snapshot).map_err(|e| StoreError::Render(e.to_string()))?;
    write_file(&out_dir.join("index.html"), &index)?;
    write_file(&out_dir.join("addons.xml"), snapshot.document())?;
    write_file(&out_dir.join("addons.xml.md5"), snapshot.checksum())?;

    info!(
        "Exported {} projects to {:?} (checksum {})",
        snapshot.len(),
        out_dir,
        snapshot.checksum()
    );
    Ok(())
}

/// Aggregate the configured repositories once and export the result
pub async fn generate(config: &RepoConfig, out_dir: &Path) -> anyhow::Result<()> {
    config.validate_repositories()?;

    let source = Arc::new(GitHubSource::new(
        &config.upstream.base_url,
        Duration::from_millis(config.upstream.fetch_timeout_ms),
    ));
    let report = Aggregator::from_config(config, source).aggregate().await;

    for failure in &report.failures {
        warn!("Skipped {}: {}", failure.project, failure.error);
    }
    if report.snapshot.is_empty() {
        bail!(
            "no project could be aggregated ({} failed); nothing exported",
            report.failures.len()
        );
    }

    write_static_repo(&report.snapshot, out_dir)?;
    Ok(())
}
