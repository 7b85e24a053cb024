//! Immutable repository snapshot produced by one aggregation pass

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::repo::types::{Asset, Release};

/// Bytes written before the concatenated project fragments
pub const MANIFEST_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<addons>";

/// Bytes written after the concatenated project fragments
pub const MANIFEST_FOOTER: &str = "</addons>";

/// Hex-encoded MD5 of a manifest document
pub fn manifest_checksum(document: &str) -> String {
    format!("{:x}", md5::compute(document.as_bytes()))
}

/// A release together with its asset name index
#[derive(Debug, Clone)]
pub struct IndexedRelease {
    release: Release,
    by_name: HashMap<String, usize>,
}

impl IndexedRelease {
    pub fn new(release: Release) -> Self {
        let mut by_name = HashMap::with_capacity(release.assets.len());
        for (i, asset) in release.assets.iter().enumerate() {
            // First asset with a given name wins
            by_name.entry(asset.name.clone()).or_insert(i);
        }
        Self { release, by_name }
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.by_name.get(name).map(|&i| &self.release.assets[i])
    }
}

/// Rendered manifest and release history of one tracked project
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    /// Add-on id parsed from the rendered manifest
    pub id: String,
    /// Version declared by the rendered manifest
    pub declared_version: String,
    /// Prolog-free manifest fragment
    pub rendered_xml: String,
    /// Upstream project the manifest was built from
    pub source: String,
    releases: Vec<IndexedRelease>,
}

impl ProjectManifest {
    /// `releases` must already be ordered newest first
    pub fn new(
        id: String,
        declared_version: String,
        rendered_xml: String,
        source: String,
        releases: Vec<Release>,
    ) -> Self {
        Self {
            id,
            declared_version,
            rendered_xml,
            source,
            releases: releases.into_iter().map(IndexedRelease::new).collect(),
        }
    }

    /// Releases, newest first
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.iter().map(IndexedRelease::release)
    }

    /// The newest release
    pub fn current(&self) -> Option<&IndexedRelease> {
        self.releases.first()
    }

    /// Look up an asset of the current release by exact name
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.current()?.asset(name)
    }

    /// The archive offered for installation: the current release's
    /// `*<version>.zip`, or its last `.zip` asset when none matches
    pub fn primary_asset(&self) -> Option<&Asset> {
        let assets = &self.current()?.release().assets;
        let versioned = format!("{}.zip", self.declared_version);

        assets
            .iter()
            .find(|a| a.name.ends_with(&versioned))
            .or_else(|| assets.iter().rev().find(|a| a.name.ends_with(".zip")))
    }

    /// Changelog text covering every release, newest first
    pub fn changelog(&self) -> String {
        self.releases()
            .map(|r| format!("{}\n-------\n{}\n\n", r.tag, r.changelog_body))
            .collect()
    }
}

/// Aggregated repository state, never mutated after construction
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    projects: BTreeMap<String, ProjectManifest>,
    document: String,
    checksum: String,
    created_at: DateTime<Utc>,
}

impl RepositorySnapshot {
    /// Build a snapshot; if two manifests share an id the first one is kept
    pub fn new(manifests: Vec<ProjectManifest>) -> Self {
        let mut projects = BTreeMap::new();
        for manifest in manifests {
            projects.entry(manifest.id.clone()).or_insert(manifest);
        }

        let body_len: usize = projects.values().map(|p| p.rendered_xml.len()).sum();
        let mut document =
            String::with_capacity(MANIFEST_HEADER.len() + body_len + MANIFEST_FOOTER.len());
        document.push_str(MANIFEST_HEADER);
        for project in projects.values() {
            document.push_str(&project.rendered_xml);
        }
        document.push_str(MANIFEST_FOOTER);

        let checksum = manifest_checksum(&document);

        Self {
            projects,
            document,
            checksum,
            created_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Project ids in lexicographic order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&ProjectManifest> {
        self.projects.get(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectManifest> {
        self.projects.values()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The served `addons.xml` document
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Hex MD5 of [`Self::document`]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Project id and primary asset for every project that has one
    pub fn index(&self) -> Vec<(&str, &Asset)> {
        self.projects
            .values()
            .filter_map(|p| p.primary_asset().map(|a| (p.id.as_str(), a)))
            .collect()
    }
}
