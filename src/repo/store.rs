//! Atomically published repository snapshot

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use tracing::info;

use crate::repo::snapshot::RepositorySnapshot;

/// Holds the single published snapshot
///
/// Readers take an `Arc` of the current snapshot and keep using it for the
/// whole request; a concurrent publish swaps the pointer without blocking them.
pub struct SnapshotStore {
    inner: ArcSwap<RepositorySnapshot>,
    generation: AtomicU64,
}

impl SnapshotStore {
    pub fn new(initial: RepositorySnapshot) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
            generation: AtomicU64::new(0),
        }
    }

    /// The latest published snapshot
    pub fn current(&self) -> Arc<RepositorySnapshot> {
        self.inner.load_full()
    }

    /// Replace the published snapshot; concurrent publishers race and the last store wins
    pub fn publish(&self, snapshot: RepositorySnapshot) {
        let projects = snapshot.len();
        let checksum = snapshot.checksum().to_string();
        self.inner.store(Arc::new(snapshot));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            generation,
            projects,
            checksum = %checksum,
            "published repository snapshot"
        );
    }

    /// Number of publishes since the store was created
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(RepositorySnapshot::empty())
    }
}
