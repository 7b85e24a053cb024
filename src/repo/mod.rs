//! Repository aggregation layer
//!
//! This module turns the release histories of the tracked upstream projects
//! into one checksummed repository snapshot and publishes it atomically.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│ Aggregator  │────▶│  Snapshot   │────▶│    Store    │
//! │  (fetch)    │     │  (combine)  │     │ (immutable) │     │  (publish)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │   GitHub    │     │  Template   │
//! │ (releases)  │     │  Version    │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Release source trait for fetching upstream data
//! - [`github`]: GitHub REST API implementation of the source
//! - [`fetcher`]: Per-project release list and template retrieval
//! - [`version`]: Ordering over free-form release tags
//! - [`template`]: Manifest template rendering and header parsing
//! - [`aggregator`]: Fan-out aggregation into a snapshot
//! - [`snapshot`]: Immutable snapshot, manifest document and checksum
//! - [`store`]: Atomically swapped published snapshot
//! - [`index`]: HTML index page
//! - [`export`]: Static directory export
//! - [`error`]: Error types for fetching, rendering and validation
//! - [`types`]: Release and asset types

pub mod aggregator;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod github;
pub mod index;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod template;
pub mod types;
pub mod version;
