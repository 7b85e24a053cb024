//! Mirrors GitHub release feeds into a single add-on repository.
//!
//! - [`repo`]: fetching, rendering, aggregation and snapshot publication
//! - [`server`]: HTTP interface over the published snapshot
//! - [`config`]: service configuration
//! - [`logging`]: tracing setup

pub mod config;
pub mod logging;
pub mod repo;
pub mod server;
