//! HTTP interface over the published repository snapshot
//!
//! # Routes
//!
//! - `GET /`: HTML index of installable archives
//! - `GET /addons.xml`: full manifest document
//! - `GET /addons.xml.md5`: hex checksum of the manifest document
//! - `GET /{id}/changelog-{version}.txt`: release notes, newest first
//! - `GET /{id}/{asset}`: redirect to an asset of the current release
//! - `GET|POST /reload`: aggregate and publish a new snapshot
//! - `GET /healthz`: health and last reload outcome

pub mod error;
pub mod health;
pub mod query;
pub mod reload;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use axum::routing::get;
use axum::{Router, serve};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::RepoConfig;
use crate::repo::aggregator::Aggregator;
use crate::repo::github::GitHubSource;
use crate::repo::store::SnapshotStore;
use crate::server::health::HealthState;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<SnapshotStore>,
    pub aggregator: Arc<Aggregator>,
    pub health: Arc<HealthState>,
}

/// Build the router for the given state
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(query::index))
        .route("/addons.xml", get(query::manifest))
        .route("/addons.xml.md5", get(query::checksum))
        .route("/healthz", get(health::handler))
        .route("/reload", get(reload::handler).post(reload::handler))
        .route("/{addon_id}/{file}", get(query::project_file))
        .with_state(state)
}

pub struct RepoServer {
    addr: SocketAddr,
    router: Router,
}

impl RepoServer {
    pub fn new(addr: SocketAddr, state: ServerState) -> Self {
        Self {
            addr,
            router: router(state),
        }
    }

    pub async fn serve(self) -> Result<()> {
        info!(addr = %self.addr, "starting repository server");
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

/// Aggregate once and serve the repository until interrupted
///
/// Fails before binding when the port is unset or when the first
/// aggregation yields no project at all.
pub async fn run(config: RepoConfig) -> Result<()> {
    let port = config.validate_for_serve()?;
    let ip: IpAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.bind_address))?;

    let source = Arc::new(GitHubSource::new(
        &config.upstream.base_url,
        Duration::from_millis(config.upstream.fetch_timeout_ms),
    ));
    let state = ServerState {
        store: Arc::new(SnapshotStore::default()),
        aggregator: Arc::new(Aggregator::from_config(&config, source)),
        health: Arc::new(HealthState::new()),
    };

    let summary = reload::reload(&state.aggregator, &state.store, &state.health).await;
    if !summary.published {
        let reasons: Vec<_> = summary
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.project, f.message))
            .collect();
        bail!(
            "initial aggregation produced no projects from {}: {}",
            config.upstream.base_url,
            reasons.join("; ")
        );
    }

    RepoServer::new(SocketAddr::new(ip, port), state).serve().await
}
