//! Router test utilities

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use addon_repo::repo::aggregator::Aggregator;
use addon_repo::repo::source::ReleaseSource;
use addon_repo::repo::store::SnapshotStore;
use addon_repo::repo::template::TemplateRenderer;
use addon_repo::server::ServerState;
use addon_repo::server::health::HealthState;

/// Server state over the given source with an empty published snapshot
pub fn test_state(source: Arc<dyn ReleaseSource>, projects: &[&str]) -> ServerState {
    let aggregator = Aggregator::new(
        source,
        TemplateRenderer::default(),
        projects.iter().map(|p| p.to_string()).collect(),
        "addon.xml.tpl",
        Duration::from_secs(5),
    );
    ServerState {
        store: Arc::new(SnapshotStore::default()),
        aggregator: Arc::new(aggregator),
        health: Arc::new(HealthState::new()),
    }
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(router, "GET", uri).await
}

pub async fn post(router: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(router, "POST", uri).await
}
