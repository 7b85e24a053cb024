//! Reload E2E tests

mod helper;

use std::sync::Arc;

use axum::http::StatusCode;

use addon_repo::repo::snapshot::manifest_checksum;
use addon_repo::server::{reload, router};

use helper::{MockSource, addon_template, get, post, release, test_state};

fn source() -> MockSource {
    MockSource::new()
        .with_project(
            "owner/a",
            vec![
                release("plugin.a", "v1.0.0", "Initial release"),
                release("plugin.a", "v1.1.0", "Bug fixes"),
            ],
            addon_template("plugin.a"),
        )
        .with_project(
            "owner/b",
            vec![release("plugin.b", "v2.0.0", "First B")],
            addon_template("plugin.b"),
        )
}

#[tokio::test]
async fn reload_drops_withdrawn_release() {
    let upstream = source();
    let state = test_state(Arc::new(upstream.clone()), &["owner/a", "owner/b"]);
    let router = router(state);

    let (status, _, _) = post(&router, "/reload").await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, checksum_before) = get(&router, "/addons.xml.md5").await;

    upstream.set_releases(
        "owner/a",
        vec![release("plugin.a", "v1.0.0", "Initial release")],
    );
    let (status, _, body) = post(&router, "/reload").await;
    let summary: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["published"], true);
    assert_eq!(summary["complete"], true);
    assert_eq!(summary["projects"], 2);

    let (_, _, manifest) = get(&router, "/addons.xml").await;
    let (_, _, checksum) = get(&router, "/addons.xml.md5").await;
    let (_, _, changelog) = get(&router, "/plugin.a/changelog-1.0.0.txt").await;
    let (withdrawn, _, _) = get(&router, "/plugin.a/plugin.a-1.1.0.zip").await;

    assert!(manifest.contains("id=\"plugin.a\" name=\"plugin.a\" version=\"1.0.0\""));
    assert!(!manifest.contains("1.1.0"));
    assert_eq!(checksum, manifest_checksum(&manifest));
    assert_ne!(checksum, checksum_before);
    assert_eq!(changelog, "v1.0.0\n-------\nInitial release\n\n");
    assert_eq!(withdrawn, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_omits_failing_project_and_reports_degraded() {
    let upstream = source();
    let state = test_state(Arc::new(upstream.clone()), &["owner/a", "owner/b"]);
    let router = router(state);
    post(&router, "/reload").await;

    upstream.remove_project("owner/b");
    let (status, _, body) = get(&router, "/reload").await;
    let summary: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["complete"], false);
    assert_eq!(summary["projects"], 1);
    assert_eq!(summary["failures"][0]["project"], "owner/b");
    assert_eq!(summary["failures"][0]["kind"], "fetch");

    let (_, _, manifest) = get(&router, "/addons.xml").await;
    assert!(manifest.contains("plugin.a"));
    assert!(!manifest.contains("plugin.b"));

    let (_, _, health) = get(&router, "/healthz").await;
    let health: serde_json::Value = serde_json::from_str(&health).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["tracked"], 2);
}

#[tokio::test]
async fn reload_with_no_surviving_project_keeps_previous_snapshot() {
    let upstream = source();
    let state = test_state(Arc::new(upstream.clone()), &["owner/a", "owner/b"]);
    let store = state.store.clone();
    let router = router(state);
    post(&router, "/reload").await;
    let (_, _, manifest_before) = get(&router, "/addons.xml").await;

    upstream.remove_project("owner/a");
    upstream.remove_project("owner/b");
    let (status, _, body) = post(&router, "/reload").await;
    let summary: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(summary["published"], false);
    assert_eq!(summary["projects"], 2);
    assert_eq!(summary["failures"].as_array().unwrap().len(), 2);

    let (_, _, manifest_after) = get(&router, "/addons.xml").await;
    assert_eq!(manifest_after, manifest_before);
    assert_eq!(store.generation(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reloads_and_reads_always_see_complete_snapshot() {
    let upstream = source();
    let state = test_state(Arc::new(upstream.clone()), &["owner/a", "owner/b"]);
    reload::reload(&state.aggregator, &state.store, &state.health).await;

    let reloaders: Vec<_> = (0..4)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                for _ in 0..5 {
                    reload::reload(&state.aggregator, &state.store, &state.health).await;
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = router(state.clone());
            tokio::spawn(async move {
                for _ in 0..25 {
                    let (_, _, manifest) = get(&router, "/addons.xml").await;
                    assert!(manifest.contains("plugin.a") && manifest.contains("plugin.b"));
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for handle in reloaders.into_iter().chain(readers) {
        handle.await.unwrap();
    }
    assert_eq!(state.store.generation(), 21);
    let current = state.store.current();
    assert_eq!(current.checksum(), manifest_checksum(current.document()));
}
