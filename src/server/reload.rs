//! Reload: run an aggregation pass and publish its snapshot

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use tracing::{info, warn};

use crate::repo::aggregator::{AggregationReport, Aggregator};
use crate::repo::store::SnapshotStore;
use crate::server::ServerState;
use crate::server::health::HealthState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub project: String,
    pub kind: &'static str,
    pub message: String,
}

/// Result of a reload as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    /// Whether the new snapshot replaced the published one
    pub published: bool,
    /// Whether every tracked project made it into the aggregated snapshot
    pub complete: bool,
    pub projects: usize,
    pub checksum: String,
    pub failures: Vec<FailureSummary>,
}

/// Publish the report's snapshot unless no project survived aggregation
///
/// An empty pass leaves the previously published snapshot in place.
pub fn apply_report(
    store: &SnapshotStore,
    health: &HealthState,
    report: AggregationReport,
) -> ReloadSummary {
    let complete = report.is_complete();
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|f| FailureSummary {
            project: f.project.clone(),
            kind: f.error.kind(),
            message: f.error.to_string(),
        })
        .collect();

    let published = !report.snapshot.is_empty();
    let summary = if published {
        let summary = ReloadSummary {
            published,
            complete,
            projects: report.snapshot.len(),
            checksum: report.snapshot.checksum().to_string(),
            failures,
        };
        store.publish(report.snapshot);
        summary
    } else {
        warn!(
            "Aggregation produced no projects ({} failures); keeping the published snapshot",
            failures.len()
        );
        let current = store.current();
        ReloadSummary {
            published,
            complete,
            projects: current.len(),
            checksum: current.checksum().to_string(),
            failures,
        }
    };

    health.record_reload(&summary);
    summary
}

/// Aggregate all tracked projects and publish the result
pub async fn reload(
    aggregator: &Aggregator,
    store: &SnapshotStore,
    health: &HealthState,
) -> ReloadSummary {
    info!("Reloading {} projects", aggregator.projects().len());
    let report = aggregator.aggregate().await;
    apply_report(store, health, report)
}

pub async fn handler(State(state): State<ServerState>) -> impl IntoResponse {
    let summary = reload(&state.aggregator, &state.store, &state.health).await;
    let status = if summary.published {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(summary))
}
