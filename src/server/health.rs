use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::server::ServerState;
use crate::server::reload::{FailureSummary, ReloadSummary};

#[derive(Default)]
pub struct HealthState {
    meta: Mutex<HealthMeta>,
}

#[derive(Default, Clone)]
struct HealthMeta {
    last_reload: Option<DateTime<Utc>>,
    last_published: Option<DateTime<Utc>>,
    last_complete: bool,
    last_failures: Vec<FailureSummary>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reload(&self, summary: &ReloadSummary) {
        let now = Utc::now();
        let mut meta = self.meta.lock();
        meta.last_reload = Some(now);
        if summary.published {
            meta.last_published = Some(now);
        }
        meta.last_complete = summary.complete;
        meta.last_failures = summary.failures.clone();
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let meta = self.meta.lock().clone();
        HealthSnapshot {
            last_reload: meta.last_reload,
            last_published: meta.last_published,
            last_complete: meta.last_complete,
            last_failures: meta.last_failures,
        }
    }
}

pub struct HealthSnapshot {
    pub last_reload: Option<DateTime<Utc>>,
    pub last_published: Option<DateTime<Utc>>,
    pub last_complete: bool,
    pub last_failures: Vec<FailureSummary>,
}

pub async fn handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health = state.health.snapshot();
    let current = state.store.current();
    let status = if !current.is_empty() && health.last_complete {
        "ok"
    } else {
        "degraded"
    };
    Json(serde_json::json!({
        "status": status,
        "projects": current.len(),
        "tracked": state.aggregator.projects().len(),
        "checksum": current.checksum(),
        "generation": state.store.generation(),
        "snapshot_created_at": current.created_at().to_rfc3339(),
        "last_reload": health.last_reload.map(|ts| ts.to_rfc3339()),
        "last_published": health.last_published.map(|ts| ts.to_rfc3339()),
        "last_failures": health.last_failures,
    }))
}
