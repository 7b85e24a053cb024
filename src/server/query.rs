//! Read-only queries against the published snapshot
//!
//! Every handler loads the current snapshot once and answers from it, so a
//! concurrent reload cannot change data halfway through a response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::response::{Html, IntoResponse, Response};

use crate::repo::index::render_index;
use crate::server::ServerState;
use crate::server::error::QueryError;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn index(State(state): State<ServerState>) -> Result<Html<String>, QueryError> {
    let snapshot = state.store.current();
    render_index(&snapshot)
        .map(Html)
        .map_err(|e| QueryError::Render(e.to_string()))
}

pub async fn manifest(State(state): State<ServerState>) -> Response {
    let snapshot = state.store.current();
    ([(CONTENT_TYPE, XML_CONTENT_TYPE)], snapshot.document().to_string()).into_response()
}

pub async fn checksum(State(state): State<ServerState>) -> Response {
    let snapshot = state.store.current();
    ([(CONTENT_TYPE, TEXT_CONTENT_TYPE)], snapshot.checksum().to_string()).into_response()
}

/// `changelog-<version>.txt`; the version part is not checked
fn is_changelog(file: &str) -> bool {
    file.starts_with("changelog-") && file.ends_with(".txt")
}

/// Changelog text or a redirect to an asset of the project's current release
pub async fn project_file(
    State(state): State<ServerState>,
    Path((addon_id, file)): Path<(String, String)>,
) -> Result<Response, QueryError> {
    let snapshot = state.store.current();
    let project = snapshot.get(&addon_id).ok_or(QueryError::NotFound)?;

    if is_changelog(&file) {
        return Ok(([(CONTENT_TYPE, TEXT_CONTENT_TYPE)], project.changelog()).into_response());
    }

    let asset = project.asset(&file).ok_or(QueryError::NotFound)?;
    Ok((StatusCode::FOUND, [(LOCATION, asset.download_url.clone())]).into_response())
}
