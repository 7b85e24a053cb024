use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors returned by repository queries
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("not found")]
    NotFound,

    #[error("failed to render page: {0}")]
    Render(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "not found").into_response(),
            QueryError::Render(message) => {
                error!("Failed to render response: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
