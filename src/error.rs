//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // Wire errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("socket error: {0}")]
    Socket(#[from] axum::Error),

    // Lifecycle errors
    #[error("dashboard is shutting down")]
    ShuttingDown,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ShuttingDown => (StatusCode::SERVICE_UNAVAILABLE, "Dashboard is shutting down"),
            // Startup and socket errors never reach a handler; log anything else.
            other => {
                tracing::error!("Internal error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
