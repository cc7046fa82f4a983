//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    training_active: bool,
    observers: usize,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.dashboard.simulator().is_closed() {
        "shutting_down"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status,
        version: crate::constants::APP_VERSION,
        timestamp: chrono::Utc::now().timestamp(),
        training_active: state.dashboard.store().is_training(),
        observers: state.dashboard.hub().observer_count(),
    })
}
