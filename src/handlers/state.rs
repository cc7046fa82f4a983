//! Snapshot handler

use axum::{extract::State, Json};

use crate::models::DashboardState;
use crate::AppState;

/// Same payload a WebSocket observer receives on connect
pub async fn snapshot(State(state): State<AppState>) -> Json<DashboardState> {
    Json(state.dashboard.store().snapshot())
}
