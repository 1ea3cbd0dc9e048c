//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub drafts: usize,
    /// `graph` when a Graph API token is configured, otherwise `memory`
    pub integrations: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let integrations = if state.settings.graph.is_configured() {
        "graph"
    } else {
        "memory"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        drafts: state.service.store().count(),
        integrations: integrations.to_string(),
    })
}
