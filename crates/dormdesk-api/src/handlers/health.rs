//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Basic health payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Detailed health payload.
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        ws_connections: state.chat.router.pool().connection_count(),
    })
}
