//! WebAPI - HTTP/WebSocket surface for the dashboard
//!
//! ## Responsibilities
//!
//! - Read-only grid and camera snapshots
//! - Manual input events (cell clicked, unlock requested)
//! - Raw telemetry injection without a broker
//! - WebSocket stream of dispatch operations

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.started_at;

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_sec: uptime.num_seconds().max(0) as u64,
        mqtt_enabled: state.config.mqtt.host.is_some(),
        ws_clients: state.realtime.connection_count(),
        ingest: state.dispatcher.stats(),
        grid: state.grid.summary().await,
    };

    Json(response)
}
