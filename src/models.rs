//! Shared API models

use crate::camera_arbiter::{CameraArbiterState, LockState};
use crate::dispatcher::IngestStatsSnapshot;
use crate::grid_state_store::GridSummary;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_sec: u64,
    pub mqtt_enabled: bool,
    pub ws_clients: u64,
    pub ingest: IngestStatsSnapshot,
    pub grid: GridSummary,
}

/// Camera state as exposed over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraStateResponse {
    pub active_feed: Option<u8>,
    /// 1-based floor of the active feed
    pub active_floor: Option<u8>,
    pub active_zone_index: Option<u8>,
    pub lock_state: LockState,
}

impl From<CameraArbiterState> for CameraStateResponse {
    fn from(state: CameraArbiterState) -> Self {
        Self {
            active_feed: state.active_feed.map(|f| f.value()),
            active_floor: state.active_feed.map(|f| f.floor_index() + 1),
            active_zone_index: state.active_feed.map(|f| f.zone_index()),
            lock_state: state.lock_state(),
        }
    }
}

/// Cell-clicked request body
#[derive(Debug, Clone, Deserialize)]
pub struct SelectCameraRequest {
    /// 0-based floor index
    pub floor_index: u8,
    pub zone_index: u8,
}
