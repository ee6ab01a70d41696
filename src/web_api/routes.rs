//! API Routes

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::dispatcher::IngestOutcome;
use crate::error::Result;
use crate::models::{ApiResponse, CameraStateResponse, SelectCameraRequest};
use crate::realtime_hub::{CellUpdatedMessage, HubMessage, SnapshotMessage};
use crate::spatial_resolver::SpatialCoordinate;
use crate::state::AppState;
use crate::telemetry_log::IngestStatus;
use tokio::sync::mpsc::UnboundedReceiver;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Grid
        .route("/api/grid", get(get_grid))
        .route("/api/grid/summary", get(get_grid_summary))
        .route("/api/grid/:floor_index/:zone_index/:type_index", get(get_cell))
        // Camera
        .route("/api/camera", get(get_camera))
        .route("/api/camera/select", post(select_camera))
        .route("/api/camera/unlock", post(unlock_camera))
        // Telemetry
        .route("/api/telemetry", post(ingest_telemetry))
        .route("/api/telemetry/recent", get(recent_telemetry))
        // WebSocket
        .route("/api/ws", get(websocket_handler))
        .with_state(state)
}

// ========================================
// Grid Handlers
// ========================================

async fn get_grid(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.grid.snapshot().await))
}

async fn get_grid_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.grid.summary().await))
}

async fn get_cell(
    State(state): State<AppState>,
    Path((floor_index, zone_index, type_index)): Path<(u8, u8, u8)>,
) -> Result<impl IntoResponse> {
    let coordinate = SpatialCoordinate {
        floor_index,
        zone_index,
        type_index,
    };
    let cell = state.grid.read(coordinate).await?;
    Ok(Json(ApiResponse::success(cell)))
}

// ========================================
// Camera Handlers
// ========================================

async fn get_camera(State(state): State<AppState>) -> impl IntoResponse {
    let camera = CameraStateResponse::from(state.camera.state().await);
    Json(ApiResponse::success(camera))
}

/// Cell clicked: manual select, locks the display
async fn select_camera(
    State(state): State<AppState>,
    Json(req): Json<SelectCameraRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .dispatcher
        .cell_selected(req.floor_index, req.zone_index)
        .await?;
    let camera = CameraStateResponse::from(state.camera.state().await);
    Ok(Json(json!({
        "ok": true,
        "outcome": outcome,
        "camera": camera,
    })))
}

async fn unlock_camera(State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.dispatcher.unlock_requested().await?;
    let camera = CameraStateResponse::from(state.camera.state().await);
    Ok(Json(ApiResponse::success(camera)))
}

// ========================================
// Telemetry Handlers
// ========================================

/// Push one raw payload through the same pipeline as the broker
async fn ingest_telemetry(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let outcome = state.dispatcher.ingest(&body).await?;

    let response = match outcome {
        IngestOutcome::Dispatched {
            reading,
            coordinate,
            severity,
        } => json!({
            "ok": true,
            "status": IngestStatus::Dispatched,
            "reading": reading,
            "coordinate": coordinate,
            "severity": severity,
        }),
        IngestOutcome::Malformed(e) => json!({
            "ok": false,
            "status": IngestStatus::DroppedMalformed,
            "error": e.to_string(),
        }),
        IngestOutcome::Unresolved { reading, error } => json!({
            "ok": false,
            "status": IngestStatus::DroppedUnresolved,
            "reading": reading,
            "error": error.to_string(),
        }),
    };

    Ok(Json(response))
}

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
    status: Option<IngestStatus>,
}

async fn recent_telemetry(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(100);

    let entries = if let Some(status) = query.status {
        state.telemetry_log.get_by_status(status, limit).await
    } else {
        state.telemetry_log.get_latest(limit).await
    };

    Json(ApiResponse::success(entries))
}

// ========================================
// WebSocket Handler
// ========================================

/// WebSocket upgrade handler
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Current grid and camera state as one hub message
async fn snapshot_message(state: &AppState) -> HubMessage {
    HubMessage::Snapshot(SnapshotMessage {
        cells: state
            .grid
            .snapshot()
            .await
            .iter()
            .map(CellUpdatedMessage::from)
            .collect(),
        camera: state.camera.state().await,
    })
}

/// Write the snapshot, then every hub message queued since registration
///
/// The snapshot is read after `register`, so anything in `rx` is at least as
/// new as the snapshot and replaying it on top is harmless.
async fn forward_to_client<S>(
    mut sender: S,
    snapshot: HubMessage,
    mut rx: UnboundedReceiver<String>,
) where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize snapshot");
            return;
        }
    };
    if sender.send(Message::Text(json)).await.is_err() {
        return;
    }

    while let Some(msg) = rx.recv().await {
        if sender.send(Message::Text(msg)).await.is_err() {
            break;
        }
    }
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    // Register before reading state so no update falls between the two
    let (conn_id, rx) = state.realtime.register().await;
    let snapshot = snapshot_message(&state).await;

    let send_task = tokio::spawn(forward_to_client(sender, snapshot, rx));

    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Ping(data)) => {
                    tracing::trace!("Received ping: {:?}", data);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %conn_id, "WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
        conn_id
    });

    // Wait for either task to complete
    let conn_id = tokio::select! {
        _ = send_task => conn_id,
        result = recv_task => result.unwrap_or(conn_id),
    };

    state.realtime.unregister(&conn_id).await;
}
