//! RealtimeHub - WebSocket distribution to dashboard clients
//!
//! ## Responsibilities
//!
//! - WebSocket connection management
//! - Fan-out of outbound dispatch operations (cell updates, pulses, camera switches)
//! - Snapshot message shape for newly connected clients
//!
//! Implements [`PresentationSink`], so the grid store and the camera arbiter
//! talk to it without knowing about sockets.

use crate::camera_arbiter::{CameraArbiterState, CameraFeedIndex};
use crate::grid_state_store::GridCell;
use crate::presentation::PresentationSink;
use crate::spatial_resolver::SpatialCoordinate;
use crate::status_classifier::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Hub message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum HubMessage {
    CellUpdated(CellUpdatedMessage),
    /// Momentary highlight start/end; does not change the steady colour
    CellPulse(CellPulseMessage),
    CameraSwitched(CameraSwitchedMessage),
    CameraUnlocked(CameraUnlockedMessage),
    /// Full state, sent once on connect
    Snapshot(SnapshotMessage),
}

impl HubMessage {
    fn kind(&self) -> &'static str {
        match self {
            HubMessage::CellUpdated(_) => "cell_updated",
            HubMessage::CellPulse(_) => "cell_pulse",
            HubMessage::CameraSwitched(_) => "camera_switched",
            HubMessage::CameraUnlocked(_) => "camera_unlocked",
            HubMessage::Snapshot(_) => "snapshot",
        }
    }
}

/// Cell update message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellUpdatedMessage {
    /// 1-based floor number
    pub floor: u8,
    pub zone_index: u8,
    pub type_index: u8,
    /// Dashboard element name, e.g. "1A_Temp"
    pub element: Option<String>,
    pub severity: Severity,
    pub color: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&GridCell> for CellUpdatedMessage {
    fn from(cell: &GridCell) -> Self {
        Self {
            floor: cell.coordinate.floor_number(),
            zone_index: cell.coordinate.zone_index,
            type_index: cell.coordinate.type_index,
            element: cell.coordinate.cell_name(),
            severity: cell.severity,
            color: cell.severity.color_hint().to_string(),
            updated_at: cell.last_updated_at,
        }
    }
}

/// Pulse message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellPulseMessage {
    pub floor: u8,
    pub zone_index: u8,
    pub type_index: u8,
    pub active: bool,
    /// Colour to restore when the pulse ends
    pub color: String,
}

/// Camera switch message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSwitchedMessage {
    pub feed_index: u8,
    /// 1-based floor number
    pub floor: u8,
    pub zone_index: u8,
    pub manual: bool,
    /// Whether the unlock control should be shown
    pub locked: bool,
}

/// Unlock message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraUnlockedMessage {
    pub timestamp: String,
}

/// Initial snapshot message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMessage {
    pub cells: Vec<CellUpdatedMessage>,
    pub camera: CameraArbiterState,
}

/// Client connection
struct ClientConnection {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

/// RealtimeHub instance
pub struct RealtimeHub {
    connections: RwLock<HashMap<Uuid, ClientConnection>>,
    connection_count: AtomicU64,
}

impl RealtimeHub {
    /// Create new RealtimeHub
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            connection_count: AtomicU64::new(0),
        }
    }

    /// Register a new client
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, ClientConnection { id, tx });
        }

        self.connection_count.fetch_add(1, Ordering::Relaxed);

        tracing::info!(connection_id = %id, "Client connected");

        (id, rx)
    }

    /// Unregister a client
    pub async fn unregister(&self, id: &Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            self.connection_count.fetch_sub(1, Ordering::Relaxed);
            tracing::info!(connection_id = %id, "Client disconnected");
        }
    }

    /// Broadcast message to all clients
    pub async fn broadcast(&self, message: HubMessage) {
        tracing::debug!(message_type = %message.kind(), "Broadcasting message to clients");

        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return;
            }
        };

        let connections = self.connections.read().await;
        for conn in connections.values() {
            if let Err(e) = conn.tx.send(json.clone()) {
                tracing::warn!(connection_id = %conn.id, error = %e, "Failed to send message");
            }
        }
    }

    /// Get connection count
    pub fn connection_count(&self) -> u64 {
        self.connection_count.load(Ordering::Relaxed)
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PresentationSink for RealtimeHub {
    async fn update_cell(&self, cell: GridCell) {
        self.broadcast(HubMessage::CellUpdated(CellUpdatedMessage::from(&cell)))
            .await;
    }

    async fn pulse_cell(&self, coordinate: SpatialCoordinate, severity: Severity, active: bool) {
        self.broadcast(HubMessage::CellPulse(CellPulseMessage {
            floor: coordinate.floor_number(),
            zone_index: coordinate.zone_index,
            type_index: coordinate.type_index,
            active,
            color: severity.color_hint().to_string(),
        }))
        .await;
    }

    async fn switch_camera(&self, feed: CameraFeedIndex, manual: bool) {
        self.broadcast(HubMessage::CameraSwitched(CameraSwitchedMessage {
            feed_index: feed.value(),
            floor: feed.floor_index() + 1,
            zone_index: feed.zone_index(),
            manual,
            locked: manual,
        }))
        .await;
    }

    async fn unlock(&self) {
        self.broadcast(HubMessage::CameraUnlocked(CameraUnlockedMessage {
            timestamp: Utc::now().to_rfc3339(),
        }))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_broadcast() {
        let hub = RealtimeHub::new();
        let (id, mut rx) = hub.register().await;
        assert_eq!(hub.connection_count(), 1);

        let feed = CameraFeedIndex::new(23).unwrap();
        hub.switch_camera(feed, true).await;

        let json = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "camera_switched");
        assert_eq!(value["data"]["floor"], 4);
        assert_eq!(value["data"]["zone_index"], 2);
        assert_eq!(value["data"]["locked"], true);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_cell_message_carries_element_and_color() {
        let hub = RealtimeHub::new();
        let (_, mut rx) = hub.register().await;

        let coordinate = SpatialCoordinate::new(0, 1, 2).unwrap();
        let mut cell = GridCell::healthy(coordinate);
        cell.severity = Severity::Warning;
        hub.update_cell(cell).await;

        let value: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(value["type"], "cell_updated");
        assert_eq!(value["data"]["element"], "1B_CO2");
        assert_eq!(value["data"]["severity"], "warning");
        assert_eq!(value["data"]["color"], "#FFCC00");
    }
}
