//! Presentation interface
//!
//! Outbound dispatch operations consumed by whatever renders the grid and the
//! camera monitor. Floors are reported 1-based, matching the dashboard labels.

use crate::camera_arbiter::CameraFeedIndex;
use crate::grid_state_store::GridCell;
use crate::spatial_resolver::SpatialCoordinate;
use crate::status_classifier::Severity;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Receiver of outbound dispatch operations
#[async_trait::async_trait]
pub trait PresentationSink: Send + Sync {
    /// `UpdateCell(floor, zone, type, severity)`
    async fn update_cell(&self, cell: GridCell);

    /// Start (`active = true`) or end of the momentary highlight on a cell
    ///
    /// `severity` is the cell's stored severity at the moment the hint is sent.
    async fn pulse_cell(&self, coordinate: SpatialCoordinate, severity: Severity, active: bool);

    /// `SwitchCamera(floor, zone, manual)`
    async fn switch_camera(&self, feed: CameraFeedIndex, manual: bool);

    /// `Unlock()`
    async fn unlock(&self);
}

/// Outbound operation as recorded by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PresentationOp {
    UpdateCell {
        floor_number: u8,
        zone_index: u8,
        type_index: u8,
        severity: Severity,
    },
    PulseCell {
        floor_number: u8,
        zone_index: u8,
        type_index: u8,
        severity: Severity,
        active: bool,
    },
    SwitchCamera {
        floor_number: u8,
        zone_index: u8,
        manual: bool,
    },
    Unlock,
}

/// Sink that keeps every operation in memory
///
/// Used by tests and diagnostics where no renderer is attached.
#[derive(Default)]
pub struct RecordingSink {
    ops: Mutex<Vec<PresentationOp>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ops(&self) -> Vec<PresentationOp> {
        self.ops.lock().await.clone()
    }

    /// Operations excluding pulse start/end hints
    pub async fn steady_ops(&self) -> Vec<PresentationOp> {
        self.ops
            .lock()
            .await
            .iter()
            .filter(|op| !matches!(op, PresentationOp::PulseCell { .. }))
            .cloned()
            .collect()
    }

    async fn push(&self, op: PresentationOp) {
        self.ops.lock().await.push(op);
    }
}

#[async_trait::async_trait]
impl PresentationSink for RecordingSink {
    async fn update_cell(&self, cell: GridCell) {
        self.push(PresentationOp::UpdateCell {
            floor_number: cell.coordinate.floor_number(),
            zone_index: cell.coordinate.zone_index,
            type_index: cell.coordinate.type_index,
            severity: cell.severity,
        })
        .await;
    }

    async fn pulse_cell(&self, coordinate: SpatialCoordinate, severity: Severity, active: bool) {
        self.push(PresentationOp::PulseCell {
            floor_number: coordinate.floor_number(),
            zone_index: coordinate.zone_index,
            type_index: coordinate.type_index,
            severity,
            active,
        })
        .await;
    }

    async fn switch_camera(&self, feed: CameraFeedIndex, manual: bool) {
        self.push(PresentationOp::SwitchCamera {
            floor_number: feed.floor_index() + 1,
            zone_index: feed.zone_index(),
            manual,
        })
        .await;
    }

    async fn unlock(&self) {
        self.push(PresentationOp::Unlock).await;
    }
}
