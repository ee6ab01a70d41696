//! GridStateStore - Authoritative per-cell severity
//!
//! ## Responsibilities
//!
//! - Fixed 6x7x3 arena of `GridCell`, allocated once and only mutated
//! - Bounds-checked writes (out-of-range coordinates are ignored)
//! - `UpdateCell` + transient pulse notification to the presentation sink
//!
//! The pulse is a display hint only. It is fired on a detached task and never
//! touches the stored severity. The end hint re-reads the cell when the timer
//! fires, so a newer write inside the pulse window is what gets restored.

mod types;

pub use types::*;

use crate::error::DispatchError;
use crate::presentation::PresentationSink;
use crate::spatial_resolver::{SpatialCoordinate, GRID_CELL_COUNT};
use crate::status_classifier::Severity;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default pulse highlight duration
pub const DEFAULT_PULSE_DURATION: Duration = Duration::from_millis(150);

/// Narrow write interface used by the dispatcher
#[async_trait::async_trait]
pub trait CellUpdater: Send + Sync {
    async fn update(&self, coordinate: SpatialCoordinate, severity: Severity);
}

/// GridStateStore instance
pub struct GridStateStore {
    cells: Arc<RwLock<[GridCell; GRID_CELL_COUNT]>>,
    sink: Arc<dyn PresentationSink>,
    pulse_duration: Duration,
}

impl GridStateStore {
    /// Create a store with every cell Healthy
    pub fn new(sink: Arc<dyn PresentationSink>) -> Self {
        Self::with_pulse_duration(sink, DEFAULT_PULSE_DURATION)
    }

    pub fn with_pulse_duration(sink: Arc<dyn PresentationSink>, pulse_duration: Duration) -> Self {
        Self {
            cells: Arc::new(RwLock::new(initial_cells())),
            sink,
            pulse_duration,
        }
    }

    /// Overwrite a cell's severity and timestamp
    ///
    /// Silently ignores out-of-range coordinates.
    pub async fn update(&self, coordinate: SpatialCoordinate, severity: Severity) {
        let Some(offset) = coordinate.offset() else {
            tracing::debug!(?coordinate, "Ignoring update for out-of-range cell");
            return;
        };

        let cell = {
            let mut cells = self.cells.write().await;
            let cell = &mut cells[offset];
            cell.severity = severity;
            cell.last_updated_at = Some(Utc::now());
            *cell
        };

        tracing::debug!(
            floor = coordinate.floor_number(),
            zone = coordinate.zone_index,
            kind = coordinate.type_index,
            severity = ?severity,
            "Grid cell updated"
        );

        self.sink.update_cell(cell).await;
        self.spawn_pulse(coordinate, severity);
    }

    /// Fire-and-forget pulse: start now, end after `pulse_duration`
    fn spawn_pulse(&self, coordinate: SpatialCoordinate, severity: Severity) {
        let Some(offset) = coordinate.offset() else {
            return;
        };
        let sink = self.sink.clone();
        let cells = self.cells.clone();
        let duration = self.pulse_duration;

        tokio::spawn(async move {
            sink.pulse_cell(coordinate, severity, true).await;
            tokio::time::sleep(duration).await;
            let current = cells.read().await[offset].severity;
            sink.pulse_cell(coordinate, current, false).await;
        });
    }

    /// Read one cell
    pub async fn read(&self, coordinate: SpatialCoordinate) -> Result<GridCell, DispatchError> {
        let offset = coordinate.checked_offset()?;
        let cells = self.cells.read().await;
        Ok(cells[offset])
    }

    /// Consistent copy of the whole grid
    pub async fn snapshot(&self) -> Vec<GridCell> {
        let cells = self.cells.read().await;
        cells.to_vec()
    }

    /// Severity totals
    pub async fn summary(&self) -> GridSummary {
        let cells = self.cells.read().await;
        GridSummary::from_cells(cells.iter())
    }

    /// Back to all-Healthy (shutdown)
    pub async fn reset(&self) {
        let mut cells = self.cells.write().await;
        *cells = initial_cells();
        tracing::info!("Grid state reset");
    }
}

#[async_trait::async_trait]
impl CellUpdater for GridStateStore {
    async fn update(&self, coordinate: SpatialCoordinate, severity: Severity) {
        GridStateStore::update(self, coordinate, severity).await;
    }
}

fn initial_cells() -> [GridCell; GRID_CELL_COUNT] {
    std::array::from_fn(|offset| {
        let coordinate = SpatialCoordinate::from_offset(offset)
            .unwrap_or(SpatialCoordinate { floor_index: 0, zone_index: 0, type_index: 0 });
        GridCell::healthy(coordinate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{PresentationOp, RecordingSink};

    fn store() -> (GridStateStore, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (GridStateStore::new(sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_initial_state_all_healthy() {
        let (store, _) = store();
        let cells = store.snapshot().await;

        assert_eq!(cells.len(), 126);
        assert!(cells.iter().all(|c| c.severity == Severity::Healthy));
        assert!(cells.iter().all(|c| c.last_updated_at.is_none()));
        for (offset, cell) in cells.iter().enumerate() {
            assert_eq!(cell.coordinate.offset(), Some(offset));
        }
    }

    #[tokio::test]
    async fn test_update_overwrites_cell() {
        let (store, sink) = store();
        let coordinate = SpatialCoordinate::new(0, 0, 0).unwrap();

        store.update(coordinate, Severity::Danger).await;

        let cell = store.read(coordinate).await.unwrap();
        assert_eq!(cell.severity, Severity::Danger);
        assert!(cell.last_updated_at.is_some());
        assert_eq!(
            sink.steady_ops().await,
            vec![PresentationOp::UpdateCell {
                floor_number: 1,
                zone_index: 0,
                type_index: 0,
                severity: Severity::Danger,
            }]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_is_noop() {
        let (store, sink) = store();
        let before = store.snapshot().await;

        let bad = SpatialCoordinate {
            floor_index: 6,
            zone_index: 0,
            type_index: 0,
        };
        store.update(bad, Severity::Danger).await;

        assert_eq!(store.snapshot().await, before);
        assert!(matches!(
            store.read(bad).await,
            Err(DispatchError::OutOfRange { kind: "floor index", value: 6 })
        ));
        assert!(sink.ops().await.is_empty());
    }

    #[tokio::test]
    async fn test_last_write_wins_and_cells_independent() {
        let (store, _) = store();
        let a = SpatialCoordinate::new(2, 3, 1).unwrap();
        let b = SpatialCoordinate::new(2, 3, 2).unwrap();

        store.update(a, Severity::Warning).await;
        store.update(b, Severity::Danger).await;
        store.update(a, Severity::Healthy).await;

        assert_eq!(store.read(a).await.unwrap().severity, Severity::Healthy);
        assert_eq!(store.read(b).await.unwrap().severity, Severity::Danger);
        let summary = store.summary().await;
        assert_eq!(summary.danger, 1);
        assert_eq!(summary.healthy, 125);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_starts_and_reverts_without_touching_severity() {
        let (store, sink) = store();
        let coordinate = SpatialCoordinate::new(1, 4, 2).unwrap();

        store.update(coordinate, Severity::Warning).await;
        tokio::task::yield_now().await;

        let pulse_start = PresentationOp::PulseCell {
            floor_number: 2,
            zone_index: 4,
            type_index: 2,
            severity: Severity::Warning,
            active: true,
        };
        let pulse_end = PresentationOp::PulseCell {
            floor_number: 2,
            zone_index: 4,
            type_index: 2,
            severity: Severity::Warning,
            active: false,
        };

        let ops = sink.ops().await;
        assert!(ops.contains(&pulse_start));
        assert!(!ops.contains(&pulse_end));

        tokio::time::sleep(DEFAULT_PULSE_DURATION + Duration::from_millis(1)).await;

        let ops = sink.ops().await;
        assert!(ops.contains(&pulse_end));
        assert_eq!(store.read(coordinate).await.unwrap().severity, Severity::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_pulses_restore_latest_severity() {
        let (store, sink) = store();
        let coordinate = SpatialCoordinate::new(0, 2, 0).unwrap();

        store.update(coordinate, Severity::Danger).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.update(coordinate, Severity::Healthy).await;
        tokio::time::sleep(DEFAULT_PULSE_DURATION * 2).await;

        let ends: Vec<Severity> = sink
            .ops()
            .await
            .into_iter()
            .filter_map(|op| match op {
                PresentationOp::PulseCell {
                    severity,
                    active: false,
                    ..
                } => Some(severity),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec![Severity::Healthy, Severity::Healthy]);
    }

    #[tokio::test]
    async fn test_reset_restores_healthy() {
        let (store, _) = store();
        let coordinate = SpatialCoordinate::new(5, 6, 2).unwrap();
        store.update(coordinate, Severity::Danger).await;

        store.reset().await;

        let cell = store.read(coordinate).await.unwrap();
        assert_eq!(cell, GridCell::healthy(coordinate));
    }
}
