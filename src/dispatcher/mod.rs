//! Dispatcher - Ingestion pipeline and single-writer state mutation
//!
//! ## Responsibilities
//!
//! - decode -> resolve -> classify on the caller's task (pure, may run concurrently)
//! - Record every message in the TelemetryLog, dropped ones included
//! - Serialize all GridStateStore / CameraArbiter writes through one queue
//!
//! `Dispatcher` is the cloneable producer side. `DispatchWriter` owns the
//! receiving end and is the only code path that mutates shared state.

mod types;

pub use types::*;

use crate::camera_arbiter::{CameraFeedIndex, CameraSelector, SelectOutcome};
use crate::error::DispatchError;
use crate::grid_state_store::CellUpdater;
use crate::spatial_resolver;
use crate::status_classifier;
use crate::telemetry_decoder;
use crate::telemetry_log::{IngestStatus, TelemetryLog, TelemetryLogEntry};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Default queue depth
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Run one payload through decode -> resolve -> classify
pub fn process_payload(raw_payload: &[u8]) -> IngestOutcome {
    let reading = match telemetry_decoder::decode(raw_payload) {
        Ok(reading) => reading,
        Err(e) => return IngestOutcome::Malformed(e),
    };

    let coordinate = match spatial_resolver::resolve(&reading.zone_id, &reading.sensor_id) {
        Ok(coordinate) => coordinate,
        Err(error) => return IngestOutcome::Unresolved { reading, error },
    };

    let severity = status_classifier::classify(coordinate.type_index, reading.value);

    IngestOutcome::Dispatched {
        reading,
        coordinate,
        severity,
    }
}

/// Producer handle
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<DispatchCommand>,
    telemetry_log: Arc<TelemetryLog>,
    stats: Arc<IngestStats>,
}

impl Dispatcher {
    /// Create the producer handle and its writer
    ///
    /// The writer must be driven with [`DispatchWriter::run`].
    pub fn new(
        grid: Arc<dyn CellUpdater>,
        camera: Arc<dyn CameraSelector>,
        telemetry_log: Arc<TelemetryLog>,
        auto_switch: AutoSwitchPolicy,
        queue_capacity: usize,
    ) -> (Self, DispatchWriter) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));

        let dispatcher = Self {
            tx,
            telemetry_log,
            stats: Arc::new(IngestStats::default()),
        };
        let writer = DispatchWriter {
            rx,
            grid,
            camera,
            auto_switch,
        };

        (dispatcher, writer)
    }

    /// Ingest one raw message
    ///
    /// Decode/resolve failures are logged and dropped; only a closed queue
    /// is reported as an error.
    pub async fn ingest(&self, raw_payload: &[u8]) -> Result<IngestOutcome, DispatchError> {
        let outcome = process_payload(raw_payload);
        self.stats.record(&outcome);

        let mut entry = match &outcome {
            IngestOutcome::Dispatched {
                reading,
                coordinate,
                severity,
            } => {
                tracing::debug!(
                    zone = %reading.zone_id,
                    sensor = %reading.sensor_id,
                    value = reading.value,
                    severity = ?severity,
                    "Telemetry classified"
                );
                let mut entry = TelemetryLogEntry::new(IngestStatus::Dispatched, raw_payload);
                entry.reading = Some(reading.clone());
                entry.coordinate = Some(*coordinate);
                entry.severity = Some(*severity);
                entry
            }
            IngestOutcome::Malformed(e) => {
                tracing::warn!(
                    error = %e,
                    payload = %String::from_utf8_lossy(raw_payload),
                    "Dropping malformed telemetry"
                );
                let mut entry = TelemetryLogEntry::new(IngestStatus::DroppedMalformed, raw_payload);
                entry.error = Some(e.to_string());
                entry
            }
            IngestOutcome::Unresolved { reading, error } => {
                tracing::warn!(
                    error = %error,
                    zone = %reading.zone_id,
                    sensor = %reading.sensor_id,
                    "Dropping unresolvable telemetry"
                );
                let mut entry = TelemetryLogEntry::new(IngestStatus::DroppedUnresolved, raw_payload);
                entry.reading = Some(reading.clone());
                entry.error = Some(error.to_string());
                entry
            }
        };

        if let IngestOutcome::Dispatched {
            coordinate,
            severity,
            ..
        } = &outcome
        {
            let command = DispatchCommand::Reading {
                coordinate: *coordinate,
                severity: *severity,
            };
            if self.tx.send(command).await.is_err() {
                entry.error = Some(DispatchError::QueueClosed.to_string());
                self.telemetry_log.record(entry).await;
                return Err(DispatchError::QueueClosed);
            }
        }

        self.telemetry_log.record(entry).await;
        Ok(outcome)
    }

    /// "Cell clicked" -> manual select of that cell's feed
    pub async fn cell_selected(
        &self,
        floor_index: u8,
        zone_index: u8,
    ) -> Result<SelectOutcome, DispatchError> {
        let feed = CameraFeedIndex::from_location(floor_index, zone_index).map_err(|e| {
            tracing::warn!(floor_index, zone_index, error = %e, "Cell selection rejected");
            e
        })?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(DispatchCommand::CellSelected {
            feed,
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(|_| DispatchError::QueueClosed)?
    }

    /// "Unlock requested"
    pub async fn unlock_requested(&self) -> Result<(), DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(DispatchCommand::UnlockRequested { reply: reply_tx })
            .await?;

        reply_rx.await.map_err(|_| DispatchError::QueueClosed)
    }

    /// Wait until every previously queued command has been applied
    pub async fn flush(&self) -> Result<(), DispatchError> {
        let (tx, rx) = oneshot::channel();
        self.send(DispatchCommand::Flush(tx)).await?;
        rx.await.map_err(|_| DispatchError::QueueClosed)
    }

    pub fn stats(&self) -> IngestStatsSnapshot {
        self.stats.snapshot()
    }

    async fn send(&self, command: DispatchCommand) -> Result<(), DispatchError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| DispatchError::QueueClosed)
    }
}

/// Single writer owning all state mutation
pub struct DispatchWriter {
    rx: mpsc::Receiver<DispatchCommand>,
    grid: Arc<dyn CellUpdater>,
    camera: Arc<dyn CameraSelector>,
    auto_switch: AutoSwitchPolicy,
}

impl DispatchWriter {
    /// Apply commands until shutdown is signalled or every producer is gone
    ///
    /// On shutdown the queue is closed and already-queued commands are drained.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(auto_switch = ?self.auto_switch, "Dispatch writer started");

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => self.apply(command).await,
                    None => break,
                },
                _ = shutdown.changed() => {
                    self.rx.close();
                    let mut drained = 0usize;
                    while let Some(command) = self.rx.recv().await {
                        self.apply(command).await;
                        drained += 1;
                    }
                    tracing::info!(drained, "Dispatch queue drained");
                    break;
                }
            }
        }

        tracing::info!("Dispatch writer stopped");
    }

    async fn apply(&self, command: DispatchCommand) {
        match command {
            DispatchCommand::Reading {
                coordinate,
                severity,
            } => {
                self.grid.update(coordinate, severity).await;

                if !self.auto_switch.should_switch(severity) {
                    return;
                }
                let feed = match CameraFeedIndex::from_location(
                    coordinate.floor_index,
                    coordinate.zone_index,
                ) {
                    Ok(feed) => feed,
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping camera switch");
                        return;
                    }
                };
                if let Err(e) = self.camera.select(feed.value(), false).await {
                    tracing::debug!(error = %e, "Automated camera switch rejected");
                }
            }
            DispatchCommand::CellSelected { feed, reply } => {
                let result = self.camera.select(feed.value(), true).await;
                if let Err(e) = &result {
                    tracing::warn!(feed = feed.value(), error = %e, "Manual camera select failed");
                }
                let _ = reply.send(result);
            }
            DispatchCommand::UnlockRequested { reply } => {
                self.camera.unlock().await;
                let _ = reply.send(());
            }
            DispatchCommand::Flush(reply) => {
                let _ = reply.send(());
            }
        }
    }
}
