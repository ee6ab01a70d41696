//! TelemetryLog - Recent ingestion outcomes (ring buffer)
//!
//! ## Responsibilities
//!
//! - Keep the last N messages with their decode/resolve/classify result
//! - Keep dropped messages with raw content and reason
//! - Provide recent-entry queries for the HTTP API

use crate::spatial_resolver::SpatialCoordinate;
use crate::status_classifier::Severity;
use crate::telemetry_decoder::TelemetryReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Default capacity
pub const DEFAULT_CAPACITY: usize = 500;

/// How a message left the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Dispatched,
    DroppedMalformed,
    DroppedUnresolved,
}

/// One ingested message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryLogEntry {
    pub entry_id: u64,
    pub received_at: DateTime<Utc>,
    pub status: IngestStatus,
    pub raw_payload: String,
    pub reading: Option<TelemetryReading>,
    pub coordinate: Option<SpatialCoordinate>,
    pub severity: Option<Severity>,
    pub error: Option<String>,
}

impl TelemetryLogEntry {
    pub fn new(status: IngestStatus, raw_payload: &[u8]) -> Self {
        Self {
            entry_id: 0,
            received_at: Utc::now(),
            status,
            raw_payload: String::from_utf8_lossy(raw_payload).into_owned(),
            reading: None,
            coordinate: None,
            severity: None,
            error: None,
        }
    }
}

struct EntryRingBuffer {
    entries: VecDeque<TelemetryLogEntry>,
    capacity: usize,
    next_id: u64,
}

impl EntryRingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    fn push(&mut self, mut entry: TelemetryLogEntry) -> u64 {
        entry.entry_id = self.next_id;
        self.next_id += 1;

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.next_id - 1
    }

    fn get_latest(&self, count: usize) -> Vec<TelemetryLogEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }

    fn get_by_status(&self, status: IngestStatus, count: usize) -> Vec<TelemetryLogEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.status == status)
            .take(count)
            .cloned()
            .collect()
    }
}

/// TelemetryLog instance
pub struct TelemetryLog {
    buffer: RwLock<EntryRingBuffer>,
}

impl TelemetryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RwLock::new(EntryRingBuffer::new(capacity.max(1))),
        }
    }

    /// Add entry, returns its id
    pub async fn record(&self, entry: TelemetryLogEntry) -> u64 {
        let mut buffer = self.buffer.write().await;
        let id = buffer.push(entry);
        tracing::trace!(entry_id = id, "Telemetry log entry added");
        id
    }

    /// Newest first
    pub async fn get_latest(&self, count: usize) -> Vec<TelemetryLogEntry> {
        let buffer = self.buffer.read().await;
        buffer.get_latest(count)
    }

    pub async fn get_by_status(&self, status: IngestStatus, count: usize) -> Vec<TelemetryLogEntry> {
        let buffer = self.buffer.read().await;
        buffer.get_by_status(status, count)
    }

    pub async fn count(&self) -> usize {
        let buffer = self.buffer.read().await;
        buffer.entries.len()
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
