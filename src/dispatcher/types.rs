//! Dispatcher types

use crate::camera_arbiter::{CameraFeedIndex, SelectOutcome};
use crate::error::{DecodeError, DispatchError, ResolveError};
use crate::spatial_resolver::SpatialCoordinate;
use crate::status_classifier::Severity;
use crate::telemetry_decoder::TelemetryReading;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

/// When a classified reading also requests an automated camera switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSwitchPolicy {
    /// Every dispatched reading
    #[default]
    Always,
    /// Only Warning or Danger readings
    OnAlert,
    /// Never; only manual selection moves the camera
    Off,
}

impl AutoSwitchPolicy {
    pub fn should_switch(self, severity: Severity) -> bool {
        match self {
            AutoSwitchPolicy::Always => true,
            AutoSwitchPolicy::OnAlert => matches!(severity, Severity::Warning | Severity::Danger),
            AutoSwitchPolicy::Off => false,
        }
    }
}

impl std::str::FromStr for AutoSwitchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(AutoSwitchPolicy::Always),
            "on_alert" | "alert" => Ok(AutoSwitchPolicy::OnAlert),
            "off" | "never" => Ok(AutoSwitchPolicy::Off),
            other => Err(format!("unknown auto-switch policy: {}", other)),
        }
    }
}

/// Work item for the single writer
#[derive(Debug)]
pub enum DispatchCommand {
    /// Classified reading: UpdateCell, then automated SwitchCamera
    Reading {
        coordinate: SpatialCoordinate,
        severity: Severity,
    },
    /// "Cell clicked" input event
    CellSelected {
        feed: CameraFeedIndex,
        reply: oneshot::Sender<Result<SelectOutcome, DispatchError>>,
    },
    /// "Unlock requested" input event
    UnlockRequested { reply: oneshot::Sender<()> },
    /// Resolves once every earlier command has been applied
    Flush(oneshot::Sender<()>),
}

/// Result of pushing one raw payload through decode -> resolve -> classify
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Dispatched {
        reading: TelemetryReading,
        coordinate: SpatialCoordinate,
        severity: Severity,
    },
    Malformed(DecodeError),
    Unresolved {
        reading: TelemetryReading,
        error: ResolveError,
    },
}

impl IngestOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, IngestOutcome::Dispatched { .. })
    }
}

/// Ingest counters
#[derive(Debug, Default)]
pub struct IngestStats {
    received: AtomicU64,
    dispatched: AtomicU64,
    dropped_malformed: AtomicU64,
    dropped_unresolved: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStatsSnapshot {
    pub received: u64,
    pub dispatched: u64,
    pub dropped_malformed: u64,
    pub dropped_unresolved: u64,
}

impl IngestStats {
    pub fn record(&self, outcome: &IngestOutcome) {
        self.received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            IngestOutcome::Dispatched { .. } => &self.dispatched,
            IngestOutcome::Malformed(_) => &self.dropped_malformed,
            IngestOutcome::Unresolved { .. } => &self.dropped_unresolved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngestStatsSnapshot {
        IngestStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            dropped_unresolved: self.dropped_unresolved.load(Ordering::Relaxed),
        }
    }
}
