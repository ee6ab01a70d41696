//! Grid state types

use crate::spatial_resolver::SpatialCoordinate;
use crate::status_classifier::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One status indicator on the dashboard grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub coordinate: SpatialCoordinate,
    pub severity: Severity,
    /// `None` until the first update since startup/reset
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl GridCell {
    /// Initial state of a cell
    pub fn healthy(coordinate: SpatialCoordinate) -> Self {
        Self {
            coordinate,
            severity: Severity::Healthy,
            last_updated_at: None,
        }
    }
}

/// Severity totals across the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSummary {
    pub healthy: usize,
    pub warning: usize,
    pub danger: usize,
    pub unknown: usize,
}

impl GridSummary {
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a GridCell>) -> Self {
        let mut summary = Self::default();
        for cell in cells {
            match cell.severity {
                Severity::Healthy => summary.healthy += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Danger => summary.danger += 1,
                Severity::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}
