//! StatusClassifier - (sensor type, value) -> Severity
//!
//! Thresholds are fixed. All comparisons are strict, so a value sitting
//! exactly on a threshold lands in the lower-severity branch.

use crate::spatial_resolver::SensorType;
use serde::{Deserialize, Serialize};

/// Health classification of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Healthy,
    Warning,
    Danger,
    Unknown,
}

impl Severity {
    /// Dashboard tint for this severity
    pub fn color_hint(self) -> &'static str {
        match self {
            Severity::Healthy => "#33CC33",
            Severity::Warning => "#FFCC00",
            Severity::Danger => "#E61A1A",
            Severity::Unknown => "#808080",
        }
    }
}

/// Threshold set for one sensor class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Danger when value < this
    pub danger_below: Option<f64>,
    /// Danger when value > this
    pub danger_above: f64,
    /// Warning when value > this
    pub warning_above: f64,
}

impl Thresholds {
    pub const fn for_type(sensor_type: SensorType) -> Self {
        match sensor_type {
            SensorType::Temp => Self {
                danger_below: Some(18.0),
                danger_above: 27.0,
                warning_above: 24.0,
            },
            SensorType::Energy => Self {
                danger_below: None,
                danger_above: 450.0,
                warning_above: 300.0,
            },
            SensorType::Co2 => Self {
                danger_below: None,
                danger_above: 1200.0,
                warning_above: 800.0,
            },
        }
    }

    pub fn evaluate(&self, value: f64) -> Severity {
        let below = self.danger_below.is_some_and(|low| value < low);
        if below || value > self.danger_above {
            Severity::Danger
        } else if value > self.warning_above {
            Severity::Warning
        } else {
            Severity::Healthy
        }
    }
}

/// Classify a value for a raw type index; unknown indices yield `Unknown`
pub fn classify(type_index: u8, value: f64) -> Severity {
    match SensorType::from_index(type_index) {
        Some(sensor_type) => Thresholds::for_type(sensor_type).evaluate(value),
        None => Severity::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMP: u8 = 0;
    const ENERGY: u8 = 1;
    const CO2: u8 = 2;

    #[test]
    fn test_temp_boundaries() {
        assert_eq!(classify(TEMP, 24.0), Severity::Healthy);
        assert_eq!(classify(TEMP, 24.01), Severity::Warning);
        assert_eq!(classify(TEMP, 27.0), Severity::Warning);
        assert_eq!(classify(TEMP, 27.01), Severity::Danger);
        assert_eq!(classify(TEMP, 18.0), Severity::Healthy);
        assert_eq!(classify(TEMP, 17.99), Severity::Danger);
        assert_eq!(classify(TEMP, 30.0), Severity::Danger);
    }

    #[test]
    fn test_energy_boundaries() {
        assert_eq!(classify(ENERGY, 0.0), Severity::Healthy);
        assert_eq!(classify(ENERGY, 300.0), Severity::Healthy);
        assert_eq!(classify(ENERGY, 300.5), Severity::Warning);
        assert_eq!(classify(ENERGY, 450.0), Severity::Warning);
        assert_eq!(classify(ENERGY, 450.1), Severity::Danger);
    }

    #[test]
    fn test_co2_boundaries() {
        assert_eq!(classify(CO2, 800.0), Severity::Healthy);
        assert_eq!(classify(CO2, 801.0), Severity::Warning);
        assert_eq!(classify(CO2, 1200.0), Severity::Warning);
        assert_eq!(classify(CO2, 1201.0), Severity::Danger);
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(classify(3, 10.0), Severity::Unknown);
        assert_eq!(classify(u8::MAX, 10_000.0), Severity::Unknown);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for value in [-5.0, 0.0, 18.0, 24.0, 27.0, 450.0, 1200.0, 1e9] {
            for kind in 0..4 {
                assert_eq!(classify(kind, value), classify(kind, value));
            }
        }
    }

    #[test]
    fn test_nan_is_healthy_for_known_types() {
        assert_eq!(classify(TEMP, f64::NAN), Severity::Healthy);
        assert_eq!(classify(CO2, f64::NAN), Severity::Healthy);
    }
}
