//! Spatial resolver types

use crate::error::DispatchError;
use serde::{Deserialize, Serialize};

/// Floors in the facility (1..=6 on the wire, 0..=5 internally)
pub const FLOOR_COUNT: u8 = 6;
/// Zones per floor (A..=G)
pub const ZONES_PER_FLOOR: u8 = 7;
/// Sensor classes per zone
pub const SENSOR_TYPE_COUNT: u8 = 3;
/// Total grid cells (6 x 7 x 3)
pub const GRID_CELL_COUNT: usize =
    FLOOR_COUNT as usize * ZONES_PER_FLOOR as usize * SENSOR_TYPE_COUNT as usize;

/// Sensor class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temp,
    Energy,
    Co2,
}

impl SensorType {
    /// Keyword match order; earlier entries win regardless of position in the id
    pub const PRIORITY: [SensorType; 3] = [SensorType::Temp, SensorType::Energy, SensorType::Co2];

    pub fn index(self) -> u8 {
        match self {
            SensorType::Temp => 0,
            SensorType::Energy => 1,
            SensorType::Co2 => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(SensorType::Temp),
            1 => Some(SensorType::Energy),
            2 => Some(SensorType::Co2),
            _ => None,
        }
    }

    /// Lowercase keyword searched for in sensor ids
    pub fn keyword(self) -> &'static str {
        match self {
            SensorType::Temp => "temp",
            SensorType::Energy => "energy",
            SensorType::Co2 => "co2",
        }
    }

    /// Label used by the dashboard cells
    pub fn label(self) -> &'static str {
        match self {
            SensorType::Temp => "Temp",
            SensorType::Energy => "Power",
            SensorType::Co2 => "CO2",
        }
    }
}

/// Resolved (floor, zone, sensor type) triple addressing one grid cell
///
/// Fields are raw so that externally supplied coordinates can be represented
/// and rejected; use [`SpatialCoordinate::new`] for a checked constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialCoordinate {
    pub floor_index: u8,
    pub zone_index: u8,
    pub type_index: u8,
}

impl SpatialCoordinate {
    /// Checked constructor
    pub fn new(floor_index: u8, zone_index: u8, type_index: u8) -> Result<Self, DispatchError> {
        let coordinate = Self {
            floor_index,
            zone_index,
            type_index,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.floor_index >= FLOOR_COUNT {
            return Err(DispatchError::OutOfRange {
                kind: "floor index",
                value: self.floor_index as u32,
            });
        }
        if self.zone_index >= ZONES_PER_FLOOR {
            return Err(DispatchError::OutOfRange {
                kind: "zone index",
                value: self.zone_index as u32,
            });
        }
        if self.type_index >= SENSOR_TYPE_COUNT {
            return Err(DispatchError::OutOfRange {
                kind: "type index",
                value: self.type_index as u32,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Arena offset, `None` when out of range
    pub fn offset(&self) -> Option<usize> {
        self.checked_offset().ok()
    }

    /// Arena offset, or the range error naming the offending axis
    pub fn checked_offset(&self) -> Result<usize, DispatchError> {
        self.validate()?;
        let floor = self.floor_index as usize;
        let zone = self.zone_index as usize;
        let kind = self.type_index as usize;
        Ok((floor * ZONES_PER_FLOOR as usize + zone) * SENSOR_TYPE_COUNT as usize + kind)
    }

    /// Inverse of [`offset`](Self::offset)
    pub fn from_offset(offset: usize) -> Option<Self> {
        if offset >= GRID_CELL_COUNT {
            return None;
        }
        let kinds = SENSOR_TYPE_COUNT as usize;
        let zones = ZONES_PER_FLOOR as usize;
        Some(Self {
            floor_index: (offset / (zones * kinds)) as u8,
            zone_index: ((offset / kinds) % zones) as u8,
            type_index: (offset % kinds) as u8,
        })
    }

    pub fn sensor_type(&self) -> Option<SensorType> {
        SensorType::from_index(self.type_index)
    }

    /// 1-based floor number as shown on the dashboard
    pub fn floor_number(&self) -> u8 {
        self.floor_index + 1
    }

    /// Dashboard element name, e.g. `3C_Temp`
    pub fn cell_name(&self) -> Option<String> {
        let kind = self.sensor_type()?;
        if !self.is_valid() {
            return None;
        }
        let letter = (b'A' + self.zone_index) as char;
        Some(format!("{}{}_{}", self.floor_number(), letter, kind.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_covers_arena_without_gaps() {
        let mut seen = vec![false; GRID_CELL_COUNT];
        for floor in 0..FLOOR_COUNT {
            for zone in 0..ZONES_PER_FLOOR {
                for kind in 0..SENSOR_TYPE_COUNT {
                    let coordinate = SpatialCoordinate::new(floor, zone, kind).unwrap();
                    let offset = coordinate.offset().unwrap();
                    assert!(!seen[offset]);
                    seen[offset] = true;
                    assert_eq!(SpatialCoordinate::from_offset(offset), Some(coordinate));
                }
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(SpatialCoordinate::new(6, 0, 0).is_err());
        assert!(SpatialCoordinate::new(0, 7, 0).is_err());
        assert!(SpatialCoordinate::new(0, 0, 3).is_err());
        assert_eq!(SpatialCoordinate::from_offset(GRID_CELL_COUNT), None);

        let raw = SpatialCoordinate {
            floor_index: 9,
            zone_index: 0,
            type_index: 0,
        };
        assert_eq!(raw.offset(), None);
        assert_eq!(raw.cell_name(), None);
    }

    #[test]
    fn test_cell_name() {
        let coordinate = SpatialCoordinate::new(2, 2, 0).unwrap();
        assert_eq!(coordinate.cell_name().as_deref(), Some("3C_Temp"));
        let coordinate = SpatialCoordinate::new(5, 6, 1).unwrap();
        assert_eq!(coordinate.cell_name().as_deref(), Some("6G_Power"));
    }
}
