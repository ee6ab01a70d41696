//! SpatialResolver - Zone/sensor identifiers -> grid coordinate
//!
//! ## Rules
//!
//! - Zone id: exactly `Zone_<1-6><A-G>`; floor = digit - '1', zone = letter - 'A'
//! - Sensor id: case-insensitive keyword search in fixed priority
//!   `temp` > `energy` > `co2`

mod types;

pub use types::*;

use crate::error::ResolveError;

const ZONE_PREFIX: &str = "Zone_";

/// Resolve a reading's identifiers to a coordinate
pub fn resolve(zone_id: &str, sensor_id: &str) -> Result<SpatialCoordinate, ResolveError> {
    let (floor_index, zone_index) = resolve_zone(zone_id)?;
    let sensor_type = resolve_sensor_type(sensor_id)?;

    Ok(SpatialCoordinate {
        floor_index,
        zone_index,
        type_index: sensor_type.index(),
    })
}

/// Parse `Zone_<digit><letter>` into (floor index, zone index)
pub fn resolve_zone(zone_id: &str) -> Result<(u8, u8), ResolveError> {
    let bad = || ResolveError::BadZoneFormat(zone_id.to_string());

    let suffix = zone_id.strip_prefix(ZONE_PREFIX).ok_or_else(bad)?;
    let &[digit, letter] = suffix.as_bytes() else {
        return Err(bad());
    };

    if !(b'1'..=b'0' + FLOOR_COUNT).contains(&digit) {
        return Err(bad());
    }
    if !(b'A'..b'A' + ZONES_PER_FLOOR).contains(&letter) {
        return Err(bad());
    }

    Ok((digit - b'1', letter - b'A'))
}

/// Find the sensor class by keyword priority
pub fn resolve_sensor_type(sensor_id: &str) -> Result<SensorType, ResolveError> {
    let lowered = sensor_id.to_lowercase();

    SensorType::PRIORITY
        .into_iter()
        .find(|kind| lowered.contains(kind.keyword()))
        .ok_or_else(|| ResolveError::UnknownSensorType(sensor_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_zone_and_type() {
        let coordinate = resolve("Zone_3C", "zone_3C_temp").unwrap();
        assert_eq!(coordinate.floor_index, 2);
        assert_eq!(coordinate.zone_index, 2);
        assert_eq!(coordinate.type_index, 0);
    }

    #[test]
    fn test_every_valid_zone_maps_to_distinct_location() {
        let mut seen = std::collections::HashSet::new();
        for digit in '1'..='6' {
            for letter in 'A'..='G' {
                let zone_id = format!("Zone_{}{}", digit, letter);
                let (floor, zone) = resolve_zone(&zone_id).unwrap();
                assert_eq!(floor as u32, digit as u32 - '1' as u32);
                assert_eq!(zone as u32, letter as u32 - 'A' as u32);
                assert!(seen.insert((floor, zone)));
            }
        }
        assert_eq!(seen.len(), 42);
    }

    #[test]
    fn test_bad_zone_formats() {
        for zone_id in [
            "Zone_0A", "Zone_7A", "Zone_1H", "Zone_1a", "zone_1A", "Zone_1", "Zone_1AB",
            "Zone_A1", "Zone1A", "", "Zone_", "Zone_１A",
        ] {
            assert_eq!(
                resolve_zone(zone_id),
                Err(ResolveError::BadZoneFormat(zone_id.to_string())),
                "{zone_id}"
            );
        }
    }

    #[test]
    fn test_sensor_type_case_insensitive() {
        assert_eq!(resolve_sensor_type("ZONE_1A_TEMP"), Ok(SensorType::Temp));
        assert_eq!(resolve_sensor_type("zone_1A_Energy"), Ok(SensorType::Energy));
        assert_eq!(resolve_sensor_type("zone_1A_CO2"), Ok(SensorType::Co2));
    }

    #[test]
    fn test_sensor_type_priority_not_position() {
        // co2 appears first in the string but temp has priority
        assert_eq!(resolve_sensor_type("co2_temp_probe"), Ok(SensorType::Temp));
        assert_eq!(resolve_sensor_type("co2_energy"), Ok(SensorType::Energy));
        assert_eq!(resolve_sensor_type("temperature"), Ok(SensorType::Temp));
    }

    #[test]
    fn test_unknown_sensor_type() {
        assert_eq!(
            resolve("Zone_1A", "zone_1A_humidity"),
            Err(ResolveError::UnknownSensorType("zone_1A_humidity".to_string()))
        );
    }

    #[test]
    fn test_zone_checked_before_sensor() {
        assert!(matches!(
            resolve("Zone_9Z", "humidity"),
            Err(ResolveError::BadZoneFormat(_))
        ));
    }
}
