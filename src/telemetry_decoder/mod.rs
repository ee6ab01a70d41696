//! TelemetryDecoder - Raw payload -> TelemetryReading
//!
//! ## Wire format (UTF-8 JSON)
//!
//! `{"timestamp": string, "zone": string, "sensor": string, "value": number}`
//!
//! Extra keys are ignored; the upstream publisher serialises whole dataset rows.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// One decoded telemetry sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub timestamp: String,
    #[serde(rename = "zone")]
    pub zone_id: String,
    #[serde(rename = "sensor")]
    pub sensor_id: String,
    pub value: f64,
}

impl TelemetryReading {
    /// Human-readable label, e.g. `zone_1A_temp: 30.00`
    pub fn display_value(&self) -> String {
        format!("{}: {:.2}", self.sensor_id, self.value)
    }
}

/// Decode a raw payload
///
/// The payload must be a JSON object; arrays are rejected even though they
/// would otherwise deserialize positionally.
pub fn decode(raw_payload: &[u8]) -> Result<TelemetryReading, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(raw_payload)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(DecodeError::Malformed("payload is not a JSON object".to_string()));
    }

    serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let raw = br#"{"timestamp":"t","zone":"Zone_1A","sensor":"zone_1A_temp","value":30}"#;
        let reading = decode(raw).unwrap();

        assert_eq!(reading.timestamp, "t");
        assert_eq!(reading.zone_id, "Zone_1A");
        assert_eq!(reading.sensor_id, "zone_1A_temp");
        assert_eq!(reading.value, 30.0);
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let raw = br#"{"timestamp":"2025-01-01T00:00:00","zone":"Zone_2B","sensor":"zone_2B_co2","value":812.5,"building":"office-small"}"#;
        let reading = decode(raw).unwrap();
        assert_eq!(reading.value, 812.5);
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let raw = br#"{"timestamp":"t","zone":"Zone_1A","sensor":"zone_1A_temp"}"#;
        assert!(matches!(decode(raw), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_mistyped_fields_are_malformed() {
        let string_value = br#"{"timestamp":"t","zone":"Zone_1A","sensor":"s","value":"30"}"#;
        let numeric_zone = br#"{"timestamp":"t","zone":11,"sensor":"s","value":30}"#;
        let null_value = br#"{"timestamp":"t","zone":"Zone_1A","sensor":"s","value":null}"#;

        assert!(decode(string_value).is_err());
        assert!(decode(numeric_zone).is_err());
        assert!(decode(null_value).is_err());
    }

    #[test]
    fn test_non_object_payloads_are_malformed() {
        assert!(decode(br#"["t","Zone_1A","zone_1A_temp",30]"#).is_err());
        assert!(decode(b"not json").is_err());
        assert!(decode(&[0xff, 0xfe, 0x00]).is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_display_value() {
        let reading = TelemetryReading {
            timestamp: "t".into(),
            zone_id: "Zone_1A".into(),
            sensor_id: "zone_1A_energy".into(),
            value: 312.456,
        };
        assert_eq!(reading.display_value(), "zone_1A_energy: 312.46");
    }
}
