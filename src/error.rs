//! Error handling for the facility monitor
//!
//! Pipeline errors (`DecodeError`, `ResolveError`, `DispatchError`) are
//! recovered locally by the ingest loop. The crate-level `Error` wraps them
//! for the HTTP surface and for startup/transport failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Telemetry payload could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Missing or mistyped field, non-JSON or non-UTF-8 payload
    #[error("Malformed telemetry payload: {0}")]
    Malformed(String),
}

/// Reading could not be mapped to a grid coordinate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Zone id is not `Zone_<1-6><A-G>`
    #[error("Bad zone format: {0:?}")]
    BadZoneFormat(String),

    /// Sensor id contains none of the known type keywords
    #[error("Unknown sensor type: {0:?}")]
    UnknownSensorType(String),
}

/// Coordinate or feed index outside the facility layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("{kind} out of range: {value}")]
    OutOfRange { kind: &'static str, value: u32 },

    /// Writer task is gone (shutdown in progress)
    #[error("Dispatch queue closed")]
    QueueClosed,
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Telemetry decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Spatial resolution error
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Dispatch error
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Transport (broker) error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Error::Decode(e) => (StatusCode::BAD_REQUEST, "DECODE_ERROR", e.to_string()),
            Error::Resolve(e) => (StatusCode::UNPROCESSABLE_ENTITY, "RESOLVE_ERROR", e.to_string()),
            Error::Dispatch(DispatchError::QueueClosed) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SHUTTING_DOWN",
                DispatchError::QueueClosed.to_string(),
            ),
            Error::Dispatch(e) => (StatusCode::BAD_REQUEST, "OUT_OF_RANGE", e.to_string()),
            Error::Transport(msg) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR", msg.clone()),
            Error::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                msg.clone(),
            ),
        };

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}
