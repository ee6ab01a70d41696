//! Facility Monitor Library
//!
//! Real-time facility telemetry: sensor grid status and camera feed arbitration.
//!
//! ## Pipeline
//!
//! raw message -> TelemetryDecoder -> SpatialResolver -> StatusClassifier
//! -> Dispatcher (single writer) -> { GridStateStore, CameraArbiter }
//!
//! ## Components
//!
//! 1. TelemetryDecoder - JSON payload -> TelemetryReading
//! 2. SpatialResolver - zone/sensor ids -> (floor, zone, type)
//! 3. StatusClassifier - fixed thresholds -> Severity
//! 4. GridStateStore - 6x7x3 cell arena + pulse hints
//! 5. CameraArbiter - exclusive active feed with manual lock
//! 6. Dispatcher - serialized state mutation
//! 7. TelemetryLog - recent ingestion outcomes
//! 8. MqttSubscriber - broker transport adapter
//! 9. RealtimeHub - WebSocket distribution
//! 10. WebAPI - HTTP endpoints

pub mod camera_arbiter;
pub mod dispatcher;
pub mod error;
pub mod grid_state_store;
pub mod models;
pub mod mqtt_subscriber;
pub mod presentation;
pub mod realtime_hub;
pub mod spatial_resolver;
pub mod state;
pub mod status_classifier;
pub mod telemetry_decoder;
pub mod telemetry_log;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
