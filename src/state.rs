//! Application state
//!
//! Holds configuration and all shared components

use crate::camera_arbiter::CameraArbiter;
use crate::dispatcher::{AutoSwitchPolicy, Dispatcher};
use crate::grid_state_store::GridStateStore;
use crate::realtime_hub::RealtimeHub;
use crate::telemetry_log::TelemetryLog;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Broker connection settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker host; the subscriber is disabled when unset
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic: String,
    pub client_id: String,
    pub use_tls: bool,
    pub keep_alive: Duration,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("MQTT_HOST").ok().filter(|h| !h.is_empty()),
            port: env_or("MQTT_PORT", 8883),
            username: std::env::var("MQTT_USERNAME").ok(),
            password: std::env::var("MQTT_PASSWORD").ok(),
            topic: std::env::var("MQTT_TOPIC")
                .unwrap_or_else(|_| "facility/office/sensors".to_string()),
            client_id: std::env::var("MQTT_CLIENT_ID").unwrap_or_else(|_| {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                format!("facility-monitor-{}", &suffix[..8])
            }),
            use_tls: env_or("MQTT_TLS", true),
            keep_alive: Duration::from_secs(env_or("MQTT_KEEP_ALIVE_SEC", 60)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    pub mqtt: MqttConfig,
    /// Cell pulse highlight duration
    pub pulse_duration: Duration,
    /// Ring buffer size for recent telemetry
    pub telemetry_log_capacity: usize,
    /// Writer queue depth
    pub dispatch_queue_capacity: usize,
    /// Which readings request an automated camera switch
    pub auto_switch: AutoSwitchPolicy,
    /// Upper bound for transport disconnect on shutdown
    pub shutdown_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8080),
            mqtt: MqttConfig::default(),
            pulse_duration: Duration::from_millis(env_or("PULSE_MS", 150)),
            telemetry_log_capacity: env_or("TELEMETRY_LOG_CAPACITY", 500),
            dispatch_queue_capacity: env_or("DISPATCH_QUEUE_CAPACITY", 1024),
            auto_switch: env_or("CAMERA_AUTO_SWITCH", AutoSwitchPolicy::Always),
            shutdown_timeout: Duration::from_secs(env_or("SHUTDOWN_TIMEOUT_SEC", 5)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// GridStateStore (read side; writes go through the dispatcher)
    pub grid: Arc<GridStateStore>,
    /// CameraArbiter (read side; writes go through the dispatcher)
    pub camera: Arc<CameraArbiter>,
    /// Dispatcher producer handle
    pub dispatcher: Dispatcher,
    /// RealtimeHub (WebSocket)
    pub realtime: Arc<RealtimeHub>,
    /// Recent ingestion outcomes
    pub telemetry_log: Arc<TelemetryLog>,
    pub started_at: DateTime<Utc>,
}
