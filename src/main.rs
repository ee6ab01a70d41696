//! Facility Monitor - main entry point

use facility_monitor::{
    camera_arbiter::CameraArbiter,
    dispatcher::Dispatcher,
    grid_state_store::GridStateStore,
    mqtt_subscriber::MqttSubscriber,
    realtime_hub::RealtimeHub,
    state::{AppConfig, AppState},
    telemetry_log::TelemetryLog,
    web_api,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facility_monitor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Facility Monitor v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        mqtt_host = ?config.mqtt.host,
        mqtt_topic = %config.mqtt.topic,
        pulse_ms = config.pulse_duration.as_millis() as u64,
        auto_switch = ?config.auto_switch,
        "Configuration loaded"
    );

    // Presentation side
    let realtime = Arc::new(RealtimeHub::new());

    // Core state, initialized once: all cells Healthy, camera unlocked with no feed
    let grid = Arc::new(GridStateStore::with_pulse_duration(
        realtime.clone(),
        config.pulse_duration,
    ));
    let camera = Arc::new(CameraArbiter::new(realtime.clone()));
    let telemetry_log = Arc::new(TelemetryLog::new(config.telemetry_log_capacity));
    tracing::info!("GridStateStore and CameraArbiter initialized");

    let (dispatcher, writer) = Dispatcher::new(
        grid.clone(),
        camera.clone(),
        telemetry_log.clone(),
        config.auto_switch,
        config.dispatch_queue_capacity,
    );

    // Separate signals so ingestion stops before the writer drains
    let (ingest_shutdown_tx, ingest_shutdown_rx) = watch::channel(false);
    let (writer_shutdown_tx, writer_shutdown_rx) = watch::channel(false);
    let writer_task = tokio::spawn(writer.run(writer_shutdown_rx));

    let subscriber_task = if config.mqtt.host.is_some() {
        let subscriber = MqttSubscriber::new(config.mqtt.clone(), dispatcher.clone());
        let shutdown_timeout = config.shutdown_timeout;
        Some(tokio::spawn(async move {
            if let Err(e) = subscriber.run(ingest_shutdown_rx, shutdown_timeout).await {
                tracing::error!(error = %e, "MqttSubscriber failed");
            }
        }))
    } else {
        tracing::info!("MqttSubscriber disabled (MQTT_HOST not set); use POST /api/telemetry");
        None
    };

    let state = AppState {
        config: config.clone(),
        grid: grid.clone(),
        camera: camera.clone(),
        dispatcher,
        realtime,
        telemetry_log,
        started_at: chrono::Utc::now(),
    };

    let app = web_api::create_router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = ingest_shutdown_tx.send(true);
    if let Some(task) = subscriber_task {
        let bound = config.shutdown_timeout * 2;
        if tokio::time::timeout(bound, task).await.is_err() {
            tracing::warn!("MqttSubscriber did not stop in time");
        }
    }

    // No producer left; apply whatever is still queued
    let _ = writer_shutdown_tx.send(true);
    if let Err(e) = writer_task.await {
        tracing::error!(error = %e, "Dispatch writer task failed");
    }

    grid.reset().await;
    camera.reset().await;
    tracing::info!("Facility Monitor stopped");

    Ok(())
}
