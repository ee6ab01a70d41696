//! MQTT Subscriber
//!
//! Transport adapter: subscribes to the telemetry topic and hands every
//! publish payload to the [`Dispatcher`]. Nothing here touches grid or camera
//! state directly.
//!
//! ## Behaviour
//!
//! - TLS + credentials + clean session
//! - (Re)subscribe with QoS 1 on every ConnAck
//! - Connection errors: log, back off (1s doubling to 30s), keep polling
//! - Shutdown: stop receiving, then disconnect within the configured timeout

use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::state::MqttConfig;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use std::time::Duration;
use tokio::sync::watch;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Reconnect delay: 1s doubling to 30s, back to 1s after a ConnAck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Backoff {
    current: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            current: INITIAL_BACKOFF,
        }
    }

    /// Delay to wait now; advances to the next step
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = next_backoff(delay);
        delay
    }

    fn reset(&mut self) {
        self.current = INITIAL_BACKOFF;
    }
}

fn next_backoff(current: Duration) -> Duration {
    current.saturating_mul(2).min(MAX_BACKOFF)
}

/// MQTT Subscriber
pub struct MqttSubscriber {
    config: MqttConfig,
    dispatcher: Dispatcher,
}

impl MqttSubscriber {
    pub fn new(config: MqttConfig, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    fn options(&self) -> Result<MqttOptions> {
        let host = self
            .config
            .host
            .clone()
            .ok_or_else(|| Error::Config("MQTT_HOST not set".to_string()))?;

        let mut options = MqttOptions::new(self.config.client_id.clone(), host, self.config.port);
        options.set_keep_alive(self.config.keep_alive);
        options.set_clean_session(true);

        if let Some(username) = &self.config.username {
            let password = self.config.password.clone().unwrap_or_default();
            options.set_credentials(username.clone(), password);
        }
        if self.config.use_tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        Ok(options)
    }

    /// Receive loop; returns after shutdown is signalled
    pub async fn run(
        self,
        mut shutdown: watch::Receiver<bool>,
        shutdown_timeout: Duration,
    ) -> Result<()> {
        let options = self.options()?;
        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        let mut backoff = Backoff::new();

        tracing::info!(
            host = ?self.config.host,
            port = self.config.port,
            topic = %self.config.topic,
            tls = self.config.use_tls,
            "Connecting to MQTT broker"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        backoff.reset();
                        tracing::info!(code = ?ack.code, "MQTT connected");
                        if let Err(e) = client.subscribe(self.config.topic.clone(), QoS::AtLeastOnce).await {
                            tracing::error!(error = %e, topic = %self.config.topic, "MQTT subscribe request failed");
                        }
                    }
                    Ok(Event::Incoming(Packet::SubAck(_))) => {
                        tracing::info!(topic = %self.config.topic, "Subscribed to topic");
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if let Err(e) = self.dispatcher.ingest(&publish.payload).await {
                            tracing::warn!(error = %e, "Dispatcher unavailable, stopping receive loop");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let delay = backoff.next_delay();
                        tracing::error!(
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            "MQTT connection error"
                        );
                        tokio::select! {
                            _ = shutdown.changed() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                },
            }
        }

        match tokio::time::timeout(shutdown_timeout, disconnect(&client, &mut eventloop)).await {
            Ok(Ok(())) => tracing::info!("Gracefully disconnected from MQTT broker"),
            Ok(Err(e)) => tracing::warn!(error = %e, "MQTT disconnect failed"),
            Err(_) => tracing::warn!(
                timeout_ms = shutdown_timeout.as_millis() as u64,
                "MQTT disconnect timed out"
            ),
        }

        Ok(())
    }
}

/// Queue a DISCONNECT and drive the event loop until it has been sent
async fn disconnect(client: &AsyncClient, eventloop: &mut EventLoop) -> Result<()> {
    client
        .disconnect()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => return Ok(()),
            Ok(_) => {}
            // Connection already gone: nothing left to close
            Err(_) => return Ok(()),
        }
    }
}
