//! Feed connection manager
//!
//! Handles reconnection logic and hands parsed updates to the engine task.
//! Updates are forwarded strictly in the order they were received.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{error, info, trace, warn};

use super::{FeedClient, Incoming};
use crate::config::Config;
use crate::error::{ReconcilerError, Result};
use crate::parser::{Notification, ParsedMessage};
use crate::telemetry::Telemetry;

/// Maximum backoff delay in milliseconds (60 seconds)
const MAX_BACKOFF_MS: u64 = 60_000;

/// Manages the feed connection until the server ends the stream
pub struct FeedManager {
    config: Arc<Config>,
    client: FeedClient,
    sender: mpsc::Sender<Notification>,
    telemetry: Arc<Telemetry>,
    reconnect_attempts: u32,
}

impl FeedManager {
    /// Create a new feed manager
    pub fn new(
        config: Arc<Config>,
        sender: mpsc::Sender<Notification>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        let client = FeedClient::new(&config.ws_endpoint);

        Self {
            config,
            client,
            sender,
            telemetry,
            reconnect_attempts: 0,
        }
    }

    /// Run until end-of-stream, reconnecting on transport errors
    pub async fn run(&mut self) -> Result<()> {
        info!(endpoint = %self.config.ws_endpoint, "Starting feed manager");

        loop {
            match self.connect_and_process().await {
                Ok(()) => {
                    info!("Disconnected from feed, end of stream");
                    self.client.close().await;
                    return Ok(());
                }
                Err(ReconcilerError::ChannelClosed) => {
                    error!("Engine task is gone, stopping feed");
                    self.client.close().await;
                    return Err(ReconcilerError::ChannelClosed);
                }
                Err(e) => {
                    error!(error = %e, "Feed error");
                    self.reconnect_attempts += 1;
                    self.telemetry.record_reconnect();

                    if self.reconnect_attempts > self.config.max_reconnect_attempts {
                        return Err(ReconcilerError::MaxReconnectAttemptsExceeded(
                            self.config.max_reconnect_attempts,
                        ));
                    }

                    let delay = Duration::from_millis(
                        self.config
                            .backoff_ms(self.reconnect_attempts)
                            .min(MAX_BACKOFF_MS),
                    );

                    warn!(
                        attempt = self.reconnect_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Reconnecting after error..."
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Connect and process frames until the server closes the stream
    async fn connect_and_process(&mut self) -> Result<()> {
        self.client.connect().await?;
        self.reconnect_attempts = 0;

        let mut last_message = Instant::now();
        let keepalive_timeout = Duration::from_secs(30);
        let recv_timeout = Duration::from_secs(self.config.recv_timeout_secs);

        loop {
            match timeout(recv_timeout, self.client.recv()).await {
                Ok(Ok(Incoming::Text(text))) => {
                    last_message = Instant::now();
                    self.process_message(&text).await?;
                }
                Ok(Ok(Incoming::Control)) => {
                    if last_message.elapsed() > keepalive_timeout {
                        if let Err(e) = self.client.ping().await {
                            warn!(error = %e, "Failed to send keepalive ping");
                        }
                    }
                }
                Ok(Ok(Incoming::Closed)) => return Ok(()),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(
                        last_message_secs = last_message.elapsed().as_secs(),
                        "No message received within timeout, sending keepalive"
                    );
                    if let Err(e) = self.client.ping().await {
                        warn!(error = %e, "Failed to send keepalive ping, reconnecting");
                        return Err(ReconcilerError::ConnectionTimeout);
                    }
                }
            }
        }
    }

    /// Parse one frame and forward it to the engine
    ///
    /// Malformed updates are dropped here so they never reach engine state.
    async fn process_message(&self, raw: &str) -> Result<()> {
        self.telemetry.record_frame();

        match ParsedMessage::parse(raw) {
            Ok(ParsedMessage::Notification(notification)) => {
                self.sender
                    .send(*notification)
                    .await
                    .map_err(|_| ReconcilerError::ChannelClosed)?;
            }
            Ok(ParsedMessage::Unknown(msg)) => {
                trace!(msg = %msg, "Unknown message type");
            }
            Err(e) => {
                self.telemetry.record_rejected();
                warn!(error = %e, "Rejected malformed order update");
            }
        }

        Ok(())
    }
}
