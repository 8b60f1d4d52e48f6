//! Scripted order-update feed
//!
//! A WebSocket server that replays an order script to every client in timed
//! batches, stamping each update with the local send time, then closes.

use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::{accept_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use crate::error::Result;

const SAMPLE_SCRIPT: &str = include_str!("../fixtures/sample_orders.json");

/// Layout of the generation timestamp stamped on each update
pub const GENERATED_AT_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Up to `count` updates sent `delay` after the connection opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub count: usize,
    pub delay: Duration,
}

impl Batch {
    pub fn new(count: usize, delay_ms: u64) -> Self {
        Self {
            count,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Default batch schedule
pub fn default_schedule() -> Vec<Batch> {
    vec![
        Batch::new(10, 1_000),
        Batch::new(20, 3_000),
        Batch::new(40, 6_000),
        Batch::new(30, 11_000),
    ]
}

/// Replays an order script over WebSocket
#[derive(Debug, Clone)]
pub struct FeedSimulator {
    script: Arc<Vec<Map<String, Value>>>,
    schedule: Vec<Batch>,
}

impl FeedSimulator {
    pub fn new(script: Vec<Map<String, Value>>) -> Self {
        Self {
            script: Arc::new(script),
            schedule: default_schedule(),
        }
    }

    /// The built-in ten-update sample
    pub fn sample() -> Result<Self> {
        Ok(Self::new(serde_json::from_str(SAMPLE_SCRIPT)?))
    }

    /// Load a script: a JSON array of update objects
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&raw)?))
    }

    pub fn with_schedule(mut self, schedule: Vec<Batch>) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn script_len(&self) -> usize {
        self.script.len()
    }

    /// Accept clients forever, each replayed independently
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!(addr = ?listener.local_addr().ok(), "Feed simulator listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            info!(peer = %peer, "Client connected");

            let script = self.script.clone();
            let schedule = self.schedule.clone();
            tokio::spawn(async move {
                if let Err(e) = replay(stream, script, schedule).await {
                    warn!(peer = %peer, error = %e, "Replay failed");
                }
                info!(peer = %peer, "Client disconnected");
            });
        }
    }
}

async fn replay(
    stream: TcpStream,
    script: Arc<Vec<Map<String, Value>>>,
    schedule: Vec<Batch>,
) -> Result<()> {
    let mut ws = accept_async(stream).await?;
    let started = Instant::now();
    let mut next = 0;

    for batch in schedule {
        if next >= script.len() {
            break;
        }
        sleep_until(started + batch.delay).await;

        for update in script.iter().skip(next).take(batch.count) {
            let mut update = update.clone();
            update.insert(
                "OrderGeneratedDateTimeAPI".to_string(),
                Value::String(Local::now().format(GENERATED_AT_FORMAT).to_string()),
            );
            let payload = serde_json::to_string(&update)?;
            debug!(payload = %payload, "Sent order update");
            ws.send(Message::Text(payload)).await?;
            next += 1;
        }
    }

    info!(sent = next, "All updates sent, closing connection");
    ws.close(None).await?;

    // Finish the closing handshake
    while let Some(msg) = ws.next().await {
        if msg.is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedMessage;

    #[test]
    fn test_sample_script_parses() {
        let sim = FeedSimulator::sample().unwrap();
        assert_eq!(sim.script_len(), 10);

        for update in sim.script.iter() {
            let raw = serde_json::to_string(update).unwrap();
            assert!(matches!(
                ParsedMessage::parse(&raw).unwrap(),
                ParsedMessage::Notification(_)
            ));
        }
    }

    #[test]
    fn test_default_schedule_covers_more_than_sample() {
        let total: usize = default_schedule().iter().map(|b| b.count).sum();
        assert_eq!(total, 100);
        assert_eq!(default_schedule()[0].delay, Duration::from_secs(1));
    }
}
