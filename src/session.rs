//! Engine task
//!
//! The single consumer of the feed queue. It owns the reconciliation engine
//! outright, so no state is shared or locked.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::engine::{EngineStats, Outcome, ReconciliationEngine};
use crate::parser::Notification;
use crate::publisher::Publisher;
use crate::telemetry::Telemetry;

/// Drives an engine from a queue of notifications
pub struct EngineTask {
    engine: ReconciliationEngine,
    publisher: Option<Publisher>,
    telemetry: Option<Arc<Telemetry>>,
    stats_tx: Option<watch::Sender<EngineStats>>,
}

impl EngineTask {
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self {
            engine,
            publisher: None,
            telemetry: None,
            stats_tx: None,
        }
    }

    /// Forward each new audit record to the order book updater
    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Broadcast engine stats after every update
    pub fn with_stats(mut self, stats_tx: watch::Sender<EngineStats>) -> Self {
        self.stats_tx = Some(stats_tx);
        self
    }

    /// Handle notifications until every sender is dropped, then hand the engine back
    pub async fn run(mut self, mut rx: mpsc::Receiver<Notification>) -> ReconciliationEngine {
        info!(policy = ?self.engine.policy(), "Engine task started");

        while let Some(notification) = rx.recv().await {
            let outcome = self.engine.handle(notification);
            let stats = self.engine.stats();

            if let Some(telemetry) = &self.telemetry {
                telemetry.record_outcome(outcome, stats.tracked_orders);
            }

            if let (Outcome::Actioned(_), Some(publisher)) = (outcome, &self.publisher) {
                if let Some(record) = self.engine.last_record() {
                    if let Err(e) = publisher.publish(record).await {
                        warn!(error = %e, "Failed to publish audit record");
                    }
                }
            }

            if let Some(stats_tx) = &self.stats_tx {
                stats_tx.send_replace(stats);
            }
        }

        let stats = self.engine.stats();
        info!(
            received = stats.received,
            duplicates = stats.duplicates,
            actions = stats.actions(),
            "Feed drained, engine task finished"
        );
        self.engine
    }
}
