//! Prometheus counters for the feed and the engine

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

use crate::engine::{Action, Outcome};

/// Counters exported on `/metrics`
#[derive(Clone)]
pub struct Telemetry {
    registry: Registry,
    frames: IntCounter,
    rejected: IntCounter,
    duplicates: IntCounter,
    unclassified: IntCounter,
    actions: IntCounterVec,
    reconnects: IntCounter,
    tracked_orders: IntGauge,
}

impl Telemetry {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("reconciler".to_string()), None)?;

        let frames = IntCounter::new("feed_frames_total", "Data frames received from the feed")?;
        let rejected = IntCounter::new(
            "feed_rejected_total",
            "Frames rejected as malformed order updates",
        )?;
        let duplicates = IntCounter::new("duplicates_total", "Updates dropped as duplicates")?;
        let unclassified = IntCounter::new(
            "unclassified_total",
            "Updates admitted without an order book action",
        )?;
        let actions = IntCounterVec::new(
            Opts::new("actions_total", "Order book actions emitted"),
            &["action"],
        )?;
        let reconnects = IntCounter::new("feed_reconnects_total", "Feed reconnect attempts")?;
        let tracked_orders = IntGauge::new("tracked_orders", "Orders with a last known state")?;

        registry.register(Box::new(frames.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(duplicates.clone()))?;
        registry.register(Box::new(unclassified.clone()))?;
        registry.register(Box::new(actions.clone()))?;
        registry.register(Box::new(reconnects.clone()))?;
        registry.register(Box::new(tracked_orders.clone()))?;

        Ok(Self {
            registry,
            frames,
            rejected,
            duplicates,
            unclassified,
            actions,
            reconnects,
            tracked_orders,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_frame(&self) {
        self.frames.inc();
    }

    pub fn record_rejected(&self) {
        self.rejected.inc();
    }

    pub fn record_reconnect(&self) {
        self.reconnects.inc();
    }

    pub fn record_outcome(&self, outcome: Outcome, tracked_orders: usize) {
        match outcome {
            Outcome::Duplicate => self.duplicates.inc(),
            Outcome::Unclassified => self.unclassified.inc(),
            Outcome::Actioned(action) => self.actions.with_label_values(&[action_label(action)]).inc(),
        }
        self.tracked_orders.set(tracked_orders as i64);
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.get()
    }

    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::Place => "place",
        Action::Modify => "modify",
        Action::Cancel => "cancel",
    }
}
