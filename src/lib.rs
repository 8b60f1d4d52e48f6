//! Order Reconciler - Order Update Reconciliation Library
//!
//! This crate consumes a WebSocket stream of order-state updates and turns it
//! into a deduplicated history, a list of order-book actions, and an audit log
//! for downstream order book synchronization.

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod publisher;
pub mod report;
pub mod session;
pub mod simulator;
pub mod telemetry;
pub mod websocket;

pub use config::Config;
pub use engine::{
    Action, ActionTaken, AuditRecord, EngineStats, ModifyPolicy, Outcome, ReconciliationEngine,
    ReconciliationReport,
};
pub use error::{ReconcilerError, Result};
pub use parser::{Notification, OrderStatus, ParsedMessage, PriceType};
pub use publisher::Publisher;
pub use session::EngineTask;
pub use simulator::FeedSimulator;
pub use telemetry::Telemetry;
pub use websocket::FeedManager;
