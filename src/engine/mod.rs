//! Reconciliation engine module
//!
//! Turns the order-update stream into a deduplicated history, the list of
//! order-book actions, and an append-only audit log.

mod audit;
mod classifier;
mod dedup;
mod metrics;
mod reconciler;

pub use audit::{normalize_timestamp, parse_generated_at, AuditLogBuilder, AuditRecord};
pub use classifier::{classify, Action, Classifier, ModifyPolicy};
pub use dedup::{DedupIndex, DedupKey};
pub use metrics::EngineStats;
pub use reconciler::ReconciliationEngine;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::Notification;

/// Result of handling one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Already seen; nothing changed
    Duplicate,
    /// Admitted to history but implies no action
    Unclassified,
    /// Admitted, audited, and stored as the order's last known state
    Actioned(Action),
}

/// One entry of the actions-taken list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTaken {
    pub order_id: u64,
    pub action: Action,
}

impl fmt::Display for ActionTaken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "For AppOrderID: {} : {}", self.order_id, self.action)
    }
}

/// Accumulated results of a session, for presentation
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub filtered_updates: Vec<Notification>,
    pub actions_taken: Vec<ActionTaken>,
    pub log_entries: Vec<AuditRecord>,
    pub stats: EngineStats,
}
