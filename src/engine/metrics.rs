//! Engine counters

use serde::{Deserialize, Serialize};

use super::Action;

/// Running counters for one reconciliation session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Notifications handed to the engine
    pub received: u64,

    /// Dropped as duplicates
    pub duplicates: u64,

    /// Admitted but not actionable
    pub unclassified: u64,

    pub placed: u64,
    pub modified: u64,
    pub cancelled: u64,

    /// Orders with a last-known state
    pub tracked_orders: usize,
}

impl EngineStats {
    pub(crate) fn record_action(&mut self, action: Action) {
        match action {
            Action::Place => self.placed += 1,
            Action::Modify => self.modified += 1,
            Action::Cancel => self.cancelled += 1,
        }
    }

    /// Notifications admitted to history
    pub fn admitted(&self) -> u64 {
        self.received - self.duplicates
    }

    pub fn actions(&self) -> u64 {
        self.placed + self.modified + self.cancelled
    }

    /// Share of received notifications that were duplicates
    pub fn duplicate_ratio(&self) -> Option<f64> {
        if self.received > 0 {
            Some(self.duplicates as f64 / self.received as f64)
        } else {
            None
        }
    }
}
