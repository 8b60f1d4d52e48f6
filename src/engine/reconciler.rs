//! Reconciliation engine
//!
//! Owns every piece of session state. Notifications must be handled one at a
//! time in delivery order; nothing here is shared across tasks.

use std::collections::HashMap;
use tracing::{debug, trace};

use super::{
    ActionTaken, AuditLogBuilder, AuditRecord, Classifier, DedupIndex, EngineStats, ModifyPolicy,
    Outcome, ReconciliationReport,
};
use crate::parser::Notification;

/// Dedups, classifies and audits order updates for one stream session
#[derive(Debug)]
pub struct ReconciliationEngine {
    dedup: DedupIndex,
    classifier: Classifier,
    auditor: AuditLogBuilder,
    /// order_id -> last actionable notification
    last_known: HashMap<u64, Notification>,
    history: Vec<Notification>,
    actions_taken: Vec<ActionTaken>,
    audit_log: Vec<AuditRecord>,
    stats: EngineStats,
}

impl ReconciliationEngine {
    /// Create an engine with the strict modify policy
    pub fn new(base_client_id: u64) -> Self {
        Self::with_policy(base_client_id, ModifyPolicy::Strict)
    }

    pub fn with_policy(base_client_id: u64, policy: ModifyPolicy) -> Self {
        Self {
            dedup: DedupIndex::new(),
            classifier: Classifier::new(policy),
            auditor: AuditLogBuilder::new(base_client_id),
            last_known: HashMap::new(),
            history: Vec::new(),
            actions_taken: Vec::new(),
            audit_log: Vec::new(),
            stats: EngineStats::default(),
        }
    }

    /// Handle one notification
    pub fn handle(&mut self, notification: Notification) -> Outcome {
        self.stats.received += 1;

        if self.dedup.is_duplicate(&notification) {
            self.stats.duplicates += 1;
            trace!(order_id = notification.order_id, "Duplicate update dropped");
            return Outcome::Duplicate;
        }

        self.dedup.admit(&notification);
        self.history.push(notification.clone());

        let order_id = notification.order_id;
        let prior = self.last_known.get(&order_id);
        let Some(action) = self.classifier.classify(&notification, prior) else {
            self.stats.unclassified += 1;
            debug!(
                order_id,
                price_type = %notification.price_type,
                status = %notification.status,
                transaction = ?notification.transaction(),
                "Update not actionable"
            );
            return Outcome::Unclassified;
        };

        self.actions_taken.push(ActionTaken { order_id, action });
        self.audit_log.push(self.auditor.build_record(&notification));
        self.last_known.insert(order_id, notification);

        self.stats.record_action(action);
        self.stats.tracked_orders = self.last_known.len();

        debug!(order_id, action = %action, "Update actioned");
        Outcome::Actioned(action)
    }

    /// Admitted notifications, in delivery order
    pub fn history(&self) -> &[Notification] {
        &self.history
    }

    pub fn actions_taken(&self) -> &[ActionTaken] {
        &self.actions_taken
    }

    pub fn audit_log(&self) -> &[AuditRecord] {
        &self.audit_log
    }

    /// Most recent audit record, if any
    pub fn last_record(&self) -> Option<&AuditRecord> {
        self.audit_log.last()
    }

    /// Last actionable notification seen for an order
    pub fn last_known(&self, order_id: u64) -> Option<&Notification> {
        self.last_known.get(&order_id)
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn policy(&self) -> ModifyPolicy {
        self.classifier.policy()
    }

    /// Snapshot of the accumulated results
    pub fn report(&self) -> ReconciliationReport {
        ReconciliationReport {
            filtered_updates: self.history.clone(),
            actions_taken: self.actions_taken.clone(),
            log_entries: self.audit_log.clone(),
            stats: self.stats,
        }
    }

    /// Consume the engine into its accumulated results
    pub fn into_report(self) -> ReconciliationReport {
        ReconciliationReport {
            filtered_updates: self.history,
            actions_taken: self.actions_taken,
            log_entries: self.audit_log,
            stats: self.stats,
        }
    }
}
