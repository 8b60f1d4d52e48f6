//! Deduplication index
//!
//! Two notifications that agree on every identity field are the same update,
//! whatever their delivery time or quantities.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::parser::{Notification, OrderStatus, PriceType};

/// Identity of a notification for deduplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    order_id: u64,
    price: Decimal,
    trigger_price: Decimal,
    price_type: PriceType,
    product_type: String,
    status: OrderStatus,
    exchange: String,
    symbol: String,
}

impl From<&Notification> for DedupKey {
    fn from(n: &Notification) -> Self {
        Self {
            order_id: n.order_id,
            price: n.price,
            trigger_price: n.trigger_price,
            price_type: n.price_type.clone(),
            product_type: n.product_type.clone(),
            status: n.status.clone(),
            exchange: n.exchange.clone(),
            symbol: n.symbol.clone(),
        }
    }
}

/// Set of admitted dedup keys
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<DedupKey>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an equivalent notification was already admitted
    pub fn is_duplicate(&self, notification: &Notification) -> bool {
        self.seen.contains(&DedupKey::from(notification))
    }

    /// Record the notification's key. Returns false if it was already present.
    pub fn admit(&mut self, notification: &Notification) -> bool {
        self.seen.insert(DedupKey::from(notification))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
