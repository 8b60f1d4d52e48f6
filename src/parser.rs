//! Parser module for order-update WebSocket messages
//!
//! Each text frame carries one JSON order-state notification. Unknown
//! `priceType`/`status` strings are kept verbatim so the classifier can decide
//! they are not actionable; a frame missing a required field is rejected.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Order price type as sent on the wire (`MKT`, `LMT`, `SL-LMT`, `SL-MKT`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PriceType {
    Market,
    Limit,
    StopLimit,
    StopMarket,
    Other(String),
}

impl PriceType {
    pub fn as_str(&self) -> &str {
        match self {
            PriceType::Market => "MKT",
            PriceType::Limit => "LMT",
            PriceType::StopLimit => "SL-LMT",
            PriceType::StopMarket => "SL-MKT",
            PriceType::Other(s) => s.as_str(),
        }
    }

    /// Stop orders rest as `pending` until triggered
    pub fn is_stop(&self) -> bool {
        matches!(self, PriceType::StopLimit | PriceType::StopMarket)
    }
}

impl From<String> for PriceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MKT" | "MARKET" => PriceType::Market,
            "LMT" | "LIMIT" => PriceType::Limit,
            "SL-LMT" | "STOP_LIMIT" => PriceType::StopLimit,
            "SL-MKT" | "STOP_MARKET" => PriceType::StopMarket,
            _ => PriceType::Other(s),
        }
    }
}

impl From<PriceType> for String {
    fn from(p: PriceType) -> Self {
        match p {
            PriceType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status reported by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Open,
    Complete,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Open => "open",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => OrderStatus::Pending,
            "open" => OrderStatus::Open,
            "complete" => OrderStatus::Complete,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(s: OrderStatus) -> Self {
        match s {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass-through keys: opaque to reconciliation, kept verbatim in `extra`
pub const CUMULATIVE_QUANTITY: &str = "CumulativeQuantity";
pub const LEAVES_QUANTITY: &str = "LeavesQuantity";
pub const TRANSACTION: &str = "transaction";
pub const ALGO_ID: &str = "AlgoID";

/// One order-state notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Order ID, stable across the order's lifecycle
    #[serde(rename = "AppOrderID")]
    pub order_id: u64,

    #[serde(serialize_with = "serialize_decimal_number")]
    pub price: Decimal,

    #[serde(rename = "triggerPrice", serialize_with = "serialize_decimal_number")]
    pub trigger_price: Decimal,

    #[serde(rename = "priceType")]
    pub price_type: PriceType,

    #[serde(rename = "productType")]
    pub product_type: String,

    pub status: OrderStatus,

    pub exchange: String,

    pub symbol: String,

    /// Generation time, loosely formatted (e.g. `17-10-2026 09:15:02`)
    #[serde(
        rename = "OrderGeneratedDateTimeAPI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<String>,

    /// Every other key, including quantities, transaction and algo ID,
    /// carried through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Notification {
    /// Minimal notification on NSE with zero prices; mostly for tests and benches
    pub fn new(order_id: u64, price_type: PriceType, status: OrderStatus) -> Self {
        Self {
            order_id,
            price: Decimal::ZERO,
            trigger_price: Decimal::ZERO,
            price_type,
            product_type: "I".to_string(),
            status,
            exchange: "NSE".to_string(),
            symbol: String::new(),
            generated_at: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_price(mut self, price: Decimal, trigger_price: Decimal) -> Self {
        self.price = price;
        self.trigger_price = trigger_price;
        self
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    pub fn with_generated_at(mut self, generated_at: &str) -> Self {
        self.generated_at = Some(generated_at.to_string());
        self
    }

    /// Set a pass-through field
    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn cumulative_quantity(&self) -> Option<&serde_json::Value> {
        self.extra.get(CUMULATIVE_QUANTITY)
    }

    pub fn leaves_quantity(&self) -> Option<&serde_json::Value> {
        self.extra.get(LEAVES_QUANTITY)
    }

    pub fn transaction(&self) -> Option<&serde_json::Value> {
        self.extra.get(TRANSACTION)
    }

    pub fn algo_id(&self) -> Option<&serde_json::Value> {
        self.extra.get(ALGO_ID)
    }
}

/// Write a Decimal back as a JSON number; integral values stay integers
fn serialize_decimal_number<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        if let Some(i) = normalized.to_i64() {
            return serializer.serialize_i64(i);
        }
    }
    match normalized.to_f64() {
        Some(f) => serializer.serialize_f64(f),
        None => Err(serde::ser::Error::custom(format!("Decimal {} out of range", value))),
    }
}

/// Parsed WebSocket message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Notification(Box<Notification>),
    Unknown(String),
}

impl ParsedMessage {
    /// Parse a raw WebSocket message
    ///
    /// Valid JSON that is not an object is `Unknown`. An object that does not
    /// carry every required notification field is an error.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Ok(ParsedMessage::Unknown(raw.to_string()));
        }

        let notification: Notification = serde_json::from_value(value)?;
        Ok(ParsedMessage::Notification(Box::new(notification)))
    }
}
