//! Audit log builder
//!
//! Turns an actionable notification into the record sent to the order book
//! updater: normalized timestamp, client ID bucket, and every original field.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::parser::Notification;

/// Layouts tried after the date/time separator has been replaced with `T`
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    // Feed-native layout, e.g. 17-10-2026 09:15:02
    "%d-%m-%YT%H:%M:%S",
];

/// Keys owned by the record itself; a notification field of the same name is dropped
pub const RESERVED_KEYS: &[&str] = &["timestamp", "clientID"];

/// Immutable audit log entry for one actionable notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// ISO-8601 UTC, millisecond precision
    pub timestamp: String,

    #[serde(rename = "clientID")]
    pub client_id: u64,

    #[serde(flatten)]
    pub notification: Notification,
}

impl AuditRecord {
    pub fn order_id(&self) -> u64 {
        self.notification.order_id
    }
}

/// Builds audit records
#[derive(Debug, Clone, Copy)]
pub struct AuditLogBuilder {
    base_client_id: u64,
}

impl AuditLogBuilder {
    pub fn new(base_client_id: u64) -> Self {
        Self { base_client_id }
    }

    /// Client ID for an order: `base + order_id % 2`
    pub fn client_id(&self, order_id: u64) -> u64 {
        self.base_client_id + order_id % 2
    }

    pub fn build_record(&self, notification: &Notification) -> AuditRecord {
        self.build_record_at(notification, Utc::now())
    }

    /// Build with an explicit fallback instant for unparseable timestamps
    pub fn build_record_at(&self, notification: &Notification, now: DateTime<Utc>) -> AuditRecord {
        self.build_record_in(notification, &Local, now)
    }

    /// Build, reading naive generation times in `tz`
    pub fn build_record_in<Tz: TimeZone>(
        &self,
        notification: &Notification,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> AuditRecord {
        let raw = notification.generated_at.as_deref().unwrap_or_default();

        let mut notification = notification.clone();
        for key in RESERVED_KEYS {
            notification.extra.remove(*key);
        }

        AuditRecord {
            timestamp: normalize_timestamp_in(raw, tz, now),
            client_id: self.client_id(notification.order_id),
            notification,
        }
    }
}

/// Normalize a generation time to ISO-8601, falling back to `now`.
/// Naive times are read in the host's local zone.
pub fn normalize_timestamp(raw: &str, now: DateTime<Utc>) -> String {
    normalize_timestamp_in(raw, &Local, now)
}

pub fn normalize_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz, now: DateTime<Utc>) -> String {
    parse_generated_at_in(raw, tz)
        .unwrap_or(now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a loosely formatted generation time in the host's local zone
pub fn parse_generated_at(raw: &str) -> Option<DateTime<Utc>> {
    parse_generated_at_in(raw, &Local)
}

/// Parse a loosely formatted generation time
///
/// Explicit offsets are honoured. Naive date-times are read in `tz`; a time
/// that is skipped or repeated by a DST shift is rejected. A bare date is
/// midnight UTC.
pub fn parse_generated_at_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let candidate = raw.trim().replacen(' ', "T", 1);
    if candidate.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&candidate) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&candidate, fmt).ok())
    {
        return tz
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{OrderStatus, PriceType};
    use chrono::FixedOffset;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn kolkata() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    #[test]
    fn test_feed_native_layout() {
        assert_eq!(
            normalize_timestamp_in("17-10-2026 09:15:02", &Utc, fixed_now()),
            "2026-10-17T09:15:02.000Z"
        );
    }

    #[test]
    fn test_naive_time_is_read_in_given_zone() {
        assert_eq!(
            normalize_timestamp_in("17-10-2026 06:50:10", &kolkata(), fixed_now()),
            "2026-10-17T01:20:10.000Z"
        );
        assert_eq!(
            normalize_timestamp_in("2026-10-17 06:50:10", &kolkata(), fixed_now()),
            "2026-10-17T01:20:10.000Z"
        );
    }

    #[test]
    fn test_explicit_offset_ignores_zone() {
        assert_eq!(
            normalize_timestamp_in("2026-10-17T09:15:02+05:30", &Utc, fixed_now()),
            "2026-10-17T03:45:02.000Z"
        );
        assert_eq!(
            normalize_timestamp_in("2026-10-17T09:15:02Z", &kolkata(), fixed_now()),
            "2026-10-17T09:15:02.000Z"
        );
    }

    #[test]
    fn test_space_separated_iso_and_bare_date() {
        assert_eq!(
            normalize_timestamp_in("2026-10-17 09:15:02.250", &Utc, fixed_now()),
            "2026-10-17T09:15:02.250Z"
        );
        assert_eq!(
            normalize_timestamp_in("2026-10-17", &kolkata(), fixed_now()),
            "2026-10-17T00:00:00.000Z"
        );
    }

    #[test]
    fn test_local_feed_stamp_round_trips_to_now() {
        // Stamped the way the demo feed stamps, read back with the host zone
        let now = Utc::now();
        let stamped = now.with_timezone(&Local).format("%d-%m-%Y %H:%M:%S").to_string();

        let parsed = parse_generated_at(&stamped).unwrap();
        let skew = (now - parsed).num_seconds().abs();
        assert!(skew <= 1, "skew {skew}s for {stamped}");
    }

    #[test]
    fn test_malformed_falls_back_to_now() {
        let expected = "2026-10-17T12:00:00.000Z";
        assert_eq!(normalize_timestamp("", fixed_now()), expected);
        assert_eq!(normalize_timestamp("not a date", fixed_now()), expected);
        assert_eq!(normalize_timestamp("32-13-2026 25:61:00", fixed_now()), expected);
    }

    #[test]
    fn test_missing_timestamp_uses_wall_clock() {
        let builder = AuditLogBuilder::new(95055780);
        let before = Utc::now();
        let record = builder.build_record(&Notification::new(1, PriceType::Limit, OrderStatus::Open));
        let after = Utc::now();

        let ts = DateTime::parse_from_rfc3339(&record.timestamp)
            .unwrap()
            .with_timezone(&Utc);
        // millisecond truncation
        assert!(ts >= before - chrono::Duration::milliseconds(1));
        assert!(ts <= after);
        assert!(record.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_client_id_buckets_by_parity() {
        let builder = AuditLogBuilder::new(95055780);
        assert_eq!(builder.client_id(1111075076), 95055780);
        assert_eq!(builder.client_id(1111075075), 95055781);
    }

    #[test]
    fn test_record_copies_every_field() {
        let builder = AuditLogBuilder::new(100);
        let n = Notification::new(3, PriceType::StopLimit, OrderStatus::Pending)
            .with_price(rust_decimal::Decimal::new(25, 1), rust_decimal::Decimal::from(3))
            .with_symbol("TATA")
            .with_generated_at("17-10-2026 09:15:02")
            .with_field("transaction", serde_json::json!("buy"))
            .with_field("CumulativeQuantity", serde_json::json!(0))
            .with_field("OrderSide", serde_json::json!("BUY"));

        let record = builder.build_record_in(&n, &Utc, fixed_now());
        assert_eq!(record.notification, n);
        assert_eq!(record.order_id(), 3);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["clientID"], 101);
        assert_eq!(json["timestamp"], "2026-10-17T09:15:02.000Z");
        assert_eq!(json["AppOrderID"], 3);
        assert_eq!(json["priceType"], "SL-LMT");
        assert!(json["price"].is_number());
        assert_eq!(json["price"], serde_json::json!(2.5));
        assert_eq!(json["triggerPrice"], serde_json::json!(3));
        assert_eq!(json["CumulativeQuantity"], serde_json::json!(0));
        assert_eq!(json["transaction"], "buy");
        assert_eq!(json["OrderSide"], "BUY");
        assert_eq!(json["OrderGeneratedDateTimeAPI"], "17-10-2026 09:15:02");
    }

    #[test]
    fn test_record_fields_win_over_same_named_notification_fields() {
        let builder = AuditLogBuilder::new(100);
        let n = Notification::new(4, PriceType::Limit, OrderStatus::Open)
            .with_generated_at("17-10-2026 09:15:02")
            .with_field("timestamp", serde_json::json!("X"))
            .with_field("clientID", serde_json::json!("Y"));

        let record = builder.build_record_in(&n, &Utc, fixed_now());
        assert!(record.notification.extra.is_empty());

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"timestamp\"").count(), 1);
        assert_eq!(text.matches("\"clientID\"").count(), 1);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["timestamp"], "2026-10-17T09:15:02.000Z");
        assert_eq!(json["clientID"], 100);
    }
}
