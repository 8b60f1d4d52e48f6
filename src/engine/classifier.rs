//! Action classifier
//!
//! Maps a novel notification, plus the last actionable notification for the
//! same order, to the order-book action it implies.
//!
//! | price type        | status      | unknown order | known order |
//! |-------------------|-------------|---------------|-------------|
//! | MKT               | complete    | place         | modify      |
//! | LMT               | open        | place         | modify      |
//! | SL-LMT / SL-MKT   | pending     | place         | modify      |
//! | LMT / SL-*        | cancelled   | cancel        | cancel      |
//!
//! Everything else is not actionable. Market orders are never cancelled.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::{Notification, OrderStatus, PriceType};

/// Order-book action implied by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "placeOrder")]
    Place,
    #[serde(rename = "modifyOrder")]
    Modify,
    #[serde(rename = "cancelOrder")]
    Cancel,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Place => "placeOrder",
            Action::Modify => "modifyOrder",
            Action::Cancel => "cancelOrder",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How updates to an already-known order are classified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifyPolicy {
    /// A known order is modified only by a live price type / status pair
    #[default]
    Strict,
    /// Any recognised price type on a known order is a modify, even a cancel
    Lenient,
}

/// Classifier bound to a modify policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    policy: ModifyPolicy,
}

impl Classifier {
    pub fn new(policy: ModifyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ModifyPolicy {
        self.policy
    }

    pub fn classify(&self, notification: &Notification, prior: Option<&Notification>) -> Option<Action> {
        match self.policy {
            ModifyPolicy::Strict => classify(notification, prior),
            ModifyPolicy::Lenient => classify_lenient(notification, prior),
        }
    }
}

/// Classify under the strict policy
pub fn classify(notification: &Notification, prior: Option<&Notification>) -> Option<Action> {
    let action = is_live(notification).then(|| match prior {
        Some(_) => Action::Modify,
        None => Action::Place,
    });

    // Cancellation wins over whatever the table above produced
    if is_cancel(notification) {
        return Some(Action::Cancel);
    }
    action
}

fn classify_lenient(notification: &Notification, prior: Option<&Notification>) -> Option<Action> {
    match prior {
        None => classify(notification, None),
        Some(_) => match notification.price_type {
            PriceType::Other(_) => None,
            _ => Some(Action::Modify),
        },
    }
}

/// Price type / status pair of a working or filled order
fn is_live(n: &Notification) -> bool {
    match (&n.price_type, &n.status) {
        (PriceType::Market, OrderStatus::Complete) => true,
        (PriceType::Limit, OrderStatus::Open) => true,
        (pt, OrderStatus::Pending) => pt.is_stop(),
        _ => false,
    }
}

fn is_cancel(n: &Notification) -> bool {
    n.status == OrderStatus::Cancelled
        && matches!(
            n.price_type,
            PriceType::Limit | PriceType::StopLimit | PriceType::StopMarket
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn n(price_type: PriceType, status: OrderStatus) -> Notification {
        Notification::new(1111075077, price_type, status)
    }

    #[test]
    fn test_place_then_modify_for_each_live_pair() {
        let live = [
            (PriceType::Market, OrderStatus::Complete),
            (PriceType::Limit, OrderStatus::Open),
            (PriceType::StopLimit, OrderStatus::Pending),
            (PriceType::StopMarket, OrderStatus::Pending),
        ];
        for (pt, st) in live {
            let update = n(pt.clone(), st.clone());
            assert_eq!(classify(&update, None), Some(Action::Place), "{pt} {st}");
            assert_eq!(classify(&update, Some(&update)), Some(Action::Modify), "{pt} {st}");
        }
    }

    #[test]
    fn test_cancel_takes_precedence_with_or_without_prior() {
        let prior = n(PriceType::Limit, OrderStatus::Open);
        for pt in [PriceType::Limit, PriceType::StopLimit, PriceType::StopMarket] {
            let cancel = n(pt, OrderStatus::Cancelled);
            assert_eq!(classify(&cancel, None), Some(Action::Cancel));
            assert_eq!(classify(&cancel, Some(&prior)), Some(Action::Cancel));
        }
    }

    #[test]
    fn test_market_cancel_is_not_actionable() {
        let cancel = n(PriceType::Market, OrderStatus::Cancelled);
        let prior = n(PriceType::Market, OrderStatus::Complete);
        assert_eq!(classify(&cancel, None), None);
        assert_eq!(classify(&cancel, Some(&prior)), None);
    }

    #[test]
    fn test_unlisted_pairs_are_not_actionable() {
        let prior = n(PriceType::Limit, OrderStatus::Open);
        let cases = [
            n(PriceType::Market, OrderStatus::Open),
            n(PriceType::Limit, OrderStatus::Complete),
            n(PriceType::StopLimit, OrderStatus::Open),
            n(PriceType::Limit, OrderStatus::Pending),
            n(PriceType::Other("ICEBERG".into()), OrderStatus::Open),
            n(PriceType::Limit, OrderStatus::Other("rejected".into())),
        ];
        for update in &cases {
            assert_eq!(classify(update, None), None);
            assert_eq!(classify(update, Some(&prior)), None);
        }
    }

    #[test]
    fn test_classify_is_pure() {
        let update = n(PriceType::Limit, OrderStatus::Open).with_price(dec!(4), dec!(6));
        let prior = update.clone().with_price(dec!(5), dec!(6));
        let snapshot = (update.clone(), prior.clone());

        let first = classify(&update, Some(&prior));
        let second = classify(&update, Some(&prior));
        assert_eq!(first, second);
        assert_eq!((update, prior), snapshot);
    }

    #[test]
    fn test_lenient_modifies_any_known_order() {
        let classifier = Classifier::new(ModifyPolicy::Lenient);
        let prior = n(PriceType::Limit, OrderStatus::Open);

        let odd = n(PriceType::Market, OrderStatus::Open);
        assert_eq!(classifier.classify(&odd, None), None);
        assert_eq!(classifier.classify(&odd, Some(&prior)), Some(Action::Modify));

        let cancel = n(PriceType::Limit, OrderStatus::Cancelled);
        assert_eq!(classifier.classify(&cancel, None), Some(Action::Cancel));
        assert_eq!(classifier.classify(&cancel, Some(&prior)), Some(Action::Modify));

        let unknown = n(PriceType::Other("ICEBERG".into()), OrderStatus::Open);
        assert_eq!(classifier.classify(&unknown, Some(&prior)), None);
    }

    #[test]
    fn test_default_classifier_is_strict() {
        let classifier = Classifier::default();
        assert_eq!(classifier.policy(), ModifyPolicy::Strict);

        let prior = n(PriceType::Limit, OrderStatus::Open);
        let odd = n(PriceType::Market, OrderStatus::Open);
        assert_eq!(classifier.classify(&odd, Some(&prior)), None);
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::Place.to_string(), "placeOrder");
        assert_eq!(serde_json::to_string(&Action::Cancel).unwrap(), r#""cancelOrder""#);
    }
}
