//! # Order Module
//!
//! The order snapshot taken at checkout and its status transitions.
//!
//! ## Two Status Axes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Fulfillment (kitchen and counter)                                      │
//! │                                                                         │
//! │  ┌─────────┐  start_preparation  ┌────────────────┐  mark_ready         │
//! │  │ pending │────────────────────►│ in_preparation │────────────┐        │
//! │  └─────────┘                     └────────────────┘            ▼        │
//! │                                                           ┌─────────┐   │
//! │                          deliver("confirmar") ◄───────────│  ready  │   │
//! │                                   │                       └─────────┘   │
//! │                                   ▼                                     │
//! │                            ┌───────────┐                                │
//! │                            │ delivered │ (terminal)                     │
//! │                            └───────────┘                                │
//! │                                                                         │
//! │  Payment (cashier)                                                      │
//! │                                                                         │
//! │  ┌────────┐   mark_paid   ┌──────┐                                      │
//! │  │ unpaid │──────────────►│ paid │ (terminal)                           │
//! │  └────────┘               └──────┘                                      │
//! │                                                                         │
//! │  The axes are independent: an order can be delivered unpaid, and paid   │
//! │  at any fulfillment stage.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything else on an [`Order`] is fixed when it is created.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::fulfillment::{DeliveryWindow, FulfillmentEstimate};
use crate::money::Money;
use crate::pricing::LineItem;
use crate::promotion::Promotion;
use crate::DELIVERY_CONFIRMATION_TOKEN;

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "PED-";

/// Random characters after the prefix.
pub const ORDER_NUMBER_LENGTH: usize = 8;

/// Characters an order number is drawn from.
const ORDER_NUMBER_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// =============================================================================
// Statuses
// =============================================================================

/// Kitchen and counter progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    InPreparation,
    Ready,
    Delivered,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::InPreparation => "in_preparation",
            FulfillmentStatus::Ready => "ready",
            FulfillmentStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the order has been paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Details
// =============================================================================

/// How the order is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Cash,
}

/// What the payment terminal reported, if anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub reference: Option<String>,
}

// =============================================================================
// Totals
// =============================================================================

/// Money side of an order.
///
/// ```text
/// total = subtotal + tax − discount
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Builds totals from a subtotal, its tax and a discount.
    pub fn new(subtotal: Money, tax: Money, discount: Money) -> Self {
        OrderTotals {
            subtotal,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }

    /// Every amount rounded to 2 places, for display and storage.
    pub fn rounded(&self) -> Self {
        OrderTotals {
            subtotal: self.subtotal.rounded(),
            tax: self.tax.rounded(),
            discount: self.discount.rounded(),
            total: self.total.rounded(),
        }
    }
}

/// The promotion an order got, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedPromotion {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub discount_percent: Decimal,
}

impl From<&Promotion> for AppliedPromotion {
    fn from(promotion: &Promotion) -> Self {
        AppliedPromotion {
            id: promotion.id.clone(),
            name: promotion.name.clone(),
            discount_percent: promotion.discount_percent,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// ## Invariants
/// - `lines` is never empty
/// - `totals.total == totals.subtotal + totals.tax − totals.discount`
/// - Only `fulfillment`, `payment` and `payment_details` change after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Counter-facing number, `PED-` followed by 8 characters.
    pub order_number: String,
    pub customer_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub delivery_window: DeliveryWindow,
    pub lines: Vec<LineItem>,
    pub totals: OrderTotals,
    pub promotion_applied: Option<AppliedPromotion>,
    pub estimate: FulfillmentEstimate,
    pub fulfillment: FulfillmentStatus,
    pub payment: PaymentStatus,
    pub payment_details: PaymentDetails,
    /// Free-text notes for the kitchen.
    pub notes: String,
}

impl Order {
    /// Kitchen starts working on the order.
    pub fn start_preparation(&mut self) -> CoreResult<()> {
        self.advance(
            FulfillmentStatus::Pending,
            FulfillmentStatus::InPreparation,
            "order is not pending",
        )
    }

    /// Kitchen is done; the order waits at the counter.
    pub fn mark_ready(&mut self) -> CoreResult<()> {
        self.advance(
            FulfillmentStatus::InPreparation,
            FulfillmentStatus::Ready,
            "order is not in preparation",
        )
    }

    /// Hands the order to the customer.
    ///
    /// ## Errors
    /// `InvalidStateTransition` when the order is not `ready`, or when
    /// `confirmation` is not exactly the operator's confirmation token.
    pub fn deliver(&mut self, confirmation: &str) -> CoreResult<()> {
        if confirmation != DELIVERY_CONFIRMATION_TOKEN {
            return Err(self.transition_error(
                FulfillmentStatus::Delivered.as_str(),
                "delivery was not confirmed",
            ));
        }

        self.advance(
            FulfillmentStatus::Ready,
            FulfillmentStatus::Delivered,
            "order is not ready",
        )
    }

    /// Records payment. Independent of fulfillment.
    ///
    /// ## Errors
    /// `InvalidStateTransition` when the order is already paid.
    pub fn mark_paid(&mut self, details: PaymentDetails) -> CoreResult<()> {
        if self.payment == PaymentStatus::Paid {
            return Err(CoreError::InvalidStateTransition {
                order_number: self.order_number.clone(),
                from: self.payment.to_string(),
                to: PaymentStatus::Paid.to_string(),
                reason: "order is already paid".to_string(),
            });
        }

        self.payment = PaymentStatus::Paid;
        self.payment_details = details;
        Ok(())
    }

    /// Whether the order belongs in the pickup queue: in preparation,
    /// ready, or paid, and not yet delivered.
    pub fn awaiting_pickup(&self) -> bool {
        match self.fulfillment {
            FulfillmentStatus::Delivered => false,
            FulfillmentStatus::InPreparation | FulfillmentStatus::Ready => true,
            FulfillmentStatus::Pending => self.payment == PaymentStatus::Paid,
        }
    }

    /// Case-insensitive match on the order number or the customer's
    /// username. An empty query matches.
    pub fn matches_search(&self, query: &str, username: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.order_number.to_lowercase().contains(&needle)
            || username.to_lowercase().contains(&needle)
    }

    fn advance(
        &mut self,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        reason: &str,
    ) -> CoreResult<()> {
        if self.fulfillment != from {
            return Err(self.transition_error(to.as_str(), reason));
        }
        self.fulfillment = to;
        Ok(())
    }

    fn transition_error(&self, to: &str, reason: &str) -> CoreError {
        CoreError::InvalidStateTransition {
            order_number: self.order_number.clone(),
            from: self.fulfillment.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A fresh order number: `PED-` and 8 upper-case letters or digits.
///
/// Not guaranteed unique; the caller checks for collisions.
pub fn generate_order_number() -> String {
    let random: String = Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(ORDER_NUMBER_LENGTH)
        .map(|b| {
            let index = usize::from(*b) % ORDER_NUMBER_ALPHABET.len();
            char::from(ORDER_NUMBER_ALPHABET[index])
        })
        .collect();
    format!("{ORDER_NUMBER_PREFIX}{random}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveTime;

    pub(crate) fn sample_order(number: &str) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            order_number: number.to_string(),
            customer_id: "c1".to_string(),
            created_at: Utc::now(),
            delivery_window: DeliveryWindow::Asap,
            lines: Vec::new(),
            totals: OrderTotals::new(
                Money::from_major(13000),
                Money::from_major(1300),
                Money::zero(),
            ),
            promotion_applied: None,
            estimate: FulfillmentEstimate {
                minutes: 25,
                ready_at: NaiveTime::from_hms_opt(12, 25, 0).unwrap(),
            },
            fulfillment: FulfillmentStatus::Pending,
            payment: PaymentStatus::Unpaid,
            payment_details: PaymentDetails::default(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_full_fulfillment_lifecycle() {
        let mut order = sample_order("PED-AAAA1111");

        order.start_preparation().unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::InPreparation);
        order.mark_ready().unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::Ready);
        order.deliver("confirmar").unwrap();
        assert_eq!(order.fulfillment, FulfillmentStatus::Delivered);
    }

    #[test]
    fn test_deliver_requires_ready() {
        let mut order = sample_order("PED-AAAA1111");

        let err = order.deliver("confirmar").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidStateTransition { ref from, ref to, .. }
                if from == "pending" && to == "delivered"
        ));
        assert_eq!(order.fulfillment, FulfillmentStatus::Pending);
    }

    #[test]
    fn test_deliver_requires_confirmation() {
        let mut order = sample_order("PED-AAAA1111");
        order.start_preparation().unwrap();
        order.mark_ready().unwrap();

        assert!(matches!(
            order.deliver(""),
            Err(CoreError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            order.deliver("si"),
            Err(CoreError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            order.deliver(" confirmar "),
            Err(CoreError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            order.deliver("Confirmar"),
            Err(CoreError::InvalidStateTransition { .. })
        ));
        assert_eq!(order.fulfillment, FulfillmentStatus::Ready);
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        let mut order = sample_order("PED-AAAA1111");
        assert!(order.mark_ready().is_err());

        order.start_preparation().unwrap();
        assert!(order.start_preparation().is_err());

        order.mark_ready().unwrap();
        order.deliver("confirmar").unwrap();
        assert!(order.start_preparation().is_err());
        assert!(order.mark_ready().is_err());
        assert!(order.deliver("confirmar").is_err());
    }

    #[test]
    fn test_payment_is_independent_of_fulfillment() {
        let mut order = sample_order("PED-AAAA1111");

        // Delivered without paying.
        order.start_preparation().unwrap();
        order.mark_ready().unwrap();
        order.deliver("confirmar").unwrap();
        assert_eq!(order.payment, PaymentStatus::Unpaid);

        // Paid afterwards.
        let details = PaymentDetails {
            method: PaymentMethod::Cash,
            ..Default::default()
        };
        order.mark_paid(details.clone()).unwrap();
        assert_eq!(order.payment, PaymentStatus::Paid);
        assert_eq!(order.payment_details, details);
    }

    #[test]
    fn test_paying_twice_fails() {
        let mut order = sample_order("PED-AAAA1111");
        order.mark_paid(PaymentDetails::default()).unwrap();

        let err = order.mark_paid(PaymentDetails::default()).unwrap_err();
        assert!(err.to_string().contains("already paid"));
    }

    #[test]
    fn test_awaiting_pickup() {
        let mut order = sample_order("PED-AAAA1111");
        assert!(!order.awaiting_pickup());

        order.mark_paid(PaymentDetails::default()).unwrap();
        assert!(order.awaiting_pickup());

        let mut order = sample_order("PED-BBBB2222");
        order.start_preparation().unwrap();
        assert!(order.awaiting_pickup());
        order.mark_ready().unwrap();
        assert!(order.awaiting_pickup());
        order.deliver("confirmar").unwrap();
        assert!(!order.awaiting_pickup());
    }

    #[test]
    fn test_matches_search() {
        let order = sample_order("PED-AB12CD34");
        assert!(order.matches_search("", "ana"));
        assert!(order.matches_search("ab12", "ana"));
        assert!(order.matches_search("ANA", "ana"));
        assert!(!order.matches_search("zz", "ana"));
    }

    #[test]
    fn test_totals_identity_and_rounding() {
        let totals = OrderTotals::new(
            Money::from_minor(1005),
            Money::from_decimal(rust_decimal::Decimal::new(1005, 3)),
            Money::zero(),
        );
        assert_eq!(totals.total, totals.subtotal + totals.tax - totals.discount);
        assert_eq!(totals.rounded().tax, Money::from_minor(100));
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number();
        assert!(number.starts_with("PED-"));
        let suffix = &number[ORDER_NUMBER_PREFIX.len()..];
        assert_eq!(suffix.len(), ORDER_NUMBER_LENGTH);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_order_numbers_use_full_alphabet() {
        let letters_past_f = (0..200)
            .map(|_| generate_order_number())
            .flat_map(|n| n[ORDER_NUMBER_PREFIX.len()..].chars().collect::<Vec<_>>())
            .filter(|c| ('G'..='Z').contains(c))
            .count();
        assert!(letters_past_f > 0);
    }

    #[test]
    fn test_statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&FulfillmentStatus::InPreparation).unwrap(),
            "\"in_preparation\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
    }
}
