//! # Promotion Module
//!
//! Customers, promotions and the promotion evaluator.
//!
//! ## Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Promotion Evaluation                                 │
//! │                                                                         │
//! │  PromotionCatalog (registration order)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  candidate?  active && audience matches customer                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  eligible?   verified                                                   │
//! │              && last_purchase_at is set                                 │
//! │              && now − last_purchase_at ≤ recency_window_days            │
//! │              && purchase_count ≥ min_purchases                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  winner      highest priority; first registered wins a tie              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount    subtotal × discount_percent / 100                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Evaluation never mutates anything. Purchase history changes only through
//! [`Customer::record_purchase`] at checkout, and the default promotion is
//! created only by [`PromotionCatalog::ensure_default_promotion`], which the
//! application calls once at startup.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation::validate_discount_percent;

/// Name of the promotion created by [`PromotionCatalog::ensure_default_promotion`].
pub const DEFAULT_PROMOTION_NAME: &str = "Frequent student promotion";

// =============================================================================
// Customer
// =============================================================================

/// A customer's eligibility record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub username: String,
    pub institutional_email: String,
    /// Verified student.
    pub verified: bool,
    /// Completed checkouts.
    pub purchase_count: u32,
    #[ts(as = "Option<String>")]
    pub last_purchase_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// A verified customer with no purchase history.
    ///
    /// The email defaults to `<username>@campus.local`.
    pub fn new_verified(username: impl Into<String>) -> Self {
        let username = username.into();
        Customer {
            id: Uuid::new_v4().to_string(),
            institutional_email: format!("{username}@campus.local"),
            username,
            verified: true,
            purchase_count: 0,
            last_purchase_at: None,
        }
    }

    /// Checks the purchase-history part of promotion eligibility.
    ///
    /// The window is inclusive: a purchase exactly `window_days` ago counts.
    /// A purchase time in the future counts as recent.
    pub fn is_eligible(&self, min_purchases: u32, window_days: u32, now: DateTime<Utc>) -> bool {
        if !self.verified {
            return false;
        }

        let Some(last) = self.last_purchase_at else {
            return false;
        };

        let recent = now - last <= Duration::days(i64::from(window_days));
        recent && self.purchase_count >= min_purchases
    }

    /// Records a completed checkout.
    pub fn record_purchase(&mut self, now: DateTime<Utc>) {
        self.purchase_count = self.purchase_count.saturating_add(1);
        self.last_purchase_at = Some(now);
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// Who a promotion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionAudience {
    /// Verified students only.
    Student,
    /// Anyone.
    General,
}

impl PromotionAudience {
    /// Whether this audience includes the customer.
    pub fn includes(&self, customer: &Customer) -> bool {
        match self {
            PromotionAudience::Student => customer.verified,
            PromotionAudience::General => true,
        }
    }
}

/// A discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Percentage off the subtotal, 0 to 100.
    #[ts(as = "String")]
    pub discount_percent: Decimal,
    pub audience: PromotionAudience,
    pub active: bool,
    pub min_purchases: u32,
    pub recency_window_days: u32,
    /// Higher wins.
    pub priority: i32,
}

impl Promotion {
    /// Whether this promotion can be considered for the customer at all.
    pub fn is_candidate_for(&self, customer: &Customer) -> bool {
        self.active && self.audience.includes(customer)
    }

    /// Whether the customer qualifies for this promotion at `now`.
    pub fn applies_to(&self, customer: &Customer, now: DateTime<Utc>) -> bool {
        self.is_candidate_for(customer)
            && customer.is_eligible(self.min_purchases, self.recency_window_days, now)
    }

    /// Discount this promotion gives on `subtotal`.
    pub fn discount_on(&self, subtotal: Money) -> Money {
        subtotal.percentage(self.discount_percent)
    }
}

// =============================================================================
// Promotion Catalog
// =============================================================================

/// Result of evaluating the promotion catalog for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionOutcome {
    pub promotion: Option<Promotion>,
    pub discount: Money,
}

impl PromotionOutcome {
    pub fn none() -> Self {
        PromotionOutcome {
            promotion: None,
            discount: Money::zero(),
        }
    }
}

/// Every known promotion, in registration order.
#[derive(Debug, Clone, Default)]
pub struct PromotionCatalog {
    promotions: Vec<Promotion>,
}

impl PromotionCatalog {
    pub fn new(promotions: Vec<Promotion>) -> Self {
        PromotionCatalog { promotions }
    }

    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Adds a promotion after the existing ones.
    ///
    /// ## Errors
    /// `Validation(OutOfRange)` when the discount is outside 0 to 100.
    pub fn register(&mut self, promotion: Promotion) -> CoreResult<()> {
        validate_discount_percent(promotion.discount_percent)?;
        self.promotions.push(promotion);
        Ok(())
    }

    /// Creates the default student promotion when there is no active
    /// student promotion and none carries the default name.
    ///
    /// Returns `true` when a promotion was created. Calling it again is a
    /// no-op.
    ///
    /// ## Default Promotion
    /// 10% off, student audience, at least 3 purchases with the last one
    /// within 30 days, priority 1.
    pub fn ensure_default_promotion(&mut self) -> bool {
        let has_active_student = self
            .promotions
            .iter()
            .any(|p| p.active && p.audience == PromotionAudience::Student);
        let has_default = self
            .promotions
            .iter()
            .any(|p| p.name == DEFAULT_PROMOTION_NAME);

        if has_active_student || has_default {
            return false;
        }

        self.promotions.push(Promotion {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_PROMOTION_NAME.to_string(),
            description: "10% off for students with 3 purchases in the last 30 days".to_string(),
            discount_percent: Decimal::TEN,
            audience: PromotionAudience::Student,
            active: true,
            min_purchases: 3,
            recency_window_days: 30,
            priority: 1,
        });
        true
    }

    /// Picks the best promotion for the customer and computes its discount.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    /// use cafeteria_core::promotion::{Customer, PromotionCatalog};
    /// use chrono::{Duration, Utc};
    ///
    /// let mut promotions = PromotionCatalog::default();
    /// promotions.ensure_default_promotion();
    ///
    /// let now = Utc::now();
    /// let mut customer = Customer::new_verified("ana");
    /// customer.purchase_count = 3;
    /// customer.last_purchase_at = Some(now - Duration::days(10));
    ///
    /// let outcome = promotions.evaluate(&customer, Money::from_major(13000), now);
    /// assert_eq!(outcome.discount, Money::from_major(1300));
    /// ```
    pub fn evaluate(
        &self,
        customer: &Customer,
        subtotal: Money,
        now: DateTime<Utc>,
    ) -> PromotionOutcome {
        let winner = self
            .promotions
            .iter()
            .filter(|p| p.applies_to(customer, now))
            .fold(None::<&Promotion>, |best, p| match best {
                Some(b) if b.priority >= p.priority => Some(b),
                _ => Some(p),
            });

        match winner {
            Some(promotion) => PromotionOutcome {
                discount: promotion.discount_on(subtotal),
                promotion: Some(promotion.clone()),
            },
            None => PromotionOutcome::none(),
        }
    }

    /// Highest-priority active promotion shown on the menu for a customer,
    /// whether or not they qualify yet.
    pub fn featured_for(&self, customer: &Customer) -> Option<&Promotion> {
        self.promotions
            .iter()
            .filter(|p| p.is_candidate_for(customer))
            .fold(None, |best: Option<&Promotion>, p| match best {
                Some(b) if b.priority >= p.priority => Some(b),
                _ => Some(p),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use rust_decimal_macros::dec;

    pub(crate) fn promotion(name: &str, percent: Decimal, priority: i32) -> Promotion {
        Promotion {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: String::new(),
            discount_percent: percent,
            audience: PromotionAudience::Student,
            active: true,
            min_purchases: 3,
            recency_window_days: 30,
            priority,
        }
    }

    /// Verified, 3 purchases, last one 10 days before `now`.
    pub(crate) fn frequent_customer(now: DateTime<Utc>) -> Customer {
        let mut customer = Customer::new_verified("ana");
        customer.purchase_count = 3;
        customer.last_purchase_at = Some(now - Duration::days(10));
        customer
    }

    #[test]
    fn test_new_customer_defaults() {
        let customer = Customer::new_verified("luis");
        assert_eq!(customer.institutional_email, "luis@campus.local");
        assert!(customer.verified);
        assert_eq!(customer.purchase_count, 0);
        assert!(customer.last_purchase_at.is_none());
    }

    #[test]
    fn test_eligibility_rules() {
        let now = Utc::now();
        let customer = frequent_customer(now);
        assert!(customer.is_eligible(3, 30, now));
        assert!(!customer.is_eligible(4, 30, now));
        assert!(!customer.is_eligible(3, 9, now));

        let mut unverified = customer.clone();
        unverified.verified = false;
        assert!(!unverified.is_eligible(0, 30, now));

        let mut never_bought = customer;
        never_bought.last_purchase_at = None;
        assert!(!never_bought.is_eligible(0, 30, now));
    }

    #[test]
    fn test_recency_window_is_inclusive() {
        let now = Utc::now();
        let mut customer = frequent_customer(now);

        customer.last_purchase_at = Some(now - Duration::days(30));
        assert!(customer.is_eligible(3, 30, now));

        customer.last_purchase_at = Some(now - Duration::days(30) - Duration::seconds(1));
        assert!(!customer.is_eligible(3, 30, now));
    }

    #[test]
    fn test_record_purchase() {
        let now = Utc::now();
        let mut customer = Customer::new_verified("ana");
        customer.record_purchase(now);
        customer.record_purchase(now);

        assert_eq!(customer.purchase_count, 2);
        assert_eq!(customer.last_purchase_at, Some(now));
    }

    #[test]
    fn test_ensure_default_promotion_is_idempotent() {
        let mut catalog = PromotionCatalog::default();
        assert!(catalog.ensure_default_promotion());
        assert!(!catalog.ensure_default_promotion());
        assert_eq!(catalog.promotions().len(), 1);

        let default = &catalog.promotions()[0];
        assert_eq!(default.discount_percent, dec!(10));
        assert_eq!(default.priority, 1);
        assert_eq!(default.min_purchases, 3);
        assert_eq!(default.recency_window_days, 30);
        assert_eq!(default.audience, PromotionAudience::Student);
    }

    #[test]
    fn test_ensure_default_skipped_when_student_promotion_exists() {
        let mut catalog = PromotionCatalog::new(vec![promotion("Finals week", dec!(15), 2)]);
        assert!(!catalog.ensure_default_promotion());
        assert_eq!(catalog.promotions().len(), 1);
    }

    #[test]
    fn test_ensure_default_not_duplicated_when_inactive() {
        let mut catalog = PromotionCatalog::default();
        catalog.ensure_default_promotion();
        let mut promotions = catalog.promotions().to_vec();
        promotions[0].active = false;

        let mut catalog = PromotionCatalog::new(promotions);
        assert!(!catalog.ensure_default_promotion());
        assert_eq!(catalog.promotions().len(), 1);
    }

    #[test]
    fn test_evaluate_applies_student_discount() {
        let now = Utc::now();
        let catalog = PromotionCatalog::new(vec![promotion("Students", dec!(10), 1)]);

        let outcome = catalog.evaluate(&frequent_customer(now), Money::from_major(13000), now);
        assert_eq!(outcome.discount, Money::from_major(1300));
        assert_eq!(
            outcome.promotion.map(|p| p.name),
            Some("Students".to_string())
        );
    }

    #[test]
    fn test_evaluate_unverified_gets_nothing() {
        let now = Utc::now();
        let catalog = PromotionCatalog::new(vec![promotion("Students", dec!(10), 1)]);
        let mut customer = frequent_customer(now);
        customer.verified = false;

        assert_eq!(
            catalog.evaluate(&customer, Money::from_major(13000), now),
            PromotionOutcome::none()
        );
    }

    #[test]
    fn test_general_promotion_still_needs_verification() {
        let now = Utc::now();
        let mut general = promotion("Everyone", dec!(5), 1);
        general.audience = PromotionAudience::General;
        let catalog = PromotionCatalog::new(vec![general]);

        let mut customer = frequent_customer(now);
        assert!(catalog.evaluate(&customer, Money::from_major(1000), now).promotion.is_some());

        customer.verified = false;
        assert!(catalog.evaluate(&customer, Money::from_major(1000), now).promotion.is_none());
    }

    #[test]
    fn test_inactive_promotions_ignored() {
        let now = Utc::now();
        let mut inactive = promotion("Old", dec!(50), 9);
        inactive.active = false;
        let catalog = PromotionCatalog::new(vec![inactive, promotion("Current", dec!(10), 1)]);

        let outcome = catalog.evaluate(&frequent_customer(now), Money::from_major(1000), now);
        assert_eq!(outcome.promotion.map(|p| p.name), Some("Current".to_string()));
    }

    #[test]
    fn test_highest_priority_wins_and_first_registered_breaks_ties() {
        let now = Utc::now();
        let catalog = PromotionCatalog::new(vec![
            promotion("Low", dec!(30), 1),
            promotion("First high", dec!(10), 5),
            promotion("Second high", dec!(20), 5),
        ]);

        let outcome = catalog.evaluate(&frequent_customer(now), Money::from_major(1000), now);
        assert_eq!(outcome.promotion.map(|p| p.name), Some("First high".to_string()));
        assert_eq!(outcome.discount, Money::from_major(100));
    }

    #[test]
    fn test_ineligible_high_priority_falls_back() {
        let now = Utc::now();
        let mut strict = promotion("Loyal", dec!(25), 10);
        strict.min_purchases = 20;
        let catalog = PromotionCatalog::new(vec![strict, promotion("Students", dec!(10), 1)]);

        let outcome = catalog.evaluate(&frequent_customer(now), Money::from_major(1000), now);
        assert_eq!(outcome.promotion.map(|p| p.name), Some("Students".to_string()));
    }

    #[test]
    fn test_register_rejects_bad_percent() {
        let mut catalog = PromotionCatalog::default();
        let err = catalog
            .register(promotion("Too good", dec!(120), 1))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(catalog.promotions().is_empty());
    }

    #[test]
    fn test_featured_ignores_purchase_history() {
        let catalog = PromotionCatalog::new(vec![promotion("Students", dec!(10), 1)]);
        let newcomer = Customer::new_verified("nuevo");

        assert!(catalog.evaluate(&newcomer, Money::from_major(1000), Utc::now()).promotion.is_none());
        assert_eq!(
            catalog.featured_for(&newcomer).map(|p| p.name.as_str()),
            Some("Students")
        );
    }
}
