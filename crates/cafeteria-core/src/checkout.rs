//! # Checkout Module
//!
//! Composes the pricing pipeline into a quote or an order.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Pipeline                                    │
//! │                                                                         │
//! │  priced lines ──► aggregate ──► subtotal, tax (10%)                     │
//! │                                     │                                   │
//! │  customer + promotions ──► evaluate ┤──► discount (on subtotal only)    │
//! │                                     │                                   │
//! │  line count + window ──► estimate ──┤──► minutes, ready_at              │
//! │                                     ▼                                   │
//! │                        total = subtotal + tax − discount                │
//! │                                     │                                   │
//! │             quote() ◄───────────────┤                                   │
//! │                                     ▼                                   │
//! │             checkout() ──► Order snapshot + customer.record_purchase()  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here stores anything. [`checkout`] returns the new order and the
//! customer with updated purchase history together; the caller commits
//! both in one step or neither.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::CartTotals;
use crate::error::{CoreError, CoreResult};
use crate::fulfillment::{estimate, DeliveryWindow, FulfillmentEstimate};
use crate::order::{
    AppliedPromotion, FulfillmentStatus, Order, OrderTotals, PaymentDetails, PaymentStatus,
};
use crate::pricing::LineItem;
use crate::promotion::{Customer, Promotion, PromotionCatalog};

/// Totals, promotion and estimate for a set of priced lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub totals: OrderTotals,
    pub promotion: Option<Promotion>,
    pub estimate: FulfillmentEstimate,
}

/// Runs the pipeline without creating an order.
///
/// No lines gives zero totals. Use [`payment_summary`] where an empty cart
/// is an error.
///
/// `now` is the counter's local time. The promotion recency check uses its
/// UTC instant; the ready-at clock time uses its local wall clock.
pub fn quote(
    lines: &[LineItem],
    customer: &Customer,
    promotions: &PromotionCatalog,
    window: DeliveryWindow,
    now: DateTime<FixedOffset>,
) -> Quote {
    let CartTotals { subtotal, tax, .. } = CartTotals::from_lines(lines);
    let outcome = promotions.evaluate(customer, subtotal, now.with_timezone(&Utc));

    Quote {
        totals: OrderTotals::new(subtotal, tax, outcome.discount),
        promotion: outcome.promotion,
        estimate: estimate(lines.len(), window, now.naive_local()),
    }
}

/// Like [`quote`], but an empty set of lines is `EmptyCart`.
pub fn payment_summary(
    lines: &[LineItem],
    customer: &Customer,
    promotions: &PromotionCatalog,
    window: DeliveryWindow,
    now: DateTime<FixedOffset>,
) -> CoreResult<Quote> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    Ok(quote(lines, customer, promotions, window, now))
}

// =============================================================================
// Checkout
// =============================================================================

/// Everything checkout needs.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub customer: &'a Customer,
    /// Lines priced against the catalog at checkout time.
    pub lines: Vec<LineItem>,
    pub promotions: &'a PromotionCatalog,
    pub window: DeliveryWindow,
    /// Counter-local time of checkout.
    pub now: DateTime<FixedOffset>,
    /// Number for the new order, already checked for collisions.
    pub order_number: String,
    pub payment_details: PaymentDetails,
    pub notes: String,
}

/// The two records a checkout produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub order: Order,
    /// The customer with this purchase recorded.
    pub customer: Customer,
}

/// Turns priced lines into an order.
///
/// The discount is evaluated against the purchase history *before* this
/// purchase; the returned customer has it recorded.
///
/// ## Errors
/// `EmptyCart` when there are no lines.
pub fn checkout(request: CheckoutRequest<'_>) -> CoreResult<CheckoutOutcome> {
    let quote = payment_summary(
        &request.lines,
        request.customer,
        request.promotions,
        request.window,
        request.now,
    )?;

    let created_at = request.now.with_timezone(&Utc);
    let order = Order {
        id: Uuid::new_v4().to_string(),
        order_number: request.order_number,
        customer_id: request.customer.id.clone(),
        created_at,
        delivery_window: request.window,
        lines: request.lines,
        totals: quote.totals,
        promotion_applied: quote.promotion.as_ref().map(AppliedPromotion::from),
        estimate: quote.estimate,
        fulfillment: FulfillmentStatus::Pending,
        payment: PaymentStatus::Unpaid,
        payment_details: request.payment_details,
        notes: request.notes.trim().to_string(),
    };

    let mut customer = request.customer.clone();
    customer.record_purchase(created_at);

    Ok(CheckoutOutcome { order, customer })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, NewCartLine};
    use crate::catalog::tests::sample_catalog;
    use crate::catalog::Catalog;
    use crate::money::Money;
    use crate::promotion::tests::{frequent_customer, promotion};
    use crate::types::{Availability, Category, Product};
    use chrono::{Duration, NaiveTime, TimeZone};
    use rust_decimal_macros::dec;

    /// Arroz 10000 plus a plain 3000 coffee.
    fn scenario_catalog() -> Catalog {
        let product = |id: &str, price: i64| Product {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            base_price: Money::from_major(price),
            category_id: "menu".to_string(),
            availability: Availability::Available,
            allergens: None,
            sizes: Vec::new(),
            extras: Vec::new(),
        };
        Catalog::new(
            vec![Category {
                id: "menu".to_string(),
                name: "Menu".to_string(),
                position: 0,
            }],
            vec![product("arroz", 10000), product("cafe", 3000)],
        )
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 6, 12, 0, 0)
            .unwrap()
    }

    fn priced(catalog: &Catalog, products: &[&str]) -> Vec<LineItem> {
        let now = Utc::now();
        let mut cart = Cart::new(now);
        for id in products {
            cart.add_line(catalog, NewCartLine::plain(*id, 1), now).unwrap();
        }
        cart.price_lines(catalog).unwrap()
    }

    fn students_only() -> PromotionCatalog {
        PromotionCatalog::new(vec![promotion("Students", dec!(10), 1)])
    }

    fn request<'a>(
        customer: &'a Customer,
        promotions: &'a PromotionCatalog,
        lines: Vec<LineItem>,
    ) -> CheckoutRequest<'a> {
        CheckoutRequest {
            customer,
            lines,
            promotions,
            window: DeliveryWindow::Asap,
            now: noon(),
            order_number: "PED-TEST0001".to_string(),
            payment_details: PaymentDetails::default(),
            notes: "  sin cebolla ".to_string(),
        }
    }

    #[test]
    fn test_verified_frequent_student_gets_discount() {
        let catalog = scenario_catalog();
        let promotions = students_only();
        let customer = frequent_customer(noon().with_timezone(&Utc));
        let lines = priced(&catalog, &["arroz", "cafe"]);

        let quote = quote(&lines, &customer, &promotions, DeliveryWindow::Asap, noon());

        assert_eq!(quote.totals.subtotal, Money::from_major(13000));
        assert_eq!(quote.totals.tax, Money::from_major(1300));
        assert_eq!(quote.totals.discount, Money::from_major(1300));
        assert_eq!(quote.totals.total, Money::from_major(13000));
        assert!(quote.promotion.is_some());
    }

    #[test]
    fn test_unverified_customer_pays_tax_without_discount() {
        let catalog = scenario_catalog();
        let promotions = students_only();
        let mut customer = frequent_customer(noon().with_timezone(&Utc));
        customer.verified = false;
        let lines = priced(&catalog, &["arroz", "cafe"]);

        let quote = quote(&lines, &customer, &promotions, DeliveryWindow::Asap, noon());

        assert_eq!(quote.totals.discount, Money::zero());
        assert_eq!(quote.totals.tax, Money::from_major(1300));
        assert_eq!(quote.totals.total, Money::from_major(14300));
        assert!(quote.promotion.is_none());
    }

    #[test]
    fn test_estimate_uses_line_count_and_window() {
        let catalog = scenario_catalog();
        let lines = priced(&catalog, &["arroz", "cafe", "arroz", "cafe"]);
        let customer = Customer::new_verified("ana");

        let quote = quote(
            &lines,
            &customer,
            &PromotionCatalog::default(),
            DeliveryWindow::Minutes30,
            noon(),
        );

        assert_eq!(quote.estimate.minutes, 35);
        // Local wall clock, not UTC.
        assert_eq!(
            quote.estimate.ready_at,
            NaiveTime::from_hms_opt(12, 35, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_quote_is_zero_but_summary_fails() {
        let customer = Customer::new_verified("ana");
        let promotions = students_only();

        let quote = quote(&[], &customer, &promotions, DeliveryWindow::Asap, noon());
        assert_eq!(quote.totals, OrderTotals::default());

        assert!(matches!(
            payment_summary(&[], &customer, &promotions, DeliveryWindow::Asap, noon()),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let customer = Customer::new_verified("ana");
        let promotions = students_only();

        let err = checkout(request(&customer, &promotions, Vec::new())).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_checkout_builds_snapshot_and_records_purchase() {
        let catalog = sample_catalog();
        let promotions = students_only();
        let now = noon().with_timezone(&Utc);
        let customer = frequent_customer(now);

        let lines = priced(&catalog, &["arroz"]);
        let outcome = checkout(request(&customer, &promotions, lines)).unwrap();
        let order = &outcome.order;

        assert_eq!(order.order_number, "PED-TEST0001");
        assert_eq!(order.customer_id, customer.id);
        assert_eq!(order.created_at, now);
        assert_eq!(order.fulfillment, FulfillmentStatus::Pending);
        assert_eq!(order.payment, PaymentStatus::Unpaid);
        assert_eq!(order.notes, "sin cebolla");
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.totals.discount, Money::from_major(1000));
        assert_eq!(
            order.promotion_applied.as_ref().map(|p| p.name.as_str()),
            Some("Students")
        );

        assert_eq!(outcome.customer.purchase_count, 4);
        assert_eq!(outcome.customer.last_purchase_at, Some(now));
        // The input record is untouched.
        assert_eq!(customer.purchase_count, 3);
    }

    #[test]
    fn test_discount_uses_history_before_this_purchase() {
        let catalog = scenario_catalog();
        let promotions = students_only();
        let now = noon().with_timezone(&Utc);

        // Two purchases so far: this third one is not yet discounted.
        let mut customer = Customer::new_verified("ana");
        customer.purchase_count = 2;
        customer.last_purchase_at = Some(now - Duration::days(1));

        let first = checkout(request(&customer, &promotions, priced(&catalog, &["arroz"]))).unwrap();
        assert!(first.order.totals.discount.is_zero());

        let second = checkout(request(&first.customer, &promotions, priced(&catalog, &["arroz"])))
            .unwrap();
        assert_eq!(second.order.totals.discount, Money::from_major(1000));
    }

    #[test]
    fn test_order_snapshot_survives_catalog_change() {
        let catalog = scenario_catalog();
        let promotions = PromotionCatalog::default();
        let customer = Customer::new_verified("ana");

        let outcome =
            checkout(request(&customer, &promotions, priced(&catalog, &["arroz"]))).unwrap();

        let mut products = catalog.products().to_vec();
        products[0].base_price = Money::from_major(99999);
        let changed = Catalog::new(catalog.categories().to_vec(), products);

        let repriced = checkout(request(
            &outcome.customer,
            &promotions,
            priced(&changed, &["arroz"]),
        ))
        .unwrap();
        assert_eq!(repriced.order.totals.subtotal, Money::from_major(99999));

        assert_eq!(outcome.order.lines[0].unit_price, Money::from_major(10000));
        assert_eq!(outcome.order.totals.subtotal, Money::from_major(10000));
    }
}
