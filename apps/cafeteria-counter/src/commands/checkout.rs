//! # Checkout Commands
//!
//! Payment summary, order placement and order lookup.
//!
//! ## Place Order Flow
//! ```text
//! place_order
//!   │
//!   ├── lock cart ──────────────────────────────────────────────┐
//!   │     price lines against the current menu                  │
//!   │     snapshot promotions                                   │
//!   │     ledger.commit_checkout                                │
//!   │       ├── current purchase history                        │
//!   │       ├── unused order number                             │
//!   │       ├── checkout() ── totals, promotion, estimate       │
//!   │       └── store order + customer with purchase recorded   │
//!   │     clear cart                                            │
//!   └── unlock cart ◄───────────────────────────────────────────┘
//! ```
//!
//! A failure anywhere leaves the cart and the ledger untouched.

use cafeteria_core::{
    checkout, payment_summary, CheckoutRequest, DeliveryWindow, FulfillmentEstimate,
    FulfillmentStatus, Order, OrderTotals, PaymentDetails, PaymentMethod, PaymentStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::parse_window;
use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState, OrderLedger};

/// What the customer is about to pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub item_count: usize,
    pub totals: OrderTotals,
    pub display_subtotal: String,
    pub display_tax: String,
    pub display_discount: String,
    pub display_total: String,
    pub promotion: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub window: DeliveryWindow,
    pub estimate: FulfillmentEstimate,
    /// Ready-at time as `HH:MM`.
    pub ready_at: String,
}

/// Request to place an order from the current cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub window: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub auth_code: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// An order as shown to customers and counter staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_number: String,
    pub fulfillment: FulfillmentStatus,
    pub payment: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub item_count: i64,
    pub totals: OrderTotals,
    pub display_total: String,
    pub promotion: Option<String>,
    pub window: DeliveryWindow,
    pub estimated_minutes: u32,
    /// Ready-at time as `HH:MM`.
    pub ready_at: String,
    pub created_at: DateTime<Utc>,
    pub notes: String,
}

impl OrderResponse {
    pub fn from_order(order: &Order, config: &ConfigState) -> Self {
        let totals = order.totals.rounded();
        OrderResponse {
            order_number: order.order_number.clone(),
            fulfillment: order.fulfillment,
            payment: order.payment,
            payment_method: order.payment_details.method,
            item_count: order.lines.iter().map(|l| l.quantity).sum(),
            display_total: config.format_currency(totals.total),
            totals,
            promotion: order.promotion_applied.as_ref().map(|p| p.name.clone()),
            window: order.delivery_window,
            estimated_minutes: order.estimate.minutes,
            ready_at: order.estimate.ready_at.format("%H:%M").to_string(),
            created_at: order.created_at,
            notes: order.notes.clone(),
        }
    }
}

/// Gets the payment summary for the customer's cart.
///
/// ## Errors
/// `EMPTY_CART` when there is nothing to pay for.
pub fn checkout_summary(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    window: Option<&str>,
) -> Result<PaymentSummary, ApiError> {
    debug!(username = %username, ?window, "checkout_summary command");

    let window = parse_window(window)?;
    let customer = ledger.ensure_customer(username)?;
    let now = config.local_time(Utc::now());

    let items = carts.with_cart(&customer.id, |cart| {
        catalog.with_catalog(|c| cart.price_lines(c))
    })???;
    let quote = catalog.with_promotions(|promotions| {
        payment_summary(&items, &customer, promotions, window, now)
    })??;

    let totals = quote.totals.rounded();
    Ok(PaymentSummary {
        item_count: items.len(),
        display_subtotal: config.format_currency(totals.subtotal),
        display_tax: config.format_currency(totals.tax),
        display_discount: config.format_currency(totals.discount),
        display_total: config.format_currency(totals.total),
        totals,
        discount_percent: quote.promotion.as_ref().map(|p| p.discount_percent),
        promotion: quote.promotion.map(|p| p.name),
        window,
        ready_at: quote.estimate.ready_at.format("%H:%M").to_string(),
        estimate: quote.estimate,
    })
}

/// Places an order from the customer's cart and empties the cart.
///
/// ## Behavior
/// - Lines are re-priced against the current menu; an item that sold out
///   since it was added fails the whole checkout
/// - The discount uses the purchase history before this order
/// - The order starts `pending` and `unpaid`
pub fn place_order(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    request: PlaceOrderRequest,
) -> Result<OrderResponse, ApiError> {
    debug!(username = %username, window = ?request.window, "place_order command");

    let window = parse_window(request.window.as_deref())?;
    let customer = ledger.ensure_customer(username)?;
    let now = config.local_time(Utc::now());
    let payment_details = PaymentDetails {
        method: request.payment_method.unwrap_or_default(),
        transaction_id: request.transaction_id,
        auth_code: request.auth_code,
        reference: request.reference,
    };

    let order = carts.with_cart_mut(&customer.id, |cart| -> Result<Order, ApiError> {
        let lines = catalog.with_catalog(|c| cart.price_lines(c))??;
        let promotions = catalog.with_promotions(|p| p.clone())?;

        let order = ledger.commit_checkout(&customer.id, |current, order_number| {
            checkout(CheckoutRequest {
                customer: current,
                lines,
                promotions: &promotions,
                window,
                now,
                order_number,
                payment_details,
                notes: request.notes,
            })
        })?;

        cart.clear(now.with_timezone(&Utc));
        Ok(order)
    })??;

    info!(
        order_number = %order.order_number,
        username = %username,
        total = %order.totals.total.rounded(),
        promotion = ?order.promotion_applied.as_ref().map(|p| &p.name),
        "Order placed"
    );

    Ok(OrderResponse::from_order(&order, config))
}

/// Looks up one order.
pub fn get_order(
    ledger: &OrderLedger,
    config: &ConfigState,
    order_number: &str,
) -> Result<OrderResponse, ApiError> {
    debug!(order_number = %order_number, "get_order command");
    let order = ledger.order(order_number.trim())?;
    Ok(OrderResponse::from_order(&order, config))
}

/// The customer's orders, newest first.
pub fn my_orders(
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
) -> Result<Vec<OrderResponse>, ApiError> {
    debug!(username = %username, "my_orders command");
    let customer = ledger.ensure_customer(username)?;
    Ok(ledger
        .orders_for(&customer.id)?
        .iter()
        .map(|order| OrderResponse::from_order(order, config))
        .collect())
}
