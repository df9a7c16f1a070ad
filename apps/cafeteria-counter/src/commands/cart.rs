//! # Cart Commands
//!
//! Cart manipulation and the cart view.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐        │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│  Order   │        │
//! │  │  Cart    │     │          │     │ Summary  │     │  Placed  │        │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘        │
//! │                        │                                  │             │
//! │                   add_to_cart                        place_order        │
//! │                   increment / decrement              (checkout.rs)      │
//! │                   update / remove                         │             │
//! │                        │                                  │             │
//! │                        ▼                                  ▼             │
//! │                   clear_cart ◄──────────────────── cart cleared         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response re-prices the cart against the current menu and shows the
//! discount the customer would get right now.

use cafeteria_core::{
    quote, Cart, Catalog, CoreResult, Customer, DeliveryWindow, FulfillmentEstimate, LineItem,
    NewCartLine, OrderTotals,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::parse_window;
use crate::error::ApiError;
use crate::state::{CartState, CatalogState, ConfigState, OrderLedger};

/// Cart response including priced lines and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineView>,
    /// Rounded for display.
    pub totals: OrderTotals,
    pub display_subtotal: String,
    pub display_tax: String,
    pub display_discount: String,
    pub display_total: String,
    /// Name of the promotion that would apply.
    pub promotion: Option<String>,
    pub window: DeliveryWindow,
    pub estimate: FulfillmentEstimate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub line_id: String,
    pub item: LineItem,
    pub display_subtotal: String,
}

/// Request to add a line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub size_id: Option<String>,
    #[serde(default)]
    pub extra_ids: Vec<String>,
    /// Defaults to 1.
    pub quantity: Option<i64>,
    #[serde(default)]
    pub customization: String,
}

/// Prices `cart` and quotes it for `customer`.
fn render_cart(
    catalog: &CatalogState,
    config: &ConfigState,
    customer: &Customer,
    cart: &Cart,
    window: DeliveryWindow,
    now: DateTime<Utc>,
) -> Result<CartResponse, ApiError> {
    let items = catalog.with_catalog(|c| cart.price_lines(c))??;
    let quote = catalog.with_promotions(|promotions| {
        quote(&items, customer, promotions, window, config.local_time(now))
    })?;

    let totals = quote.totals.rounded();
    let lines = cart
        .lines()
        .iter()
        .zip(items)
        .map(|(line, item)| CartLineView {
            line_id: line.id.clone(),
            display_subtotal: config.format_currency(item.subtotal),
            item,
        })
        .collect();

    Ok(CartResponse {
        lines,
        display_subtotal: config.format_currency(totals.subtotal),
        display_tax: config.format_currency(totals.tax),
        display_discount: config.format_currency(totals.discount),
        display_total: config.format_currency(totals.total),
        totals,
        promotion: quote.promotion.map(|p| p.name),
        window,
        estimate: quote.estimate,
    })
}

/// Applies `change` to the customer's cart and returns the new view.
///
/// The change is made on a copy and kept only if the new cart renders, so a
/// rejected change leaves the cart as it was.
fn change_cart<F>(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    change: F,
) -> Result<CartResponse, ApiError>
where
    F: FnOnce(&mut Cart, &Catalog, DateTime<Utc>) -> CoreResult<()>,
{
    let customer = ledger.ensure_customer(username)?;
    let now = Utc::now();

    carts.with_cart_mut(&customer.id, |cart| -> Result<CartResponse, ApiError> {
        let mut updated = cart.clone();
        catalog.with_catalog(|c| change(&mut updated, c, now))??;
        let response =
            render_cart(catalog, config, &customer, &updated, DeliveryWindow::Asap, now)?;
        *cart = updated;
        Ok(response)
    })?
}

/// Gets the customer's cart.
///
/// ## Arguments
/// * `window` - Delivery window used for the estimate (default: as soon as possible)
///
/// ## Returns
/// Priced lines and totals. An empty cart shows zero totals.
pub fn get_cart(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    window: Option<&str>,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, ?window, "get_cart command");

    let window = parse_window(window)?;
    let customer = ledger.ensure_customer(username)?;
    let now = Utc::now();

    carts.with_cart(&customer.id, |cart| {
        render_cart(catalog, config, &customer, cart, window, now)
    })?
}

/// Adds a line to the cart.
///
/// ## Behavior
/// - Always adds a new line, even for a product already in the cart
/// - The selection is validated now: sold out products, options of another
///   product and missing mandatory extras are rejected with every problem
///   listed
pub fn add_to_cart(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    request: AddToCartRequest,
) -> Result<CartResponse, ApiError> {
    debug!(
        username = %username,
        product_id = %request.product_id,
        quantity = ?request.quantity,
        "add_to_cart command"
    );

    let new_line = NewCartLine {
        product_id: request.product_id,
        size_id: request.size_id,
        extra_ids: request.extra_ids,
        quantity: request.quantity.unwrap_or(1),
        customization: request.customization,
    };

    let response = change_cart(catalog, carts, ledger, config, username, |cart, c, now| {
        cart.add_line(c, new_line, now).map(|_| ())
    })?;

    info!(username = %username, lines = response.lines.len(), "Line added to cart");
    Ok(response)
}

/// Adds one to a line.
pub fn increment_cart_line(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    line_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, line_id = %line_id, "increment_cart_line command");
    change_cart(catalog, carts, ledger, config, username, |cart, _, now| {
        cart.increment(line_id, now)
    })
}

/// Takes one from a line. A line that reaches zero is removed.
pub fn decrement_cart_line(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    line_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, line_id = %line_id, "decrement_cart_line command");
    change_cart(catalog, carts, ledger, config, username, |cart, _, now| {
        cart.decrement(line_id, now)
    })
}

/// Sets a line's quantity. Zero removes the line.
pub fn update_cart_line(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    line_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, line_id = %line_id, quantity, "update_cart_line command");
    change_cart(catalog, carts, ledger, config, username, |cart, _, now| {
        cart.set_quantity(line_id, quantity, now)
    })
}

/// Removes a line.
pub fn remove_from_cart(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    line_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, line_id = %line_id, "remove_from_cart command");
    change_cart(catalog, carts, ledger, config, username, |cart, _, now| {
        cart.remove_line(line_id, now)
    })
}

/// Empties the cart.
pub fn clear_cart(
    catalog: &CatalogState,
    carts: &CartState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
) -> Result<CartResponse, ApiError> {
    debug!(username = %username, "clear_cart command");
    change_cart(catalog, carts, ledger, config, username, |cart, _, now| {
        cart.clear(now);
        Ok(())
    })
}
