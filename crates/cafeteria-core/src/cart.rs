//! # Cart Module
//!
//! A customer's cart and the order aggregator.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation             Cart Change                  Checked             │
//! │  ─────────             ───────────                  ───────             │
//! │                                                                         │
//! │  add_line() ─────────► lines.push(new line) ──────► resolve + validate  │
//! │  increment() ────────► lines[i].qty += 1 ─────────► qty ≤ 999           │
//! │  decrement() ────────► lines[i].qty -= 1 ─────────► 0 removes the line  │
//! │  set_quantity() ─────► lines[i].qty = n ──────────► 0 removes the line  │
//! │  remove_line() ──────► lines.remove(i)                                  │
//! │  clear() ────────────► lines.clear()                                    │
//! │                                                                         │
//! │  price_lines() ──────► (read only) ───────────────► re-resolve against  │
//! │                                                     the current catalog │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## References, Not Prices
//! A [`CartLine`] stores ids only. Prices come from the catalog every time
//! the cart is priced, so a price change shows up in the cart until the
//! order snapshot is taken at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::LineItem;
use crate::validation::validate_selection;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, TAX_RATE};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in a cart: what was chosen, not what it costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Line id (UUID v4). Two lines for the same product are distinct.
    pub id: String,
    pub product_id: String,
    pub size_id: Option<String>,
    pub extra_ids: Vec<String>,
    pub quantity: i64,
    pub customization: String,
}

/// Input for [`Cart::add_line`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCartLine {
    pub product_id: String,
    pub size_id: Option<String>,
    pub extra_ids: Vec<String>,
    pub quantity: i64,
    pub customization: String,
}

impl NewCartLine {
    /// A plain line: no size, no extras, no notes.
    pub fn plain(product_id: impl Into<String>, quantity: i64) -> Self {
        NewCartLine {
            product_id: product_id.into(),
            quantity,
            ..Default::default()
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A customer's cart.
///
/// ## Invariants
/// - Every line resolved and validated against the catalog when it was added
/// - Quantity of every line is between 1 and 999
/// - At most 100 lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    /// Last time the cart changed.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(now: DateTime<Utc>) -> Self {
        Cart {
            lines: Vec::new(),
            updated_at: now,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Adds a new line. Adding the same product twice gives two lines.
    ///
    /// ## Errors
    /// - `*NotFound` when an id is unknown
    /// - `Validation` when the selection breaks a line-item rule
    /// - `CartTooLarge` when the cart already has 100 lines
    pub fn add_line(
        &mut self,
        catalog: &Catalog,
        new_line: NewCartLine,
        now: DateTime<Utc>,
    ) -> CoreResult<&CartLine> {
        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let selection = catalog.resolve(
            &new_line.product_id,
            new_line.size_id.as_deref(),
            &new_line.extra_ids,
        )?;
        validate_selection(&selection, new_line.quantity)?;

        let index = self.lines.len();
        self.lines.push(CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: new_line.product_id,
            size_id: new_line.size_id,
            extra_ids: new_line.extra_ids,
            quantity: new_line.quantity,
            customization: new_line.customization.trim().to_string(),
        });
        self.updated_at = now;

        Ok(&self.lines[index])
    }

    /// Adds one to a line's quantity.
    pub fn increment(&mut self, line_id: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let current = self.line_quantity(line_id)?;
        self.set_quantity(line_id, current + 1, now)
    }

    /// Takes one from a line's quantity. A line that reaches zero is removed.
    pub fn decrement(&mut self, line_id: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let current = self.line_quantity(line_id)?;
        self.set_quantity(line_id, current - 1, now)
    }

    /// Sets a line's quantity. Zero removes the line.
    ///
    /// ## Errors
    /// - `CartLineNotFound` for an unknown line id
    /// - `Validation(OutOfRange)` for a negative quantity or one above 999
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64, now: DateTime<Utc>) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(line_id, now);
        }

        if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))?;
        line.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Removes a line.
    pub fn remove_line(&mut self, line_id: &str, now: DateTime<Utc>) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.id != line_id);

        if self.lines.len() == initial_len {
            Err(CoreError::CartLineNotFound(line_id.to_string()))
        } else {
            self.updated_at = now;
            Ok(())
        }
    }

    /// Removes every line.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.lines.clear();
        self.updated_at = now;
    }

    /// Prices every line against the current catalog, in cart order.
    ///
    /// Fails if the catalog changed underneath the cart in a way that makes
    /// a line invalid (product removed or sold out, new mandatory extra).
    pub fn price_lines(&self, catalog: &Catalog) -> CoreResult<Vec<LineItem>> {
        self.lines
            .iter()
            .map(|line| {
                let selection =
                    catalog.resolve(&line.product_id, line.size_id.as_deref(), &line.extra_ids)?;
                LineItem::price(&selection, line.quantity, line.customization.as_str())
            })
            .collect()
    }

    fn line_quantity(&self, line_id: &str) -> CoreResult<i64> {
        self.line(line_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Sums the line subtotals. Zero for no lines.
pub fn aggregate(lines: &[LineItem]) -> Money {
    lines.iter().map(|l| l.subtotal).sum()
}

/// Totals before any promotion.
///
/// ```text
/// subtotal           = Σ line.subtotal
/// tax                = subtotal × 10%
/// pre_discount_total = subtotal + tax
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub pre_discount_total: Money,
}

impl CartTotals {
    pub fn from_subtotal(subtotal: Money) -> Self {
        let tax = subtotal.calculate_tax(TAX_RATE);
        CartTotals {
            subtotal,
            tax,
            pre_discount_total: subtotal + tax,
        }
    }

    pub fn from_lines(lines: &[LineItem]) -> Self {
        Self::from_subtotal(aggregate(lines))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
