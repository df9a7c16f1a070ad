//! # cafeteria-core: Pure Business Logic for the Campus Cafeteria
//!
//! This crate turns a cart of line items into a priced, promotion-adjusted
//! order with an estimated fulfillment time. Everything here is a pure
//! function of its inputs: no I/O, no logging, no system clock.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Pipeline                                │
//! │                                                                         │
//! │  Cart lines ──► resolve (catalog) ──► validate ──► price (pricing)      │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                                  aggregate (cart): subtotal + 10% tax   │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                       evaluate (promotion): best eligible discount      │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                    estimate (fulfillment): minutes + ready-at time      │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                        Order snapshot + updated purchase history        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type backed by exact decimals
//! - [`types`] - Catalog domain types (Product, SizeOption, ExtraOption, ...)
//! - [`catalog`] - Catalog lookups and menu browsing
//! - [`validation`] - Single-pass line item validation
//! - [`pricing`] - Line-item pricer
//! - [`cart`] - Cart lines and the totals aggregator
//! - [`promotion`] - Customers, promotions and the evaluator
//! - [`fulfillment`] - Delivery windows and preparation estimates
//! - [`order`] - Order snapshot and its status axes
//! - [`checkout`] - The composed pipeline
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cafeteria_core::money::Money;
//! use cafeteria_core::TAX_RATE;
//!
//! let subtotal = Money::from_major(13000);
//! let tax = subtotal.calculate_tax(TAX_RATE);
//! assert_eq!(tax, Money::from_major(1300));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod fulfillment;
pub mod money;
pub mod order;
pub mod pricing;
pub mod promotion;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{aggregate, Cart, CartLine, CartTotals, NewCartLine};
pub use catalog::{Catalog, Selection};
pub use checkout::{checkout, payment_summary, quote, CheckoutOutcome, CheckoutRequest, Quote};
pub use error::{CoreError, CoreResult, ValidationError, Violation};
pub use fulfillment::{DeliveryWindow, FulfillmentEstimate};
pub use money::Money;
pub use order::{
    AppliedPromotion, FulfillmentStatus, Order, OrderTotals, PaymentDetails, PaymentMethod,
    PaymentStatus,
};
pub use pricing::{LineItem, LinePrice};
pub use promotion::{Customer, Promotion, PromotionAudience, PromotionCatalog, PromotionOutcome};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied to every order: 10%, in basis points.
///
/// Fixed for the whole cafeteria, never chosen per call.
pub const TAX_RATE: TaxRate = TaxRate::from_bps(1000);

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Token the pickup-window operator must supply to hand an order over.
pub const DELIVERY_CONFIRMATION_TOKEN: &str = "confirmar";
