//! # Error Types
//!
//! Domain-specific error types for cafeteria-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafeteria-core errors (this file)                                      │
//! │  ├── CoreError        - Domain errors (empty cart, bad transition, ...) │
//! │  ├── ValidationError  - Input validation failures                       │
//! │  └── Violation        - One broken line-item rule                       │
//! │                                                                         │
//! │  cafeteria-counter errors (app)                                         │
//! │  └── ApiError         - What a client sees (serialized)                 │
//! │                                                                         │
//! │  Flow: Violation → ValidationError → CoreError → ApiError → Client      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of these are caller-input errors. None is transient, so nothing here
//! is retried.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Size option id is not in the catalog.
    #[error("Size option not found: {0}")]
    SizeNotFound(String),

    /// Extra option id is not in the catalog.
    #[error("Extra option not found: {0}")]
    ExtraNotFound(String),

    /// Cart line id is not in the cart.
    #[error("Cart line not found: {0}")]
    CartLineNotFound(String),

    /// Order id or number is unknown.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer id is unknown.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Checkout (or the payment summary) was attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has reached the maximum number of lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A status change was requested out of order, or without the
    /// confirmation the change requires.
    ///
    /// ## When This Occurs
    /// - Delivering an order that is not `ready`
    /// - Delivering without the operator's confirmation token
    /// - Marking an order ready before preparation started
    /// - Paying an order twice
    #[error("Order {order_number}: cannot move from {from} to {to}: {reason}")]
    InvalidStateTransition {
        order_number: String,
        from: String,
        to: String,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A line item broke one or more selection rules.
    ///
    /// Every broken rule is reported, not just the first one.
    #[error("invalid line item: {}", join_violations(.violations))]
    LineItem { violations: Vec<Violation> },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unknown delivery window code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the line-item violations, if this is a line-item error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::LineItem { violations } => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Violation
// =============================================================================

/// One broken rule found while validating a line-item selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Quantity is zero or negative.
    QuantityNotPositive { quantity: i64 },
    /// Quantity is above the per-line maximum.
    QuantityTooLarge { quantity: i64, max: i64 },
    /// Product is marked as sold out.
    ProductUnavailable { product_id: String },
    /// Size option belongs to a different product.
    ForeignSize { size_id: String, product_id: String },
    /// Extra option belongs to a different product.
    ForeignExtra { extra_id: String, product_id: String },
    /// The same extra was selected more than once.
    DuplicateExtra { extra_id: String },
    /// A mandatory extra of the product was not selected.
    MissingMandatoryExtra { extra_id: String, name: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::QuantityNotPositive { quantity } => {
                write!(f, "quantity must be positive (got {quantity})")
            }
            Violation::QuantityTooLarge { quantity, max } => {
                write!(f, "quantity {quantity} exceeds maximum allowed ({max})")
            }
            Violation::ProductUnavailable { product_id } => {
                write!(f, "product {product_id} is sold out")
            }
            Violation::ForeignSize { size_id, product_id } => {
                write!(f, "size {size_id} does not belong to product {product_id}")
            }
            Violation::ForeignExtra {
                extra_id,
                product_id,
            } => write!(f, "extra {extra_id} does not belong to product {product_id}"),
            Violation::DuplicateExtra { extra_id } => {
                write!(f, "extra {extra_id} selected more than once")
            }
            Violation::MissingMandatoryExtra { name, .. } => {
                write!(f, "mandatory extra '{name}' is missing")
            }
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
