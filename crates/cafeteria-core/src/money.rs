//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cafeteria order adds many small amounts (extras, sizes, tax) and     │
//! │  takes a percentage off the result. Drift accumulates at every step.    │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Every intermediate value is exact.                                   │
//! │    Rounding to 2 places happens once, at display/persistence time.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafeteria_core::money::Money;
//!
//! let price = Money::from_major(3000);          // 3000.00
//! let doubled = price * 2;                      // 6000.00
//! let total = price + Money::from_minor(550);   // 3005.50
//! assert_eq!(total.to_string(), "$3005.50");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TaxRate;

/// Number of decimal places kept when an amount is displayed or persisted.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the cafeteria's single currency.
///
/// ## Design Decisions
/// - **Decimal (signed)**: exact arithmetic, negative values allowed for
///   intermediate differences
/// - **Unrounded**: keeps full precision until [`Money::rounded`] is called
/// - **Serialized as a string**: no float conversion on the wire
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.base_price ─┬─► LineItem.unit_price ──► LineItem.subtotal      │
/// │  SizeOption.delta ───┤                                                  │
/// │  ExtraOption.price ──┘                                                  │
/// │                                                                         │
/// │  Σ subtotals ──► tax (10%) ──► − discount ──► Order total               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    ///
    /// let coffee = Money::from_major(3000);
    /// assert_eq!(coffee.to_string(), "$3000.00");
    /// ```
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Creates a Money value from hundredths of a unit.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MONEY_DECIMAL_PLACES))
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to 2 decimal places using Bankers Rounding.
    ///
    /// ## When To Call
    /// Only when an amount leaves the pricing pipeline: rendering a total,
    /// or writing an order snapshot to storage. Never between steps.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::from_decimal(Decimal::new(825, 3)); // 0.825
    /// assert_eq!(tax.rounded(), Money::from_minor(82));    // half to even
    /// ```
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Calculates tax at the given rate, without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    /// use cafeteria_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_major(13000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1000)); // 10%
    /// assert_eq!(tax, Money::from_major(1300));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.as_fraction())
    }

    /// Returns `percent`% of this amount, without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let subtotal = Money::from_major(13000);
    /// let discount = subtotal.percentage(Decimal::from(10));
    /// assert_eq!(discount, Money::from_major(1300));
    /// ```
    pub fn percentage(&self, percent: Decimal) -> Money {
        Money(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to 2 decimal places.
///
/// ## Note
/// This is for logs and tests. Presentation layers apply their own
/// currency symbol and grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}${:.2}", sign, rounded.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
