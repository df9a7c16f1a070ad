//! # Domain Types
//!
//! Catalog types shared by the pricer, the cart and the order snapshot.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Category     │   │    Product      │   │   SizeOption    │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │◄──│  category_id    │◄──│  product_id     │        │
//! │  │  name           │   │  base_price     │   │  price_delta    │        │
//! │  │  position       │   │  availability   │   └─────────────────┘        │
//! │  └─────────────────┘   │  sizes, extras  │   ┌─────────────────┐        │
//! │                        └─────────────────┘◄──│  ExtraOption    │        │
//! │                                              │  ─────────────  │        │
//! │  ┌─────────────────┐                         │  product_id     │        │
//! │  │    TaxRate      │                         │  price          │        │
//! │  │  bps (u32)      │                         │  mandatory      │        │
//! │  │  1000 = 10%     │                         └─────────────────┘        │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog entities are immutable while a price is being computed. Options
//! carry the id of the product that owns them so a mismatched selection can
//! be reported instead of silently priced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the cafeteria's sales tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as an exact fraction (1000 bps = 0.1000).
    #[inline]
    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Category
// =============================================================================

/// A menu section (breakfast, drinks, bakery, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Menu ordering; lower comes first.
    pub position: i32,
}

// =============================================================================
// Availability
// =============================================================================

/// Whether a product can currently be ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    SoldOut,
}

// =============================================================================
// Product
// =============================================================================

/// A product on the menu.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the menu and on the order ticket.
    pub name: String,

    /// Optional description for the product detail page.
    pub description: Option<String>,

    /// Price before size and extras.
    pub base_price: Money,

    /// Category this product is listed under.
    pub category_id: String,

    pub availability: Availability,

    /// Free-text allergen notes.
    pub allergens: Option<String>,

    /// Size options declared by this product.
    pub sizes: Vec<SizeOption>,

    /// Extra options declared by this product.
    pub extras: Vec<ExtraOption>,
}

impl Product {
    /// Checks if the product can be ordered right now.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Extras that every line item for this product must include.
    pub fn mandatory_extras(&self) -> impl Iterator<Item = &ExtraOption> {
        self.extras.iter().filter(|e| e.mandatory)
    }
}

// =============================================================================
// Size Option
// =============================================================================

/// A size a product can be ordered in (small, medium, large).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeOption {
    pub id: String,
    /// Product that declares this size.
    pub product_id: String,
    pub name: String,
    /// Added to the base price; zero for the default size.
    pub price_delta: Money,
}

// =============================================================================
// Extra Option
// =============================================================================

/// An add-on for a product (extra shot, egg, cup, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtraOption {
    pub id: String,
    /// Product that declares this extra.
    pub product_id: String,
    pub name: String,
    pub price: Money,
    /// When set, every line item for the product must include this extra.
    pub mandatory: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn extra(id: &str, mandatory: bool) -> ExtraOption {
        ExtraOption {
            id: id.to_string(),
            product_id: "p1".to_string(),
            name: format!("Extra {id}"),
            price: Money::from_major(500),
            mandatory,
        }
    }

    #[test]
    fn test_tax_rate_fraction() {
        let rate = TaxRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert_eq!(rate.as_fraction(), dec!(0.1));
        assert_eq!(TaxRate::default(), TaxRate::zero());
    }

    #[test]
    fn test_mandatory_extras_filter() {
        let product = Product {
            id: "p1".to_string(),
            name: "Cafe".to_string(),
            description: None,
            base_price: Money::from_major(3000),
            category_id: "c1".to_string(),
            availability: Availability::Available,
            allergens: None,
            sizes: Vec::new(),
            extras: vec![extra("e1", false), extra("e2", true)],
        };

        let ids: Vec<&str> = product.mandatory_extras().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2"]);
        assert!(product.is_available());
    }

    #[test]
    fn test_availability_serializes_snake_case() {
        let json = serde_json::to_string(&Availability::SoldOut).unwrap();
        assert_eq!(json, "\"sold_out\"");
    }
}
