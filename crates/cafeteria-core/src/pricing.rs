//! # Line-Item Pricer
//!
//! Turns a product selection and a quantity into a unit price and a line
//! subtotal.
//!
//! ## Formula
//! ```text
//! unit_price = base_price + size.price_delta (0 without size) + Σ extra.price
//! subtotal   = unit_price × quantity
//! ```
//!
//! Prices are read from the catalog at the moment the line is priced. A
//! [`LineItem`] copies names and prices so an order snapshot does not change
//! when the catalog later does.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Selection;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{ExtraOption, Product, SizeOption};
use crate::validation::validate_selection;

/// Unit price and subtotal of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LinePrice {
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Prices a product with an optional size and a set of extras.
///
/// ## Errors
/// `ValidationError::LineItem` when the quantity is not positive, the size
/// or an extra belongs to another product, or a mandatory extra is missing.
///
/// ## Example
/// ```rust
/// use cafeteria_core::money::Money;
/// use cafeteria_core::pricing::price;
/// use cafeteria_core::types::{Availability, Product};
///
/// let arroz = Product {
///     id: "arroz".into(),
///     name: "Arroz con huevo".into(),
///     description: None,
///     base_price: Money::from_major(10000),
///     category_id: "desayuno".into(),
///     availability: Availability::Available,
///     allergens: None,
///     sizes: vec![],
///     extras: vec![],
/// };
///
/// let line = price(&arroz, None, &[], 2).unwrap();
/// assert_eq!(line.unit_price, Money::from_major(10000));
/// assert_eq!(line.subtotal, Money::from_major(20000));
/// ```
pub fn price(
    product: &Product,
    size: Option<&SizeOption>,
    extras: &[&ExtraOption],
    quantity: i64,
) -> CoreResult<LinePrice> {
    let selection = Selection {
        product,
        size,
        extras: extras.to_vec(),
    };
    price_selection(&selection, quantity)
}

/// Validates and prices a resolved selection.
pub fn price_selection(selection: &Selection<'_>, quantity: i64) -> CoreResult<LinePrice> {
    validate_selection(selection, quantity)?;

    let unit_price = unit_price(selection);
    Ok(LinePrice {
        unit_price,
        subtotal: unit_price.multiply_quantity(quantity),
    })
}

fn unit_price(selection: &Selection<'_>) -> Money {
    let size_delta = selection.size.map_or(Money::zero(), |s| s.price_delta);
    let extras: Money = selection.extras.iter().map(|e| e.price).sum();
    selection.product.base_price + size_delta + extras
}

// =============================================================================
// Line Item
// =============================================================================

/// A priced line: what the customer chose, and what it cost at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at pricing time (frozen).
    pub product_name: String,
    /// Size chosen, as it was at pricing time.
    pub size: Option<SizeOption>,
    /// Extras chosen, as they were at pricing time.
    pub extras: Vec<ExtraOption>,
    pub quantity: i64,
    /// Free-text customization ("no sugar", "extra hot").
    pub customization: String,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl LineItem {
    /// Validates, prices and snapshots a selection.
    pub fn price(
        selection: &Selection<'_>,
        quantity: i64,
        customization: impl Into<String>,
    ) -> CoreResult<Self> {
        let LinePrice {
            unit_price,
            subtotal,
        } = price_selection(selection, quantity)?;

        Ok(LineItem {
            product_id: selection.product.id.clone(),
            product_name: selection.product.name.clone(),
            size: selection.size.cloned(),
            extras: selection.extras.iter().map(|e| (*e).clone()).collect(),
            quantity,
            customization: customization.into(),
            unit_price,
            subtotal,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::error::{CoreError, Violation};

    #[test]
    fn test_base_price_times_quantity() {
        let catalog = sample_catalog();
        let arroz = catalog.product("arroz").unwrap();

        let line = price(arroz, None, &[], 2).unwrap();
        assert_eq!(line.unit_price, Money::from_major(10000));
        assert_eq!(line.subtotal, Money::from_major(20000));
    }

    #[test]
    fn test_size_and_extras_are_added() {
        let catalog = sample_catalog();
        let selection = catalog
            .resolve("cafe", Some("cafe-l"), &["cafe-shot", "cafe-cup"])
            .unwrap();

        // 3000 + 1000 + 800 + 200
        let line = price_selection(&selection, 3).unwrap();
        assert_eq!(line.unit_price, Money::from_major(5000));
        assert_eq!(line.subtotal, Money::from_major(15000));
    }

    #[test]
    fn test_missing_mandatory_extra_fails() {
        let catalog = sample_catalog();
        let cafe = catalog.product("cafe").unwrap();

        let err = price(cafe, None, &[], 1).unwrap_err();
        match err {
            CoreError::Validation(v) => assert!(matches!(
                v.violations(),
                [Violation::MissingMandatoryExtra { .. }]
            )),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_quantity_fails() {
        let catalog = sample_catalog();
        let arroz = catalog.product("arroz").unwrap();

        assert!(price(arroz, None, &[], 0).is_err());
        assert!(price(arroz, None, &[], -3).is_err());
    }

    #[test]
    fn test_line_item_snapshot_keeps_names_and_prices() {
        let catalog = sample_catalog();
        let selection = catalog
            .resolve("cafe", Some("cafe-m"), &["cafe-cup"])
            .unwrap();

        let item = LineItem::price(&selection, 2, "sin azucar").unwrap();
        assert_eq!(item.product_name, "Cafe");
        assert_eq!(item.size.as_ref().map(|s| s.name.as_str()), Some("Mediano"));
        assert_eq!(item.extras.len(), 1);
        assert_eq!(item.customization, "sin azucar");
        assert_eq!(item.unit_price, Money::from_major(3200));
        assert_eq!(item.subtotal, Money::from_major(6400));
    }
}
