//! # Validation Module
//!
//! Line-item and catalog field validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Line Item Validation (single pass)                     │
//! │                                                                         │
//! │  Selection + quantity                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for rule in SELECTION_RULES:     ← ordered, extensible table           │
//! │       rule(check, &mut violations)                                      │
//! │       │                                                                 │
//! │       ├── violations empty?  → Ok(())                                   │
//! │       └── otherwise          → ValidationError::LineItem { all of them }│
//! │                                                                         │
//! │  New option-compatibility rules are one more entry in the table.        │
//! │  Call sites never change.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::catalog::Selection;
use crate::error::{ValidationError, Violation};
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Selection Rules
// =============================================================================

/// What a selection rule looks at.
#[derive(Debug, Clone, Copy)]
pub struct SelectionCheck<'s, 'a> {
    pub selection: &'s Selection<'a>,
    pub quantity: i64,
}

/// A single line-item rule. Pushes zero or more violations.
pub type SelectionRule = fn(&SelectionCheck<'_, '_>, &mut Vec<Violation>);

/// Every rule a line item must satisfy, in reporting order.
pub const SELECTION_RULES: &[SelectionRule] = &[
    quantity_in_range,
    product_available,
    size_belongs_to_product,
    extras_belong_to_product,
    extras_not_repeated,
    mandatory_extras_present,
];

/// Runs every selection rule and returns all violations found.
pub fn selection_violations(selection: &Selection<'_>, quantity: i64) -> Vec<Violation> {
    let check = SelectionCheck {
        selection,
        quantity,
    };
    let mut violations = Vec::new();
    for rule in SELECTION_RULES {
        rule(&check, &mut violations);
    }
    violations
}

/// Validates a line-item selection.
///
/// ## Example
/// ```rust
/// use cafeteria_core::catalog::Selection;
/// use cafeteria_core::money::Money;
/// use cafeteria_core::types::{Availability, Product};
/// use cafeteria_core::validation::validate_selection;
///
/// let product = Product {
///     id: "p1".into(),
///     name: "Arroz con huevo".into(),
///     description: None,
///     base_price: Money::from_major(10000),
///     category_id: "c1".into(),
///     availability: Availability::Available,
///     allergens: None,
///     sizes: vec![],
///     extras: vec![],
/// };
/// let selection = Selection { product: &product, size: None, extras: vec![] };
///
/// assert!(validate_selection(&selection, 2).is_ok());
/// assert!(validate_selection(&selection, 0).is_err());
/// ```
pub fn validate_selection(selection: &Selection<'_>, quantity: i64) -> ValidationResult<()> {
    let violations = selection_violations(selection, quantity);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::LineItem { violations })
    }
}

fn quantity_in_range(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    if check.quantity <= 0 {
        out.push(Violation::QuantityNotPositive {
            quantity: check.quantity,
        });
    } else if check.quantity > MAX_ITEM_QUANTITY {
        out.push(Violation::QuantityTooLarge {
            quantity: check.quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
}

fn product_available(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    let product = check.selection.product;
    if !product.is_available() {
        out.push(Violation::ProductUnavailable {
            product_id: product.id.clone(),
        });
    }
}

fn size_belongs_to_product(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    let product = check.selection.product;
    if let Some(size) = check.selection.size {
        if size.product_id != product.id {
            out.push(Violation::ForeignSize {
                size_id: size.id.clone(),
                product_id: product.id.clone(),
            });
        }
    }
}

fn extras_belong_to_product(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    let product = check.selection.product;
    for extra in &check.selection.extras {
        if extra.product_id != product.id {
            out.push(Violation::ForeignExtra {
                extra_id: extra.id.clone(),
                product_id: product.id.clone(),
            });
        }
    }
}

fn extras_not_repeated(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for extra in &check.selection.extras {
        if !seen.insert(extra.id.as_str()) {
            out.push(Violation::DuplicateExtra {
                extra_id: extra.id.clone(),
            });
        }
    }
}

fn mandatory_extras_present(check: &SelectionCheck<'_, '_>, out: &mut Vec<Violation>) {
    for required in check.selection.product.mandatory_extras() {
        let present = check.selection.extras.iter().any(|e| e.id == required.id);
        if !present {
            out.push(Violation::MissingMandatoryExtra {
                extra_id: required.id.clone(),
                name: required.name.clone(),
            });
        }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a catalog price (base price, size delta or extra price).
///
/// Zero is allowed (free extras, default size).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a promotion's discount percentage (0 to 100 inclusive).
pub fn validate_discount_percent(percent: Decimal) -> ValidationResult<()> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_selection_passes() {
        let catalog = sample_catalog();
        let selection = catalog.resolve("cafe", Some("cafe-m"), &["cafe-cup"]).unwrap();
        assert!(validate_selection(&selection, 1).is_ok());
    }

    #[test]
    fn test_missing_mandatory_extra() {
        let catalog = sample_catalog();
        let selection = catalog.resolve("cafe", None, &["cafe-shot"]).unwrap();

        let violations = selection_violations(&selection, 1);
        assert_eq!(
            violations,
            vec![Violation::MissingMandatoryExtra {
                extra_id: "cafe-cup".to_string(),
                name: "Vaso".to_string(),
            }]
        );
    }

    #[test]
    fn test_options_of_another_product() {
        let catalog = sample_catalog();
        let selection = catalog.resolve("arroz", Some("cafe-l"), &["cafe-shot"]).unwrap();

        let violations = selection_violations(&selection, 1);
        assert_eq!(
            violations,
            vec![
                Violation::ForeignSize {
                    size_id: "cafe-l".to_string(),
                    product_id: "arroz".to_string(),
                },
                Violation::ForeignExtra {
                    extra_id: "cafe-shot".to_string(),
                    product_id: "arroz".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let catalog = sample_catalog();
        let selection = catalog
            .resolve("cafe", None, &["cafe-shot", "cafe-shot"])
            .unwrap();

        let err = validate_selection(&selection, 0).unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 3);
        assert!(matches!(violations[0], Violation::QuantityNotPositive { quantity: 0 }));
        assert!(matches!(violations[1], Violation::DuplicateExtra { .. }));
        assert!(matches!(violations[2], Violation::MissingMandatoryExtra { .. }));
    }

    #[test]
    fn test_quantity_limits() {
        let catalog = sample_catalog();
        let no_extras: [&str; 0] = [];
        let selection = catalog.resolve("arroz", None, &no_extras).unwrap();

        assert!(validate_selection(&selection, 1).is_ok());
        assert!(validate_selection(&selection, MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_selection(&selection, -1).is_err());
        assert!(matches!(
            selection_violations(&selection, MAX_ITEM_QUANTITY + 1).as_slice(),
            [Violation::QuantityTooLarge { .. }]
        ));
    }

    #[test]
    fn test_sold_out_product() {
        let catalog = sample_catalog();
        let no_extras: [&str; 0] = [];
        let selection = catalog.resolve("croissant", None, &no_extras).unwrap();

        assert_eq!(
            selection_violations(&selection, 1),
            vec![Violation::ProductUnavailable {
                product_id: "croissant".to_string()
            }]
        );
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Arroz con huevo").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("base_price", Money::zero()).is_ok());
        assert!(validate_price("base_price", Money::from_major(3000)).is_ok());
        assert!(validate_price("base_price", Money::from_major(-1)).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(dec!(0)).is_ok());
        assert!(validate_discount_percent(dec!(10)).is_ok());
        assert!(validate_discount_percent(dec!(100)).is_ok());
        assert!(validate_discount_percent(dec!(100.01)).is_err());
        assert!(validate_discount_percent(dec!(-5)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1000).is_ok());
        assert!(validate_tax_rate_bps(10_000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }
}
