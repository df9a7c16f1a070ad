//! # Menu Commands
//!
//! Menu browsing for a customer.

use cafeteria_core::{Catalog, ExtraOption, Money, Product, SizeOption};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CatalogState, ConfigState, OrderLedger};

/// The menu as one customer sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    pub store_name: String,
    /// Sections in menu order. Sections with no matching product are left out.
    pub sections: Vec<MenuSection>,
    /// The promotion advertised to this customer, if any.
    pub promotion: Option<PromotionBanner>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSection {
    pub category_id: String,
    pub category_name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub display_price: String,
    pub available: bool,
    pub allergens: Option<String>,
    pub sizes: Vec<SizeOption>,
    pub extras: Vec<ExtraOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionBanner {
    pub name: String,
    pub description: String,
    pub discount_percent: Decimal,
    /// Whether the customer's next order would get it.
    pub eligible: bool,
}

impl MenuItem {
    fn from_product(product: &Product, config: &ConfigState) -> Self {
        MenuItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.base_price,
            display_price: config.format_currency(product.base_price),
            available: product.is_available(),
            allergens: product.allergens.clone(),
            sizes: product.sizes.clone(),
            extras: product.extras.clone(),
        }
    }
}

fn sections(
    catalog: &Catalog,
    config: &ConfigState,
    category_id: Option<&str>,
    query: &str,
) -> Vec<MenuSection> {
    let matches = catalog.menu(category_id, query);

    catalog
        .categories()
        .iter()
        .map(|category| MenuSection {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            items: matches
                .iter()
                .filter(|p| p.category_id == category.id)
                .map(|p| MenuItem::from_product(p, config))
                .collect(),
        })
        .filter(|section| !section.items.is_empty())
        .collect()
}

/// Gets the menu, optionally narrowed to one category and a search text.
///
/// ## Arguments
/// * `username` - Customer browsing (created on first sight)
/// * `category_id` - Only this category
/// * `query` - Case-insensitive match on name, description or category
pub fn get_menu(
    catalog: &CatalogState,
    ledger: &OrderLedger,
    config: &ConfigState,
    username: &str,
    category_id: Option<&str>,
    query: Option<&str>,
) -> Result<MenuResponse, ApiError> {
    debug!(username = %username, ?category_id, ?query, "get_menu command");

    let customer = ledger.ensure_customer(username)?;
    let sections = catalog.with_catalog(|c| sections(c, config, category_id, query.unwrap_or("")))?;

    let now = Utc::now();
    let promotion = catalog.with_promotions(|promotions| {
        promotions
            .featured_for(&customer)
            .map(|promotion| PromotionBanner {
                name: promotion.name.clone(),
                description: promotion.description.clone(),
                discount_percent: promotion.discount_percent,
                eligible: promotion.applies_to(&customer, now),
            })
    })?;

    Ok(MenuResponse {
        store_name: config.store_name.clone(),
        sections,
        promotion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::counter;
    use chrono::Duration;

    #[test]
    fn test_full_menu_in_category_order() {
        let c = counter();
        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, None).unwrap();

        let names: Vec<&str> = menu
            .sections
            .iter()
            .map(|s| s.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["Desayuno", "Bebidas", "Panaderia", "Comida"]);
        assert_eq!(menu.sections[1].items.len(), 2);
        assert_eq!(menu.sections[0].items[0].display_price, "$10000.00");
    }

    #[test]
    fn test_menu_search_and_category() {
        let c = counter();

        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, Some("choco")).unwrap();
        assert_eq!(menu.sections.len(), 1);
        assert_eq!(menu.sections[0].items[0].product_id, "chocolate");

        let menu =
            get_menu(&c.catalog, &c.ledger, &c.config, "ana", Some("bebidas"), None).unwrap();
        assert_eq!(menu.sections.len(), 1);
        assert_eq!(menu.sections[0].category_id, "bebidas");

        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, Some("pizza")).unwrap();
        assert!(menu.sections.is_empty());
    }

    #[test]
    fn test_banner_shows_eligibility() {
        let c = counter();

        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, None).unwrap();
        let banner = menu.promotion.unwrap();
        assert!(!banner.eligible);

        let mut ana = c.ledger.ensure_customer("ana").unwrap();
        ana.purchase_count = 3;
        ana.last_purchase_at = Some(Utc::now() - Duration::days(2));
        c.ledger.save_customer(ana).unwrap();

        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, None).unwrap();
        assert!(menu.promotion.unwrap().eligible);
    }

    #[test]
    fn test_unverified_customer_sees_no_student_banner() {
        let c = counter();
        let mut ana = c.ledger.ensure_customer("ana").unwrap();
        ana.verified = false;
        c.ledger.save_customer(ana).unwrap();

        let menu = get_menu(&c.catalog, &c.ledger, &c.config, "ana", None, None).unwrap();
        assert!(menu.promotion.is_none());
    }
}
