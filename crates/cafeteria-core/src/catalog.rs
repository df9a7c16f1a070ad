//! # Catalog Module
//!
//! Read-only lookups over the menu: categories, products and their options.
//!
//! ## Resolution
//! ```text
//! CartLine { product_id, size_id, extra_ids }
//!      │
//!      ▼
//! Catalog::resolve() ← THIS MODULE
//!      │
//!      ├── unknown product/size/extra id? → CoreError::*NotFound
//!      │
//!      └── Selection { &Product, Option<&SizeOption>, Vec<&ExtraOption> }
//!               │
//!               ▼
//!          validation + pricing
//! ```
//!
//! Sizes and extras are looked up across the whole catalog, not just the
//! selected product, so an option that belongs to another product reaches
//! validation and is reported as a violation.

use crate::error::{CoreError, CoreResult};
use crate::types::{Category, ExtraOption, Product, SizeOption};

/// The menu: categories in display order plus every product.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// A product with the size and extras chosen for it, borrowed from the
/// catalog. Not yet validated.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub product: &'a Product,
    pub size: Option<&'a SizeOption>,
    pub extras: Vec<&'a ExtraOption>,
}

impl Catalog {
    /// Builds a catalog. Categories are kept sorted by `position`.
    pub fn new(mut categories: Vec<Category>, products: Vec<Product>) -> Self {
        categories.sort_by_key(|c| c.position);
        Catalog {
            categories,
            products,
        }
    }

    /// Categories in menu order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every product, in registration order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Finds a size option by id, whichever product declares it.
    pub fn size(&self, id: &str) -> Option<&SizeOption> {
        self.products
            .iter()
            .flat_map(|p| p.sizes.iter())
            .find(|s| s.id == id)
    }

    /// Finds an extra option by id, whichever product declares it.
    pub fn extra(&self, id: &str) -> Option<&ExtraOption> {
        self.products
            .iter()
            .flat_map(|p| p.extras.iter())
            .find(|e| e.id == id)
    }

    /// Resolves ids into a [`Selection`].
    ///
    /// ## Errors
    /// - `ProductNotFound` / `SizeNotFound` / `ExtraNotFound` for unknown ids
    pub fn resolve<S: AsRef<str>>(
        &self,
        product_id: &str,
        size_id: Option<&str>,
        extra_ids: &[S],
    ) -> CoreResult<Selection<'_>> {
        let product = self
            .product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let size = size_id
            .map(|id| {
                self.size(id)
                    .ok_or_else(|| CoreError::SizeNotFound(id.to_string()))
            })
            .transpose()?;

        let extras = extra_ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                self.extra(id)
                    .ok_or_else(|| CoreError::ExtraNotFound(id.to_string()))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Selection {
            product,
            size,
            extras,
        })
    }

    /// Menu browsing.
    ///
    /// Keeps products in `category_id` (when given) whose name, description
    /// or category name contains `query`, case-insensitively. An empty query
    /// matches everything.
    pub fn menu(&self, category_id: Option<&str>, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();

        self.products
            .iter()
            .filter(|p| category_id.map_or(true, |c| p.category_id == c))
            .filter(|p| {
                if needle.is_empty() {
                    return true;
                }
                let category_name = self
                    .category(&p.category_id)
                    .map(|c| c.name.to_lowercase())
                    .unwrap_or_default();
                p.name.to_lowercase().contains(&needle)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || category_name.contains(&needle)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
