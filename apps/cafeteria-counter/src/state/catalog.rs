//! # Catalog State
//!
//! The menu and the promotion catalog shared by every command.
//!
//! Both are read on nearly every command and changed rarely (menu updates,
//! new promotions), so each sits behind an `RwLock`.

use std::sync::RwLock;

use cafeteria_core::{Catalog, Promotion, PromotionCatalog};
use tracing::info;

use crate::error::ApiError;

/// Shared menu and promotions.
#[derive(Debug, Default)]
pub struct CatalogState {
    catalog: RwLock<Catalog>,
    promotions: RwLock<PromotionCatalog>,
}

impl CatalogState {
    pub fn new(catalog: Catalog, promotions: PromotionCatalog) -> Self {
        CatalogState {
            catalog: RwLock::new(catalog),
            promotions: RwLock::new(promotions),
        }
    }

    /// Startup step: creates the default student promotion if needed.
    ///
    /// Returns `true` when the promotion was created.
    pub fn ensure_default_promotion(&self) -> Result<bool, ApiError> {
        let mut promotions = self
            .promotions
            .write()
            .map_err(|_| ApiError::lock_poisoned("Promotion catalog"))?;

        let created = promotions.ensure_default_promotion();
        if created {
            info!("Default student promotion created");
        }
        Ok(created)
    }

    /// Executes a function with read access to the menu.
    pub fn with_catalog<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Catalog) -> R,
    {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| ApiError::lock_poisoned("Catalog"))?;
        Ok(f(&catalog))
    }

    /// Executes a function with read access to the promotions.
    pub fn with_promotions<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&PromotionCatalog) -> R,
    {
        let promotions = self
            .promotions
            .read()
            .map_err(|_| ApiError::lock_poisoned("Promotion catalog"))?;
        Ok(f(&promotions))
    }

    /// Swaps in a new menu. Carts re-price against it on their next view.
    pub fn replace_catalog(&self, catalog: Catalog) -> Result<(), ApiError> {
        let mut current = self
            .catalog
            .write()
            .map_err(|_| ApiError::lock_poisoned("Catalog"))?;
        *current = catalog;
        info!(products = current.products().len(), "Catalog replaced");
        Ok(())
    }

    /// Adds a promotion after the existing ones.
    pub fn register_promotion(&self, promotion: Promotion) -> Result<(), ApiError> {
        let mut promotions = self
            .promotions
            .write()
            .map_err(|_| ApiError::lock_poisoned("Promotion catalog"))?;
        let name = promotion.name.clone();
        promotions.register(promotion)?;
        info!(promotion = %name, "Promotion registered");
        Ok(())
    }
}
