//! # Cart State
//!
//! One cart per customer, kept in memory.
//!
//! ## Thread Safety
//! All carts share one `Arc<Mutex<HashMap>>`. Cart operations are short and
//! most of them write, so a single mutex is enough.
//!
//! ## Lock Order
//! A command may read the catalog or commit to the order ledger while
//! holding the cart lock, never the other way around.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cafeteria_core::Cart;
use chrono::Utc;

use crate::error::ApiError;

/// Every customer's cart, keyed by customer id.
#[derive(Debug, Default, Clone)]
pub struct CartState {
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to a customer's cart.
    ///
    /// A customer without a cart sees an empty one.
    pub fn with_cart<F, R>(&self, customer_id: &str, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Cart) -> R,
    {
        let carts = self
            .carts
            .lock()
            .map_err(|_| ApiError::lock_poisoned("Cart state"))?;

        match carts.get(customer_id) {
            Some(cart) => Ok(f(cart)),
            None => Ok(f(&Cart::new(Utc::now()))),
        }
    }

    /// Executes a function with write access to a customer's cart, creating
    /// it if needed.
    pub fn with_cart_mut<F, R>(&self, customer_id: &str, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self
            .carts
            .lock()
            .map_err(|_| ApiError::lock_poisoned("Cart state"))?;

        let cart = carts
            .entry(customer_id.to_string())
            .or_insert_with(|| Cart::new(Utc::now()));
        Ok(f(cart))
    }
}
