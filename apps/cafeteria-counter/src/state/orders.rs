//! # Order Ledger
//!
//! Placed orders and customer purchase history, kept in memory.
//!
//! ## Why One Lock for Both?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Commit                                      │
//! │                                                                         │
//! │  lock(ledger)                                                           │
//! │     │                                                                   │
//! │     ├── read customer (purchase history before this order)              │
//! │     ├── pick an unused order number                                     │
//! │     ├── cafeteria_core::checkout()  ── fails? → nothing changed         │
//! │     ├── insert order                                                    │
//! │     └── replace customer (count + 1, last purchase = now)               │
//! │  unlock                                                                 │
//! │                                                                         │
//! │  Readers never see an order without its purchase recorded, or a         │
//! │  purchase recorded without its order.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use cafeteria_core::order::generate_order_number;
use cafeteria_core::{CheckoutOutcome, CoreError, CoreResult, Customer, Order};
use tracing::{debug, info};

use crate::error::ApiError;

#[derive(Debug, Default)]
struct Ledger {
    /// In placement order.
    orders: Vec<Order>,
    /// By customer id.
    customers: HashMap<String, Customer>,
    /// Username → customer id.
    usernames: HashMap<String, String>,
}

impl Ledger {
    fn order_mut(&mut self, order_number: &str) -> CoreResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .ok_or_else(|| CoreError::OrderNotFound(order_number.to_string()))
    }

    fn username_of(&self, customer_id: &str) -> String {
        self.customers
            .get(customer_id)
            .map(|c| c.username.clone())
            .unwrap_or_default()
    }

    /// Draws numbers from `generate` until one is not taken.
    fn unused_order_number<G>(&self, mut generate: G) -> String
    where
        G: FnMut() -> String,
    {
        loop {
            let candidate = generate();
            if self.orders.iter().all(|o| o.order_number != candidate) {
                return candidate;
            }
            debug!(order_number = %candidate, "Order number collision, regenerating");
        }
    }
}

/// Shared order and customer records.
#[derive(Debug, Default, Clone)]
pub struct OrderLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Ledger>, ApiError> {
        self.inner
            .lock()
            .map_err(|_| ApiError::lock_poisoned("Order ledger"))
    }

    /// Returns the customer for `username`, creating a verified profile on
    /// first sight.
    pub fn ensure_customer(&self, username: &str) -> Result<Customer, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::validation("username is required"));
        }

        let mut ledger = self.lock()?;
        if let Some(id) = ledger.usernames.get(username) {
            if let Some(customer) = ledger.customers.get(id) {
                return Ok(customer.clone());
            }
        }

        let customer = Customer::new_verified(username);
        ledger
            .usernames
            .insert(username.to_string(), customer.id.clone());
        ledger
            .customers
            .insert(customer.id.clone(), customer.clone());
        info!(username = %username, customer_id = %customer.id, "Customer profile created");
        Ok(customer)
    }

    /// Replaces a customer's record (e.g., after verification changes).
    pub fn save_customer(&self, customer: Customer) -> Result<(), ApiError> {
        let mut ledger = self.lock()?;
        ledger
            .usernames
            .insert(customer.username.clone(), customer.id.clone());
        ledger.customers.insert(customer.id.clone(), customer);
        Ok(())
    }

    pub fn customer(&self, customer_id: &str) -> Result<Customer, ApiError> {
        let ledger = self.lock()?;
        ledger
            .customers
            .get(customer_id)
            .cloned()
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()).into())
    }

    /// Runs `build` with the customer's current record and a fresh order
    /// number, then stores the order and the updated customer together.
    ///
    /// Nothing is stored if `build` fails.
    pub fn commit_checkout<F>(&self, customer_id: &str, build: F) -> Result<Order, ApiError>
    where
        F: FnOnce(&Customer, String) -> CoreResult<CheckoutOutcome>,
    {
        let mut ledger = self.lock()?;

        let customer = ledger
            .customers
            .get(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;
        let order_number = ledger.unused_order_number(generate_order_number);

        let CheckoutOutcome { order, customer } = build(customer, order_number)?;

        ledger.customers.insert(customer.id.clone(), customer);
        ledger.orders.push(order.clone());
        Ok(order)
    }

    /// Applies a status change to an order.
    ///
    /// Order methods check before they change anything, so a rejected
    /// change leaves the order as it was.
    pub fn update_order<F>(&self, order_number: &str, change: F) -> Result<Order, ApiError>
    where
        F: FnOnce(&mut Order) -> CoreResult<()>,
    {
        let mut ledger = self.lock()?;
        let order = ledger.order_mut(order_number)?;
        change(order)?;
        Ok(order.clone())
    }

    pub fn order(&self, order_number: &str) -> Result<Order, ApiError> {
        let ledger = self.lock()?;
        ledger
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned()
            .ok_or_else(|| CoreError::OrderNotFound(order_number.to_string()).into())
    }

    /// A customer's orders, newest first.
    pub fn orders_for(&self, customer_id: &str) -> Result<Vec<Order>, ApiError> {
        let ledger = self.lock()?;
        Ok(ledger
            .orders
            .iter()
            .rev()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    /// Orders waiting at the pickup window with their customer's username,
    /// newest first, filtered by order number or username.
    pub fn pickup_queue(&self, search: &str) -> Result<Vec<(Order, String)>, ApiError> {
        let ledger = self.lock()?;
        Ok(ledger
            .orders
            .iter()
            .rev()
            .filter(|o| o.awaiting_pickup())
            .map(|o| (o, ledger.username_of(&o.customer_id)))
            .filter(|(o, username)| o.matches_search(search, username))
            .map(|(o, username)| (o.clone(), username))
            .collect())
    }
}
