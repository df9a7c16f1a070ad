//! # Commands Module
//!
//! Every operation the counter exposes. A transport (HTTP handler, console
//! prompt, kiosk UI) calls these and serializes the result.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── menu.rs      ◄─── Menu browsing
//! ├── cart.rs      ◄─── Cart manipulation and cart view
//! ├── checkout.rs  ◄─── Payment summary, place order, order lookup
//! └── pickup.rs    ◄─── Pickup window queue and status changes
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the ledger
//! fn get_order(ledger: &OrderLedger, config: &ConfigState, order_number: &str)
//!
//! // Needs the menu, the carts and the ledger
//! fn place_order(catalog: &CatalogState, carts: &CartState, ledger: &OrderLedger, ...)
//! ```

pub mod cart;
pub mod checkout;
pub mod menu;
pub mod pickup;

use cafeteria_core::DeliveryWindow;

use crate::error::ApiError;

/// Parses a requested delivery window. Missing means as soon as possible.
pub(crate) fn parse_window(window: Option<&str>) -> Result<DeliveryWindow, ApiError> {
    match window {
        None => Ok(DeliveryWindow::Asap),
        Some(code) => Ok(code.parse::<DeliveryWindow>()?),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window(None).unwrap(), DeliveryWindow::Asap);
        assert_eq!(parse_window(Some("1hora")).unwrap(), DeliveryWindow::OneHour);
        assert!(parse_window(Some("manana")).is_err());
    }
}
