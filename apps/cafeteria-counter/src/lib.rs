//! # Cafeteria Counter Library
//!
//! The counter application: shared state plus the command functions a
//! transport calls. Business rules live in `cafeteria-core`.
//!
//! ## Module Organization
//! ```text
//! cafeteria_counter/
//! ├── lib.rs          ◄─── You are here (startup & scripted session)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── catalog.rs  ◄─── Menu and promotions
//! │   ├── cart.rs     ◄─── One cart per customer
//! │   ├── orders.rs   ◄─── Orders and purchase history
//! │   └── config.rs   ◄─── Store name, currency, clock offset
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── menu.rs     ◄─── Menu browsing
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── checkout.rs ◄─── Payment summary and order placement
//! │   └── pickup.rs   ◄─── Pickup window
//! ├── seed.rs         ◄─── Starting menu
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod seed;
pub mod state;

use cafeteria_core::{PaymentMethod, PromotionCatalog, DELIVERY_CONFIRMATION_TOKEN};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::cart::{add_to_cart, AddToCartRequest};
use commands::checkout::{checkout_summary, place_order, PlaceOrderRequest};
use commands::menu::get_menu;
use commands::pickup::{deliver_order, mark_paid, mark_ready, start_preparation, PaymentRequest};
use error::ApiError;
use state::{CartState, CatalogState, ConfigState, OrderLedger};

/// Runs a scripted counter session against the seeded menu.
///
/// ## Session
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize logging and configuration (CAFETERIA_* env vars)         │
/// │  2. Seed the menu, ensure the default student promotion                 │
/// │  3. A student browses the menu                                          │
/// │  4. Adds arroz con huevo and a large coffee to go                       │
/// │  5. Reviews the payment summary for a 15 minute window                  │
/// │  6. Places the order                                                    │
/// │  7. Kitchen prepares it, cashier takes cash, counter hands it over      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Each step's response is printed as JSON.
pub fn run() -> Result<(), ApiError> {
    init_tracing();

    let config = ConfigState::from_env();
    info!(store = %config.store_name, "Starting cafeteria counter");

    let catalog = CatalogState::new(seed::seed_catalog(), PromotionCatalog::default());
    catalog.ensure_default_promotion()?;
    let carts = CartState::new();
    let ledger = OrderLedger::new();

    let username = "estudiante";

    print_step(
        "menu",
        &get_menu(&catalog, &ledger, &config, username, None, None)?,
    )?;

    add_to_cart(
        &catalog,
        &carts,
        &ledger,
        &config,
        username,
        AddToCartRequest {
            product_id: "arroz_con_huevo".to_string(),
            ..Default::default()
        },
    )?;
    let cart = add_to_cart(
        &catalog,
        &carts,
        &ledger,
        &config,
        username,
        AddToCartRequest {
            product_id: "cafe".to_string(),
            size_id: Some("cafe_grande".to_string()),
            extra_ids: vec!["cafe_vaso".to_string()],
            quantity: Some(1),
            customization: "sin azucar".to_string(),
        },
    )?;
    print_step("cart", &cart)?;

    let summary = checkout_summary(&catalog, &carts, &ledger, &config, username, Some("15min"))?;
    print_step("payment summary", &summary)?;

    let order = place_order(
        &catalog,
        &carts,
        &ledger,
        &config,
        username,
        PlaceOrderRequest {
            window: Some("15min".to_string()),
            payment_method: Some(PaymentMethod::Cash),
            ..Default::default()
        },
    )?;
    print_step("order placed", &order)?;

    let number = order.order_number;
    start_preparation(&ledger, &config, &number)?;
    mark_ready(&ledger, &config, &number)?;
    mark_paid(
        &ledger,
        &config,
        &number,
        PaymentRequest {
            method: PaymentMethod::Cash,
            ..Default::default()
        },
    )?;
    let delivered = deliver_order(&ledger, &config, &number, DELIVERY_CONFIRMATION_TOKEN)?;
    print_step("delivered", &delivered)?;

    info!(order_number = %number, "Session finished");
    Ok(())
}

fn print_step<T: Serialize>(title: &str, value: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Failed to serialize {}: {}", title, e)))?;
    println!("== {} ==\n{}", title, json);
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cafeteria=trace` - Trace the cafeteria crates only
/// - Default: INFO, DEBUG for the cafeteria crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cafeteria=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
