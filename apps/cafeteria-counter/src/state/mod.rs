//! # State Module
//!
//! Shared state for the counter, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐    │
//! │  │ CatalogState │ │  CartState   │ │ OrderLedger  │ │ ConfigState  │    │
//! │  │              │ │              │ │              │ │              │    │
//! │  │  RwLock<     │ │  Arc<Mutex<  │ │  Arc<Mutex<  │ │  store_name  │    │
//! │  │   Catalog>   │ │   HashMap<   │ │   orders +   │ │  currency    │    │
//! │  │  RwLock<     │ │    Cart>>>   │ │   customers  │ │  utc offset  │    │
//! │  │   Promos>    │ │              │ │  >>          │ │              │    │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • CatalogState: many readers, rare writers                             │
//! │  • CartState: one mutex over every customer's cart                      │
//! │  • OrderLedger: orders and purchase history change under one lock       │
//! │  • ConfigState: read-only after initialization                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod orders;

pub use cart::CartState;
pub use catalog::CatalogState;
pub use config::ConfigState;
pub use orders::OrderLedger;
