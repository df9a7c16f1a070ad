//! # Configuration State
//!
//! Stores counter configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CAFETERIA_*`)
//! 2. Defaults (this file)
//!
//! The tax rate is not configurable: every order pays
//! [`cafeteria_core::TAX_RATE`].
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use cafeteria_core::{Money, TAX_RATE};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest accepted UTC offset, in minutes (±18h).
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Counter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown on the menu and order tickets)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places shown for amounts
    pub currency_decimals: u32,

    /// Offset of the counter's wall clock from UTC, in minutes.
    /// Ready-at times are shown in this local time.
    pub utc_offset_minutes: i32,

    /// Sales tax in basis points (read-only, for display)
    pub tax_rate_bps: u32,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "Campus Cafeteria"
    /// - Currency: "$" with 2 decimals
    /// - Clock: UTC-5
    fn default() -> Self {
        ConfigState {
            store_name: "Campus Cafeteria".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            utc_offset_minutes: -5 * 60,
            tax_rate_bps: TAX_RATE.bps(),
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CAFETERIA_STORE_NAME`: store name
    /// - `CAFETERIA_CURRENCY_SYMBOL`: currency symbol
    /// - `CAFETERIA_CURRENCY_DECIMALS`: decimals shown (0 to 4)
    /// - `CAFETERIA_UTC_OFFSET_MINUTES`: counter clock offset (e.g., "-300")
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("CAFETERIA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("CAFETERIA_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("CAFETERIA_CURRENCY_DECIMALS") {
            match raw.trim().parse::<u32>() {
                Ok(decimals) if decimals <= 4 => config.currency_decimals = decimals,
                _ => warn!(value = %raw, "Ignoring invalid CAFETERIA_CURRENCY_DECIMALS"),
            }
        }

        if let Some(raw) = lookup("CAFETERIA_UTC_OFFSET_MINUTES") {
            match raw.trim().parse::<i32>() {
                Ok(minutes) if minutes.abs() <= MAX_UTC_OFFSET_MINUTES => {
                    config.utc_offset_minutes = minutes
                }
                _ => warn!(value = %raw, "Ignoring invalid CAFETERIA_UTC_OFFSET_MINUTES"),
            }
        }

        config
    }

    /// The counter's offset from UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// `now` on the counter's wall clock.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.local_offset())
    }

    /// Formats an amount for display, rounded half to even.
    ///
    /// ## Example
    /// ```rust
    /// use cafeteria_core::Money;
    /// use cafeteria_counter::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_minor(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let rounded = amount
            .amount()
            .round_dp_with_strategy(self.currency_decimals, RoundingStrategy::MidpointNearestEven);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{}{}{:.*}",
            sign,
            self.currency_symbol,
            self.currency_decimals as usize,
            rounded.abs()
        )
    }
}
