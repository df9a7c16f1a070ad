//! # Fulfillment Estimator
//!
//! Preparation time and ready-at clock time for an order.
//!
//! ```text
//! base_minutes = 15 + 5 × line_item_count
//! minutes      = max(base_minutes, window floor)
//!
//!   window        floor
//!   ──────        ─────
//!   asap          none
//!   15min         15
//!   30min         30
//!   1hour         60
//!   custom        none
//! ```
//!
//! ## Ready-At Is a Clock Time
//! `ready_at` keeps only the time of day of `now + minutes`. An order placed
//! at 23:50 for 35 minutes is "ready at 00:25" with no date, so the value is
//! only meaningful for same-day pickup.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// Fixed part of every estimate, in minutes.
pub const BASE_MINUTES: u32 = 15;

/// Minutes added per line item.
pub const MINUTES_PER_LINE: u32 = 5;

// =============================================================================
// Delivery Window
// =============================================================================

/// How soon the customer asked for the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryWindow {
    /// As soon as possible.
    #[default]
    Asap,
    #[serde(rename = "15min")]
    Minutes15,
    #[serde(rename = "30min")]
    Minutes30,
    #[serde(rename = "1hour")]
    OneHour,
    /// A time agreed at the counter.
    Custom,
}

impl DeliveryWindow {
    /// Minimum estimate for this window, if it has one.
    pub fn floor_minutes(&self) -> Option<u32> {
        match self {
            DeliveryWindow::Minutes15 => Some(15),
            DeliveryWindow::Minutes30 => Some(30),
            DeliveryWindow::OneHour => Some(60),
            DeliveryWindow::Asap | DeliveryWindow::Custom => None,
        }
    }

    /// Canonical code.
    pub fn code(&self) -> &'static str {
        match self {
            DeliveryWindow::Asap => "asap",
            DeliveryWindow::Minutes15 => "15min",
            DeliveryWindow::Minutes30 => "30min",
            DeliveryWindow::OneHour => "1hour",
            DeliveryWindow::Custom => "custom",
        }
    }
}

impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Accepts the canonical codes and the counter's Spanish ones
/// (`ahora`, `1hora`, `personalizada`), case-insensitively.
impl FromStr for DeliveryWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "asap" | "ahora" => Ok(DeliveryWindow::Asap),
            "15min" => Ok(DeliveryWindow::Minutes15),
            "30min" => Ok(DeliveryWindow::Minutes30),
            "1hour" | "1hora" => Ok(DeliveryWindow::OneHour),
            "custom" | "personalizada" => Ok(DeliveryWindow::Custom),
            other => Err(ValidationError::InvalidFormat {
                field: "delivery_window".to_string(),
                reason: format!("unknown window '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Estimate
// =============================================================================

/// Estimated preparation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FulfillmentEstimate {
    pub minutes: u32,
    /// Time of day the order should be ready. No date.
    #[ts(as = "String")]
    pub ready_at: NaiveTime,
}

/// Minutes for `line_item_count` lines in `window`.
pub fn estimate_minutes(line_item_count: usize, window: DeliveryWindow) -> u32 {
    let lines = u32::try_from(line_item_count).unwrap_or(u32::MAX);
    let base = BASE_MINUTES.saturating_add(MINUTES_PER_LINE.saturating_mul(lines));
    window.floor_minutes().map_or(base, |floor| base.max(floor))
}

/// Estimates preparation time and ready-at clock time.
///
/// `local_now` is the counter's wall clock.
///
/// ## Example
/// ```rust
/// use cafeteria_core::fulfillment::{estimate, DeliveryWindow};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let now = NaiveDate::from_ymd_opt(2024, 5, 6)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
///
/// let est = estimate(4, DeliveryWindow::Minutes30, now);
/// assert_eq!(est.minutes, 35);
/// assert_eq!(est.ready_at, NaiveTime::from_hms_opt(12, 35, 0).unwrap());
/// ```
pub fn estimate(
    line_item_count: usize,
    window: DeliveryWindow,
    local_now: NaiveDateTime,
) -> FulfillmentEstimate {
    let minutes = estimate_minutes(line_item_count, window);
    let ready_at = (local_now + Duration::minutes(i64::from(minutes))).time();
    FulfillmentEstimate { minutes, ready_at }
}

// =============================================================================
// Unit Tests
// =============================================================================
