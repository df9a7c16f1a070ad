//! # Cafeteria Counter Entry Point
//!
//! Runs a scripted session: a student orders, the kitchen prepares, the
//! counter hands the order over. Output is JSON on stdout, logs on stderr.
//!
//! ## Environment
//! - `CAFETERIA_STORE_NAME`, `CAFETERIA_CURRENCY_SYMBOL`,
//!   `CAFETERIA_CURRENCY_DECIMALS`, `CAFETERIA_UTC_OFFSET_MINUTES`
//! - `RUST_LOG` for log filtering

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for testability
    match cafeteria_counter::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cafeteria-counter: {}", err);
            ExitCode::FAILURE
        }
    }
}
