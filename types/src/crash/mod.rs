//! Crash domain types.
//!
//! Defines round/bet/ledger/history state, engine configuration, and constants used by the
//! execution layer and its drivers.

mod amount;
mod config;
mod constants;
mod error;
mod history;
mod ledger;
mod round;
mod snapshot;

pub use amount::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use history::*;
pub use ledger::*;
pub use round::*;
pub use snapshot::*;

#[cfg(test)]
mod tests;
