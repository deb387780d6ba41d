//! Shared types for the crash round engine.
//!
//! Everything a front end needs to render a round lives here: the outcome and round
//! records, the ledger totals, the bounded history, engine configuration, errors, and the
//! serializable [`Snapshot`]. The state machines that mutate these types live in
//! `crashsim-execution`.

pub mod crash;

pub use crash::*;
