//! Crash simulator execution layer.
//!
//! This crate contains the round engine: the outcome sampler, the multiplier clock, the
//! round state machine, the session ledger and the auto-play policy.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside the engine; all timing goes through [`Scheduler`].
//! - Do not draw randomness from anywhere but the injected [`UniformSource`].
//! - Exactly two draws are taken per round, so a seeded source replays a session exactly.
//!
//! The primary entrypoint is [`Engine`].
//!
//! ## Minimal session (example)
//! ```rust
//! use crashsim_execution::{Engine, RandSource, VirtualScheduler};
//! use crashsim_types::{EngineConfig, RoundState, UNIT};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::time::Duration;
//!
//! let mut engine = Engine::new(
//!     EngineConfig::default(),
//!     VirtualScheduler::new(),
//!     RandSource(StdRng::seed_from_u64(1)),
//! );
//! engine.place_bet(10 * UNIT).unwrap();
//! engine.start_round();
//! engine.run_round();
//! assert_eq!(engine.state(), RoundState::Resolved);
//! engine.advance(Duration::from_secs(2));
//! assert_eq!(engine.state(), RoundState::Idle);
//! ```

pub mod autoplay;
pub mod clock;
pub mod engine;
pub mod ledger;
pub mod sampler;
pub mod scheduler;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use autoplay::AutoPlay;
pub use clock::{ClockStep, RoundClock};
pub use engine::Engine;
pub use ledger::Ledger;
pub use sampler::{
    draw, expected_return, expected_value, sample, survival_probability, RandSource,
    UniformSource, Zone, ZONES,
};
pub use scheduler::{Scheduler, Timer, TimerId, VirtualScheduler};
