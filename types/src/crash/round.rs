use serde::{Deserialize, Serialize};
use std::fmt;

use super::BASE_MULTIPLIER;

/// Target multiplier for one round.
///
/// Sampled exactly once per round, before the clock starts, and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeDraw(f64);

impl OutcomeDraw {
    /// The lowest possible outcome, 1.00x.
    pub const BASE: Self = Self(BASE_MULTIPLIER);

    /// Wrap a multiplier, rejecting anything below 1.00x or not finite.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= BASE_MULTIPLIER).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for OutcomeDraw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

/// Lifecycle of the single live round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// No bet and no clock; stake and auto-play settings may be edited.
    #[default]
    Idle,
    /// A stake is reserved for the next round but not yet deducted.
    BetPlaced,
    /// The clock is ticking toward the outcome.
    Running,
    /// The outcome was reached; waiting out the cooldown.
    Resolved,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundState::Idle => "idle",
            RoundState::BetPlaced => "bet_placed",
            RoundState::Running => "running",
            RoundState::Resolved => "resolved",
        };
        f.write_str(name)
    }
}

/// Stake committed by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    /// Stake in micro-units.
    pub stake: u64,
    /// Set once the stake has been deducted for a running round.
    pub placed_for_round: bool,
}

impl Bet {
    pub fn new(stake: u64) -> Self {
        Self {
            stake,
            placed_for_round: false,
        }
    }
}

/// Locked-in cash-out for the current round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashoutRecord {
    pub multiplier: f64,
    /// `stake * multiplier` in micro-units.
    pub payout: u64,
}

/// Settled round as recorded in history.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Sequence number of the round (1-based, counts spectated rounds too).
    pub round: u64,
    pub outcome: OutcomeDraw,
    pub stake: u64,
    pub cashed_out: bool,
    /// Multiplier locked in by the cash-out, if any.
    pub cashout_multiplier: Option<f64>,
    /// Player net for the round: `payout - stake` on a win, `-stake` on a loss.
    pub delta: i64,
}

impl RoundResult {
    pub fn win(round: u64, outcome: OutcomeDraw, stake: u64, cashout: CashoutRecord) -> Self {
        Self {
            round,
            outcome,
            stake,
            cashed_out: true,
            cashout_multiplier: Some(cashout.multiplier),
            delta: super::round_delta(cashout.payout, stake),
        }
    }

    pub fn loss(round: u64, outcome: OutcomeDraw, stake: u64) -> Self {
        Self {
            round,
            outcome,
            stake,
            cashed_out: false,
            cashout_multiplier: None,
            delta: super::round_delta(0, stake),
        }
    }

    /// Multiplier shown next to the entry: the cash-out point for wins, the outcome for losses.
    pub fn display_multiplier(&self) -> f64 {
        self.cashout_multiplier.unwrap_or(self.outcome.value())
    }
}
