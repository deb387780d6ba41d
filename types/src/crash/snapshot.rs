use serde::Serialize;

use super::{
    AutoPlayConfig, Bet, CashoutRecord, LedgerTotals, OutcomeDraw, RoundResult, RoundState,
};

/// Read-only view of the engine for a presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub balance: u64,
    pub round_state: RoundState,
    pub current_multiplier: f64,
    /// Stake used by the next bet placed without an explicit amount.
    pub stake: u64,
    pub bet: Option<Bet>,
    pub cashout: Option<CashoutRecord>,
    /// Revealed only once the round has resolved.
    pub outcome: Option<OutcomeDraw>,
    /// What a cash-out at the current multiplier would pay, while one is possible.
    pub potential_payout: Option<u64>,
    pub auto_play: AutoPlayConfig,
    pub ledger: LedgerTotals,
    pub history: Vec<RoundResult>,
}

/// Why auto-play switched itself off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HaltReason {
    InsufficientBalance { stake: u64, balance: u64 },
    /// A running round was abandoned with `new_round`.
    RoundAborted,
    Shutdown,
}

/// Notification emitted by the engine, drained by the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum EngineEvent {
    /// A round started. `wagered` is false for spectated rounds.
    RoundStarted { round: u64, stake: u64, wagered: bool },
    /// The clock advanced; the final tick carries the outcome exactly.
    Tick { multiplier: f64 },
    CashedOut(CashoutRecord),
    /// The outcome was reached. `result` is `None` for spectated rounds.
    Resolved {
        round: u64,
        outcome: OutcomeDraw,
        result: Option<RoundResult>,
    },
    /// The round was abandoned mid-flight.
    Aborted { round: u64, result: Option<RoundResult> },
    /// The engine returned to `Idle`.
    Idle,
    AutoPlayHalted(HaltReason),
}
