use thiserror::Error as ThisError;

use super::RoundState;

/// Rejected engine operation. None of these is fatal and none changes engine state.
#[derive(Clone, Copy, Debug, ThisError, PartialEq, Eq)]
pub enum EngineError {
    #[error("insufficient balance (stake={stake}, balance={balance})")]
    InsufficientBalance { stake: u64, balance: u64 },
    #[error("nothing to cash out (state={state})")]
    NotCashable { state: RoundState },
    #[error("bets are only accepted while idle (state={state})")]
    BetNotAccepted { state: RoundState },
}
