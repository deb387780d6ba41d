//! Session ledger.
//!
//! Reducers applied by the engine at each settling transition. Amounts are micro-units, so
//! `house_profit == total_wagered - total_won` holds exactly after every settled round.

use crashsim_types::{
    CashoutRecord, EngineError, History, LedgerTotals, OutcomeDraw, RoundResult,
};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct Ledger {
    totals: LedgerTotals,
    history: History,
}

impl Ledger {
    pub fn new(starting_balance: u64) -> Self {
        Self {
            totals: LedgerTotals::new(starting_balance),
            history: History::new(),
        }
    }

    pub fn totals(&self) -> &LedgerTotals {
        &self.totals
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn balance(&self) -> u64 {
        self.totals.balance
    }

    /// Check that `stake` could be wagered right now.
    pub fn can_cover(&self, stake: u64) -> Result<(), EngineError> {
        if stake == 0 || stake > self.totals.balance {
            return Err(EngineError::InsufficientBalance {
                stake,
                balance: self.totals.balance,
            });
        }
        Ok(())
    }

    /// Deduct a stake at round start.
    pub fn record_wager(&mut self, stake: u64) -> Result<(), EngineError> {
        self.can_cover(stake)?;
        self.totals.balance -= stake;
        self.totals.total_trials += 1;
        self.totals.total_wagered += stake;
        self.totals.house_profit += stake as i128;
        Ok(())
    }

    /// Credit a cash-out and record the win.
    pub fn record_cashout(
        &mut self,
        round: u64,
        outcome: OutcomeDraw,
        stake: u64,
        cashout: CashoutRecord,
    ) -> RoundResult {
        self.totals.balance += cashout.payout;
        self.totals.total_won += cashout.payout;
        self.totals.total_wins += 1;
        self.totals.house_profit -= cashout.payout as i128;
        self.push(RoundResult::win(round, outcome, stake, cashout))
    }

    /// Record an uncashed stake as lost. The stake was already taken at round start.
    pub fn record_loss(&mut self, round: u64, outcome: OutcomeDraw, stake: u64) -> RoundResult {
        self.push(RoundResult::loss(round, outcome, stake))
    }

    fn push(&mut self, result: RoundResult) -> RoundResult {
        if let Some(evicted) = self.history.push(result) {
            debug!(round = evicted.round, "evicted round from history");
        }
        result
    }
}
