use serde::{Deserialize, Serialize};

use super::STARTING_BALANCE;

/// Running totals for the session.
///
/// `balance` and `house_profit` move in both directions; every other counter only grows.
/// After any settled round `house_profit == total_wagered - total_won`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub balance: u64,
    pub total_trials: u64,
    pub total_wins: u64,
    pub total_wagered: u64,
    pub total_won: u64,
    pub house_profit: i128, // Stakes taken minus payouts made
}

impl Default for LedgerTotals {
    fn default() -> Self {
        Self::new(STARTING_BALANCE)
    }
}

impl LedgerTotals {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            total_trials: 0,
            total_wins: 0,
            total_wagered: 0,
            total_won: 0,
            house_profit: 0,
        }
    }

    /// Player net across all rounds: `total_won - total_wagered`.
    pub fn net_profit(&self) -> i128 {
        self.total_won as i128 - self.total_wagered as i128
    }

    /// Player return on volume, as a fraction (0 before any wager).
    pub fn roi(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        self.net_profit() as f64 / self.total_wagered as f64
    }

    pub fn roi_percent(&self) -> f64 {
        self.roi() * 100.0
    }

    /// Realized house edge, as a fraction (0 before any wager).
    pub fn actual_house_edge(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        self.house_profit as f64 / self.total_wagered as f64
    }

    pub fn actual_house_edge_percent(&self) -> f64 {
        self.actual_house_edge() * 100.0
    }

    /// Fraction of wagered rounds that were cashed out (0 before any wager).
    pub fn win_rate(&self) -> f64 {
        if self.total_trials == 0 {
            return 0.0;
        }
        self.total_wins as f64 / self.total_trials as f64
    }

    /// Check `house_profit == total_wagered - total_won`.
    pub fn is_balanced(&self) -> bool {
        self.house_profit == self.total_wagered as i128 - self.total_won as i128
    }
}
