use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    AUTO_PLAY_KICKOFF_MS, AUTO_RESTART_DELAY_MS, COOLDOWN_MS, DEFAULT_AUTO_CASHOUT,
    DEFAULT_STAKE, DEFAULT_STEP_HUNDREDTHS, DEFERRED_START_MS, MIN_AUTO_CASHOUT, MIN_STAKE,
    STARTING_BALANCE, TICK_INTERVAL_MS,
};

/// Engine timing and bankroll configuration.
///
/// Durations are in milliseconds; amounts are in micro-units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Balance the ledger starts with.
    pub starting_balance: u64,
    /// Stake used by "place bet & start" and by auto-play until changed.
    pub default_stake: u64,
    /// Time between clock ticks.
    pub tick_interval_ms: u64,
    /// Clock step per tick, in hundredths of a multiplier.
    pub step_hundredths: u64,
    /// Time spent in `Resolved` before returning to `Idle`.
    pub cooldown_ms: u64,
    /// Time auto-play waits in `Idle` before its next bet.
    pub auto_restart_delay_ms: u64,
    /// Time before the first auto-play round when enabled from `Idle`.
    pub auto_play_kickoff_ms: u64,
    /// Time between placing a bet and starting the round for the combined action.
    pub deferred_start_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            default_stake: DEFAULT_STAKE,
            tick_interval_ms: TICK_INTERVAL_MS,
            step_hundredths: DEFAULT_STEP_HUNDREDTHS,
            cooldown_ms: COOLDOWN_MS,
            auto_restart_delay_ms: AUTO_RESTART_DELAY_MS,
            auto_play_kickoff_ms: AUTO_PLAY_KICKOFF_MS,
            deferred_start_ms: DEFERRED_START_MS,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than zero");
        }
        if self.step_hundredths == 0 {
            return Err("step_hundredths must be greater than zero");
        }
        if self.default_stake < MIN_STAKE {
            return Err("default_stake must be at least one unit");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn auto_restart_delay(&self) -> Duration {
        Duration::from_millis(self.auto_restart_delay_ms)
    }

    pub fn auto_play_kickoff(&self) -> Duration {
        Duration::from_millis(self.auto_play_kickoff_ms)
    }

    pub fn deferred_start(&self) -> Duration {
        Duration::from_millis(self.deferred_start_ms)
    }
}

/// Auto-play policy settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoPlayConfig {
    pub enabled: bool,
    /// Multiplier at which auto-play cashes out (always > 1.00).
    pub cashout_threshold: f64,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cashout_threshold: DEFAULT_AUTO_CASHOUT,
        }
    }
}

impl AutoPlayConfig {
    /// Build a config, raising the threshold to [`MIN_AUTO_CASHOUT`] if needed.
    ///
    /// A NaN threshold falls back to [`DEFAULT_AUTO_CASHOUT`].
    pub fn new(enabled: bool, cashout_threshold: f64) -> Self {
        let cashout_threshold = if cashout_threshold.is_nan() {
            DEFAULT_AUTO_CASHOUT
        } else {
            cashout_threshold.max(MIN_AUTO_CASHOUT)
        };
        Self {
            enabled,
            cashout_threshold,
        }
    }

    /// True when auto-play should cash out at `multiplier`.
    pub fn should_cash_out(&self, multiplier: f64) -> bool {
        self.enabled && multiplier >= self.cashout_threshold
    }
}
