//! Auto-play policy.
//!
//! Not a thread: the engine consults it on each tick and at each idle boundary.

use crashsim_types::{AutoPlayConfig, HaltReason};

#[derive(Clone, Debug, Default)]
pub struct AutoPlay {
    config: AutoPlayConfig,
    rounds_started: u64,
    last_halt: Option<HaltReason>,
}

impl AutoPlay {
    pub fn config(&self) -> AutoPlayConfig {
        self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn threshold(&self) -> f64 {
        self.config.cashout_threshold
    }

    /// Rounds auto-play has started since creation.
    pub fn rounds_started(&self) -> u64 {
        self.rounds_started
    }

    pub fn last_halt(&self) -> Option<HaltReason> {
        self.last_halt
    }

    /// Replace the settings. Enabling clears the last halt reason.
    pub fn set(&mut self, enabled: bool, threshold: f64) {
        self.config = AutoPlayConfig::new(enabled, threshold);
        if enabled {
            self.last_halt = None;
        }
    }

    pub fn record_start(&mut self) {
        self.rounds_started += 1;
    }

    /// Switch off, keeping the threshold. Returns true if it was on.
    pub fn halt(&mut self, reason: HaltReason) -> bool {
        let was_enabled = self.config.enabled;
        self.config.enabled = false;
        if was_enabled {
            self.last_halt = Some(reason);
        }
        was_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crashsim_types::MIN_AUTO_CASHOUT;

    #[test]
    fn test_set_replaces_settings() {
        let mut auto_play = AutoPlay::default();
        auto_play.set(true, 2.0);
        assert!(auto_play.is_enabled());
        auto_play.set(true, 3.0);
        assert_eq!(auto_play.threshold(), 3.0);
        auto_play.set(false, 3.0);
        assert!(!auto_play.is_enabled());
        assert_eq!(auto_play.threshold(), 3.0);
    }

    #[test]
    fn test_threshold_floor() {
        let mut auto_play = AutoPlay::default();
        auto_play.set(true, 1.0);
        assert_eq!(auto_play.threshold(), MIN_AUTO_CASHOUT);
        assert!(!auto_play.config().should_cash_out(1.0));
        assert!(auto_play.config().should_cash_out(1.01));
    }

    #[test]
    fn test_halt_records_reason_once() {
        let mut auto_play = AutoPlay::default();
        let reason = HaltReason::RoundAborted;
        assert!(!auto_play.halt(reason));
        assert_eq!(auto_play.last_halt(), None);

        auto_play.set(true, 2.0);
        assert!(auto_play.halt(reason));
        assert_eq!(auto_play.last_halt(), Some(reason));
        assert_eq!(auto_play.threshold(), 2.0);

        auto_play.set(true, 2.0);
        assert_eq!(auto_play.last_halt(), None);
    }
}
