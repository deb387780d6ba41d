//! Headless crash player.
//!
//! Runs the round engine with auto-play switched on and a fixed cash-out threshold, either
//! on wall-clock timers ([`run_realtime`]) or on simulated time ([`run_virtual`]), and
//! reports the realized house edge against the analytic expectation.

mod scheduler;

pub use scheduler::TokioScheduler;

use anyhow::{ensure, Context, Result};
use crashsim_execution::{
    expected_return, Engine, RandSource, Scheduler, UniformSource, VirtualScheduler,
};
use crashsim_types::{
    micros_to_units, signed_micros_to_units, units_to_micros, EngineConfig, EngineEvent,
    HaltReason, RoundState, DEFAULT_AUTO_CASHOUT, MIN_AUTO_CASHOUT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Autopilot session configuration (from config file).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    /// Seed for the outcome source; entropy when absent.
    pub seed: Option<u64>,
    /// Wagered rounds to play before stopping.
    pub rounds: u64,
    /// Stake per round, in whole units.
    pub stake: f64,
    pub cashout_threshold: f64,
    /// Starting balance, in whole units.
    pub starting_balance: f64,
    /// Wall-clock speed-up applied to every engine delay.
    pub time_scale: f64,
    pub virtual_time: bool,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            log_level: "info".to_string(),
            seed: None,
            rounds: 100,
            stake: micros_to_units(engine.default_stake),
            cashout_threshold: DEFAULT_AUTO_CASHOUT,
            starting_balance: micros_to_units(engine.starting_balance),
            time_scale: 1.0,
            virtual_time: false,
            engine,
        }
    }
}

impl Config {
    /// Read a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("could not parse config file {}", path.display()))
    }

    /// Engine config with the session's stake and balance applied.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            starting_balance: units_to_micros(self.starting_balance),
            default_stake: units_to_micros(self.stake),
            ..self.engine
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.rounds > 0, "rounds must be greater than zero");
        ensure!(
            self.cashout_threshold.is_finite() && self.cashout_threshold >= MIN_AUTO_CASHOUT,
            "cashout_threshold must be at least {MIN_AUTO_CASHOUT}"
        );
        ensure!(
            self.time_scale.is_finite() && self.time_scale > 0.0,
            "time_scale must be positive"
        );
        let engine = self.engine_config();
        engine
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid engine config")?;
        ensure!(
            engine.default_stake <= engine.starting_balance,
            "stake exceeds starting balance"
        );
        Ok(())
    }

    fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

/// End-of-session report, in whole units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub rounds: u64,
    pub wins: u64,
    pub win_rate: f64,
    pub balance: f64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub house_profit: f64,
    pub roi_percent: f64,
    pub actual_house_edge_percent: f64,
    /// House edge a threshold player faces in expectation.
    pub expected_house_edge_percent: f64,
    /// Why the session stopped early, if it did.
    pub halted: Option<String>,
}

impl Summary {
    fn from_engine<S: Scheduler, R: UniformSource>(
        engine: &Engine<S, R>,
        threshold: f64,
    ) -> Self {
        let totals = engine.ledger().totals();
        Self {
            rounds: totals.total_trials,
            wins: totals.total_wins,
            win_rate: totals.win_rate(),
            balance: micros_to_units(totals.balance),
            total_wagered: micros_to_units(totals.total_wagered),
            total_won: micros_to_units(totals.total_won),
            house_profit: signed_micros_to_units(totals.house_profit),
            roi_percent: totals.roi_percent(),
            actual_house_edge_percent: totals.actual_house_edge_percent(),
            expected_house_edge_percent: (1.0 - expected_return(threshold)) * 100.0,
            halted: engine
                .auto_play()
                .last_halt()
                .filter(|reason| *reason != HaltReason::Shutdown)
                .map(|reason| format!("{reason:?}")),
        }
    }
}

/// Log one engine event.
fn report(event: &EngineEvent) {
    match event {
        EngineEvent::Tick { multiplier } => debug!(multiplier, "tick"),
        EngineEvent::RoundStarted { round, stake, .. } => {
            debug!(round, stake = micros_to_units(*stake), "round started")
        }
        EngineEvent::CashedOut(record) => debug!(
            multiplier = record.multiplier,
            payout = micros_to_units(record.payout),
            "cashed out"
        ),
        EngineEvent::Resolved {
            round,
            outcome,
            result,
        } => {
            let delta = result.map(|r| signed_micros_to_units(r.delta as i128));
            info!(round, %outcome, ?delta, "round settled");
        }
        EngineEvent::Aborted { round, .. } => warn!(round, "round aborted"),
        EngineEvent::Idle => {}
        EngineEvent::AutoPlayHalted(reason) => warn!(?reason, "auto-play halted"),
    }
}

fn finished<S: Scheduler, R: UniformSource>(engine: &Engine<S, R>, rounds: u64) -> bool {
    let totals = engine.ledger().totals();
    let settled = totals.total_trials >= rounds && engine.state() != RoundState::Running;
    settled || !engine.auto_play().is_enabled()
}

fn start<S: Scheduler, R: UniformSource>(
    config: &Config,
    engine: &mut Engine<S, R>,
) -> Result<()> {
    engine
        .set_stake(units_to_micros(config.stake))
        .context("failed to set stake")?;
    engine.set_auto_play(true, config.cashout_threshold);
    info!(
        rounds = config.rounds,
        stake = config.stake,
        threshold = config.cashout_threshold,
        seed = ?config.seed,
        "autopilot started"
    );
    Ok(())
}

/// Play on simulated time. Returns as soon as the session ends.
pub fn run_virtual(config: &Config) -> Result<Summary> {
    config.validate()?;
    let mut engine = Engine::new(
        config.engine_config(),
        VirtualScheduler::new(),
        RandSource(config.rng()),
    );
    start(config, &mut engine)?;

    while !finished(&engine, config.rounds) {
        let Some(due) = engine.scheduler().next_due() else {
            break;
        };
        let now = engine.scheduler().now();
        engine.advance(due.saturating_sub(now));
        for event in engine.take_events() {
            report(&event);
        }
    }
    engine.shutdown();
    engine.take_events();

    let summary = Summary::from_engine(&engine, config.cashout_threshold);
    info!(
        rounds = summary.rounds,
        elapsed = ?engine.scheduler().now(),
        "virtual session finished"
    );
    Ok(summary)
}

/// Play on tokio timers until the session ends or ctrl-c.
pub async fn run_realtime(config: &Config) -> Result<Summary> {
    config.validate()?;
    let (scheduler, mut timers) = TokioScheduler::new(config.time_scale);
    let mut engine = Engine::new(config.engine_config(), scheduler, RandSource(config.rng()));
    start(config, &mut engine)?;

    while !finished(&engine, config.rounds) {
        tokio::select! {
            id = timers.recv() => {
                let Some(id) = id else {
                    warn!("timer channel closed");
                    break;
                };
                engine.fire(id);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                warn!("interrupted");
                break;
            }
        }
        for event in engine.take_events() {
            report(&event);
        }
    }
    engine.shutdown();
    for event in engine.take_events() {
        report(&event);
    }

    Ok(Summary::from_engine(&engine, config.cashout_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            seed: Some(7),
            rounds: 50,
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config: Config = serde_yaml::from_str(
            "rounds: 5\ncashout_threshold: 1.5\nengine:\n  tick_interval_ms: 10\n",
        )
        .expect("parse config");
        assert_eq!(config.rounds, 5);
        assert_eq!(config.cashout_threshold, 1.5);
        assert_eq!(config.engine.tick_interval_ms, 10);
        assert_eq!(config.engine.cooldown_ms, crashsim_types::COOLDOWN_MS);
        assert_eq!(config.stake, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_sessions() {
        assert!(Config {
            rounds: 0,
            ..config()
        }
        .validate()
        .is_err());
        assert!(Config {
            cashout_threshold: 1.0,
            ..config()
        }
        .validate()
        .is_err());
        assert!(Config {
            stake: 2_000.0,
            ..config()
        }
        .validate()
        .is_err());
        assert!(Config {
            time_scale: 0.0,
            ..config()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_virtual_session_is_reproducible() {
        let first = run_virtual(&config()).expect("session");
        let second = run_virtual(&config()).expect("session");
        assert_eq!(first, second);
        assert_eq!(first.rounds, 50);
        assert!(first.halted.is_none());
        assert!(
            (first.balance + first.house_profit - 1_000.0).abs() < 1e-6,
            "balance and house profit must sum to the starting balance"
        );
    }

    #[test]
    fn test_virtual_session_halts_when_broke() {
        // Outcomes never reach 100x, so this threshold never cashes out.
        let summary = run_virtual(&Config {
            rounds: 10,
            stake: 100.0,
            cashout_threshold: 100.0,
            starting_balance: 300.0,
            ..config()
        })
        .expect("session");
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.wins, 0);
        assert_eq!(summary.balance, 0.0);
        assert_eq!(summary.house_profit, 300.0);
        assert!(summary.halted.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_session_completes() {
        let summary = run_realtime(&Config {
            rounds: 3,
            time_scale: 100.0,
            ..config()
        })
        .await
        .expect("session");
        assert_eq!(summary.rounds, 3);
    }
}
