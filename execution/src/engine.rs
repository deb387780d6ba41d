//! Round state machine.
//!
//! [`Engine`] owns the live round, the ledger and the auto-play policy. It is driven by
//! caller operations (`place_bet`, `cashout`, ...) and by timers delivered through
//! [`Engine::fire`]. All entry points take `&mut self`, so there is exactly one writer.
//!
//! ## Lifecycle
//! ```text
//! Idle --place_bet--> BetPlaced --start_round--> Running --outcome reached--> Resolved
//!  ^  \________________spectate start_round________/                             |
//!  |_________________________cooldown or new_round_______________________________|
//! ```
//!
//! Within one tick the completion check runs before any cash-out, so a cash-out can only
//! succeed while the displayed multiplier is strictly below the outcome.

use crate::{
    autoplay::AutoPlay,
    clock::{ClockStep, RoundClock},
    ledger::Ledger,
    sampler::{self, UniformSource},
    scheduler::{Scheduler, Timer, TimerId, VirtualScheduler},
};
use crashsim_types::{
    payout_for, AutoPlayConfig, Bet, CashoutRecord, EngineConfig, EngineError, EngineEvent,
    HaltReason, OutcomeDraw, RoundResult, RoundState, Snapshot, BASE_MULTIPLIER,
    EVENT_BUFFER_CAPACITY, MIN_STAKE,
};
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info, warn};

/// Single-player crash round engine.
pub struct Engine<S: Scheduler, R: UniformSource> {
    config: EngineConfig,
    scheduler: S,
    rng: R,

    state: RoundState,
    round: u64,
    stake: u64,
    bet: Option<Bet>,
    cashout: Option<CashoutRecord>,
    outcome: Option<OutcomeDraw>,
    clock: Option<RoundClock>,
    current_multiplier: f64,
    last_result: Option<RoundResult>,
    // Auto-cashout policy of the round in flight. Disabling auto-play leaves it in place.
    round_auto: AutoPlayConfig,

    // Live timers. At most one clock and one delayed transition exist at a time.
    tick: Option<TimerId>,
    delay: Option<(TimerId, Timer)>,

    ledger: Ledger,
    auto_play: AutoPlay,
    events: VecDeque<EngineEvent>,

    #[cfg(any(test, feature = "mocks"))]
    forced: VecDeque<OutcomeDraw>,
}

impl<S: Scheduler, R: UniformSource> Engine<S, R> {
    pub fn new(config: EngineConfig, scheduler: S, rng: R) -> Self {
        Self {
            config,
            scheduler,
            rng,
            state: RoundState::Idle,
            round: 0,
            stake: config.default_stake.max(MIN_STAKE),
            bet: None,
            cashout: None,
            outcome: None,
            clock: None,
            current_multiplier: BASE_MULTIPLIER,
            last_result: None,
            round_auto: AutoPlayConfig::default(),
            tick: None,
            delay: None,
            ledger: Ledger::new(config.starting_balance),
            auto_play: AutoPlay::default(),
            events: VecDeque::new(),
            #[cfg(any(test, feature = "mocks"))]
            forced: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Rounds started so far, spectated rounds included.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn bet(&self) -> Option<Bet> {
        self.bet
    }

    pub fn current_multiplier(&self) -> f64 {
        self.current_multiplier
    }

    pub fn last_result(&self) -> Option<RoundResult> {
        self.last_result
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn auto_play(&self) -> &AutoPlay {
        &self.auto_play
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Drain pending notifications, oldest first.
    ///
    /// At most [`EVENT_BUFFER_CAPACITY`] are kept between drains. Once full, the oldest
    /// `Tick` is dropped to make room.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Notifications waiting for [`Engine::take_events`].
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Change the stake used by [`Engine::place_bet_and_start`] and auto-play.
    ///
    /// Only allowed while `Idle`. Amounts below one unit are raised to one unit.
    pub fn set_stake(&mut self, stake: u64) -> Result<u64, EngineError> {
        if self.state != RoundState::Idle {
            return Err(EngineError::BetNotAccepted { state: self.state });
        }
        self.stake = stake.max(MIN_STAKE);
        debug!(stake = self.stake, "stake updated");
        Ok(self.stake)
    }

    /// Reserve `stake` for the next round. Nothing is deducted until the round starts.
    pub fn place_bet(&mut self, stake: u64) -> Result<(), EngineError> {
        if self.state != RoundState::Idle {
            return Err(EngineError::BetNotAccepted { state: self.state });
        }
        self.ledger.can_cover(stake)?;
        self.stake = stake;
        self.bet = Some(Bet::new(stake));
        self.state = RoundState::BetPlaced;
        info!(stake, balance = self.ledger.balance(), "bet placed");
        Ok(())
    }

    /// Place a bet at the configured stake and start the round shortly after.
    pub fn place_bet_and_start(&mut self) -> Result<(), EngineError> {
        self.place_bet(self.stake)?;
        self.schedule_delay(self.config.deferred_start(), Timer::DeferredStart);
        Ok(())
    }

    /// Start a round.
    ///
    /// From `BetPlaced` the stake is deducted and the round is wagered. From `Idle` the round
    /// runs without touching the ledger. Any other state is a no-op.
    pub fn start_round(&mut self) {
        let wagered = match self.state {
            RoundState::BetPlaced => true,
            RoundState::Idle => false,
            state => {
                debug!(%state, "start ignored");
                return;
            }
        };
        self.cancel_delay();

        let mut stake = 0;
        if wagered {
            let Some(bet) = self.bet.as_mut() else {
                warn!("bet placed state without a bet");
                self.enter_idle(true);
                return;
            };
            if let Err(err) = self.ledger.record_wager(bet.stake) {
                warn!(?err, "bet withdrawn at round start");
                self.enter_idle(true);
                return;
            }
            bet.placed_for_round = true;
            stake = bet.stake;
        }

        self.round += 1;
        let outcome = self.next_outcome();
        self.outcome = Some(outcome);
        self.cashout = None;
        self.current_multiplier = BASE_MULTIPLIER;
        self.round_auto = self.auto_play.config();
        self.clock = Some(RoundClock::new(outcome, self.config.step_hundredths));
        self.state = RoundState::Running;
        self.tick = Some(
            self.scheduler
                .repeat(self.config.tick_interval(), Timer::Tick),
        );
        self.emit(EngineEvent::RoundStarted {
            round: self.round,
            stake,
            wagered,
        });
        info!(round = self.round, stake, wagered, "round started");
    }

    /// Lock in the current multiplier.
    ///
    /// Valid only while running with an uncashed bet and a multiplier below the outcome.
    pub fn cashout(&mut self) -> Result<CashoutRecord, EngineError> {
        let not_cashable = EngineError::NotCashable { state: self.state };
        if !self.is_cashable() {
            return Err(not_cashable);
        }
        let (Some(bet), Some(outcome)) = (self.bet, self.outcome) else {
            return Err(not_cashable);
        };

        let multiplier = self.current_multiplier;
        let payout = payout_for(bet.stake, multiplier).ok_or(not_cashable)?;
        let record = CashoutRecord { multiplier, payout };
        self.cashout = Some(record);
        let result = self
            .ledger
            .record_cashout(self.round, outcome, bet.stake, record);
        self.last_result = Some(result);
        self.emit(EngineEvent::CashedOut(record));
        info!(
            round = self.round,
            multiplier,
            payout,
            balance = self.ledger.balance(),
            "cashed out"
        );
        Ok(record)
    }

    /// Leave the current round.
    ///
    /// From `Resolved` this skips the cooldown. From `Running` the round is aborted: the clock
    /// stops, an uncashed stake is forfeited and auto-play is switched off. From `BetPlaced`
    /// the bet is withdrawn and auto-play, if on, restarts after the usual delay. From `Idle`
    /// nothing happens.
    pub fn new_round(&mut self) {
        match self.state {
            RoundState::Resolved => self.enter_idle(true),
            RoundState::Running => self.abort(HaltReason::RoundAborted),
            RoundState::BetPlaced => {
                info!(stake = self.stake, "bet withdrawn");
                self.enter_idle(true);
            }
            RoundState::Idle => debug!("new round ignored while idle"),
        }
    }

    /// Update auto-play settings.
    ///
    /// Never interrupts a round in flight. Enabling (or changing the threshold) mid-round
    /// applies from the next tick, while disabling only stops the next round from being
    /// chained. Enabled on an idle engine with nothing pending, it kicks off a round; disabled,
    /// it cancels a pending restart.
    pub fn set_auto_play(&mut self, enabled: bool, threshold: f64) {
        self.auto_play.set(enabled, threshold);
        info!(
            enabled,
            threshold = self.auto_play.threshold(),
            "auto-play updated"
        );
        match self.state {
            RoundState::Idle => {}
            RoundState::Running if enabled => {
                self.round_auto = self.auto_play.config();
                return;
            }
            _ => return,
        }
        if enabled && self.delay.is_none() {
            self.schedule_delay(self.config.auto_play_kickoff(), Timer::AutoRestart);
        } else if !enabled && matches!(self.delay, Some((_, Timer::AutoRestart))) {
            self.cancel_delay();
        }
    }

    /// Cancel every timer and switch auto-play off. A running round is aborted.
    pub fn shutdown(&mut self) {
        if self.auto_play.halt(HaltReason::Shutdown) {
            self.emit(EngineEvent::AutoPlayHalted(HaltReason::Shutdown));
        }
        match self.state {
            RoundState::Running => self.abort(HaltReason::Shutdown),
            RoundState::Idle => {
                self.cancel_delay();
                self.stop_clock();
            }
            RoundState::BetPlaced | RoundState::Resolved => self.enter_idle(false),
        }
        info!(round = self.round, "engine shut down");
    }

    /// Deliver a timer. Returns false for ids the engine no longer tracks.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.tick == Some(id) {
            self.on_tick();
            return true;
        }
        match self.delay {
            Some((live, timer)) if live == id => {
                self.delay = None;
                match timer {
                    Timer::DeferredStart => {
                        if self.state == RoundState::BetPlaced {
                            self.start_round();
                        }
                    }
                    Timer::Cooldown => {
                        if self.state == RoundState::Resolved {
                            self.enter_idle(true);
                        }
                    }
                    Timer::AutoRestart => self.on_auto_restart(),
                    Timer::Tick => warn!(id = id.0, "tick delivered as delay"),
                }
                true
            }
            _ => {
                debug!(id = id.0, "ignoring stale timer");
                false
            }
        }
    }

    /// Read-only view for a presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        let potential_payout = match self.bet {
            Some(bet) if self.is_cashable() => payout_for(bet.stake, self.current_multiplier),
            _ => None,
        };
        Snapshot {
            balance: self.ledger.balance(),
            round_state: self.state,
            current_multiplier: self.current_multiplier,
            stake: self.stake,
            bet: self.bet,
            cashout: self.cashout,
            outcome: match self.state {
                RoundState::Resolved => self.outcome,
                _ => None,
            },
            potential_payout,
            auto_play: self.auto_play.config(),
            ledger: *self.ledger.totals(),
            history: self.ledger.history().to_vec(),
        }
    }

    /// True when [`Engine::cashout`] would succeed right now.
    pub fn is_cashable(&self) -> bool {
        let (Some(bet), Some(outcome)) = (self.bet, self.outcome) else {
            return false;
        };
        self.state == RoundState::Running
            && bet.placed_for_round
            && self.cashout.is_none()
            && self.current_multiplier < outcome.value()
    }

    /// Queue an outcome to use instead of sampling for the next round.
    #[cfg(any(test, feature = "mocks"))]
    pub fn force_outcome(&mut self, outcome: OutcomeDraw) {
        self.forced.push_back(outcome);
    }

    #[cfg(any(test, feature = "mocks"))]
    fn forced_outcome(&mut self) -> Option<OutcomeDraw> {
        self.forced.pop_front()
    }

    #[cfg(not(any(test, feature = "mocks")))]
    fn forced_outcome(&mut self) -> Option<OutcomeDraw> {
        None
    }

    fn next_outcome(&mut self) -> OutcomeDraw {
        match self.forced_outcome() {
            Some(outcome) => outcome,
            None => sampler::draw(&mut self.rng),
        }
    }

    fn on_tick(&mut self) {
        let Some(clock) = self.clock.as_mut() else {
            warn!("tick without a clock");
            self.stop_clock();
            return;
        };
        let step = clock.advance();
        self.current_multiplier = step.multiplier();
        self.emit(EngineEvent::Tick {
            multiplier: self.current_multiplier,
        });

        match step {
            ClockStep::Reached(_) => self.resolve(),
            ClockStep::Advanced(multiplier) => {
                if self.round_auto.should_cash_out(multiplier) && self.is_cashable() {
                    if let Err(err) = self.cashout() {
                        warn!(?err, "auto cash-out rejected");
                    }
                }
            }
        }
    }

    fn resolve(&mut self) {
        self.stop_clock();
        let Some(outcome) = self.outcome else {
            warn!("resolve without an outcome");
            self.enter_idle(false);
            return;
        };
        self.current_multiplier = outcome.value();
        self.state = RoundState::Resolved;
        let result = self.settle(outcome);
        self.emit(EngineEvent::Resolved {
            round: self.round,
            outcome,
            result,
        });
        info!(
            round = self.round,
            %outcome,
            cashed_out = self.cashout.is_some(),
            balance = self.ledger.balance(),
            "round resolved"
        );
        self.schedule_delay(self.config.cooldown(), Timer::Cooldown);
    }

    /// Result for the wagered round now ending, recording a loss if it was never cashed out.
    fn settle(&mut self, outcome: OutcomeDraw) -> Option<RoundResult> {
        let bet = self.bet.filter(|bet| bet.placed_for_round)?;
        if self.cashout.is_some() {
            return self.last_result;
        }
        let result = self.ledger.record_loss(self.round, outcome, bet.stake);
        self.last_result = Some(result);
        Some(result)
    }

    fn abort(&mut self, reason: HaltReason) {
        self.stop_clock();
        self.cancel_delay();
        let result = match self.outcome {
            Some(outcome) => self.settle(outcome),
            None => None,
        };
        self.emit(EngineEvent::Aborted {
            round: self.round,
            result,
        });
        warn!(round = self.round, ?reason, "round aborted");
        if self.auto_play.halt(reason) {
            self.emit(EngineEvent::AutoPlayHalted(reason));
        }
        self.enter_idle(false);
    }

    fn on_auto_restart(&mut self) {
        if !self.auto_play.is_enabled() {
            debug!("auto-play restart after disable");
            return;
        }
        match self.state {
            RoundState::Idle => match self.place_bet(self.stake) {
                Ok(()) => {
                    self.auto_play.record_start();
                    self.start_round();
                }
                Err(EngineError::InsufficientBalance { stake, balance }) => {
                    let reason = HaltReason::InsufficientBalance { stake, balance };
                    if self.auto_play.halt(reason) {
                        self.emit(EngineEvent::AutoPlayHalted(reason));
                    }
                    warn!(stake, balance, "auto-play halted");
                }
                Err(err) => warn!(?err, "auto-play bet rejected"),
            },
            RoundState::BetPlaced => {
                self.auto_play.record_start();
                self.start_round();
            }
            state => debug!(%state, "auto-play restart ignored"),
        }
    }

    /// Return to `Idle`, chaining the next auto-play round when `chain` is set.
    fn enter_idle(&mut self, chain: bool) {
        self.stop_clock();
        self.cancel_delay();
        self.state = RoundState::Idle;
        self.bet = None;
        self.cashout = None;
        self.outcome = None;
        self.current_multiplier = BASE_MULTIPLIER;
        self.round_auto = AutoPlayConfig::default();
        self.emit(EngineEvent::Idle);
        if chain && self.auto_play.is_enabled() {
            self.schedule_delay(self.config.auto_restart_delay(), Timer::AutoRestart);
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        if self.events.len() >= EVENT_BUFFER_CAPACITY {
            let oldest_tick = self
                .events
                .iter()
                .position(|event| matches!(event, EngineEvent::Tick { .. }));
            match oldest_tick {
                Some(index) => {
                    self.events.remove(index);
                }
                None => {
                    self.events.pop_front();
                }
            }
        }
        self.events.push_back(event);
    }

    fn schedule_delay(&mut self, delay: Duration, timer: Timer) {
        self.cancel_delay();
        let id = self.scheduler.after(delay, timer);
        self.delay = Some((id, timer));
    }

    fn cancel_delay(&mut self) {
        if let Some((id, _)) = self.delay.take() {
            self.scheduler.cancel(id);
        }
    }

    fn stop_clock(&mut self) {
        if let Some(id) = self.tick.take() {
            self.scheduler.cancel(id);
        }
        self.clock = None;
    }
}

impl<R: UniformSource> Engine<VirtualScheduler, R> {
    /// Move simulated time forward by `by`, firing every timer that falls due.
    ///
    /// Returns the number of deliveries.
    pub fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.now() + by;
        let mut fired = 0;
        while let Some((id, _)) = self.scheduler.pop_due(deadline) {
            self.fire(id);
            fired += 1;
        }
        self.scheduler.set_now(deadline);
        fired
    }

    /// Fire timers in due order until `done` holds.
    ///
    /// Returns false if the scheduler runs dry first.
    pub fn run_until(&mut self, mut done: impl FnMut(&Self) -> bool) -> bool {
        loop {
            if done(self) {
                return true;
            }
            let Some(due) = self.scheduler.next_due() else {
                return false;
            };
            let Some((id, _)) = self.scheduler.pop_due(due) else {
                return false;
            };
            self.fire(id);
        }
    }

    /// Run until the current round (if any) reaches its outcome.
    pub fn run_round(&mut self) -> bool {
        self.run_until(|engine| engine.state() != RoundState::Running)
    }
}
