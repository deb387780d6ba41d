/// Micro-units per whole unit of play money.
pub const UNIT: u64 = 1_000_000;

/// Starting balance for a fresh engine (1,000 units)
pub const STARTING_BALANCE: u64 = 1_000 * UNIT;

/// Stake used when none has been configured (10 units)
pub const DEFAULT_STAKE: u64 = 10 * UNIT;

/// Smallest stake the stake setter accepts (1 unit)
pub const MIN_STAKE: u64 = UNIT;

/// Number of settled rounds kept in the history ring
pub const HISTORY_CAPACITY: usize = 10;

/// Engine notifications buffered between drains
pub const EVENT_BUFFER_CAPACITY: usize = 1_024;

/// Multiplier every round starts from
pub const BASE_MULTIPLIER: f64 = 1.0;

/// Upper bound (exclusive) of any sampled outcome
pub const MAX_MULTIPLIER: f64 = 100.0;

/// Clock multipliers are tracked in hundredths (1.00x = 100).
pub const MULTIPLIER_HUNDREDTHS: u64 = 100;

/// Default clock step in hundredths per tick (0.01x)
pub const DEFAULT_STEP_HUNDREDTHS: u64 = 1;

/// Fixed-point scale for payout math (6 decimal places of multiplier precision)
pub const MULTIPLIER_SCALE: u64 = 1_000_000;

/// Milliseconds between clock ticks
pub const TICK_INTERVAL_MS: u64 = 50;

/// Pause between a resolved round and the return to idle
pub const COOLDOWN_MS: u64 = 2_000;

/// Delay before auto-play places its next bet after returning to idle
pub const AUTO_RESTART_DELAY_MS: u64 = 1_000;

/// Delay before the first auto-play round when auto-play is switched on while idle
pub const AUTO_PLAY_KICKOFF_MS: u64 = 500;

/// Delay between "place bet" and "start round" for the combined action
pub const DEFERRED_START_MS: u64 = 100;

/// Auto-cashout threshold used when none has been configured
pub const DEFAULT_AUTO_CASHOUT: f64 = 2.0;

/// Lowest auto-cashout threshold accepted; lower values are raised to this
pub const MIN_AUTO_CASHOUT: f64 = 1.01;
