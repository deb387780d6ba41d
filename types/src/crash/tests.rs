use super::*;
use proptest::prelude::*;

fn outcome(value: f64) -> OutcomeDraw {
    OutcomeDraw::new(value).expect("valid outcome")
}

#[test]
fn test_outcome_draw_rejects_below_base() {
    assert!(OutcomeDraw::new(0.99).is_none());
    assert!(OutcomeDraw::new(f64::NAN).is_none());
    assert!(OutcomeDraw::new(f64::INFINITY).is_none());
    assert_eq!(OutcomeDraw::new(1.0).map(OutcomeDraw::value), Some(1.0));
    assert_eq!(outcome(3.456).to_string(), "3.46x");
}

#[test]
fn test_units_conversion() {
    assert_eq!(units_to_micros(10.0), 10 * UNIT);
    assert_eq!(units_to_micros(0.5), UNIT / 2);
    assert_eq!(units_to_micros(-3.0), 0);
    assert_eq!(units_to_micros(f64::NAN), 0);
    assert_eq!(micros_to_units(1_010 * UNIT), 1_010.0);
    assert_eq!(signed_micros_to_units(-10 * UNIT as i128), -10.0);
}

#[test]
fn test_payout_for_exact_hundredths() {
    assert_eq!(payout_for(10 * UNIT, 2.0), Some(20 * UNIT));
    assert_eq!(payout_for(10 * UNIT, 1.37), Some(13_700_000));
    assert_eq!(payout_for(10 * UNIT, 1.0), Some(10 * UNIT));
    // 1/3 unit at 1.5x truncates toward zero
    assert_eq!(payout_for(333_333, 1.5), Some(499_999));
}

#[test]
fn test_payout_for_rejects_invalid_multiplier() {
    assert_eq!(payout_for(UNIT, -1.0), None);
    assert_eq!(payout_for(UNIT, f64::NAN), None);
    assert_eq!(payout_for(UNIT, f64::INFINITY), None);
    assert_eq!(payout_for(u64::MAX, 100.0), None);
}

#[test]
fn test_round_result_deltas() {
    let cashout = CashoutRecord {
        multiplier: 2.0,
        payout: 20 * UNIT,
    };
    let win = RoundResult::win(1, outcome(3.0), 10 * UNIT, cashout);
    assert!(win.cashed_out);
    assert_eq!(win.delta, 10 * UNIT as i64);
    assert_eq!(win.display_multiplier(), 2.0);

    let loss = RoundResult::loss(2, outcome(1.2), 10 * UNIT);
    assert!(!loss.cashed_out);
    assert_eq!(loss.delta, -(10 * UNIT as i64));
    assert_eq!(loss.display_multiplier(), 1.2);
}

#[test]
fn test_history_evicts_oldest_and_keeps_recent_first() {
    let mut history = History::new();
    for round in 1..=HISTORY_CAPACITY as u64 {
        assert!(history.push(RoundResult::loss(round, outcome(1.1), UNIT)).is_none());
    }
    assert_eq!(history.len(), HISTORY_CAPACITY);

    let evicted = history.push(RoundResult::loss(11, outcome(1.1), UNIT));
    assert_eq!(evicted.map(|r| r.round), Some(1));
    assert_eq!(history.len(), HISTORY_CAPACITY);

    let rounds: Vec<u64> = history.iter().map(|r| r.round).collect();
    assert_eq!(rounds, (2..=11).rev().collect::<Vec<_>>());
    assert_eq!(history.latest().map(|r| r.round), Some(11));
}

#[test]
fn test_ledger_ratios_zero_guard() {
    let totals = LedgerTotals::default();
    assert_eq!(totals.balance, STARTING_BALANCE);
    assert_eq!(totals.roi(), 0.0);
    assert_eq!(totals.actual_house_edge(), 0.0);
    assert_eq!(totals.win_rate(), 0.0);
    assert!(totals.is_balanced());
}

#[test]
fn test_ledger_ratios() {
    let totals = LedgerTotals {
        balance: 1_010 * UNIT,
        total_trials: 2,
        total_wins: 1,
        total_wagered: 20 * UNIT,
        total_won: 15 * UNIT,
        house_profit: 5 * UNIT as i128,
    };
    assert!(totals.is_balanced());
    assert_eq!(totals.net_profit(), -(5 * UNIT as i128));
    assert!((totals.roi() + 0.25).abs() < 1e-12);
    assert!((totals.actual_house_edge_percent() - 25.0).abs() < 1e-9);
    assert!((totals.win_rate() - 0.5).abs() < 1e-12);
}

#[test]
fn test_auto_play_config_clamps_threshold() {
    assert_eq!(AutoPlayConfig::new(true, 0.5).cashout_threshold, MIN_AUTO_CASHOUT);
    assert_eq!(AutoPlayConfig::new(true, 3.0).cashout_threshold, 3.0);
    assert_eq!(
        AutoPlayConfig::new(true, f64::NAN).cashout_threshold,
        DEFAULT_AUTO_CASHOUT
    );

    let config = AutoPlayConfig::new(true, 2.0);
    assert!(!config.should_cash_out(1.99));
    assert!(config.should_cash_out(2.0));
    assert!(!AutoPlayConfig::new(false, 2.0).should_cash_out(5.0));
}

#[test]
fn test_engine_config_validation() {
    let valid = EngineConfig::default();
    assert!(valid.validate().is_ok());
    assert_eq!(valid.tick_interval().as_millis(), 50);
    assert_eq!(valid.cooldown().as_millis(), 2_000);

    let invalid_tick = EngineConfig {
        tick_interval_ms: 0,
        ..valid
    };
    assert!(invalid_tick.validate().is_err());

    let invalid_step = EngineConfig {
        step_hundredths: 0,
        ..valid
    };
    assert!(invalid_step.validate().is_err());

    let invalid_stake = EngineConfig {
        default_stake: MIN_STAKE - 1,
        ..valid
    };
    assert!(invalid_stake.validate().is_err());
}

#[test]
fn test_engine_config_partial_json_uses_defaults() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"tick_interval_ms": 10}"#).expect("parse config");
    assert_eq!(config.tick_interval_ms, 10);
    assert_eq!(config.cooldown_ms, COOLDOWN_MS);
    assert_eq!(config.starting_balance, STARTING_BALANCE);
}

#[test]
fn test_snapshot_serializes_history_as_list() {
    let mut history = History::new();
    history.push(RoundResult::loss(1, outcome(1.2), 10 * UNIT));
    let json = serde_json::to_value(&history).expect("serialize history");
    assert!(json.is_array());
    assert_eq!(json[0]["round"], 1);
    assert_eq!(json[0]["outcome"], 1.2);
}

#[test]
fn test_error_messages() {
    let err = EngineError::InsufficientBalance {
        stake: 20,
        balance: 10,
    };
    assert_eq!(err.to_string(), "insufficient balance (stake=20, balance=10)");
    let err = EngineError::NotCashable {
        state: RoundState::Resolved,
    };
    assert_eq!(err.to_string(), "nothing to cash out (state=resolved)");
}

proptest! {
    #[test]
    fn prop_payout_never_exceeds_scaled_stake(stake in 0u64..1_000_000_000_000, hundredths in 100u64..10_000) {
        let multiplier = hundredths as f64 / 100.0;
        let payout = payout_for(stake, multiplier).expect("in range");
        prop_assert!(payout >= stake);
        prop_assert!(payout as u128 <= stake as u128 * hundredths as u128 / 100 + 1);
    }

    #[test]
    fn prop_history_bounded(count in 0usize..40) {
        let mut history = History::new();
        for round in 0..count as u64 {
            history.push(RoundResult::loss(round, outcome(1.5), UNIT));
        }
        prop_assert_eq!(history.len(), count.min(HISTORY_CAPACITY));
        if count > 0 {
            prop_assert_eq!(history.latest().map(|r| r.round), Some(count as u64 - 1));
        }
    }
}
