//! Play-money arithmetic.
//!
//! Balances, stakes and payouts are integer micro-units ([`UNIT`] per whole unit) so that
//! ledger identities hold exactly. Multipliers stay `f64` and are converted to a fixed-point
//! scale only at the moment a payout is computed.

use super::{MULTIPLIER_SCALE, UNIT};

/// Convert whole units (as typed by a player) into micro-units.
///
/// Negative, NaN and infinite inputs map to zero.
pub fn units_to_micros(units: f64) -> u64 {
    if !units.is_finite() || units <= 0.0 {
        return 0;
    }
    let micros = (units * UNIT as f64).round();
    if micros >= u64::MAX as f64 {
        u64::MAX
    } else {
        micros as u64
    }
}

/// Convert micro-units into whole units for display.
pub fn micros_to_units(micros: u64) -> f64 {
    micros as f64 / UNIT as f64
}

/// Convert a signed micro-unit amount into whole units for display.
pub fn signed_micros_to_units(micros: i128) -> f64 {
    micros as f64 / UNIT as f64
}

/// Calculate `stake * multiplier` in micro-units.
///
/// The multiplier is rounded to [`MULTIPLIER_SCALE`] (six decimal places) and the product is
/// computed with `u128` intermediates, truncating toward zero. Returns `None` for a negative
/// or non-finite multiplier, or when the payout does not fit in a `u64`.
pub fn payout_for(stake: u64, multiplier: f64) -> Option<u64> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return None;
    }
    let multiplier_scaled = (multiplier * MULTIPLIER_SCALE as f64).round() as u128;
    let numerator = (stake as u128).checked_mul(multiplier_scaled)?;
    u64::try_from(numerator / MULTIPLIER_SCALE as u128).ok()
}

/// Net result of a round for the player: `payout - stake`, clamped to `i64`.
pub fn round_delta(payout: u64, stake: u64) -> i64 {
    let delta = payout as i128 - stake as i128;
    delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
