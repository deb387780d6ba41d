//! Outcome sampler.
//!
//! Maps uniform draws to a round's target multiplier through a fixed six-zone table. The
//! first draw picks the zone; the second picks a point inside the zone's output range:
//!
//! | zone | draw range  | output range     | probability |
//! |------|-------------|------------------|-------------|
//! | 1    | [0, .33)    | [1.00, 1.50)     | 33%         |
//! | 2    | [.33, .60)  | [1.50, 2.50)     | 27%         |
//! | 3    | [.60, .80)  | [2.50, 5.00)     | 20%         |
//! | 4    | [.80, .92)  | [5.00, 10.00)    | 12%         |
//! | 5    | [.92, .97)  | [10.00, 20.00)   | 5%          |
//! | 6    | [.97, 1.0)  | [20.00, 100.00)  | 3%          |
//!
//! Zones are checked in ascending order with `u < boundary`, so a draw equal to a boundary
//! belongs to the zone above it.

use crashsim_types::{OutcomeDraw, MAX_MULTIPLIER};
use rand::Rng;

/// Source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Next draw in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

impl<T: UniformSource + ?Sized> UniformSource for Box<T> {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Adapter exposing any [`rand::Rng`] as a [`UniformSource`].
#[derive(Clone, Debug)]
pub struct RandSource<R>(pub R);

impl<R: Rng> UniformSource for RandSource<R> {
    fn next_uniform(&mut self) -> f64 {
        // The `Standard` f64 distribution is half-open: [0, 1).
        self.0.gen::<f64>()
    }
}

/// One band of the outcome distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone {
    /// Exclusive upper bound of the zone-selection draw.
    pub boundary: f64,
    pub probability: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Zone {
    const fn new(boundary: f64, probability: f64, lower: f64, upper: f64) -> Self {
        Self {
            boundary,
            probability,
            lower,
            upper,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn contains(&self, multiplier: f64) -> bool {
        multiplier >= self.lower && multiplier < self.upper
    }

    /// Probability that an outcome from this zone lies strictly above `multiplier`.
    fn survival(&self, multiplier: f64) -> f64 {
        if multiplier < self.lower {
            1.0
        } else if multiplier >= self.upper {
            0.0
        } else {
            (self.upper - multiplier) / (self.upper - self.lower)
        }
    }
}

/// The fixed outcome table, in ascending order.
pub const ZONES: [Zone; 6] = [
    Zone::new(0.33, 0.33, 1.00, 1.50),
    Zone::new(0.60, 0.27, 1.50, 2.50),
    Zone::new(0.80, 0.20, 2.50, 5.00),
    Zone::new(0.92, 0.12, 5.00, 10.00),
    Zone::new(0.97, 0.05, 10.00, 20.00),
    Zone::new(1.00, 0.03, 20.00, MAX_MULTIPLIER),
];

/// Clamp a draw into `[0, 1)`; NaN maps to 0.
fn clamp_unit(u: f64) -> f64 {
    if u.is_nan() {
        0.0
    } else {
        u.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Index (0-based) of the zone selected by `u`.
pub fn zone_index(u: f64) -> usize {
    let u = clamp_unit(u);
    ZONES
        .iter()
        .position(|zone| u < zone.boundary)
        .unwrap_or(ZONES.len() - 1)
}

/// Map a zone draw `u` and a position draw `u2` to an outcome.
pub fn sample(u: f64, u2: f64) -> OutcomeDraw {
    let zone = &ZONES[zone_index(u)];
    let u2 = clamp_unit(u2);
    let value = zone.lower + u2 * (zone.upper - zone.lower);
    // Rounding in the interpolation can land exactly on the zone's upper bound.
    let value = value.min(zone.upper - f64::EPSILON * zone.upper);
    OutcomeDraw::new(value.max(zone.lower)).unwrap_or(OutcomeDraw::BASE)
}

/// Take exactly two draws from `source` (zone first, then position) and sample an outcome.
pub fn draw(source: &mut impl UniformSource) -> OutcomeDraw {
    let u = source.next_uniform();
    let u2 = source.next_uniform();
    sample(u, u2)
}

/// Analytic mean of the outcome distribution: `Σ p · midpoint`.
pub fn expected_value() -> f64 {
    ZONES.iter().map(|zone| zone.probability * zone.midpoint()).sum()
}

/// Probability that the outcome lies strictly above `multiplier`.
///
/// This is the chance that the clock shows `multiplier` while the round is still running.
pub fn survival_probability(multiplier: f64) -> f64 {
    ZONES
        .iter()
        .map(|zone| zone.probability * zone.survival(multiplier))
        .sum()
}

/// Expected payout per unit staked for a player who always cashes out at `threshold`.
///
/// The house edge of that strategy is `1 - expected_return(threshold)`.
pub fn expected_return(threshold: f64) -> f64 {
    threshold * survival_probability(threshold)
}
