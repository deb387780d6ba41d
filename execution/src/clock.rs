//! Multiplier clock.
//!
//! Counts ticks from 1.00x in integer hundredths so repeated steps never accumulate float
//! error. The tick that reaches or passes the target is pinned to the target exactly.

use crashsim_types::{OutcomeDraw, MULTIPLIER_HUNDREDTHS};

/// Result of advancing the clock by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockStep {
    /// Still below the target.
    Advanced(f64),
    /// The target was reached; carries the target value exactly.
    Reached(f64),
}

impl ClockStep {
    pub fn multiplier(self) -> f64 {
        match self {
            ClockStep::Advanced(m) | ClockStep::Reached(m) => m,
        }
    }
}

/// Clock for a single running round.
#[derive(Clone, Debug)]
pub struct RoundClock {
    target: OutcomeDraw,
    step_hundredths: u64,
    ticks: u64,
    done: bool,
}

impl RoundClock {
    pub fn new(target: OutcomeDraw, step_hundredths: u64) -> Self {
        Self {
            target,
            step_hundredths: step_hundredths.max(1),
            ticks: 0,
            done: false,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Multiplier currently shown (1.00x before the first tick).
    pub fn current(&self) -> f64 {
        if self.done {
            return self.target.value();
        }
        self.multiplier_at(self.ticks)
    }

    fn multiplier_at(&self, ticks: u64) -> f64 {
        let hundredths =
            MULTIPLIER_HUNDREDTHS.saturating_add(ticks.saturating_mul(self.step_hundredths));
        hundredths as f64 / MULTIPLIER_HUNDREDTHS as f64
    }

    /// Advance one tick. Once the target is reached every further call repeats it.
    pub fn advance(&mut self) -> ClockStep {
        if self.done {
            return ClockStep::Reached(self.target.value());
        }
        self.ticks += 1;
        let next = self.multiplier_at(self.ticks);
        if next >= self.target.value() {
            self.done = true;
            ClockStep::Reached(self.target.value())
        } else {
            ClockStep::Advanced(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(value: f64) -> OutcomeDraw {
        OutcomeDraw::new(value).expect("valid outcome")
    }

    #[test]
    fn test_ticks_in_hundredths() {
        let mut clock = RoundClock::new(target(1.05), 1);
        assert_eq!(clock.current(), 1.0);
        assert_eq!(clock.advance(), ClockStep::Advanced(1.01));
        assert_eq!(clock.advance(), ClockStep::Advanced(1.02));
        assert_eq!(clock.advance(), ClockStep::Advanced(1.03));
        assert_eq!(clock.advance(), ClockStep::Advanced(1.04));
        assert_eq!(clock.advance(), ClockStep::Reached(1.05));
        assert!(clock.is_done());
        assert_eq!(clock.ticks(), 5);
    }

    #[test]
    fn test_final_tick_pinned_to_target() {
        let mut clock = RoundClock::new(target(1.234_567), 1);
        let mut last = ClockStep::Advanced(1.0);
        while !clock.is_done() {
            last = clock.advance();
        }
        assert_eq!(last, ClockStep::Reached(1.234_567));
        assert_eq!(clock.ticks(), 24);
        assert_eq!(clock.current(), 1.234_567);
    }

    #[test]
    fn test_outcome_of_one_reaches_on_first_tick() {
        let mut clock = RoundClock::new(target(1.0), 1);
        assert_eq!(clock.advance(), ClockStep::Reached(1.0));
        assert_eq!(clock.advance(), ClockStep::Reached(1.0));
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn test_no_drift_over_long_rounds() {
        let mut clock = RoundClock::new(target(99.99), 1);
        for k in 1..=1_000u64 {
            let step = clock.advance();
            assert_eq!(step, ClockStep::Advanced((100 + k) as f64 / 100.0));
        }
    }

    #[test]
    fn test_larger_steps_overshoot_to_target() {
        let mut clock = RoundClock::new(target(1.5), 20);
        assert_eq!(clock.advance(), ClockStep::Advanced(1.2));
        assert_eq!(clock.advance(), ClockStep::Advanced(1.4));
        assert_eq!(clock.advance().multiplier(), 1.5);
    }
}
