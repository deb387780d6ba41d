use crate::{
    engine::Engine,
    sampler::{UniformSource, ZONES},
    scheduler::VirtualScheduler,
};
use crashsim_types::{EngineConfig, OutcomeDraw};

/// Scripted uniform source. Cycles through its values; an empty script yields zeros.
#[derive(Clone, Debug, Default)]
pub struct FixedUniform {
    values: Vec<f64>,
    consumed: usize,
}

impl FixedUniform {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            consumed: 0,
        }
    }

    /// Script the draws that make the sampler produce (approximately) each of `outcomes`.
    pub fn for_outcomes(outcomes: &[f64]) -> Self {
        Self::new(outcomes.iter().flat_map(|m| draws_for(*m)).collect())
    }

    /// Number of draws taken so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl UniformSource for FixedUniform {
    fn next_uniform(&mut self) -> f64 {
        let value = match self.values.len() {
            0 => 0.0,
            len => self.values[self.consumed % len],
        };
        self.consumed += 1;
        value
    }
}

/// Zone and position draws that map to `multiplier`.
pub fn draws_for(multiplier: f64) -> [f64; 2] {
    let index = ZONES
        .iter()
        .position(|zone| zone.contains(multiplier))
        .unwrap_or(0);
    let zone = &ZONES[index];
    let start = match index {
        0 => 0.0,
        _ => ZONES[index - 1].boundary,
    };
    let position = (multiplier - zone.lower) / (zone.upper - zone.lower);
    [start, position.clamp(0.0, 1.0)]
}

pub fn outcome(value: f64) -> OutcomeDraw {
    OutcomeDraw::new(value).expect("valid outcome")
}

pub type TestEngine = Engine<VirtualScheduler, FixedUniform>;

/// Engine on virtual time with default config and a zero-draw source.
pub fn test_engine() -> TestEngine {
    test_engine_with(EngineConfig::default())
}

pub fn test_engine_with(config: EngineConfig) -> TestEngine {
    Engine::new(config, VirtualScheduler::new(), FixedUniform::default())
}
