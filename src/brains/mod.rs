//! Built-in decision capabilities
//!
//! Evolved controllers come from the optimizer; these are the fixed and
//! seeded policies the binaries, the benchmark and the tests fly with.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::sim::decision::{DecisionCapability, DecisionError, Sensors};
use crate::sim::epoch::Population;

/// Never jumps
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverJump;

impl DecisionCapability for NeverJump {
    fn decide(&mut self, _sensors: &Sensors) -> Result<f64, DecisionError> {
        Ok(0.0)
    }
}

/// Jumps on its first decision and every `period` decisions after that
#[derive(Debug, Clone)]
pub struct JumpEvery {
    period: u32,
    counter: u32,
}

impl JumpEvery {
    pub fn new(period: u32) -> Self {
        Self::with_phase(period, 0)
    }

    /// Start `phase` decisions into the cycle
    pub fn with_phase(period: u32, phase: u32) -> Self {
        let period = period.max(1);
        Self {
            period,
            counter: phase % period,
        }
    }
}

impl DecisionCapability for JumpEvery {
    fn decide(&mut self, _sensors: &Sensors) -> Result<f64, DecisionError> {
        let jump = self.counter == 0;
        self.counter = (self.counter + 1) % self.period;
        Ok(if jump { 1.0 } else { 0.0 })
    }
}

/// Single tanh unit over the three sensors
///
/// This is the minimal feed-forward topology an evolved network starts
/// from: three inputs wired straight to one output, no hidden nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perceptron {
    pub weights: [f64; 3],
    #[serde(default)]
    pub bias: f64,
}

impl Perceptron {
    pub fn new(weights: [f64; 3], bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Weights and bias drawn uniformly from [-1, 1]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            weights: [
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ],
            bias: rng.gen_range(-1.0..=1.0),
        }
    }

    pub fn activate(&self, inputs: [f64; 3]) -> f64 {
        let sum: f64 = self
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum();
        (sum + self.bias).tanh()
    }
}

impl DecisionCapability for Perceptron {
    fn decide(&mut self, sensors: &Sensors) -> Result<f64, DecisionError> {
        Ok(self.activate(sensors.as_array()))
    }
}

/// Hand-written policy: flap whenever the agent sinks into the lower half
/// of the gap, with a short cooldown so one flap can play out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapFollower {
    /// How far below the gap's midpoint the agent may sink before flapping
    pub margin: f64,
    /// Decisions to wait after a flap
    pub cooldown: u32,
    #[serde(skip)]
    since_jump: u32,
}

impl GapFollower {
    pub fn new(margin: f64, cooldown: u32) -> Self {
        Self {
            margin,
            cooldown,
            since_jump: cooldown,
        }
    }
}

impl Default for GapFollower {
    fn default() -> Self {
        Self::new(0.0, 3)
    }
}

impl DecisionCapability for GapFollower {
    fn decide(&mut self, sensors: &Sensors) -> Result<f64, DecisionError> {
        // No obstacle ahead reads as zero distances; hold level instead of
        // flapping into the ceiling.
        if sensors.to_gap_upper == 0.0 && sensors.to_gap_lower == 0.0 {
            self.since_jump = self.since_jump.saturating_add(1);
            return Ok(0.0);
        }

        // Absolute distances: below the midpoint the upper edge is the
        // farther one, by twice the depth below the midpoint.
        let depth = (sensors.to_gap_upper - sensors.to_gap_lower) / 2.0;
        if depth > self.margin && self.since_jump >= self.cooldown {
            self.since_jump = 0;
            Ok(1.0)
        } else {
            self.since_jump = self.since_jump.saturating_add(1);
            Ok(0.0)
        }
    }
}

/// Policy selector for the binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Never,
    Periodic,
    Perceptron,
    Gap,
}

impl Policy {
    /// Build the controller for agent number `index`
    ///
    /// Periodic agents are staggered across the cycle and perceptrons draw
    /// their weights from `rng`, so a population is not a row of clones.
    pub fn build<R: Rng>(&self, index: usize, rng: &mut R) -> Box<dyn DecisionCapability> {
        match self {
            Policy::Never => Box::new(NeverJump),
            Policy::Periodic => Box::new(JumpEvery::with_phase(10, index as u32)),
            Policy::Perceptron => Box::new(Perceptron::random(rng)),
            Policy::Gap => Box::new(GapFollower::default()),
        }
    }

    /// `size` controllers seeded from `seed`
    ///
    /// Uses its own RNG stream so drawing weights never shifts the obstacle
    /// sequence of an epoch run with the same seed.
    pub fn build_population(&self, size: usize, seed: u64) -> Vec<Box<dyn DecisionCapability>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        (0..size).map(|i| self.build(i, &mut rng)).collect()
    }
}

/// Borrow boxed controllers as a population keyed by index
pub fn indexed_population(brains: &mut [Box<dyn DecisionCapability>]) -> Population<'_, usize> {
    let mut population: Population<'_, usize> = Vec::with_capacity(brains.len());
    for (i, brain) in brains.iter_mut().enumerate() {
        population.push((i, brain.as_mut()));
    }
    population
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::Never => "never",
            Policy::Periodic => "periodic",
            Policy::Perceptron => "perceptron",
            Policy::Gap => "gap",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "never" => Ok(Policy::Never),
            "periodic" => Ok(Policy::Periodic),
            "perceptron" => Ok(Policy::Perceptron),
            "gap" => Ok(Policy::Gap),
            other => Err(format!(
                "unknown policy '{}' (expected never, periodic, perceptron or gap)",
                other
            )),
        }
    }
}
