//! Decision capability interface
//!
//! The simulation never looks inside an agent's controller. It hands over a
//! sensor triple and reads back one scalar; anything above the jump
//! threshold means "jump".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What an agent perceives each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensors {
    /// Agent's vertical position
    pub y: f64,
    /// `|y - gap_upper|` of the current obstacle
    pub to_gap_upper: f64,
    /// `|y - gap_lower|` of the current obstacle
    pub to_gap_lower: f64,
}

impl Sensors {
    pub fn as_array(&self) -> [f64; 3] {
        [self.y, self.to_gap_upper, self.to_gap_lower]
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("decision failed: {0}")]
    Failed(String),

    #[error("decision returned non-finite output {0}")]
    NonFinite(f64),
}

/// Pluggable per-agent controller
pub trait DecisionCapability {
    fn decide(&mut self, sensors: &Sensors) -> Result<f64, DecisionError>;
}

impl<F> DecisionCapability for F
where
    F: FnMut(&Sensors) -> f64,
{
    fn decide(&mut self, sensors: &Sensors) -> Result<f64, DecisionError> {
        Ok(self(sensors))
    }
}

/// Query a capability and reject non-finite output
pub fn query(
    brain: &mut (dyn DecisionCapability + '_),
    sensors: &Sensors,
) -> Result<f64, DecisionError> {
    let output = brain.decide(sensors)?;
    if output.is_finite() {
        Ok(output)
    } else {
        Err(DecisionError::NonFinite(output))
    }
}
