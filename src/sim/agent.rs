//! Agent record
//!
//! Everything the coordinator tracks per candidate lives in one struct:
//! kinematics, liveness, fitness ledger and the borrowed controller. Culling
//! moves whole records, so there are no parallel lists to keep in sync.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{Rect, Tick};
use crate::sim::collision::Collision;
use crate::sim::decision::DecisionCapability;
use crate::sim::fitness::FitnessLedger;
use crate::sim::motion::Kinematics;

pub struct Agent<'a, K> {
    pub key: K,
    pub kinematics: Kinematics,
    pub alive: bool,
    pub ledger: FitnessLedger,
    pub brain: &'a mut dyn DecisionCapability,
    pub decision_failures: u32,
    pub cause_of_death: Option<Collision>,
    pub died_at: Option<Tick>,
    size: (f64, f64),
}

impl<'a, K> Agent<'a, K> {
    pub fn new(key: K, brain: &'a mut dyn DecisionCapability, config: &SimulationConfig) -> Self {
        let start = config.world.start_position;
        Self {
            key,
            kinematics: Kinematics::at_rest(start.x, start.y),
            alive: true,
            ledger: FitnessLedger::new(),
            brain,
            decision_failures: 0,
            cause_of_death: None,
            died_at: None,
            size: (config.world.agent_width, config.world.agent_height),
        }
    }

    /// Current bounding box
    pub fn bounds(&self) -> Rect {
        Rect::new(self.kinematics.x, self.kinematics.y, self.size.0, self.size.1)
    }

    /// Mark dead and freeze fitness
    pub fn kill(&mut self, cause: Collision, tick: Tick) {
        self.alive = false;
        self.cause_of_death = Some(cause);
        self.died_at = Some(tick);
        self.ledger.finalize();
    }

    /// Copy out everything the caller keeps after the epoch
    pub fn into_result(self, config: &SimulationConfig) -> AgentResult<K> {
        AgentResult {
            fitness: self.ledger.fitness(&config.scoring),
            ticks_survived: self.ledger.survived_ticks(),
            obstacles_passed: self.ledger.passes(),
            cause_of_death: self.cause_of_death,
            died_at: self.died_at,
            decision_failures: self.decision_failures,
            key: self.key,
        }
    }
}

/// Final record of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult<K> {
    pub key: K,
    pub fitness: f64,
    pub ticks_survived: u64,
    pub obstacles_passed: u32,
    /// None if the agent was still alive when the epoch ended
    pub cause_of_death: Option<Collision>,
    pub died_at: Option<Tick>,
    pub decision_failures: u32,
}
