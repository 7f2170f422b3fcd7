//! Gap-flight simulation
//!
//! Fixed-tick, single-threaded. The [`epoch::Epoch`] owns the world and every
//! agent for one generation; controllers are borrowed from the caller.

pub mod agent;
pub mod collision;
pub mod context;
pub mod decision;
pub mod epoch;
pub mod fitness;
pub mod motion;
pub mod obstacle;
pub mod pacing;
pub mod world;

pub use agent::{Agent, AgentResult};
pub use collision::Collision;
pub use context::{SimContext, StopSignal};
pub use decision::{DecisionCapability, DecisionError, Sensors};
pub use epoch::{
    evaluate, evaluate_in, Epoch, EpochPhase, EpochReport, Population, Termination, TickEvents,
};
pub use fitness::FitnessLedger;
pub use motion::Kinematics;
pub use obstacle::{Obstacle, ObstacleField};
pub use pacing::FramePacer;
pub use world::World;
