pub mod config;
pub mod error;
pub mod types;

pub use config::{
    load_config, CollisionWindow, ObstacleConfig, PhysicsConfig, ScoringConfig, SimulationConfig,
    WorldConfig,
};
pub use error::{Result, SimError};
pub use types::{ObstacleId, Rect, Tick, Vec2};
