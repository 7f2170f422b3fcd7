//! Collision predicates
//!
//! Everything here is a pure read of current positions. The coordinator
//! decides what a hit means.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{ObstacleId, Rect};
use crate::sim::obstacle::Obstacle;

/// What ended an agent's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    Obstacle(ObstacleId),
    Ceiling,
    Floor,
}

/// First obstacle the agent overlaps, if any
///
/// The agent is tested by its trailing edge: when `x + width` lies inside
/// `[obstacle.x, obstacle.x + window]` the agent must be strictly inside
/// the gap, top below `gap_upper` and bottom above `gap_lower`.
pub fn obstacle_hit<'a>(
    agent: &Rect,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    window: f64,
) -> Option<ObstacleId> {
    let edge = agent.right();
    obstacles
        .into_iter()
        .filter(|o| edge >= o.x() && edge <= o.x() + window)
        .find(|o| agent.y <= o.gap_upper() || agent.bottom() >= o.gap_lower())
        .map(Obstacle::id)
}

pub fn collides_with_obstacles<'a>(
    agent: &Rect,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    window: f64,
) -> bool {
    obstacle_hit(agent, obstacles, window).is_some()
}

pub fn collides_with_ceiling(y: f64) -> bool {
    y <= 0.0
}

pub fn collides_with_floor(y: f64, floor_y: f64) -> bool {
    y >= floor_y
}

/// Run every predicate; obstacles are checked before the world bounds
pub fn detect<'a>(
    agent: &Rect,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
    config: &SimulationConfig,
) -> Option<Collision> {
    let window = config.obstacles.collision_window.width(&config.obstacles);
    if let Some(id) = obstacle_hit(agent, obstacles, window) {
        return Some(Collision::Obstacle(id));
    }
    if collides_with_ceiling(agent.y) {
        return Some(Collision::Ceiling);
    }
    if collides_with_floor(agent.y, config.world.floor_y) {
        return Some(Collision::Floor);
    }
    None
}
