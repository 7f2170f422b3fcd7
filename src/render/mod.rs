//! Presentation snapshot of an epoch
//!
//! Read-only view for whatever draws the run (a window, a trace file, a
//! test). This module never modifies simulation state.

use std::fmt::Debug;

use serde::Serialize;

use crate::core::types::Tick;
use crate::sim::epoch::Epoch;
use crate::sim::motion::Kinematics;

/// One agent as drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub x: f64,
    pub y: f64,
    /// Cosmetic tilt in degrees
    pub rotation: f64,
    pub alive: bool,
}

impl AgentView {
    fn from_pose(pose: &Kinematics, alive: bool) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
            rotation: pose.rotation,
            alive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleView {
    pub x: f64,
    pub gap_upper: f64,
    pub gap_lower: f64,
}

/// Everything a frame needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    /// In population order; eliminated agents stay at their final pose
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
    /// Ground strip offset
    pub base_scroll_x: f64,
}

impl WorldSnapshot {
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }
}

/// Collect a snapshot of the current tick
pub fn snapshot<K: Clone + Debug>(epoch: &Epoch<'_, '_, K>) -> WorldSnapshot {
    let mut agents: Vec<(usize, AgentView)> = epoch
        .retired()
        .iter()
        .map(|r| (r.slot, AgentView::from_pose(&r.last_pose, false)))
        .collect();
    agents.extend(
        epoch
            .live_slots()
            .map(|(slot, agent)| (slot, AgentView::from_pose(&agent.kinematics, agent.alive))),
    );
    agents.sort_by_key(|(slot, _)| *slot);

    let world = epoch.world();
    WorldSnapshot {
        tick: epoch.tick(),
        agents: agents.into_iter().map(|(_, view)| view).collect(),
        obstacles: world
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                x: o.x(),
                gap_upper: o.gap_upper(),
                gap_lower: o.gap_lower(),
            })
            .collect(),
        base_scroll_x: world.base_x(),
    }
}
