//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one tick is nominally 1/60s)
pub type Tick = u64;

/// Identifier of an obstacle, assigned in creation order
///
/// Ids only ever grow within an epoch, so comparing two ids tells which
/// obstacle was spawned first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

impl ObstacleId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// 2D position in world units (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Horizontal coordinate of the trailing (right) edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Vertical coordinate of the bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}
