//! Vertical motion model
//!
//! Agents never move horizontally; the world scrolls past them. Each tick the
//! vertical displacement is recomputed from scratch out of the velocity set
//! by the last jump and the ticks elapsed since.

use serde::{Deserialize, Serialize};

use crate::core::config::PhysicsConfig;

/// Kinematic state of one agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Horizontal position, fixed for the whole epoch
    pub x: f64,
    /// Vertical position (grows downward)
    pub y: f64,
    /// Velocity set by the last jump
    pub velocity: f64,
    /// Ticks since the last jump
    pub ticks_since_jump: u64,
    /// Cosmetic tilt in degrees
    pub rotation: f64,
}

/// Result of advancing the motion model by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub y: f64,
    pub rotation: f64,
    pub displacement: f64,
}

impl Kinematics {
    pub fn at_rest(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            ticks_since_jump: 0,
            rotation: 0.0,
        }
    }

    /// Apply the jump impulse and restart the arc
    pub fn jump(&mut self, physics: &PhysicsConfig) {
        self.velocity = physics.jump_impulse;
        self.ticks_since_jump = 0;
    }

    /// Advance one tick, returning the displacement applied
    pub fn step(&mut self, physics: &PhysicsConfig) -> f64 {
        self.ticks_since_jump += 1;
        let step = advance(self, self.ticks_since_jump, physics);
        self.y = step.y;
        self.rotation = step.rotation;
        step.displacement
    }
}

/// Per-tick vertical displacement for `ticks` since a jump with velocity `v0`
///
/// The cubic term is clamped to the terminal velocity; rising ticks then get
/// the extra rise bias, so the result lies in
/// `[-(terminal_velocity + rise_bias), terminal_velocity]`.
pub fn displacement(v0: f64, ticks: u64, physics: &PhysicsConfig) -> f64 {
    let t = ticks as f64;
    let raw = v0 * t + 0.5 * physics.gravity_coefficient * t * t * t;
    let raw = if raw.is_nan() { 0.0 } else { raw };

    let d = raw.clamp(-physics.terminal_velocity, physics.terminal_velocity);
    if d < 0.0 {
        d - physics.rise_bias
    } else {
        d
    }
}

/// Compute the next position and rotation without mutating the agent
pub fn advance(kinematics: &Kinematics, ticks_since_jump: u64, physics: &PhysicsConfig) -> MotionStep {
    let d = displacement(kinematics.velocity, ticks_since_jump, physics);

    let rotation = if d < 0.0 {
        physics.nose_up_angle
    } else {
        (kinematics.rotation - physics.rotation_step).max(physics.nose_down_limit)
    };

    MotionStep {
        y: kinematics.y + d,
        rotation,
        displacement: d,
    }
}
