//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Defaults reproduce the tuned
//! arena: a 600x800 world, 180-unit gaps and a new pipe every 25 ticks.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Vec2;

/// World geometry and agent placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Visible world width (world units)
    pub width: f64,

    /// Visible world height (world units)
    pub height: f64,

    /// Vertical coordinate at which an agent touches the ground strip
    ///
    /// Derived from `height - ground_height + ground_overlap`; with the
    /// default 224-unit ground strip and 100-unit overlap this is 676.
    pub floor_y: f64,

    /// Where every agent starts the epoch. The x coordinate never changes.
    pub start_position: Vec2,

    /// Agent bounding box width
    pub agent_width: f64,

    /// Agent bounding box height
    pub agent_height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 800.0,
            floor_y: WorldConfig::floor_for(800.0, 224.0, 100.0),
            start_position: Vec2::new(300.0, 400.0),
            agent_width: 68.0,
            agent_height: 48.0,
        }
    }
}

impl WorldConfig {
    /// Floor line for a world of `height` with a ground strip of
    /// `ground_height` drawn `overlap` units below its natural position
    pub fn floor_for(height: f64, ground_height: f64, overlap: f64) -> f64 {
        height - ground_height + overlap
    }
}

/// Vertical motion model
///
/// Displacement per tick is `v0*t + 0.5*a*t^3`, with `t` counted in ticks
/// since the last jump. The cubic term makes the arc rise fast and then
/// fall fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration coefficient `a`
    pub gravity_coefficient: f64,

    /// Vertical velocity set by a jump (negative = upward)
    pub jump_impulse: f64,

    /// Bound on per-tick displacement magnitude
    pub terminal_velocity: f64,

    /// Extra upward displacement applied on every rising tick
    ///
    /// Applied after the terminal-velocity clamp, so the fastest possible
    /// rise is `terminal_velocity + rise_bias`.
    pub rise_bias: f64,

    /// Rotation (degrees) snapped to while rising
    pub nose_up_angle: f64,

    /// Lowest rotation (degrees) reached while falling
    pub nose_down_limit: f64,

    /// Rotation decay per falling tick (degrees)
    pub rotation_step: f64,

    /// Decision output strictly above this value triggers a jump
    pub jump_threshold: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_coefficient: 3.0,
            jump_impulse: -20.0,
            terminal_velocity: 30.0,
            rise_bias: 2.0,
            nose_up_angle: 25.0,
            nose_down_limit: -90.0,
            rotation_step: 20.0,
            jump_threshold: 0.5,
        }
    }
}

/// Horizontal extent used when testing an agent against an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionWindow {
    /// Window as wide as the vertical gap (180 by default). Wider than the
    /// drawn pipe, so agents are hit before reaching it and after leaving it.
    #[default]
    GapHeight,
    /// Window as wide as the obstacle itself
    ObstacleWidth,
}

impl CollisionWindow {
    pub fn width(&self, obstacles: &ObstacleConfig) -> f64 {
        match self {
            CollisionWindow::GapHeight => obstacles.gap_height,
            CollisionWindow::ObstacleWidth => obstacles.width,
        }
    }
}

/// Obstacle generation and scrolling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Vertical gap between the upper and lower pipe
    pub gap_height: f64,

    /// Obstacle width; an obstacle expires once `x + width < 0`
    pub width: f64,

    /// Horizontal distance every obstacle moves left per tick
    pub scroll_speed: f64,

    /// Horizontal position of a freshly spawned obstacle
    pub spawn_x: f64,

    /// Ticks between two spawns
    ///
    /// At the default scroll speed an obstacle crosses the 804 units from
    /// spawn to expiry in ~41 ticks, so at most two are active at once.
    pub spawn_interval_ticks: u64,

    /// Smallest gap-upper coordinate a spawn may draw (inclusive)
    pub gap_upper_min: u32,

    /// Largest gap-upper coordinate a spawn may draw (inclusive)
    ///
    /// `gap_upper_max + gap_height` must stay above the floor.
    pub gap_upper_max: u32,

    /// Horizontal collision test window
    pub collision_window: CollisionWindow,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            gap_height: 180.0,
            width: 104.0,
            scroll_speed: 20.0,
            spawn_x: 700.0,
            spawn_interval_ticks: 25,
            gap_upper_min: 70,
            gap_upper_max: 420,
            collision_window: CollisionWindow::GapHeight,
        }
    }
}

/// Fitness rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Reward per tick survived
    pub survival_reward: f64,

    /// Reward for passing an obstacle, paid once per obstacle per agent
    ///
    /// 5.0 is worth 50 ticks of survival, so clearing a pipe dominates
    /// merely staying airborne.
    pub pass_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            survival_reward: 0.1,
            pass_bonus: 5.0,
        }
    }
}

/// Complete configuration for one evaluation epoch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub obstacles: ObstacleConfig,
    pub scoring: ScoringConfig,

    /// Stop the epoch after this many ticks even if agents remain
    pub max_ticks: Option<u64>,

    /// Seed for the obstacle-gap RNG
    pub seed: u64,
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let o = &self.obstacles;
        let w = &self.world;
        let p = &self.physics;

        if !(o.gap_height > 0.0) {
            return Err(invalid(format!("gap_height must be positive, got {}", o.gap_height)));
        }
        if o.spawn_interval_ticks == 0 {
            return Err(invalid("spawn_interval_ticks must be at least 1".to_string()));
        }
        if !(o.scroll_speed > 0.0) {
            return Err(invalid(format!("scroll_speed must be positive, got {}", o.scroll_speed)));
        }
        if !(o.width > 0.0) {
            return Err(invalid(format!("obstacle width must be positive, got {}", o.width)));
        }
        if !o.spawn_x.is_finite() {
            return Err(invalid("spawn_x must be finite".to_string()));
        }
        if o.gap_upper_min > o.gap_upper_max {
            return Err(invalid(format!(
                "gap_upper_min ({}) must be <= gap_upper_max ({})",
                o.gap_upper_min, o.gap_upper_max
            )));
        }
        if o.gap_upper_max as f64 + o.gap_height > w.floor_y {
            return Err(invalid(format!(
                "gap band reaches {} which is below floor_y ({})",
                o.gap_upper_max as f64 + o.gap_height,
                w.floor_y
            )));
        }

        if !(w.floor_y > 0.0) {
            return Err(invalid(format!("floor_y must be positive, got {}", w.floor_y)));
        }
        if !(w.agent_width > 0.0) || !(w.agent_height > 0.0) {
            return Err(invalid("agent size must be positive".to_string()));
        }
        if !w.start_position.x.is_finite() || !w.start_position.y.is_finite() {
            return Err(invalid("start_position must be finite".to_string()));
        }

        if !(p.terminal_velocity > 0.0) {
            return Err(invalid(format!(
                "terminal_velocity must be positive, got {}",
                p.terminal_velocity
            )));
        }
        let physics_values = [
            p.gravity_coefficient,
            p.jump_impulse,
            p.rise_bias,
            p.nose_up_angle,
            p.nose_down_limit,
            p.rotation_step,
            p.jump_threshold,
        ];
        if physics_values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("physics values must be finite".to_string()));
        }

        if !self.scoring.survival_reward.is_finite() || self.scoring.survival_reward < 0.0 {
            return Err(invalid("survival_reward must be finite and non-negative".to_string()));
        }
        if !self.scoring.pass_bonus.is_finite() || self.scoring.pass_bonus < 0.0 {
            return Err(invalid("pass_bonus must be finite and non-negative".to_string()));
        }

        Ok(())
    }
}

fn invalid(reason: String) -> SimError {
    SimError::InvalidConfig(reason)
}

/// Load and validate a config from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    SimulationConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_floor_matches_ground_strip() {
        assert_eq!(WorldConfig::default().floor_y, 676.0);
    }

    #[test]
    fn test_rejects_non_positive_gap() {
        let mut config = SimulationConfig::default();
        config.obstacles.gap_height = 0.0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        config.obstacles.gap_height = f64::NAN;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_spawn_interval() {
        let mut config = SimulationConfig::default();
        config.obstacles.spawn_interval_ticks = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_gap_band_below_floor() {
        let mut config = SimulationConfig::default();
        config.obstacles.gap_upper_max = 600;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_gap_range() {
        let mut config = SimulationConfig::default();
        config.obstacles.gap_upper_min = 300;
        config.obstacles.gap_upper_max = 200;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_collision_window_width() {
        let obstacles = ObstacleConfig::default();
        assert_eq!(CollisionWindow::GapHeight.width(&obstacles), 180.0);
        assert_eq!(CollisionWindow::ObstacleWidth.width(&obstacles), 104.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            seed = 7
            max_ticks = 5000

            [obstacles]
            gap_height = 200.0
            collision_window = "obstacle_width"
        "#;
        let config = SimulationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_ticks, Some(5000));
        assert_eq!(config.obstacles.gap_height, 200.0);
        assert_eq!(config.obstacles.collision_window, CollisionWindow::ObstacleWidth);
        assert_eq!(config.obstacles.scroll_speed, 20.0);
        assert_eq!(config.physics.jump_impulse, -20.0);
    }

    #[test]
    fn test_invalid_toml_value_is_rejected() {
        let toml_str = r#"
            [obstacles]
            spawn_interval_ticks = 0
        "#;
        assert!(matches!(
            SimulationConfig::from_toml_str(toml_str),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
