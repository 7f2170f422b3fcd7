//! Integration tests for TOML configuration loading

use std::path::PathBuf;

use flapsim::core::config::{load_config, CollisionWindow, SimulationConfig};
use flapsim::core::error::SimError;

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("config")
        .join(name)
}

#[test]
fn test_default_file_matches_builtin_defaults() {
    let loaded = load_config(data_file("default.toml")).unwrap();
    let builtin = SimulationConfig::default();

    assert_eq!(loaded.world.floor_y, builtin.world.floor_y);
    assert_eq!(loaded.world.start_position, builtin.world.start_position);
    assert_eq!(loaded.physics.jump_impulse, builtin.physics.jump_impulse);
    assert_eq!(loaded.physics.terminal_velocity, builtin.physics.terminal_velocity);
    assert_eq!(loaded.obstacles.gap_height, builtin.obstacles.gap_height);
    assert_eq!(loaded.obstacles.spawn_interval_ticks, builtin.obstacles.spawn_interval_ticks);
    assert_eq!(loaded.obstacles.gap_upper_min, builtin.obstacles.gap_upper_min);
    assert_eq!(loaded.obstacles.gap_upper_max, builtin.obstacles.gap_upper_max);
    assert_eq!(loaded.obstacles.collision_window, CollisionWindow::GapHeight);
    assert_eq!(loaded.scoring.survival_reward, builtin.scoring.survival_reward);
    assert_eq!(loaded.scoring.pass_bonus, builtin.scoring.pass_bonus);
    assert_eq!(loaded.max_ticks, None);
    assert_eq!(loaded.seed, 0);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_config(data_file("does_not_exist.toml"));
    assert!(matches!(result, Err(SimError::IoError(_))));
}

#[test]
fn test_override_sections() {
    let config = SimulationConfig::from_toml_str(
        r#"
        seed = 99
        max_ticks = 1000

        [obstacles]
        collision_window = "obstacle_width"
        spawn_interval_ticks = 30
        "#,
    )
    .unwrap();

    assert_eq!(config.seed, 99);
    assert_eq!(config.max_ticks, Some(1000));
    assert_eq!(config.obstacles.collision_window, CollisionWindow::ObstacleWidth);
    assert_eq!(config.obstacles.spawn_interval_ticks, 30);
    assert_eq!(config.obstacles.gap_height, 180.0);
}

#[test]
fn test_inconsistent_file_is_rejected() {
    let result = SimulationConfig::from_toml_str(
        r#"
        [world]
        floor_y = 500.0
        "#,
    );
    // 420 + 180 reaches past a floor at 500
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}
