//! Integration tests for whole epochs
//!
//! These run complete generations through the public API the optimizer
//! uses: build a population of decision capabilities, evaluate, read the
//! fitness map.

use flapsim::brains::{indexed_population, JumpEvery, NeverJump, Policy};
use flapsim::core::config::{CollisionWindow, SimulationConfig};
use flapsim::render::snapshot;
use flapsim::sim::collision::Collision;
use flapsim::sim::context::{SimContext, StopSignal};
use flapsim::sim::decision::{DecisionCapability, Sensors};
use flapsim::sim::epoch::{evaluate, evaluate_in, Epoch, Population, Termination};

// ============================================================================
// Single-agent scenarios
// ============================================================================

/// A never-jumping agent starting mid-screen with the floor at 700 falls
/// 1.5, 12, 40.5 and then 30 per tick: 683.5 after tick 11, 713.5 after
/// tick 12.
#[test]
fn test_never_jumper_hits_lowered_floor_on_tick_12() {
    let mut config = SimulationConfig::default();
    config.world.floor_y = 700.0;

    let mut brain = NeverJump;
    let mut population: Population<&str> = Vec::new();
    population.push(("faller", &mut brain));
    let report = evaluate(population, config).unwrap();

    let result = &report.results[0];
    assert_eq!(result.died_at, Some(12));
    assert_eq!(result.cause_of_death, Some(Collision::Floor));
    assert_eq!(result.ticks_survived, 11);
    assert_eq!(result.fitness, 0.1 * 11.0);
    assert_eq!(report.fitness["faller"], 0.1 * 11.0);
    assert_eq!(report.termination, Termination::AllEliminated);
    assert_eq!(report.ticks, 12);
}

#[test]
fn test_periodic_jumper_outscores_never_jumper() {
    let mut jumper = JumpEvery::new(10);
    let mut faller = NeverJump;
    let mut population: Population<&str> = Vec::new();
    population.push(("jumper", &mut jumper));
    population.push(("faller", &mut faller));

    let report = evaluate(population, SimulationConfig::default()).unwrap();

    assert!(report.fitness["jumper"] > report.fitness["faller"]);
    assert_eq!(report.best().map(|r| r.key), Some("jumper"));
}

#[test]
fn test_closure_controllers_are_accepted() {
    let mut seen = Vec::new();
    let mut brain = |s: &Sensors| {
        seen.push(*s);
        0.0
    };
    let mut population: Population<u32> = Vec::new();
    population.push((42, &mut brain));
    let report = evaluate(population, SimulationConfig::default()).unwrap();

    assert_eq!(report.fitness[&42], 0.1 * 10.0);
    assert_eq!(seen.len(), 11);
    // first decision is made from the start position against the first pipe
    assert_eq!(seen[0].y, 400.0);
    assert!(seen[0].to_gap_upper + seen[0].to_gap_lower >= 180.0);
}

// ============================================================================
// Populations
// ============================================================================

#[test]
fn test_same_seed_same_outcome() {
    let run = |seed: u64| {
        let mut config = SimulationConfig::default();
        config.seed = seed;
        config.max_ticks = Some(2_000);
        let mut brains = Policy::Perceptron.build_population(30, seed);
        evaluate(indexed_population(&mut brains), config).unwrap()
    };

    let a = run(7);
    let b = run(7);
    assert_eq!(a.results, b.results);
    assert_eq!(a.ticks, b.ticks);
    assert_eq!(a.obstacles_spawned, b.obstacles_spawned);
}

#[test]
fn test_obstacle_course_depends_only_on_seed() {
    let course = |policy: Policy| {
        let mut config = SimulationConfig::default();
        config.seed = 11;
        config.max_ticks = Some(80);
        let mut ctx = SimContext::new(config).unwrap();
        let mut brains = policy.build_population(5, 11);
        let mut epoch = Epoch::new(indexed_population(&mut brains), &mut ctx);
        let mut gaps = Vec::new();
        epoch.run_with(|e| {
            for o in snapshot(e).obstacles {
                if !gaps.contains(&o.gap_upper) {
                    gaps.push(o.gap_upper);
                }
            }
        });
        gaps
    };

    // the first obstacle and the spawn stream never depend on the agents
    let a = course(Policy::Never);
    let b = course(Policy::Gap);
    let shared = a.len().min(b.len());
    assert!(shared >= 1);
    assert_eq!(a[..shared], b[..shared]);
}

#[test]
fn test_every_agent_gets_a_fitness() {
    let mut brains = Policy::Periodic.build_population(25, 3);
    let report = evaluate(indexed_population(&mut brains), SimulationConfig::default()).unwrap();

    assert_eq!(report.fitness.len(), 25);
    assert_eq!(report.results.len(), 25);
    for (slot, result) in report.results.iter().enumerate() {
        assert_eq!(result.key, slot);
        assert!(result.fitness >= 0.1 * result.ticks_survived as f64 - 1e-9);
    }
    let ranking = report.ranking();
    assert!(ranking.windows(2).all(|w| w[0].fitness >= w[1].fitness));
}

#[test]
fn test_obstacle_width_window_is_more_forgiving() {
    // same controller, same course: the pipe-width window is a subset of the
    // gap-height window, so it can only kill later
    let survival = |window: CollisionWindow| {
        let mut config = SimulationConfig::default();
        config.seed = 5;
        config.obstacles.collision_window = window;
        config.max_ticks = Some(3_000);
        let mut brain = flapsim::brains::GapFollower::default();
        let mut population: Population<u8> = Vec::new();
        population.push((0, &mut brain));
        evaluate(population, config).unwrap().results[0].ticks_survived
    };

    assert!(survival(CollisionWindow::ObstacleWidth) >= survival(CollisionWindow::GapHeight));
}

// ============================================================================
// Early termination
// ============================================================================

#[test]
fn test_tick_limit_reports_partial_fitness() {
    let mut config = SimulationConfig::default();
    config.max_ticks = Some(8);

    let mut brain = NeverJump;
    let mut population: Population<u8> = Vec::new();
    population.push((0, &mut brain));
    let report = evaluate(population, config).unwrap();

    assert_eq!(report.termination, Termination::TickLimit);
    assert_eq!(report.ticks, 8);
    assert_eq!(report.results[0].fitness, 0.1 * 8.0);
    assert_eq!(report.results[0].cause_of_death, None);
}

#[test]
fn test_stop_from_another_thread() {
    let stop = StopSignal::new();
    let mut ctx = SimContext::new(SimulationConfig::default())
        .unwrap()
        .with_stop(stop.clone());

    let handle = std::thread::spawn(move || stop.request_stop());
    handle.join().unwrap();

    let mut brain = JumpEvery::new(10);
    let mut population: Population<u8> = Vec::new();
    population.push((0, &mut brain));
    let report = evaluate_in(population, &mut ctx);

    assert_eq!(report.termination, Termination::Stopped);
    assert_eq!(report.ticks, 0);
    assert_eq!(report.results[0].fitness, 0.0);
}

#[test]
fn test_empty_population_is_not_an_error() {
    let population: Population<u8> = Vec::new();
    let report = evaluate(population, SimulationConfig::default()).unwrap();
    assert_eq!(report.termination, Termination::EmptyPopulation);
    assert!(report.fitness.is_empty());
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let mut config = SimulationConfig::default();
    config.obstacles.gap_height = -1.0;

    let mut calls = 0;
    let mut brain = |_: &Sensors| {
        calls += 1;
        0.0
    };
    let mut population: Population<u8> = Vec::new();
    population.push((0, &mut brain as &mut dyn DecisionCapability));
    assert!(evaluate(population, config).is_err());
    assert_eq!(calls, 0);
}

#[test]
fn test_report_serializes_to_json() {
    let mut brain = NeverJump;
    let mut population: Population<String> = Vec::new();
    population.push(("genome-1".to_string(), &mut brain));
    let report = evaluate(population, SimulationConfig::default()).unwrap();

    let json = report.to_json().unwrap();
    assert!(json.contains("\"genome-1\""));
    assert!(json.contains("\"AllEliminated\""));
}
