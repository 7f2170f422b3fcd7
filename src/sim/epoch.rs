//! Generation coordinator
//!
//! One epoch evaluates a whole population in a shared scrolling world.
//! Each tick: decide + move agents -> scroll/spawn obstacles -> expire
//! obstacles -> collisions -> fitness -> cursor -> cull.

use std::fmt::Debug;
use std::hash::Hash;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{ObstacleId, Tick};
use crate::sim::agent::{Agent, AgentResult};
use crate::sim::collision;
use crate::sim::context::SimContext;
use crate::sim::decision::{self, DecisionCapability};
use crate::sim::motion::Kinematics;
use crate::sim::world::World;

/// Candidates handed in by the optimizer
pub type Population<'a, K> = Vec<(K, &'a mut dyn DecisionCapability)>;

/// Epoch lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpochPhase {
    #[default]
    Initializing,
    Running,
    Finished(Termination),
}

/// Why an epoch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Every agent collided
    AllEliminated,
    /// `max_ticks` was reached with agents still alive
    TickLimit,
    /// The stop signal was raised
    Stopped,
    /// Nothing to evaluate
    EmptyPopulation,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub spawned: Option<ObstacleId>,
    pub expired: usize,
    pub deaths: usize,
    pub passes: usize,
}

/// An agent removed from play, with its last pose kept for presentation
pub(crate) struct Retired<K> {
    pub slot: usize,
    pub last_pose: Kinematics,
    pub result: AgentResult<K>,
}

struct Slotted<'a, K> {
    slot: usize,
    agent: Agent<'a, K>,
}

pub struct Epoch<'a, 'c, K> {
    ctx: &'c mut SimContext,
    world: World,
    live: Vec<Slotted<'a, K>>,
    retired: Vec<Retired<K>>,
    phase: EpochPhase,
}

impl<'a, 'c, K: Clone + Debug> Epoch<'a, 'c, K> {
    /// Initialize agents at the start position and a world with one obstacle
    pub fn new(
        population: impl IntoIterator<Item = (K, &'a mut dyn DecisionCapability)>,
        ctx: &'c mut SimContext,
    ) -> Self {
        let world = World::new(&ctx.config, &mut ctx.rng);
        Self::from_parts(population, ctx, world)
    }

    fn from_parts(
        population: impl IntoIterator<Item = (K, &'a mut dyn DecisionCapability)>,
        ctx: &'c mut SimContext,
        world: World,
    ) -> Self {
        ctx.tick = 0;
        let live: Vec<_> = population
            .into_iter()
            .enumerate()
            .map(|(slot, (key, brain))| Slotted {
                slot,
                agent: Agent::new(key, brain, &ctx.config),
            })
            .collect();

        let mut epoch = Self {
            ctx,
            world,
            live,
            retired: Vec::new(),
            phase: EpochPhase::Initializing,
        };

        if epoch.live.is_empty() {
            epoch.phase = EpochPhase::Finished(Termination::EmptyPopulation);
        } else {
            tracing::info!("Epoch starting with {} agents", epoch.live.len());
            epoch.phase = EpochPhase::Running;
        }
        epoch
    }

    pub fn phase(&self) -> EpochPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, EpochPhase::Running)
    }

    pub fn tick(&self) -> Tick {
        self.ctx.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.ctx.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Agents still in play
    pub fn live_agents(&self) -> impl Iterator<Item = &Agent<'a, K>> {
        self.live.iter().map(|s| &s.agent)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn retired(&self) -> &[Retired<K>] {
        &self.retired
    }

    /// Live agents with their population slot
    pub(crate) fn live_slots(&self) -> impl Iterator<Item = (usize, &Agent<'a, K>)> {
        self.live.iter().map(|s| (s.slot, &s.agent))
    }

    /// Run one fixed tick
    pub fn run_tick(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        if !self.is_running() {
            return events;
        }
        if self.ctx.stop.is_stopped() {
            self.end(Termination::Stopped);
            return events;
        }

        let ctx = &mut *self.ctx;
        ctx.tick += 1;
        let tick = ctx.tick;
        let config = &ctx.config;

        // 1. decide, then move
        for Slotted { agent, .. } in self.live.iter_mut() {
            let sensors = self.world.sensors_for(agent.kinematics.y);
            let jump = match decision::query(&mut *agent.brain, &sensors) {
                Ok(output) => output > config.physics.jump_threshold,
                Err(err) => {
                    if agent.decision_failures == 0 {
                        tracing::warn!(
                            "Agent {:?} decision failed, treating as no jump: {}",
                            agent.key,
                            err
                        );
                    }
                    agent.decision_failures += 1;
                    false
                }
            };
            if jump {
                agent.kinematics.jump(&config.physics);
            }
            agent.kinematics.step(&config.physics);
        }

        // 2. scroll and spawn
        events.spawned = self.world.advance(config, &mut ctx.rng);

        // 3. expire
        events.expired = self.world.expire(config);

        // 4. collisions
        for Slotted { agent, .. } in self.live.iter_mut() {
            if let Some(cause) = collision::detect(&agent.bounds(), self.world.obstacles.iter(), config) {
                tracing::debug!("Agent {:?} eliminated at tick {} by {:?}", agent.key, tick, cause);
                agent.kill(cause, tick);
                events.deaths += 1;
            }
        }

        // 5. fitness
        let mut any_passed = false;
        for Slotted { agent, .. } in self.live.iter_mut().filter(|s| s.agent.alive) {
            agent.ledger.record_survival();
            if let Some(id) = self.world.passed_current(agent.kinematics.x, config) {
                any_passed = true;
                if agent.ledger.award_pass(id) {
                    events.passes += 1;
                }
            }
        }

        // 6. shared cursor
        if any_passed {
            self.world.advance_cursor();
        }

        // 7. cull
        let (alive, dead): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.live).into_iter().partition(|s| s.agent.alive);
        self.live = alive;
        self.retired.extend(dead.into_iter().map(|s| Retired {
            slot: s.slot,
            last_pose: s.agent.kinematics,
            result: s.agent.into_result(config),
        }));

        if self.live.is_empty() {
            self.end(Termination::AllEliminated);
        } else if config.max_ticks.is_some_and(|max| tick >= max) {
            self.end(Termination::TickLimit);
        }

        events
    }

    /// Run until finished
    pub fn run(&mut self) -> Termination {
        self.run_with(|_| {})
    }

    /// Run until finished, handing the observer the epoch after every tick
    ///
    /// The observer only gets a shared reference; presentation can read but
    /// never steer the simulation.
    pub fn run_with(&mut self, mut observer: impl FnMut(&Self)) -> Termination {
        loop {
            if let EpochPhase::Finished(termination) = self.phase {
                return termination;
            }
            self.run_tick();
            observer(self);
        }
    }

    fn end(&mut self, termination: Termination) {
        self.phase = EpochPhase::Finished(termination);
        tracing::info!(
            "Epoch finished after {} ticks ({:?}), {} obstacles spawned",
            self.ctx.tick,
            termination,
            self.world.obstacles.spawned()
        );
    }

    /// Report every agent's result in population order
    ///
    /// Agents still alive (stop signal, tick limit) keep the fitness they
    /// had accumulated so far.
    pub fn finish(mut self) -> EpochReport<K>
    where
        K: Eq + Hash,
    {
        let config = &self.ctx.config;
        let termination = match self.phase {
            EpochPhase::Finished(t) => t,
            _ => Termination::Stopped,
        };

        let mut results: Vec<(usize, AgentResult<K>)> =
            self.retired.drain(..).map(|r| (r.slot, r.result)).collect();
        results.extend(self.live.drain(..).map(|s| (s.slot, s.agent.into_result(config))));
        results.sort_by_key(|(slot, _)| *slot);
        let results: Vec<AgentResult<K>> = results.into_iter().map(|(_, r)| r).collect();

        let fitness = results.iter().map(|r| (r.key.clone(), r.fitness)).collect();

        EpochReport {
            fitness,
            results,
            ticks: self.ctx.tick,
            obstacles_spawned: self.world.obstacles.spawned(),
            termination,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_world(
        population: impl IntoIterator<Item = (K, &'a mut dyn DecisionCapability)>,
        ctx: &'c mut SimContext,
        world: World,
    ) -> Self {
        Self::from_parts(population, ctx, world)
    }
}

/// Outcome of one epoch, returned to the optimizer
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "K: Serialize + Eq + Hash"))]
pub struct EpochReport<K> {
    /// Final fitness per candidate key
    pub fitness: AHashMap<K, f64>,
    /// Per-agent detail in population order
    pub results: Vec<AgentResult<K>>,
    pub ticks: Tick,
    pub obstacles_spawned: u32,
    pub termination: Termination,
}

impl<K> EpochReport<K> {
    /// Results sorted by fitness, best first
    pub fn ranking(&self) -> Vec<&AgentResult<K>> {
        let mut ranked: Vec<_> = self.results.iter().collect();
        ranked.sort_by_key(|r| std::cmp::Reverse(OrderedFloat(r.fitness)));
        ranked
    }

    pub fn best(&self) -> Option<&AgentResult<K>> {
        self.results.iter().max_by_key(|r| OrderedFloat(r.fitness))
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().map(|r| r.fitness).sum::<f64>() / self.results.len() as f64
    }

    pub fn summary(&self) -> String {
        let best = self.best().map(|r| r.fitness).unwrap_or(0.0);
        let passes = self.results.iter().map(|r| r.obstacles_passed).max().unwrap_or(0);
        format!(
            "{} agents over {} ticks ({:?})\nbest fitness {:.1}, mean {:.2}, most obstacles passed {}, {} obstacles spawned",
            self.results.len(),
            self.ticks,
            self.termination,
            best,
            self.mean_fitness(),
            passes,
            self.obstacles_spawned,
        )
    }

    pub fn to_json(&self) -> Result<String>
    where
        K: Serialize + Eq + Hash,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Evaluate one generation with a fresh context built from `config`
pub fn evaluate<'a, K>(
    population: impl IntoIterator<Item = (K, &'a mut dyn DecisionCapability)>,
    config: SimulationConfig,
) -> Result<EpochReport<K>>
where
    K: Clone + Debug + Eq + Hash,
{
    let mut ctx = SimContext::new(config)?;
    Ok(evaluate_in(population, &mut ctx))
}

/// Evaluate one generation inside a caller-owned context
pub fn evaluate_in<'a, K>(
    population: impl IntoIterator<Item = (K, &'a mut dyn DecisionCapability)>,
    ctx: &mut SimContext,
) -> EpochReport<K>
where
    K: Clone + Debug + Eq + Hash,
{
    let mut epoch = Epoch::new(population, ctx);
    epoch.run();
    epoch.finish()
}
