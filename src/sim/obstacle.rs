//! Obstacle generation, scrolling and expiry

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use crate::core::config::ObstacleConfig;
use crate::core::types::ObstacleId;

/// A pipe pair with a vertical gap between `gap_upper` and `gap_lower`
///
/// The gap is fixed at creation; only `x` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    id: ObstacleId,
    x: f64,
    gap_upper: f64,
    gap_lower: f64,
}

impl Obstacle {
    pub fn new(id: ObstacleId, x: f64, gap_upper: f64, gap_height: f64) -> Self {
        Self {
            id,
            x,
            gap_upper,
            gap_lower: gap_upper + gap_height,
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn gap_upper(&self) -> f64 {
        self.gap_upper
    }

    pub fn gap_lower(&self) -> f64 {
        self.gap_lower
    }

    /// Scroll left by one tick
    pub fn advance(&mut self, scroll_speed: f64) {
        self.x -= scroll_speed;
    }

    /// True once the right edge has left the world
    pub fn is_expired(&self, width: f64) -> bool {
        self.x + width < 0.0
    }

    /// Horizontal coordinate of the trailing edge
    pub fn trailing_edge(&self, width: f64) -> f64 {
        self.x + width
    }
}

/// Draw a new obstacle at the spawn line
pub fn spawn<R: Rng>(id: ObstacleId, config: &ObstacleConfig, rng: &mut R) -> Obstacle {
    let gap_upper = rng.gen_range(config.gap_upper_min..=config.gap_upper_max);
    Obstacle::new(id, config.spawn_x, gap_upper as f64, config.gap_height)
}

/// Active obstacles in creation order plus the spawn countdown
///
/// All obstacles scroll at the same speed, so creation order is also
/// descending distance from the left edge and expiry only ever happens at
/// the front.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    active: VecDeque<Obstacle>,
    countdown: u64,
    next_id: ObstacleId,
    spawned: u32,
}

impl ObstacleField {
    pub fn new(config: &ObstacleConfig) -> Self {
        Self {
            active: VecDeque::new(),
            countdown: config.spawn_interval_ticks,
            next_id: ObstacleId(0),
            spawned: 0,
        }
    }

    /// Spawn one obstacle immediately, independent of the countdown
    pub fn spawn<R: Rng>(&mut self, config: &ObstacleConfig, rng: &mut R) -> ObstacleId {
        let id = self.next_id;
        let obstacle = spawn(id, config, rng);
        tracing::debug!(
            "Spawned obstacle {} with gap {:.0}..{:.0}",
            id.0,
            obstacle.gap_upper(),
            obstacle.gap_lower()
        );
        self.active.push_back(obstacle);
        self.next_id = id.next();
        self.spawned += 1;
        id
    }

    /// Scroll every obstacle, then run the spawn countdown
    ///
    /// Returns the id of the obstacle spawned this tick, if any.
    pub fn tick<R: Rng>(&mut self, config: &ObstacleConfig, rng: &mut R) -> Option<ObstacleId> {
        for obstacle in self.active.iter_mut() {
            obstacle.advance(config.scroll_speed);
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = config.spawn_interval_ticks;
            Some(self.spawn(config, rng))
        } else {
            None
        }
    }

    /// Drop obstacles that scrolled off the left edge; returns how many
    pub fn expire(&mut self, width: f64) -> usize {
        let mut removed = 0;
        while self.active.front().is_some_and(|o| o.is_expired(width)) {
            self.active.pop_front();
            removed += 1;
        }
        removed
    }

    /// First active obstacle whose id is at least `cursor`
    pub fn first_from(&self, cursor: ObstacleId) -> Option<&Obstacle> {
        self.active.iter().find(|o| o.id() >= cursor)
    }

    /// Id of the oldest active obstacle spawned after `id`
    pub fn successor_of(&self, id: ObstacleId) -> Option<ObstacleId> {
        self.active.iter().map(Obstacle::id).find(|other| *other > id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Ticks left until the next spawn
    pub fn countdown(&self) -> u64 {
        self.countdown
    }

    /// Total obstacles created so far
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, obstacle: Obstacle) {
        self.next_id = obstacle.id().next();
        self.active.push_back(obstacle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gap_invariant_over_many_draws() {
        let config = ObstacleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for i in 0..10_000 {
            let o = spawn(ObstacleId(i), &config, &mut rng);
            assert_eq!(o.gap_lower() - o.gap_upper(), config.gap_height);
            assert!(o.gap_upper() >= config.gap_upper_min as f64);
            assert!(o.gap_upper() <= config.gap_upper_max as f64);
            assert_eq!(o.x(), config.spawn_x);
        }
    }

    #[test]
    fn test_spawn_cadence() {
        let config = ObstacleConfig {
            spawn_interval_ticks: 7,
            ..ObstacleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut field = ObstacleField::new(&config);

        let mut spawn_ticks = Vec::new();
        for tick in 1..=50u64 {
            if field.tick(&config, &mut rng).is_some() {
                spawn_ticks.push(tick);
            }
        }

        assert_eq!(spawn_ticks, vec![7, 14, 21, 28, 35, 42, 49]);
        assert_eq!(field.spawned(), 7);
    }

    #[test]
    fn test_interval_of_one_spawns_every_tick() {
        let config = ObstacleConfig {
            spawn_interval_ticks: 1,
            ..ObstacleConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut field = ObstacleField::new(&config);

        for _ in 0..5 {
            assert!(field.tick(&config, &mut rng).is_some());
        }
    }

    #[test]
    fn test_all_obstacles_scroll_together() {
        let config = ObstacleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut field = ObstacleField::new(&config);
        field.spawn(&config, &mut rng);
        field.spawn(&config, &mut rng);

        field.tick(&config, &mut rng);
        assert!(field.iter().all(|o| o.x() == config.spawn_x - config.scroll_speed));
    }

    #[test]
    fn test_expire_removes_only_from_front() {
        let config = ObstacleConfig::default();
        let mut field = ObstacleField::new(&config);
        field.push_for_test(Obstacle::new(ObstacleId(0), -150.0, 100.0, 180.0));
        field.push_for_test(Obstacle::new(ObstacleId(1), -105.0, 100.0, 180.0));
        field.push_for_test(Obstacle::new(ObstacleId(2), -104.0, 100.0, 180.0));
        field.push_for_test(Obstacle::new(ObstacleId(3), 300.0, 100.0, 180.0));

        let removed = field.expire(config.width);

        assert_eq!(removed, 2);
        let ids: Vec<_> = field.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![ObstacleId(2), ObstacleId(3)]);
    }

    #[test]
    fn test_expired_obstacle_gone_next_tick() {
        let config = ObstacleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut field = ObstacleField::new(&config);
        field.push_for_test(Obstacle::new(ObstacleId(0), -90.0, 100.0, 180.0));

        field.tick(&config, &mut rng);
        field.expire(config.width);

        assert!(field.first_from(ObstacleId(0)).is_none());
    }

    #[test]
    fn test_cursor_lookup_survives_expiry() {
        let config = ObstacleConfig::default();
        let mut field = ObstacleField::new(&config);
        field.push_for_test(Obstacle::new(ObstacleId(4), -200.0, 100.0, 180.0));
        field.push_for_test(Obstacle::new(ObstacleId(5), 200.0, 100.0, 180.0));
        field.expire(config.width);

        assert_eq!(field.first_from(ObstacleId(4)).map(|o| o.id()), Some(ObstacleId(5)));
        assert_eq!(field.successor_of(ObstacleId(5)), None);
    }

    proptest! {
        #[test]
        fn prop_gap_height_is_exact(seed in any::<u64>(), min in 0u32..200, span in 0u32..200) {
            let config = ObstacleConfig {
                gap_upper_min: min,
                gap_upper_max: min + span,
                ..ObstacleConfig::default()
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let o = spawn(ObstacleId(0), &config, &mut rng);
            prop_assert_eq!(o.gap_lower() - o.gap_upper(), config.gap_height);
        }
    }
}
