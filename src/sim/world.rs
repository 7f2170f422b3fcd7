//! World state for one epoch: obstacles, the shared cursor and ground scroll

use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::ObstacleId;
use crate::sim::decision::Sensors;
use crate::sim::obstacle::{Obstacle, ObstacleField};

pub struct World {
    pub obstacles: ObstacleField,
    /// Id of the nearest obstacle the population has not yet passed
    ///
    /// Shared by every agent: once any survivor clears it, the whole
    /// population is steered by the next one.
    cursor: ObstacleId,
    /// Horizontal offset of the scrolling ground strip, in `(-width, 0]`
    base_x: f64,
}

impl World {
    /// Fresh world with one obstacle already at the spawn line
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Self {
        let mut obstacles = ObstacleField::new(&config.obstacles);
        let cursor = obstacles.spawn(&config.obstacles, rng);
        Self {
            obstacles,
            cursor,
            base_x: 0.0,
        }
    }

    /// The obstacle agents currently steer by
    ///
    /// If the cursor's obstacle has already expired the next newer one
    /// stands in.
    pub fn current_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles.first_from(self.cursor)
    }

    pub fn cursor(&self) -> ObstacleId {
        self.cursor
    }

    pub fn base_x(&self) -> f64 {
        self.base_x
    }

    /// Sensor triple for an agent at height `y`
    ///
    /// With no obstacle on screen both distances read 0.
    pub fn sensors_for(&self, y: f64) -> Sensors {
        match self.current_obstacle() {
            Some(o) => Sensors {
                y,
                to_gap_upper: (y - o.gap_upper()).abs(),
                to_gap_lower: (y - o.gap_lower()).abs(),
            },
            None => Sensors {
                y,
                to_gap_upper: 0.0,
                to_gap_lower: 0.0,
            },
        }
    }

    /// Scroll obstacles and ground, run the spawn countdown
    pub fn advance<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) -> Option<ObstacleId> {
        let spawned = self.obstacles.tick(&config.obstacles, rng);

        self.base_x -= config.obstacles.scroll_speed;
        if self.base_x <= -config.world.width {
            self.base_x += config.world.width;
        }

        spawned
    }

    pub fn expire(&mut self, config: &SimulationConfig) -> usize {
        self.obstacles.expire(config.obstacles.width)
    }

    /// Id of the current obstacle if an agent at `x` is past its trailing edge
    pub fn passed_current(&self, x: f64, config: &SimulationConfig) -> Option<ObstacleId> {
        self.current_obstacle()
            .filter(|o| x > o.trailing_edge(config.obstacles.width))
            .map(Obstacle::id)
    }

    /// Move the cursor to the next obstacle, if one exists
    pub fn advance_cursor(&mut self) -> bool {
        let current = match self.current_obstacle() {
            Some(o) => o.id(),
            None => return false,
        };
        match self.obstacles.successor_of(current) {
            Some(next) => {
                self.cursor = next;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn empty(config: &SimulationConfig) -> Self {
        Self {
            obstacles: ObstacleField::new(&config.obstacles),
            cursor: ObstacleId(0),
            base_x: 0.0,
        }
    }
}
