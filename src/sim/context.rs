//! Explicit simulation context
//!
//! One context per run carries the config, the deterministic RNG and the
//! stop signal. Nothing is stored in process-wide statics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Tick;

/// Cooperative cancellation flag shared with whoever may stop the run
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct SimContext {
    pub config: SimulationConfig,
    /// Ticks elapsed in the current epoch
    pub tick: Tick,
    pub rng: ChaCha8Rng,
    pub stop: StopSignal,
}

impl SimContext {
    /// Validate `config` and seed the RNG from `config.seed`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            tick: 0,
            rng,
            stop: StopSignal::new(),
        })
    }

    /// Use an externally owned stop signal
    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }
}
