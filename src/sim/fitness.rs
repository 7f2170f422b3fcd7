//! Per-agent fitness accounting
//!
//! The ledger stores counts, not a running float sum, so fitness after `k`
//! quiet ticks is exactly `survival_reward * k`.

use serde::{Deserialize, Serialize};

use crate::core::config::ScoringConfig;
use crate::core::types::ObstacleId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessLedger {
    survived_ticks: u64,
    passes: u32,
    last_passed: Option<ObstacleId>,
    finalized: bool,
}

impl FitnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one tick of survival
    pub fn record_survival(&mut self) {
        if !self.finalized {
            self.survived_ticks += 1;
        }
    }

    /// Credit a pass of `obstacle`; returns false if it was already paid
    ///
    /// Obstacles are passed in creation order, so any id at or below the
    /// last credited one has been paid before.
    pub fn award_pass(&mut self, obstacle: ObstacleId) -> bool {
        if self.finalized || self.last_passed.is_some_and(|last| obstacle <= last) {
            return false;
        }
        self.last_passed = Some(obstacle);
        self.passes += 1;
        true
    }

    /// Freeze the ledger; later credits are ignored
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn survived_ticks(&self) -> u64 {
        self.survived_ticks
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn fitness(&self, scoring: &ScoringConfig) -> f64 {
        scoring.survival_reward * self.survived_ticks as f64 + scoring.pass_bonus * self.passes as f64
    }
}
