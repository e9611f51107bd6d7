//! Bimodal Branch Predictor.
//!
//! A table of n-bit saturating counters indexed by branch address. A counter
//! predicts taken once it reaches the upper half of its range. Every counter
//! starts in the weakly-not-taken state, so a single taken outcome flips the
//! prediction and further outcomes only move it within its bounds.

use super::BranchPredictor;
use crate::common::INSTRUCTION_WIDTH;
use crate::config::BimodalConfig;

/// Bimodal (per-address saturating counter) predictor.
#[derive(Debug, Clone)]
pub struct BimodalPredictor {
    counters: Vec<u8>,
    max: u8,
    threshold: u8,
}

impl BimodalPredictor {
    /// Creates a predictor from its configuration.
    ///
    /// `counter_bits` must be in `1..=8` and `table_size` non-zero; both are
    /// enforced by [`Config::validate`](crate::config::Config::validate).
    pub fn new(config: &BimodalConfig) -> Self {
        let bits = u32::from(config.counter_bits.clamp(1, 8));
        let max = ((1u16 << bits) - 1) as u8;
        let threshold = (1u16 << (bits - 1)) as u8;
        Self {
            counters: vec![threshold - 1; config.table_size.max(1)],
            max,
            threshold,
        }
    }

    fn index(&self, pc: u32) -> usize {
        (pc / INSTRUCTION_WIDTH) as usize % self.counters.len()
    }

    /// Current counter value for the branch at `pc`.
    pub fn counter(&self, pc: u32) -> u8 {
        self.counters[self.index(pc)]
    }

    /// Largest value a counter can reach.
    pub const fn max_counter(&self) -> u8 {
        self.max
    }
}

impl BranchPredictor for BimodalPredictor {
    fn predict_branch(&self, pc: u32, _target: u32) -> bool {
        self.counter(pc) >= self.threshold
    }

    fn update_branch(&mut self, pc: u32, taken: bool) {
        let idx = self.index(pc);
        let counter = &mut self.counters[idx];
        *counter = if taken {
            counter.saturating_add(1).min(self.max)
        } else {
            counter.saturating_sub(1)
        };
    }
}
