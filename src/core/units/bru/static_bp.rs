//! Static Branch Predictor.
//!
//! Implements the "Always Not Taken" policy. The fetch stream simply keeps
//! falling through, and no outcome is ever learned.

use super::BranchPredictor;

/// Static not-taken predictor.
#[derive(Debug, Default, Clone)]
pub struct StaticPredictor;

impl StaticPredictor {
    /// Creates a new static predictor.
    pub const fn new() -> Self {
        Self
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict_branch(&self, _pc: u32, _target: u32) -> bool {
        false
    }

    fn update_branch(&mut self, _pc: u32, _taken: bool) {}
}
