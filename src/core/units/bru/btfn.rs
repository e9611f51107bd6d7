//! Backward-Taken / Forward-Not-Taken Predictor.
//!
//! A static heuristic that exploits loop structure: a branch to a lower (or
//! equal) address usually closes a loop and is predicted taken, while a
//! forward branch usually skips a rarely-executed block and is predicted not
//! taken.

use super::BranchPredictor;

/// BTFN predictor.
#[derive(Debug, Default, Clone)]
pub struct BtfnPredictor;

impl BtfnPredictor {
    /// Creates a new BTFN predictor.
    pub const fn new() -> Self {
        Self
    }
}

impl BranchPredictor for BtfnPredictor {
    fn predict_branch(&self, pc: u32, target: u32) -> bool {
        target <= pc
    }

    fn update_branch(&mut self, _pc: u32, _taken: bool) {}
}
