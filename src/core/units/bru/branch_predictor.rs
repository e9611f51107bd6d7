//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that all direction
//! predictors implement. Predictors are consulted only when decode cannot
//! resolve a branch because its status register is still in flight, and are
//! trained with every speculative branch's real outcome once it resolves.

/// Trait for branch direction prediction algorithms.
pub trait BranchPredictor {
    /// Predicts whether the branch at `pc` will be taken.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the branch instruction
    /// * `target` - Address the branch jumps to when taken
    fn predict_branch(&self, pc: u32, target: u32) -> bool;

    /// Trains the predictor with the resolved direction of the branch at `pc`.
    fn update_branch(&mut self, pc: u32, taken: bool);
}
