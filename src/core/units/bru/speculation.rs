//! Branch Speculation Unit.
//!
//! Branches never reach an execution lane. Decode hands every branch to this
//! unit, which takes one of two paths:
//! 1. **Certain:** no in-flight producer of the status register. The
//!    condition is evaluated immediately; a taken branch clears the decode
//!    queue and redirects fetch.
//! 2. **Speculative:** the status register is still in flight. The predictor
//!    chooses a direction, fetch is redirected along it, and a [`Prediction`]
//!    is queued. The unit registers itself as a completion listener on the
//!    blocking instruction.
//!
//! When a listened-to instruction commits, the oldest prediction is popped
//! and must belong to it. Predictions resolve strictly in creation order,
//! and a mismatch is a fatal scheduler error. A misprediction squashes every
//! in-flight instruction younger than the branch and restarts fetch on the
//! correct path.
//!
//! A branch resolved on the certain path while predictions are pending sits
//! on the youngest prediction's path. It retires when that prediction is
//! confirmed and counts as squashed if any prediction before it misses.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::{BranchPredictor, BranchPredictorWrapper};
use crate::common::{RegisterFile, SimError, SimResult};
use crate::config::PipelineConfig;
use crate::core::pipeline::{PipelineLatch, PipelineState};
use crate::isa::{DecodedInstruction, InstId, UnitKind};
use crate::stats::SimStats;

/// A branch whose direction was guessed while its status register was in
/// flight.
#[derive(Clone, Debug)]
pub struct Prediction {
    /// The branch, with its decode-time operand snapshot.
    pub branch: DecodedInstruction,
    /// Producer of the status register the branch waits on.
    pub blocking: InstId,
    /// Direction fetch was redirected along.
    pub predicted_taken: bool,
    /// Fall-through address, where fetch restarts if the branch resolves
    /// not taken after being predicted taken.
    pub alternative: u32,
    /// Certain branches resolved in decode on this prediction's path.
    pub shadowed: usize,
}

/// Branch speculation unit.
#[derive(Debug, Clone)]
pub struct BranchUnit {
    predictor: BranchPredictorWrapper,
    predictions: VecDeque<Prediction>,
    /// Completion listeners: blocking instruction to number of predictions
    /// waiting on it.
    listeners: HashMap<InstId, usize>,
}

impl BranchUnit {
    /// Creates a unit with the predictor selected by `config`.
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_predictor(BranchPredictorWrapper::new(config))
    }

    /// Creates a unit around an explicit predictor.
    pub fn with_predictor(predictor: BranchPredictorWrapper) -> Self {
        Self {
            predictor,
            predictions: VecDeque::new(),
            listeners: HashMap::new(),
        }
    }

    /// The direction predictor.
    pub fn predictor(&self) -> &BranchPredictorWrapper {
        &self.predictor
    }

    /// Pending predictions, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions.iter()
    }

    /// Number of pending predictions.
    pub fn pending_count(&self) -> usize {
        self.predictions.len()
    }

    /// Whether a prediction is waiting on `id` to commit.
    pub fn is_listening(&self, id: InstId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Resolves a branch whose status register is already committed.
    ///
    /// Counts the branch as retired, or defers the count to the youngest
    /// pending prediction when the branch is itself on a speculative path.
    /// A taken branch clears the decode queue and sets the fetch PC to its
    /// target.
    ///
    /// # Returns
    ///
    /// Whether the branch was taken.
    pub fn execute(
        &mut self,
        branch: &DecodedInstruction,
        state: &mut PipelineState,
        stats: &mut SimStats,
    ) -> bool {
        match self.predictions.back_mut() {
            Some(youngest) => youngest.shadowed += 1,
            None => stats.record_retired(UnitKind::Branch),
        }

        let taken = branch.should_take_branch();
        if taken {
            stats.branch_certain_taken += 1;
            state.decode.flush();
            state.pc = branch.branch_target().unwrap_or_else(|| branch.fall_through());
        } else {
            stats.branch_certain_not_taken += 1;
        }
        debug!(branch = %branch, taken, "branch resolved at decode");
        taken
    }

    /// Predicts a branch whose status register is produced by `blocking`.
    ///
    /// Clears the decode queue, redirects fetch along the predicted path,
    /// queues the prediction, and listens for `blocking` to commit.
    pub fn predict_and_execute(
        &mut self,
        branch: DecodedInstruction,
        blocking: InstId,
        state: &mut PipelineState,
        stats: &mut SimStats,
    ) {
        let fall_through = branch.fall_through();
        let target = branch.branch_target().unwrap_or(fall_through);
        let predicted_taken = self.predictor.predict_branch(branch.address, target);

        state.decode.flush();
        state.pc = if predicted_taken { target } else { fall_through };
        stats.branch_predictions += 1;

        debug!(
            branch = %branch,
            %blocking,
            predicted_taken,
            "branch predicted"
        );

        self.predictions.push_back(Prediction {
            branch,
            blocking,
            predicted_taken,
            alternative: fall_through,
            shadowed: 0,
        });
        *self.listeners.entry(blocking).or_default() += 1;
    }

    /// Completion callback, invoked by write-back after `completed` commits.
    ///
    /// Resolves every prediction blocked on `completed`, oldest first. Stops
    /// early when one of them mispredicts, since the squash discards the rest.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PredictionOrderViolation`] when the oldest pending
    /// prediction is blocked on a different instruction.
    pub fn on_write_back(
        &mut self,
        completed: InstId,
        regs: &RegisterFile,
        state: &mut PipelineState,
        stats: &mut SimStats,
    ) -> SimResult<()> {
        let Some(count) = self.listeners.remove(&completed) else {
            return Ok(());
        };

        for _ in 0..count {
            let Some(prediction) = self.predictions.pop_front() else {
                break;
            };
            if prediction.blocking != completed {
                return Err(SimError::PredictionOrderViolation {
                    expected: prediction.blocking.0,
                    completed: completed.0,
                });
            }
            if self.resolve(prediction, regs, state, stats) {
                break;
            }
        }
        Ok(())
    }

    /// Re-evaluates one prediction against committed state.
    ///
    /// Returns `true` if it mispredicted and the pipeline was squashed.
    fn resolve(
        &mut self,
        prediction: Prediction,
        regs: &RegisterFile,
        state: &mut PipelineState,
        stats: &mut SimStats,
    ) -> bool {
        let mut branch = prediction.branch;
        branch.refresh_status(regs);
        let taken = branch.should_take_branch();
        self.predictor.update_branch(branch.address, taken);

        stats.record_retired(UnitKind::Branch);

        if taken == prediction.predicted_taken {
            stats.branch_predicted_correct += 1;
            for _ in 0..prediction.shadowed {
                stats.record_retired(UnitKind::Branch);
            }
            debug!(branch = %branch, taken, "prediction confirmed");
            return false;
        }

        stats.branch_mispredictions += 1;
        let discarded: usize = prediction.shadowed
            + self
                .predictions
                .drain(..)
                .map(|younger| 1 + younger.shadowed)
                .sum::<usize>();
        let squashed = state.squash_younger_than(branch.id) + discarded;
        stats.squashed_instructions += squashed as u64;
        self.listeners.clear();
        state.pc = if taken {
            branch.branch_target().unwrap_or(prediction.alternative)
        } else {
            prediction.alternative
        };

        debug!(
            branch = %branch,
            taken,
            squashed,
            restart = state.pc,
            "misprediction, pipeline squashed"
        );
        true
    }
}
