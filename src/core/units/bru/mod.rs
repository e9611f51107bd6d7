//! Branch resolution unit (BRU).
//!
//! This module contains the direction predictors (static, BTFN, bimodal)
//! and the speculation unit that resolves branches inside decode, tracks
//! pending predictions, and squashes the pipeline on a misprediction.

pub use self::branch_predictor::BranchPredictor;

/// Bimodal saturating-counter predictor.
pub mod bimodal;

/// Branch predictor trait.
pub mod branch_predictor;

/// Backward-taken / forward-not-taken predictor.
pub mod btfn;

/// Prediction queue, completion listeners, and squash logic.
pub mod speculation;

/// Static branch predictor (always not-taken).
pub mod static_bp;

pub use self::speculation::{BranchUnit, Prediction};

use self::{bimodal::BimodalPredictor, btfn::BtfnPredictor, static_bp::StaticPredictor};
use crate::config::{BranchPredictor as BpType, PipelineConfig};

/// Enum wrapper for static dispatch of branch predictors.
#[derive(Debug, Clone)]
pub enum BranchPredictorWrapper {
    /// Always not taken.
    Static(StaticPredictor),
    /// Backward taken, forward not taken.
    Btfn(BtfnPredictor),
    /// Per-address saturating counters.
    Bimodal(BimodalPredictor),
}

impl BranchPredictorWrapper {
    /// Creates the predictor selected by the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        match config.branch_predictor {
            BpType::Static => Self::Static(StaticPredictor::new()),
            BpType::Btfn => Self::Btfn(BtfnPredictor::new()),
            BpType::Bimodal => Self::Bimodal(BimodalPredictor::new(&config.bimodal)),
        }
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline(always)]
    fn predict_branch(&self, pc: u32, target: u32) -> bool {
        match self {
            Self::Static(bp) => bp.predict_branch(pc, target),
            Self::Btfn(bp) => bp.predict_branch(pc, target),
            Self::Bimodal(bp) => bp.predict_branch(pc, target),
        }
    }

    #[inline(always)]
    fn update_branch(&mut self, pc: u32, taken: bool) {
        match self {
            Self::Static(bp) => bp.update_branch(pc, taken),
            Self::Btfn(bp) => bp.update_branch(pc, taken),
            Self::Bimodal(bp) => bp.update_branch(pc, taken),
        }
    }
}
