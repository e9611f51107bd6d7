//! Integration tests for branch prediction.

use pretty_assertions::assert_eq;
use rstest::rstest;

use superscalar_sim::config::{BimodalConfig, BranchPredictor as BpType, PipelineConfig};
use superscalar_sim::core::units::bru::*;

fn new_bimodal(table_size: usize, counter_bits: u8) -> bimodal::BimodalPredictor {
    bimodal::BimodalPredictor::new(&BimodalConfig {
        table_size,
        counter_bits,
    })
}

/// Tests static branch predictor behavior.
#[test]
fn test_static_predictor() {
    let mut bp = static_bp::StaticPredictor::new();

    assert!(!bp.predict_branch(0x40, 0x10));
    assert!(!bp.predict_branch(0x40, 0x80));

    bp.update_branch(0x40, true);
    bp.update_branch(0x40, true);
    assert!(!bp.predict_branch(0x40, 0x10), "static predictor never learns");
}

/// BTFN predicts backward (and self-targeting) branches taken.
#[rstest]
#[case(0x40, 0x10, true)]
#[case(0x40, 0x40, true)]
#[case(0x40, 0x44, false)]
#[case(0x00, 0x100, false)]
fn test_btfn_direction(#[case] pc: u32, #[case] target: u32, #[case] expected: bool) {
    let mut bp = btfn::BtfnPredictor::new();
    assert_eq!(bp.predict_branch(pc, target), expected);

    bp.update_branch(pc, !expected);
    assert_eq!(bp.predict_branch(pc, target), expected, "BTFN never learns");
}

/// Counters start weakly not-taken, so one taken outcome flips the prediction.
#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(8)]
fn test_bimodal_initial_state(#[case] bits: u8) {
    let mut bp = new_bimodal(16, bits);
    let threshold = 1u16 << (bits - 1);

    assert_eq!(u16::from(bp.counter(0x20)), threshold - 1);
    assert!(!bp.predict_branch(0x20, 0x00));

    bp.update_branch(0x20, true);
    assert!(bp.predict_branch(0x20, 0x00));
}

/// Counters saturate at both ends and converge to the dominant outcome.
#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn test_bimodal_saturates(#[case] bits: u8) {
    let mut bp = new_bimodal(16, bits);
    let max = ((1u16 << bits) - 1) as u8;
    assert_eq!(bp.max_counter(), max);

    for _ in 0..600 {
        bp.update_branch(0x8, true);
    }
    assert_eq!(bp.counter(0x8), max);
    assert!(bp.predict_branch(0x8, 0x0));

    for _ in 0..600 {
        bp.update_branch(0x8, false);
    }
    assert_eq!(bp.counter(0x8), 0);
    assert!(!bp.predict_branch(0x8, 0x0));
}

/// A strongly-taken 2-bit counter survives one not-taken outcome.
#[test]
fn test_bimodal_hysteresis() {
    let mut bp = new_bimodal(16, 2);
    bp.update_branch(0x4, true);
    bp.update_branch(0x4, true);
    assert_eq!(bp.counter(0x4), 3);

    bp.update_branch(0x4, false);
    assert!(bp.predict_branch(0x4, 0x0), "one miss does not flip a strong counter");

    bp.update_branch(0x4, false);
    assert!(!bp.predict_branch(0x4, 0x0));
}

/// Branches whose word index collides modulo the table size share a counter.
#[test]
fn test_bimodal_indexing_aliases() {
    let mut bp = new_bimodal(4, 2);
    bp.update_branch(0x0, true);

    assert!(bp.predict_branch(0x10, 0x0), "0x10 / 4 = 4 aliases slot 0");
    assert!(!bp.predict_branch(0x4, 0x0), "neighbouring slot untouched");
}

/// The wrapper dispatches to the configured variant.
#[rstest]
#[case(BpType::Static, false)]
#[case(BpType::Btfn, true)]
#[case(BpType::Bimodal, false)]
fn test_wrapper_selects_variant(#[case] kind: BpType, #[case] backward_prediction: bool) {
    let config = PipelineConfig {
        branch_predictor: kind,
        ..PipelineConfig::default()
    };
    let bp = BranchPredictorWrapper::new(&config);
    assert_eq!(bp.predict_branch(0x40, 0x10), backward_prediction);
}
