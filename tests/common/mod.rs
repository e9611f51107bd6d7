//! Shared helpers for the integration tests.
#![allow(dead_code)]

use superscalar_sim::common::RegisterFile;
use superscalar_sim::config::{BranchPredictor, Config};
use superscalar_sim::core::{Cpu, RunState};
use superscalar_sim::isa::{decode, DecodedInstruction, EncodedInstruction, FetchedInstruction, InstId};
use superscalar_sim::sim::load_cpu;

/// Default configuration with the given lane count and predictor.
pub fn config(lanes: usize, predictor: BranchPredictor) -> Config {
    let mut config = Config::default();
    config.pipeline.lanes = lanes;
    config.pipeline.branch_predictor = predictor;
    config
}

/// Loads `source` and runs it to completion.
pub fn run_program(source: &str, config: &Config) -> Cpu {
    let mut cpu = load_cpu(source, config).expect("program should load");
    let state = cpu.run().expect("program should run without a fatal error");
    assert_eq!(state, RunState::Halted, "run should end halted");
    cpu
}

/// Decodes `text` as if it had been fetched from `address` with sequence id
/// `id`, snapshotting operands from `regs`.
pub fn decoded_with(id: u64, address: u32, text: &str, regs: &RegisterFile) -> DecodedInstruction {
    let fetched = FetchedInstruction {
        id: InstId(id),
        address,
        encoded: EncodedInstruction::new(text),
    };
    decode(&fetched, regs).expect("test instruction should decode")
}

/// Decodes `text` against a zeroed register file.
pub fn decoded(id: u64, address: u32, text: &str) -> DecodedInstruction {
    decoded_with(id, address, text, &RegisterFile::new())
}
