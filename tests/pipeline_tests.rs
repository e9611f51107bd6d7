//! End-to-end pipeline tests: programs are loaded from text and run on a
//! full core.

mod common;

use common::{config, run_program};
use pretty_assertions::assert_eq;
use rstest::rstest;

use superscalar_sim::common::{MemoryError, Reg, SimError, Status};
use superscalar_sim::config::{BranchPredictor, Config};
use superscalar_sim::core::{Cpu, RunState};
use superscalar_sim::isa::EncodedInstruction;
use superscalar_sim::sim::load_cpu;
use superscalar_sim::soc::Memory;

const COMPARE_AND_BRANCH: &str = "
    mov r0, 1
    add r0, r0, 1
    cmp r1, r0, 0
    beq r1, fail      ; r1 = GT, never taken
    nop
fail:
    mov r0, 99
    nop
";

const COUNTDOWN_LOOP: &str = "
    mov r1, 3
loop:
    sub r1, r1, 1
    cmp r2, r1, 0
    bgt r2, loop
    nop
";

fn independent_movs(count: usize) -> String {
    (0..count)
        .map(|i| format!("mov r{}, {}\n", i, i + 1))
        .collect()
}

/// MOV/ADD/CMP/BEQ/NOP ends with r0 = 2 after a confirmed speculative branch.
#[rstest]
#[case(1, BranchPredictor::Static)]
#[case(1, BranchPredictor::Bimodal)]
#[case(2, BranchPredictor::Static)]
#[case(2, BranchPredictor::Btfn)]
#[case(2, BranchPredictor::Bimodal)]
fn test_compare_and_branch(#[case] lanes: usize, #[case] predictor: BranchPredictor) {
    let cpu = run_program(COMPARE_AND_BRANCH, &config(lanes, predictor));

    assert_eq!(cpu.regs().read(0), 2);
    assert_eq!(cpu.regs().read(1), Status::Gt.to_word());

    let stats = cpu.stats();
    assert_eq!(stats.cycles, 8);
    assert_eq!(stats.instructions_retired, 5, "mov, add, cmp, beq, nop");
    assert_eq!(stats.branch_predictions, 1);
    assert_eq!(stats.branch_predicted_correct, 1);
    assert_eq!(stats.branch_mispredictions, 0);
    assert!((stats.ipc() - 5.0 / 8.0).abs() < 1e-9);
    assert!((stats.cpi() - 8.0 / 5.0).abs() < 1e-9);
    assert_eq!(stats.branch_accuracy(), Some(1.0));
}

/// A branch mispredicted as not taken squashes the wrong path and redirects.
#[test]
fn test_mispredicted_branch_recovers() {
    let program = "
        mov r1, 5
        mov r2, 5
        cmp r3, r1, r2
        beq r3, equal
        mov r0, 1
        nop
    equal:
        mov r0, 2
        nop
    ";
    let cpu = run_program(program, &config(2, BranchPredictor::Bimodal));

    assert_eq!(cpu.regs().read(0), 2, "wrong-path mov never commits");
    let stats = cpu.stats();
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.squashed_instructions, 4);
    assert_eq!(stats.cycles, 10);
    assert_eq!(stats.instructions_retired, 6);
}

/// An older instruction still waiting to commit survives a misprediction.
#[test]
fn test_misprediction_keeps_older_work() {
    let program = "
        cmp r1, 1, 1
        mov r5, 42
        beq r1, done
        mov r6, 1
    done:
        nop
    ";
    let cpu = run_program(program, &config(2, BranchPredictor::Static));

    assert_eq!(cpu.regs().read(5), 42, "mov is older than the branch");
    assert_eq!(cpu.regs().read(6), 0, "wrong-path mov never commits");
    let stats = cpu.stats();
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.squashed_instructions, 2);
    assert_eq!(stats.instructions_retired, 4, "cmp, mov, beq, nop");
    assert_eq!(stats.cycles, 5);
}

/// A speculative branch resolves against the last write to its status
/// register, not an earlier one still in flight.
#[test]
fn test_branch_waits_for_last_status_write() {
    let program = format!(
        "{}
        cmp r1, 1, 1
        cmp r1, 2, 1
        beq r1, bad
        mov r0, 5
        nop
    bad:
        mov r0, 9
        nop
    ",
        (2..8).map(|i| format!("mov r{i}, {i}\n")).collect::<String>()
    );
    let cpu = run_program(&program, &config(2, BranchPredictor::Static));

    assert_eq!(cpu.regs().read(1), Status::Gt.to_word());
    assert_eq!(cpu.regs().read(0), 5);
    let stats = cpu.stats();
    assert_eq!(stats.branch_predictions, 1);
    assert_eq!(stats.branch_predicted_correct, 1);
    assert_eq!(stats.branch_mispredictions, 0);
    assert_eq!(stats.squashed_instructions, 0);
}

/// Independent instructions never stall and retire one per lane per cycle.
#[rstest]
#[case(1, 11)]
#[case(2, 7)]
#[case(4, 5)]
fn test_independent_stream_never_stalls(#[case] lanes: usize, #[case] cycles: u64) {
    let mut config = config(lanes, BranchPredictor::Static);
    config.pipeline.writeback_width = lanes;
    let cpu = run_program(&independent_movs(8), &config);

    let stats = cpu.stats();
    assert_eq!(stats.stalls_data, 0);
    assert_eq!(stats.instructions_retired, 8);
    assert_eq!(stats.cycles, cycles, "three cycles of latency, then one per lane");
    for i in 0..8 {
        assert_eq!(cpu.regs().read(i), i as i32 + 1);
    }
}

/// A dependent instruction waits in decode until its producer has committed.
#[test]
fn test_raw_stall_until_commit() {
    let mut cpu = load_cpu("mov r1, 5\nadd r2, r1, 1\n", &config(1, BranchPredictor::Static))
        .expect("program should load");

    for _ in 0..3 {
        cpu.step().expect("cycle");
    }
    assert_eq!(cpu.occupancy().decode, 1, "add is stalled in decode");
    assert_eq!(cpu.occupancy().writeback, 1, "mov waits to commit");
    assert_eq!(cpu.regs().read(1), 0);
    assert_eq!(cpu.stats().stalls_data, 1);

    cpu.step().expect("cycle");
    assert!(cpu.regs().is_dirty(Reg::Gpr(1)), "mov committed this cycle");
    assert_eq!(cpu.regs().read(1), 5);
    assert_eq!(cpu.occupancy().alu, vec![1], "add dispatched in the same cycle");

    assert_eq!(cpu.run().expect("run"), RunState::Halted);
    assert_eq!(cpu.regs().read(2), 6, "add saw the committed value");
}

/// Dirty flags only cover writes from the current cycle.
#[test]
fn test_dirty_flags_reset_each_cycle() {
    let mut cpu = load_cpu("mov r1, 5\n", &config(1, BranchPredictor::Static))
        .expect("program should load");
    for _ in 0..4 {
        cpu.step().expect("cycle");
    }
    assert!(cpu.regs().is_dirty(Reg::Gpr(1)));

    let mut cpu = load_cpu("mov r1, 5\nmov r2, 6\n", &config(1, BranchPredictor::Static))
        .expect("program should load");
    for _ in 0..5 {
        cpu.step().expect("cycle");
    }
    assert!(!cpu.regs().is_dirty(Reg::Gpr(1)));
    assert!(cpu.regs().is_dirty(Reg::Gpr(2)));
}

/// A branch whose status is already committed resolves without prediction.
#[test]
fn test_certain_branch_taken() {
    let program = "
        mov r1, 3
        cmp r2, r1, 1
        mov r5, 0
        mov r6, 0
        mov r7, 0
        bgt r2, skip
        mov r3, 99
    skip:
        mov r4, 7
        nop
    ";
    let cpu = run_program(program, &config(1, BranchPredictor::Static));

    assert_eq!(cpu.regs().read(3), 0, "skipped instruction never runs");
    assert_eq!(cpu.regs().read(4), 7);
    let stats = cpu.stats();
    assert_eq!(stats.branch_certain_taken, 1);
    assert_eq!(stats.branch_predictions, 0);
    assert_eq!(stats.instructions_retired, 8);
    assert_eq!(stats.cycles, 11);
}

/// A counted loop ends with the right registers under every predictor.
#[rstest]
#[case(1, BranchPredictor::Static, 2)]
#[case(2, BranchPredictor::Static, 2)]
#[case(4, BranchPredictor::Static, 2)]
#[case(1, BranchPredictor::Btfn, 1)]
#[case(2, BranchPredictor::Btfn, 1)]
#[case(4, BranchPredictor::Btfn, 1)]
#[case(1, BranchPredictor::Bimodal, 2)]
#[case(2, BranchPredictor::Bimodal, 2)]
#[case(4, BranchPredictor::Bimodal, 2)]
fn test_countdown_loop(
    #[case] lanes: usize,
    #[case] predictor: BranchPredictor,
    #[case] mispredictions: u64,
) {
    let cpu = run_program(COUNTDOWN_LOOP, &config(lanes, predictor));

    assert_eq!(cpu.regs().read(1), 0);
    assert_eq!(cpu.regs().read(2), Status::Eq.to_word());

    let stats = cpu.stats();
    assert_eq!(stats.branch_predictions, 3);
    assert_eq!(stats.branch_mispredictions, mispredictions);
    assert_eq!(stats.branch_predicted_correct, 3 - mispredictions);
    assert_eq!(stats.inst_branch, 3);
    assert_eq!(stats.instructions_retired, 11);
    assert_eq!(cpu.pending_predictions().count(), 0);
}

/// A load issued after the store commits observes the stored value.
#[test]
fn test_store_then_load() {
    let program = "
        mov r1, 42
        stm r1, 0x100, 0
        ldm r2, 0x100, 0
        nop
    ";
    let cpu = run_program(program, &config(1, BranchPredictor::Static));

    assert_eq!(cpu.regs().read(2), 42);
    assert_eq!(cpu.memory().read_word(0x100), Ok(42));
    assert_eq!(cpu.stats().inst_memory, 2);
}

/// Vector loads, lane-wise add, and vector store through the vector lane.
#[test]
fn test_vector_pipeline() {
    let program = "
        vldm v0, data, 0
        vldm v1, data, 0
        vadd v2, v0, v1
        vstm v2, out, 0
        ldm r1, out, 12
        nop
    data:
        .word 1
        .word 2
        .word 3
        .word 4
    out:
        .word 0
        .word 0
        .word 0
        .word 0
    ";
    let cpu = run_program(program, &config(1, BranchPredictor::Static));

    assert_eq!(cpu.regs().read_vec(2), [2, 4, 6, 8]);
    assert_eq!(cpu.regs().read(1), 8);
    assert_eq!(cpu.memory().read_word(40), Ok(2));
    assert_eq!(cpu.stats().inst_vector, 4);
    assert_eq!(cpu.stats().cycles, 10);
}

/// A program without a final `nop` ends once every buffer drains.
#[test]
fn test_program_drains_without_nop() {
    let cpu = run_program("mov r1, 1\n", &config(2, BranchPredictor::Static));
    assert_eq!(cpu.regs().read(1), 1);
    assert!(cpu.is_halted());
}

/// An empty program halts after one cycle.
#[test]
fn test_empty_program() {
    let cpu = run_program("; nothing here\n", &Config::default());
    assert_eq!(cpu.stats().cycles, 1);
    assert_eq!(cpu.stats().instructions_retired, 0);
}

/// `nop` discards anything fetched behind it.
#[test]
fn test_nop_halts() {
    let cpu = run_program("mov r1, 1\nnop\nmov r1, 2\n", &config(2, BranchPredictor::Static));
    assert_eq!(cpu.regs().read(1), 1);
    assert_eq!(cpu.stats().inst_nop, 1);
}

/// Memory faults are raised when the faulting instruction commits.
#[test]
fn test_fault_raised_at_write_back() {
    let mut cpu = load_cpu("ldm r1, 2, 0\n", &config(1, BranchPredictor::Static))
        .expect("program should load");

    let err = cpu.run().expect_err("misaligned load");
    assert!(
        matches!(err, SimError::Memory(MemoryError::Misaligned(2))),
        "unexpected error: {err}"
    );
    assert_eq!(cpu.stats().cycles, 4, "fetch, decode, execute, write-back");
}

/// A faulting instruction on the wrong path is squashed before it can fault.
#[rstest]
#[case(1)]
#[case(2)]
fn test_wrong_path_fault_is_squashed(#[case] lanes: usize) {
    let program = "
        mov r1, 1
        cmp r2, r1, 1
        beq r2, ok
        ldm r3, 3, 0
        nop
    ok:
        mov r4, 9
        nop
    ";
    let cpu = run_program(program, &config(lanes, BranchPredictor::Static));
    assert_eq!(cpu.regs().read(4), 9);
    assert_eq!(cpu.regs().read(3), 0);
    assert_eq!(cpu.stats().branch_mispredictions, 1);
}

/// Undecodable text reaching decode is fatal.
#[test]
fn test_decode_failure_is_fatal() {
    let mut memory = Memory::new(64);
    memory
        .place_instruction(0, EncodedInstruction::new("frob r1"))
        .expect("address 0 is valid");
    let mut cpu = Cpu::new(memory, &Config::default());

    assert!(matches!(cpu.run(), Err(SimError::Decode(_))));
}

/// The configured cycle limit stops a program that never ends.
#[test]
fn test_cycle_limit() {
    let mut config = config(2, BranchPredictor::Bimodal);
    config.general.max_cycles = 50;
    let mut cpu = load_cpu("loop: jmp loop\n", &config).expect("program should load");

    let err = cpu.run().expect_err("infinite loop");
    assert!(matches!(err, SimError::CycleLimitExceeded(50)), "unexpected error: {err}");
    assert_eq!(cpu.stats().cycles, 50);
}

/// A breakpoint pauses before the cycle runs, and resuming finishes the run.
#[test]
fn test_breakpoint_pause_and_resume() {
    let config = config(2, BranchPredictor::Bimodal);
    let reference = run_program(COMPARE_AND_BRANCH, &config);

    let mut cpu = load_cpu(COMPARE_AND_BRANCH, &config).expect("program should load");
    cpu.add_breakpoint(3);
    cpu.add_breakpoint(6);
    assert!(cpu.should_pause_before_cycle(3));
    assert!(!cpu.should_pause_before_cycle(4));

    assert_eq!(cpu.run().expect("run"), RunState::Paused(3));
    assert_eq!(cpu.stats().cycles, 2);
    assert_eq!(cpu.run().expect("run"), RunState::Paused(6));
    assert_eq!(cpu.stats().cycles, 5);
    assert_eq!(cpu.run().expect("run"), RunState::Halted);

    assert_eq!(cpu.stats().cycles, reference.stats().cycles);
    assert_eq!(cpu.regs().read(0), reference.regs().read(0));
}

/// Statistics serialize to JSON without host-only fields.
#[test]
fn test_stats_serialize() {
    let cpu = run_program(COMPARE_AND_BRANCH, &config(2, BranchPredictor::Static));
    let json = serde_json::to_value(cpu.stats()).expect("stats serialize");

    assert_eq!(json["cycles"], 8);
    assert_eq!(json["instructions_retired"], 5);
    assert!(json.get("start_time").is_none());
}

/// The state dump lists the PC and registers.
#[test]
fn test_dump_state() {
    let cpu = run_program("mov r1, 0x2a\n", &config(1, BranchPredictor::Static));
    let dump = cpu.dump_state(false);
    assert!(dump.contains("PC = 0x0004"), "{dump}");
    assert!(dump.contains("r1 =0x0000002a"), "{dump}");
}
