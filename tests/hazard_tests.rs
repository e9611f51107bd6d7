//! Tests for read-after-write hazard detection.

mod common;

use common::decoded;
use superscalar_sim::core::pipeline::hazards::{detect_hazard, find_hazard, youngest_hazard};
use superscalar_sim::core::pipeline::PipelineState;
use superscalar_sim::isa::InstId;

/// An instruction reading a register written by an in-flight producer stalls.
#[test]
fn test_raw_dependency_is_a_hazard() {
    let producer = decoded(1, 0, "mov r1, 5");
    let consumer = decoded(2, 4, "add r2, r1, 1");

    let hit = find_hazard(&consumer, [&producer]);
    assert_eq!(hit.map(|p| p.id), Some(InstId(1)));
}

/// Instructions with no destination register never cause a hazard.
#[test]
fn test_store_is_never_a_producer() {
    let store = decoded(1, 0, "stm r1, 0x100, 0");
    let consumer = decoded(2, 4, "add r2, r1, r1");

    assert!(find_hazard(&consumer, [&store]).is_none());
}

/// An instruction without source registers never stalls.
#[test]
fn test_no_sources_never_stalls() {
    let producer = decoded(1, 0, "mov r1, 5");
    let consumer = decoded(2, 4, "mov r1, 7");

    assert!(find_hazard(&consumer, [&producer]).is_none());
}

/// All three sources of a store are checked, including the offset register.
#[test]
fn test_store_offset_register_is_a_source() {
    let producer = decoded(1, 0, "mov r9, 4");
    let store = decoded(2, 4, "stm r1, r2, r9");

    assert_eq!(find_hazard(&store, [&producer]).map(|p| p.id), Some(InstId(1)));
}

/// Scalar and vector register files do not alias.
#[test]
fn test_vector_and_scalar_registers_are_distinct() {
    let producer = decoded(1, 0, "vldm v1, 0x100, 0");
    let consumer = decoded(2, 4, "add r2, r1, 1");
    assert!(find_hazard(&consumer, [&producer]).is_none());

    let vector_consumer = decoded(3, 8, "vadd v2, v1, v1");
    assert_eq!(
        find_hazard(&vector_consumer, [&producer]).map(|p| p.id),
        Some(InstId(1))
    );
}

/// Within one buffer the oldest matching producer is reported.
#[test]
fn test_oldest_producer_first() {
    let mut state = PipelineState::new(2, 0);
    state.writeback.entries.push_back(decoded(3, 0, "mov r1, 1"));
    state.writeback.entries.push_back(decoded(5, 4, "mov r1, 2"));

    let consumer = decoded(9, 8, "cmp r2, r1, 0");
    assert_eq!(detect_hazard(&consumer, &state).map(|p| p.id), Some(InstId(3)));
}

/// The youngest producer is found regardless of which buffer holds it.
#[test]
fn test_youngest_producer() {
    let mut state = PipelineState::new(2, 0);
    state.writeback.entries.push_back(decoded(3, 0, "cmp r1, 1, 1"));
    state.alu[0].entries.push_back(decoded(4, 4, "cmp r1, 2, 1"));
    state.alu[1].entries.push_back(decoded(5, 8, "mov r7, 1"));

    let branch = decoded(6, 12, "beq r1, 0x40");
    assert_eq!(detect_hazard(&branch, &state).map(|p| p.id), Some(InstId(4)));

    state.mem[0].entries.push_back(decoded(2, 16, "ldm r1, 0x100, 0"));
    assert_eq!(detect_hazard(&branch, &state).map(|p| p.id), Some(InstId(2)));
    assert_eq!(youngest_hazard(&branch, &state).map(|p| p.id), Some(InstId(4)));

    state.alu[0].entries.clear();
    state.mem[0].entries.clear();
    assert_eq!(youngest_hazard(&branch, &state).map(|p| p.id), Some(InstId(3)));

    state.writeback.entries.clear();
    assert!(youngest_hazard(&branch, &state).is_none());
}

/// Buffers are scanned memory lanes first, then ALU lanes, vector, write-back.
#[test]
fn test_scan_priority_order() {
    let mut state = PipelineState::new(2, 0);
    state.writeback.entries.push_back(decoded(1, 0, "mov r1, 1"));
    state.vector.entries.push_back(decoded(2, 4, "vldm v0, 0x100, 0"));
    state.alu[1].entries.push_back(decoded(3, 8, "add r1, r5, 1"));
    state.mem[1].entries.push_back(decoded(4, 12, "ldm r1, 0x100, 0"));

    let consumer = decoded(9, 16, "add r2, r1, 1");
    assert_eq!(
        detect_hazard(&consumer, &state).map(|p| p.id),
        Some(InstId(4)),
        "memory lanes take priority"
    );

    state.mem[1].entries.clear();
    assert_eq!(
        detect_hazard(&consumer, &state).map(|p| p.id),
        Some(InstId(3)),
        "then ALU lanes"
    );

    state.alu[1].entries.clear();
    assert_eq!(
        detect_hazard(&consumer, &state).map(|p| p.id),
        Some(InstId(1)),
        "vector producer writes v0, so the write-back entry is next"
    );

    state.writeback.entries.clear();
    assert!(detect_hazard(&consumer, &state).is_none());
}

/// Instructions still in the decode queue are not producers.
#[test]
fn test_decode_queue_is_not_scanned() {
    use superscalar_sim::isa::{EncodedInstruction, FetchedInstruction};

    let mut state = PipelineState::new(1, 0);
    state.decode.entries.push_back(FetchedInstruction {
        id: InstId(1),
        address: 0,
        encoded: EncodedInstruction::new("mov r1, 1"),
    });

    let consumer = decoded(2, 4, "add r2, r1, 1");
    assert!(detect_hazard(&consumer, &state).is_none());
}
