use tracing::trace;

use crate::common::INSTRUCTION_WIDTH;
use crate::core::pipeline::PipelineLatch;
use crate::core::Cpu;
use crate::isa::FetchedInstruction;
use crate::soc::Cell;

/// Fetches one instruction for `lane` into the shared decode queue.
///
/// Does nothing when the decode queue already holds more entries than there
/// are lanes, or when the PC points at a data cell or past the end of
/// memory. The latter is how a program ends: fetch goes quiet and the
/// pipeline drains.
pub fn fetch_stage(cpu: &mut Cpu, lane: usize) {
    if cpu.state.decode.len() > cpu.lanes() {
        cpu.stats.stalls_fetch += 1;
        trace!(lane, "IF  decode queue full");
        return;
    }

    let pc = cpu.state.pc;
    let Some(Cell::Instruction(encoded)) = cpu.memory.read_cell(pc) else {
        trace!(lane, pc, "IF  no instruction");
        return;
    };
    let encoded = encoded.clone();
    let id = cpu.next_inst_id();

    trace!(lane, pc, %id, text = encoded.text(), "IF");
    cpu.state.decode.entries.push_back(FetchedInstruction {
        id,
        address: pc,
        encoded,
    });
    cpu.state.pc = pc.wrapping_add(INSTRUCTION_WIDTH);
}
