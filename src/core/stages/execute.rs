use tracing::trace;

use crate::core::units;
use crate::core::Cpu;

/// Executes at most one instruction per ALU lane, per memory lane, and for
/// the vector lane, moving each to the write-back queue.
///
/// Results are only staged here. Faults travel with the instruction and are
/// raised when it commits.
pub fn execute_stage(cpu: &mut Cpu) {
    let Cpu { state, memory, .. } = cpu;

    let queues = state
        .alu
        .iter_mut()
        .chain(state.mem.iter_mut())
        .chain(std::iter::once(&mut state.vector));
    for queue in queues {
        let Some(mut inst) = queue.entries.pop_front() else {
            continue;
        };
        units::execute(&mut inst, memory);
        trace!(inst = %inst, outcome = ?inst.outcome, fault = ?inst.fault, "EX");
        state.writeback.entries.push_back(inst);
    }
}
