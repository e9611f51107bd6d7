use tracing::{info, trace};

use crate::common::SimResult;
use crate::core::pipeline::hazards::{detect_hazard, youngest_hazard};
use crate::core::pipeline::PipelineLatch;
use crate::core::Cpu;
use crate::isa::{decode, UnitKind};

/// Decodes the head of the decode queue for `lane` and dispatches it.
///
/// The head is re-decoded every cycle against the current register file, so
/// a stalled instruction picks up committed values once its producer
/// retires. A stalled head stays in place.
///
/// # Returns
///
/// `true` if an instruction was dispatched to an execution lane. Any other
/// result (empty queue, stall, branch, barrier) ends decode for the cycle.
///
/// # Errors
///
/// Fails if the head's text cannot be decoded.
pub fn decode_stage(cpu: &mut Cpu, lane: usize) -> SimResult<bool> {
    let Some(fetched) = cpu.state.decode.entries.front() else {
        return Ok(false);
    };
    let inst = decode(fetched, &cpu.regs)?;

    if inst.is_nop() {
        if !cpu.state.backend_empty() {
            cpu.stats.stalls_barrier += 1;
            trace!(lane, inst = %inst, "ID  barrier waiting for pipeline to drain");
            return Ok(false);
        }
        cpu.state.decode.flush();
        cpu.stats.record_retired(UnitKind::Barrier);
        cpu.halt();
        info!(inst = %inst, cycle = cpu.stats.cycles, "halt");
        return Ok(false);
    }

    let blocking = detect_hazard(&inst, &cpu.state).map(|producer| producer.id);
    if let Some(blocking) = blocking {
        if inst.is_branch() {
            let last_writer =
                youngest_hazard(&inst, &cpu.state).map_or(blocking, |producer| producer.id);
            cpu.state.decode.entries.pop_front();
            cpu.branch_unit
                .predict_and_execute(inst, last_writer, &mut cpu.state, &mut cpu.stats);
        } else {
            cpu.stats.stalls_data += 1;
            trace!(lane, inst = %inst, %blocking, "ID  data hazard");
        }
        return Ok(false);
    }

    cpu.state.decode.entries.pop_front();
    trace!(lane, inst = %inst, unit = ?inst.unit(), "ID  dispatch");
    match inst.unit() {
        UnitKind::Branch => {
            cpu.branch_unit
                .execute(&inst, &mut cpu.state, &mut cpu.stats);
            return Ok(false);
        }
        UnitKind::Alu => cpu.state.alu[lane].entries.push_back(inst),
        UnitKind::Memory => cpu.state.mem[lane].entries.push_back(inst),
        UnitKind::Vector => cpu.state.vector.entries.push_back(inst),
        UnitKind::Barrier => return Ok(false),
    }
    Ok(true)
}
