use tracing::trace;

use crate::common::SimResult;
use crate::core::units;
use crate::core::Cpu;

/// Commits up to the configured write-back width, oldest first.
///
/// Each commit applies the staged outcome, counts the instruction as
/// retired, then notifies the branch speculation unit if a prediction is
/// listening on it. A misprediction empties the write-back queue, which ends
/// the loop.
///
/// # Errors
///
/// Raises a fault carried from execute, or a prediction-order violation.
pub fn wb_stage(cpu: &mut Cpu) -> SimResult<()> {
    for _ in 0..cpu.writeback_width() {
        let Some(inst) = cpu.state.writeback.entries.pop_front() else {
            break;
        };
        if let Some(fault) = inst.fault {
            return Err(fault.into());
        }
        if let Some(outcome) = inst.outcome {
            units::commit(outcome, &mut cpu.regs, &mut cpu.memory)?;
        }
        cpu.stats.record_retired(inst.unit());
        trace!(inst = %inst, outcome = ?inst.outcome, "WB");

        if cpu.branch_unit.is_listening(inst.id) {
            cpu.branch_unit
                .on_write_back(inst.id, &cpu.regs, &mut cpu.state, &mut cpu.stats)?;
        }
    }
    Ok(())
}
