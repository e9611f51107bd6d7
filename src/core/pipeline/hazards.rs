//! Data Hazard Detection.
//!
//! Decides whether an instruction may leave decode. There is no forwarding
//! and no renaming: a read-after-write dependency on any in-flight producer
//! stalls the consumer until the producer commits. Memory address aliasing
//! between stores and loads is not tracked; only register dependencies stall.

use super::latches::PipelineState;
use crate::isa::DecodedInstruction;

/// Returns the first instruction in `in_flight` whose destination register is
/// one of `candidate`'s source registers.
///
/// Instructions without a destination never match, and a candidate without
/// source registers never stalls.
pub fn find_hazard<'a, I>(candidate: &DecodedInstruction, in_flight: I) -> Option<&'a DecodedInstruction>
where
    I: IntoIterator<Item = &'a DecodedInstruction>,
{
    in_flight.into_iter().find(|producer| candidate.depends_on(producer))
}

/// Scans every post-decode buffer for a producer `candidate` must wait on.
///
/// Buffers are searched in priority order: memory lanes, ALU lanes, the
/// vector queue, then the write-back queue.
pub fn detect_hazard<'a>(
    candidate: &DecodedInstruction,
    state: &'a PipelineState,
) -> Option<&'a DecodedInstruction> {
    find_hazard(candidate, state.hazard_scan_order())
}

/// Returns the youngest in-flight producer `candidate` depends on.
///
/// A speculative branch listens on this instruction: once it commits, no
/// older write to the branch's status register can still be pending.
pub fn youngest_hazard<'a>(
    candidate: &DecodedInstruction,
    state: &'a PipelineState,
) -> Option<&'a DecodedInstruction> {
    state
        .hazard_scan_order()
        .filter(|producer| candidate.depends_on(producer))
        .max_by_key(|producer| producer.id)
}
