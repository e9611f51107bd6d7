//! Functional units.
//!
//! This module dispatches a decoded instruction to the unit that computes
//! its result, and later applies that staged result to architectural state.
//! 1. **Execute:** compute an [`Outcome`] (or a fault) without touching
//!    registers or memory.
//! 2. **Commit:** write the staged outcome to the register file or memory.

/// Arithmetic Logic Unit.
pub mod alu;

/// Branch resolution unit (predictors and speculation).
pub mod bru;

/// Load/Store Unit.
pub mod lsu;

/// Vector Processing Unit.
pub mod vpu;

use crate::common::{MemoryError, RegisterFile, INSTRUCTION_WIDTH};
use crate::isa::{DecodedInstruction, Operation, Outcome};
use crate::soc::Memory;

use self::{alu::Alu, lsu::Lsu, vpu::Vpu};

/// Computes the instruction's outcome and stages it on the instruction.
///
/// A memory fault is stored in `inst.fault` and raised when the instruction
/// reaches write-back.
pub fn execute(inst: &mut DecodedInstruction, memory: &Memory) {
    let result = match &inst.op {
        Operation::Arith { op, rd, lhs, rhs } => Ok(Outcome::WriteReg(
            *rd,
            Alu::execute(*op, lhs.value(), rhs.value()),
        )),
        Operation::Mov { rd, src } => Ok(Outcome::WriteReg(*rd, src.value())),
        Operation::Cmp { rd, lhs, rhs } => {
            Ok(Outcome::WriteReg(*rd, Alu::compare(lhs.value(), rhs.value())))
        }
        Operation::Load { rd, base, offset } => Lsu::load(memory, *rd, base, offset),
        Operation::Store {
            value,
            base,
            offset,
        } => Lsu::store(memory, value.value(), base, offset),
        Operation::VectorLoad { vd, base, offset } => Vpu::load(memory, *vd, base, offset),
        Operation::VectorStore {
            value,
            base,
            offset,
        } => Vpu::store(memory, value.value, base, offset),
        Operation::VectorArith { op, vd, lhs, rhs } => Ok(Outcome::WriteVec(
            *vd,
            Vpu::execute(*op, lhs.value, rhs.value),
        )),
        Operation::Branch { .. } | Operation::Jump { .. } | Operation::Nop => Ok(Outcome::Nothing),
    };

    match result {
        Ok(outcome) => inst.outcome = Some(outcome),
        Err(fault) => inst.fault = Some(fault),
    }
}

/// Applies a staged outcome to architectural state.
///
/// # Errors
///
/// Returns the fault a store raises on an invalid address.
pub fn commit(
    outcome: Outcome,
    regs: &mut RegisterFile,
    memory: &mut Memory,
) -> Result<(), MemoryError> {
    match outcome {
        Outcome::WriteReg(rd, value) => regs.write(rd as usize, value),
        Outcome::WriteVec(vd, value) => regs.write_vec(vd as usize, value),
        Outcome::Store(address, value) => memory.write_word(i64::from(address), value)?,
        Outcome::StoreVec(address, value) => {
            for (i, word) in value.into_iter().enumerate() {
                let lane = i64::from(address) + i as i64 * i64::from(INSTRUCTION_WIDTH);
                memory.write_word(lane, word)?;
            }
        }
        Outcome::Nothing => {}
    }
    Ok(())
}
