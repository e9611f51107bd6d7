//! Vector Processing Unit (VPU).
//!
//! The single vector lane. Vectors are [`VECTOR_LANES`] words wide and live
//! in consecutive memory cells starting at the effective address.

use crate::common::{MemoryError, VectorWord, INSTRUCTION_WIDTH, VECTOR_LANES};
use crate::isa::{Operand, Outcome, VectorOp};
use crate::soc::Memory;

use super::lsu::Lsu;

/// Vector arithmetic and memory unit.
pub struct Vpu;

impl Vpu {
    /// Lane-wise arithmetic.
    pub fn execute(op: VectorOp, a: VectorWord, b: VectorWord) -> VectorWord {
        let mut out = [0; VECTOR_LANES];
        for (i, lane) in out.iter_mut().enumerate() {
            *lane = match op {
                VectorOp::Add => a[i].wrapping_add(b[i]),
                VectorOp::Mul => a[i].wrapping_mul(b[i]),
            };
        }
        out
    }

    /// Executes `vldm`.
    ///
    /// # Errors
    ///
    /// Faults if any of the cells is misaligned, out of range, or not data.
    pub fn load(
        memory: &Memory,
        vd: u8,
        base: &Operand,
        offset: &Operand,
    ) -> Result<Outcome, MemoryError> {
        let start = Lsu::effective_address(base, offset);
        let mut value = [0; VECTOR_LANES];
        for (i, lane) in value.iter_mut().enumerate() {
            *lane = memory.read_word(start + lane_offset(i))?;
        }
        Ok(Outcome::WriteVec(vd, value))
    }

    /// Executes `vstm`, staging the write for commit.
    ///
    /// # Errors
    ///
    /// Faults if any of the cells is misaligned or out of range.
    pub fn store(
        memory: &Memory,
        value: VectorWord,
        base: &Operand,
        offset: &Operand,
    ) -> Result<Outcome, MemoryError> {
        let start = Lsu::effective_address(base, offset);
        let address = memory.check_address(start)?;
        memory.check_address(start + lane_offset(VECTOR_LANES - 1))?;
        Ok(Outcome::StoreVec(address, value))
    }
}

fn lane_offset(lane: usize) -> i64 {
    lane as i64 * i64::from(INSTRUCTION_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_wise_arithmetic() {
        assert_eq!(
            Vpu::execute(VectorOp::Add, [1, 2, 3, 4], [10, 20, 30, 40]),
            [11, 22, 33, 44]
        );
        assert_eq!(
            Vpu::execute(VectorOp::Mul, [1, 2, 3, 4], [2, 2, 2, i32::MAX]),
            [2, 4, 6, -2]
        );
    }
}
