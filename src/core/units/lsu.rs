//! Load/Store Unit (LSU).
//!
//! Computes effective addresses and performs the memory side of the scalar
//! memory lanes. Loads read memory at execute; stores are validated at
//! execute but only written when the instruction commits.

use crate::common::{MemoryError, Word};
use crate::isa::{Operand, Outcome};
use crate::soc::Memory;

/// Scalar load/store unit.
pub struct Lsu;

impl Lsu {
    /// Effective address `base + offset`, computed without wrapping so that
    /// negative or overflowing addresses fault instead of aliasing.
    pub fn effective_address(base: &Operand, offset: &Operand) -> i64 {
        i64::from(base.value()) + i64::from(offset.value())
    }

    /// Executes `ldm`.
    ///
    /// # Errors
    ///
    /// Faults on misaligned, out-of-range, or non-data addresses.
    pub fn load(
        memory: &Memory,
        rd: u8,
        base: &Operand,
        offset: &Operand,
    ) -> Result<Outcome, MemoryError> {
        let value = memory.read_word(Self::effective_address(base, offset))?;
        Ok(Outcome::WriteReg(rd, value))
    }

    /// Executes `stm`, staging the write for commit.
    ///
    /// # Errors
    ///
    /// Faults on misaligned or out-of-range addresses.
    pub fn store(
        memory: &Memory,
        value: Word,
        base: &Operand,
        offset: &Operand,
    ) -> Result<Outcome, MemoryError> {
        let address = memory.check_address(Self::effective_address(base, offset))?;
        Ok(Outcome::Store(address, value))
    }
}
