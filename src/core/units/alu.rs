//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the scalar ALU used by the ALU lanes. All
//! arithmetic wraps on overflow, matching 32-bit two's complement hardware.

use crate::common::{Status, Word};
use crate::isa::ArithOp;

/// Scalar arithmetic and comparison.
pub struct Alu;

impl Alu {
    /// Executes a scalar arithmetic operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation to perform
    /// * `a` - Left operand
    /// * `b` - Right operand
    ///
    /// # Returns
    ///
    /// The wrapped 32-bit result.
    pub fn execute(op: ArithOp, a: Word, b: Word) -> Word {
        match op {
            ArithOp::Add => a.wrapping_add(b),
            ArithOp::Sub => a.wrapping_sub(b),
            ArithOp::Mul => a.wrapping_mul(b),
        }
    }

    /// Signed comparison, encoded as a status word for the destination
    /// register.
    pub fn compare(a: Word, b: Word) -> Word {
        Status::compare(a, b).to_word()
    }
}
