//! Instruction set definitions and the text decoder.
//!
//! The pipeline only depends on the capability set exposed here: decoding
//! fetched text against a register snapshot, and querying a decoded
//! instruction for its destination and source registers.

/// Assembly text decoder.
pub mod decode;

/// Encoded and decoded instruction representations.
pub mod instruction;

pub use decode::decode;
pub use instruction::{
    ArithOp, Condition, DecodedInstruction, EncodedInstruction, FetchedInstruction, InstId,
    Opcode, Operand, Operation, Outcome, UnitKind, VectorOp, VectorOperand,
};
