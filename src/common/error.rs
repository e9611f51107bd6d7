//! Simulator error definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Decode Errors:** Malformed or unknown instruction text.
//! 2. **Memory Errors:** Faults raised by loads and stores, carried on the
//!    in-flight instruction and reported when it reaches write-back.
//! 3. **Simulator Errors:** The top-level error, including the fatal
//!    prediction-order consistency check.
//!
//! Hazard stalls, mispredictions, and fetching past the end of the program are
//! ordinary control flow and are never reported through these types.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    /// An instruction could not be decoded.
    #[error("malformed instruction: {0}")]
    Decode(#[from] DecodeError),

    /// A committed instruction faulted on a memory access.
    #[error("memory fault: {0}")]
    Memory(#[from] MemoryError),

    /// A completed instruction was not the blocking instruction of the oldest
    /// pending prediction. This signals a scheduler bug and is never
    /// recoverable.
    #[error(
        "prediction resolved out of order: oldest prediction waits on #{expected}, but #{completed} completed"
    )]
    PredictionOrderViolation {
        /// Sequence id the oldest prediction is blocked on.
        expected: u64,
        /// Sequence id that actually completed write-back.
        completed: u64,
    },

    /// The run did not finish within the configured cycle budget.
    #[error("cycle limit of {0} exceeded")]
    CycleLimitExceeded(u64),

    /// Program text could not be loaded.
    #[error("{path}:{line}: {source}")]
    Load {
        /// Source file, or `<memory>` for in-memory programs.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying problem.
        #[source]
        source: DecodeError,
    },

    /// The program does not fit in the configured memory.
    #[error("program needs {needed} bytes but memory holds {available}")]
    ProgramTooLarge {
        /// Bytes needed by instructions and data words.
        needed: u32,
        /// Configured memory size.
        available: u32,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure while reading a program or configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while turning instruction text into a decoded instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The mnemonic is not part of the instruction set.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// Wrong number of operands for the mnemonic.
    #[error("`{mnemonic}` expects {expected} operand(s), found {found}")]
    OperandCount {
        /// Mnemonic being decoded.
        mnemonic: &'static str,
        /// Number of operands the form requires.
        expected: usize,
        /// Number of operands present.
        found: usize,
    },

    /// Operand is neither a register nor a number.
    #[error("invalid operand `{0}`")]
    InvalidOperand(String),

    /// Operand names a register outside the register file.
    #[error("register `{0}` does not exist")]
    InvalidRegister(String),

    /// A register of the wrong class (scalar vs vector) was used.
    #[error("operand `{operand}` must be a {expected} register")]
    RegisterClass {
        /// Offending operand text.
        operand: String,
        /// Expected register class.
        expected: &'static str,
    },

    /// A label was referenced but never defined.
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    /// The same label was defined twice.
    #[error("duplicate label `{0}`")]
    DuplicateLabel(String),
}

/// Faults raised by memory accesses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Address lies outside the configured memory.
    #[error("address {0:#x} is out of bounds")]
    OutOfBounds(i64),

    /// Address is not aligned to a cell boundary.
    #[error("address {0:#x} is not 4-byte aligned")]
    Misaligned(i64),

    /// A data access hit a cell that holds an instruction.
    #[error("address {0:#x} holds an instruction, not data")]
    NotData(u32),
}

/// Type alias for Result with [`SimError`].
pub type SimResult<T> = Result<T, SimError>;
