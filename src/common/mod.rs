//! Common utilities and types used throughout the superscalar simulator.
//!
//! This module provides the fundamental types shared by the pipeline, the
//! execution units, and the loader: machine constants, the comparison status
//! word, error handling, and the register file.

/// Machine constants (instruction width, register counts, vector lanes).
pub mod constants;

/// Comparison status values written by `CMP` and read by branches.
pub mod data;

/// Error types for decoding, memory access, and pipeline consistency.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use data::Status;
pub use error::{DecodeError, MemoryError, SimError, SimResult};
pub use reg::{Reg, RegisterFile, VectorWord, Word};

pub use constants::{INSTRUCTION_WIDTH, NUM_GPRS, NUM_VREGS, VECTOR_LANES};
