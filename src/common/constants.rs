//! Machine constants.

/// Size of one memory cell and of one encoded instruction, in bytes.
pub const INSTRUCTION_WIDTH: u32 = 4;

/// Number of scalar general-purpose registers (`r0`..`r31`).
pub const NUM_GPRS: usize = 32;

/// Number of vector registers (`v0`..`v7`).
pub const NUM_VREGS: usize = 8;

/// Number of 32-bit lanes in one vector register.
pub const VECTOR_LANES: usize = 4;
