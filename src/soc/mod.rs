//! Memory system.
//!
//! The simulated core talks to a single flat, cell-addressed main memory.

/// Main memory holding instruction and data cells.
pub mod memory;

pub use memory::{Cell, Memory};
