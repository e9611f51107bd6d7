//! Simulation harness.
//!
//! Turns program text into a loaded [`Memory`](crate::soc::Memory) and a
//! [`Cpu`](crate::core::Cpu) ready to run.

/// Assembly text loader.
pub mod loader;

pub use loader::{build_cpu, load_cpu, Program, ProgramItem};
