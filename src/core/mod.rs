//! Superscalar core.
//!
//! This module contains the processor model: the [`Cpu`] and its per-cycle
//! scheduler, the inter-stage buffers and hazard detector, the pipeline
//! stages, and the functional units including branch speculation.

/// CPU state and the per-cycle scheduler.
pub mod cpu;

/// Inter-stage buffers and hazard detection.
pub mod pipeline;

/// Fetch, decode, execute, and write-back.
pub mod stages;

/// ALU, load/store, vector, and branch units.
pub mod units;

pub use cpu::{Cpu, Occupancy, RunState};
