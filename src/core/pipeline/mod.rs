//! Instruction pipeline.
//!
//! This module contains the inter-stage buffers and the hazard detector
//! used by the four-stage (fetch, decode, execute, write-back) scheduler.

/// Read-after-write hazard detection.
pub mod hazards;

/// Inter-stage buffers (decode, lane, and write-back queues).
pub mod latches;

/// Traits for pipeline buffers.
pub mod traits;

pub use latches::{DecodeQueue, ExecQueue, PipelineState, WriteBackQueue};
pub use traits::PipelineLatch;
