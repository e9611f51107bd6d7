//! Pipeline Latch Interface.
//!
//! Defines the common behaviour of the inter-stage buffers. This allows the
//! scheduler and the branch speculation unit to flush, drain-check, and size
//! every buffer uniformly.

/// Represents a pipeline buffer between two stages.
pub trait PipelineLatch {
    /// Discards every entry and returns how many were dropped.
    ///
    /// Called when a taken branch redirects fetch or a misprediction squashes
    /// the speculative stream.
    fn flush(&mut self) -> usize;

    /// Checks if the latch is empty.
    fn is_empty(&self) -> bool;

    /// Number of buffered instructions.
    fn len(&self) -> usize;
}
