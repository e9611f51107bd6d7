//! Superscalar Pipeline Simulator Library.
//!
//! This crate implements a cycle-accurate model of an N-wide superscalar
//! processor with in-order issue, per-lane execution queues, a single
//! shared write-back queue, and speculative branch execution.
//!
//! # Architecture
//!
//! * **Core**: Four stages (Fetch, Decode, Execute, Write-back) run in
//!   reverse order each cycle. Decode stalls on any read-after-write hazard;
//!   there is no forwarding.
//! * **Speculation**: Branches resolve inside decode. A branch whose status
//!   register is still in flight is predicted, and the prediction is checked
//!   when the producer commits. A misprediction squashes everything younger
//!   than the branch.
//! * **Predictors**: Static not-taken, backward-taken/forward-not-taken, and
//!   bimodal saturating counters.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: CPU core, pipeline buffers, stages, and functional units.
//! * `isa`: Instruction representation and the text decoder.
//! * `sim`: Program loader.
//! * `soc`: Main memory.
//! * `stats`: Performance statistics collection.

/// Shared types, constants, error handling, and register definitions.
pub mod common;

/// Configuration for lanes, predictor, memory, and run limits.
///
/// Loads and validates TOML configuration files.
pub mod config;

/// CPU core implementation including pipeline stages and execution units.
pub mod core;

/// Instruction definitions and the assembly text decoder.
pub mod isa;

/// Program loading.
pub mod sim;

/// Main memory.
pub mod soc;

/// Performance statistics collection and reporting.
///
/// Tracks cycle counts, instruction mix, stalls, and branch outcomes.
pub mod stats;
