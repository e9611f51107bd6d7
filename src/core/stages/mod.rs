//! Pipeline stages.
//!
//! Each stage is a free function over the [`Cpu`](crate::core::Cpu). The
//! scheduler calls them in reverse pipeline order (write-back, execute,
//! decode, fetch) so that a value committed this cycle is visible to decode
//! in the same cycle, and no instruction advances more than one stage.

/// Instruction decode, hazard check, and dispatch.
pub mod decode;

/// Execution lanes.
pub mod execute;

/// Instruction fetch.
pub mod fetch;

/// Commit.
pub mod write_back;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use write_back::wb_stage;
