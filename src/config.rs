//! Simulator configuration.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or `Config::default()`) describes a two-lane core with a
//! bimodal predictor and 4 KiB of memory.

use serde::Deserialize;

use crate::common::{SimError, SimResult, INSTRUCTION_WIDTH};

const DEFAULT_LANES: usize = 2;
const DEFAULT_WRITEBACK_WIDTH: usize = 1;
const DEFAULT_MEMORY_SIZE: u32 = 4096;
const DEFAULT_MAX_CYCLES: u64 = 1_000_000;

const DEFAULT_BIMODAL_TABLE_SIZE: usize = 256;
const DEFAULT_COUNTER_BITS: u8 = 2;
const MAX_COUNTER_BITS: u8 = 8;

/// Root configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tracing and run limits.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Lane counts and branch prediction.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Main memory size.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] on syntax errors or invalid values.
    pub fn from_toml(text: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] describing the first invalid value.
    pub fn validate(&self) -> SimResult<()> {
        if self.pipeline.lanes == 0 {
            return Err(SimError::Config("pipeline.lanes must be at least 1".into()));
        }
        if self.pipeline.writeback_width == 0 {
            return Err(SimError::Config(
                "pipeline.writeback_width must be at least 1".into(),
            ));
        }
        let bits = self.pipeline.bimodal.counter_bits;
        if bits == 0 || bits > MAX_COUNTER_BITS {
            return Err(SimError::Config(format!(
                "pipeline.bimodal.counter_bits must be in 1..={MAX_COUNTER_BITS}, got {bits}"
            )));
        }
        if self.pipeline.bimodal.table_size == 0 {
            return Err(SimError::Config(
                "pipeline.bimodal.table_size must be at least 1".into(),
            ));
        }
        if self.memory.size_bytes == 0 || self.memory.size_bytes % INSTRUCTION_WIDTH != 0 {
            return Err(SimError::Config(format!(
                "memory.size_bytes must be a non-zero multiple of {INSTRUCTION_WIDTH}"
            )));
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Emit per-stage trace events.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Abort the run after this many cycles.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            max_cycles: default_max_cycles(),
        }
    }
}

/// Branch prediction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Always predict not taken.
    Static,
    /// Backward taken, forward not taken.
    #[serde(alias = "BTFN")]
    Btfn,
    /// Per-address saturating counters.
    #[default]
    Bimodal,
}

impl std::str::FromStr for BranchPredictor {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "btfn" => Ok(Self::Btfn),
            "bimodal" => Ok(Self::Bimodal),
            other => Err(SimError::Config(format!("unknown branch predictor `{other}`"))),
        }
    }
}

/// Pipeline shape.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of parallel fetch/decode lanes, and of ALU and memory lanes.
    #[serde(default = "default_lanes")]
    pub lanes: usize,

    /// Instructions committed per cycle.
    #[serde(default = "default_writeback_width")]
    pub writeback_width: usize,

    /// Predictor used for speculative branches.
    #[serde(default)]
    pub branch_predictor: BranchPredictor,

    /// Bimodal predictor parameters.
    #[serde(default)]
    pub bimodal: BimodalConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            writeback_width: default_writeback_width(),
            branch_predictor: BranchPredictor::default(),
            bimodal: BimodalConfig::default(),
        }
    }
}

/// Bimodal predictor parameters.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BimodalConfig {
    /// Number of counters.
    #[serde(default = "d_b_size")]
    pub table_size: usize,

    /// Width of each saturating counter.
    #[serde(default = "d_b_bits")]
    pub counter_bits: u8,
}

impl Default for BimodalConfig {
    fn default() -> Self {
        Self {
            table_size: d_b_size(),
            counter_bits: d_b_bits(),
        }
    }
}

/// Main memory settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Memory size in bytes.
    #[serde(default = "default_memory_size")]
    pub size_bytes: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: default_memory_size(),
        }
    }
}

fn default_max_cycles() -> u64 {
    DEFAULT_MAX_CYCLES
}

fn default_lanes() -> usize {
    DEFAULT_LANES
}

fn default_writeback_width() -> usize {
    DEFAULT_WRITEBACK_WIDTH
}

fn default_memory_size() -> u32 {
    DEFAULT_MEMORY_SIZE
}

fn d_b_size() -> usize {
    DEFAULT_BIMODAL_TABLE_SIZE
}

fn d_b_bits() -> u8 {
    DEFAULT_COUNTER_BITS
}
