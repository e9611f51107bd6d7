use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::pipeline::{PipelineLatch, PipelineState};
use super::stages;
use super::units::bru::{BranchUnit, Prediction};
use crate::common::{RegisterFile, SimError, SimResult};
use crate::config::Config;
use crate::isa::InstId;
use crate::soc::Memory;
use crate::stats::SimStats;

/// Why [`Cpu::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The program halted on a `nop` or the pipeline drained.
    Halted,
    /// A breakpoint was reached; the given cycle has not been simulated yet.
    Paused(u64),
}

/// Buffer occupancy snapshot, for inspection between cycles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Occupancy {
    pub decode: usize,
    pub alu: Vec<usize>,
    pub mem: Vec<usize>,
    pub vector: usize,
    pub writeback: usize,
}

/// The superscalar core: architectural state, pipeline buffers, branch
/// speculation unit, and the per-cycle scheduler.
pub struct Cpu {
    pub regs: RegisterFile,
    pub memory: Memory,
    pub state: PipelineState,
    pub branch_unit: BranchUnit,
    pub stats: SimStats,

    lanes: usize,
    writeback_width: usize,
    max_cycles: u64,
    next_id: u64,
    halted: bool,
    breakpoints: BTreeSet<u64>,
    paused_at: Option<u64>,
}

impl Cpu {
    /// Creates a core that fetches from address 0 of `memory`.
    pub fn new(memory: Memory, config: &Config) -> Self {
        let lanes = config.pipeline.lanes.max(1);
        Self {
            regs: RegisterFile::new(),
            memory,
            state: PipelineState::new(lanes, 0),
            branch_unit: BranchUnit::new(&config.pipeline),
            stats: SimStats::default(),
            lanes,
            writeback_width: config.pipeline.writeback_width.max(1),
            max_cycles: config.general.max_cycles,
            next_id: 0,
            halted: false,
            breakpoints: BTreeSet::new(),
            paused_at: None,
        }
    }

    /// Simulates one clock cycle.
    ///
    /// Stage order within a cycle:
    /// 1. Clear the register file's dirty flags and count the cycle.
    /// 2. Write-back.
    /// 3. Execute every lane.
    /// 4. Decode lane by lane, stopping at the first lane that does not
    ///    dispatch.
    /// 5. Fetch lane by lane, unless decode halted the program.
    ///
    /// After the cycle the core is finished if a `nop` halted it or every
    /// buffer is empty. Ticking a finished core does nothing.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a decode failure, a memory fault
    /// reaching write-back, a prediction-order violation, or exceeding the
    /// configured cycle limit.
    pub fn tick(&mut self) -> SimResult<()> {
        if self.halted {
            return Ok(());
        }
        if self.stats.cycles >= self.max_cycles {
            return Err(SimError::CycleLimitExceeded(self.max_cycles));
        }

        self.regs.commit_dirty_reset();
        self.stats.cycles += 1;
        trace!(cycle = self.stats.cycles, pc = self.state.pc, "cycle");

        stages::wb_stage(self)?;
        stages::execute_stage(self);

        for lane in 0..self.lanes {
            if !stages::decode_stage(self, lane)? {
                break;
            }
        }

        if !self.halted {
            for lane in 0..self.lanes {
                stages::fetch_stage(self, lane);
            }
            if self.state.is_drained() {
                debug!(cycle = self.stats.cycles, "pipeline drained");
                self.halted = true;
            }
        }
        Ok(())
    }

    /// Simulates one cycle and reports whether the core has finished.
    ///
    /// # Errors
    ///
    /// See [`tick`](Self::tick).
    pub fn step(&mut self) -> SimResult<bool> {
        self.tick()?;
        Ok(self.halted)
    }

    /// Runs until the program halts or a breakpoint is reached.
    ///
    /// A run paused at a breakpoint resumes past it when called again.
    ///
    /// # Errors
    ///
    /// See [`tick`](Self::tick).
    pub fn run(&mut self) -> SimResult<RunState> {
        while !self.halted {
            let next = self.stats.cycles + 1;
            if self.should_pause_before_cycle(next) && self.paused_at != Some(next) {
                self.paused_at = Some(next);
                debug!(cycle = next, "breakpoint");
                return Ok(RunState::Paused(next));
            }
            self.tick()?;
        }
        Ok(RunState::Halted)
    }

    /// Pauses [`run`](Self::run) before the given cycle is simulated.
    pub fn add_breakpoint(&mut self, cycle: u64) {
        self.breakpoints.insert(cycle);
    }

    /// Removes a breakpoint. Returns whether it was set.
    pub fn remove_breakpoint(&mut self, cycle: u64) -> bool {
        self.breakpoints.remove(&cycle)
    }

    /// Whether a breakpoint is set on `cycle`.
    pub fn should_pause_before_cycle(&self, cycle: u64) -> bool {
        self.breakpoints.contains(&cycle)
    }

    /// Whether the core halted or drained.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
    }

    pub(crate) fn next_inst_id(&mut self) -> InstId {
        let id = InstId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of parallel lanes.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Instructions committed per cycle.
    pub fn writeback_width(&self) -> usize {
        self.writeback_width
    }

    /// Next fetch address.
    pub fn pc(&self) -> u32 {
        self.state.pc
    }

    /// Architectural registers.
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Main memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Collected statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Predictions waiting on their blocking instruction, oldest first.
    pub fn pending_predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.branch_unit.pending()
    }

    /// Current buffer occupancy.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            decode: self.state.decode.len(),
            alu: self.state.alu.iter().map(PipelineLatch::len).collect(),
            mem: self.state.mem.iter().map(PipelineLatch::len).collect(),
            vector: self.state.vector.len(),
            writeback: self.state.writeback.len(),
        }
    }

    /// Renders the PC, pipeline occupancy, and registers.
    ///
    /// With `dirty_only`, only registers written during the last cycle are
    /// listed.
    pub fn dump_state(&self, dirty_only: bool) -> String {
        let occ = self.occupancy();
        format!(
            "cycle {} PC = {:#06x}\nID:{} -> ALU:{:?} MEM:{:?} VEC:{} -> WB:{} (predictions pending: {})\n{}",
            self.stats.cycles,
            self.state.pc,
            occ.decode,
            occ.alu,
            occ.mem,
            occ.vector,
            occ.writeback,
            self.branch_unit.pending_count(),
            self.regs.dump(dirty_only)
        )
    }
}
