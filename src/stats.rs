//! Simulation statistics collection and reporting.
//!
//! Tracks cycle and instruction counts, the retired instruction mix, stall
//! causes, and branch resolution outcomes. Statistics serialize to JSON for
//! machine consumption and print as a fixed-width report for humans.

use std::time::Instant;

use serde::Serialize;

use crate::isa::UnitKind;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Debug, Clone, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub cycles: u64,
    pub instructions_retired: u64,

    pub inst_alu: u64,
    pub inst_memory: u64,
    pub inst_vector: u64,
    pub inst_branch: u64,
    pub inst_nop: u64,

    /// Decode lane-cycles lost to a read-after-write hazard.
    pub stalls_data: u64,
    /// Decode lane-cycles lost waiting for a `nop` barrier to drain.
    pub stalls_barrier: u64,
    /// Fetch lane-cycles skipped because the decode queue was full.
    pub stalls_fetch: u64,

    pub branch_certain_taken: u64,
    pub branch_certain_not_taken: u64,
    pub branch_predictions: u64,
    pub branch_predicted_correct: u64,
    pub branch_mispredictions: u64,
    /// Wrong-path instructions discarded by mispredictions, including
    /// branches resolved in decode on a mispredicted path.
    pub squashed_instructions: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_memory: 0,
            inst_vector: 0,
            inst_branch: 0,
            inst_nop: 0,
            stalls_data: 0,
            stalls_barrier: 0,
            stalls_fetch: 0,
            branch_certain_taken: 0,
            branch_certain_not_taken: 0,
            branch_predictions: 0,
            branch_predicted_correct: 0,
            branch_mispredictions: 0,
            squashed_instructions: 0,
        }
    }
}

impl SimStats {
    /// Counts one retired instruction by the unit class it belongs to.
    pub fn record_retired(&mut self, unit: UnitKind) {
        self.instructions_retired += 1;
        match unit {
            UnitKind::Alu => self.inst_alu += 1,
            UnitKind::Memory => self.inst_memory += 1,
            UnitKind::Vector => self.inst_vector += 1,
            UnitKind::Branch => self.inst_branch += 1,
            UnitKind::Barrier => self.inst_nop += 1,
        }
    }

    /// Instructions retired per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.instructions_retired as f64 / self.cycles as f64
    }

    /// Cycles per retired instruction.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            return 0.0;
        }
        self.cycles as f64 / self.instructions_retired as f64
    }

    /// Fraction of speculative branches whose prediction was confirmed.
    ///
    /// Returns `None` when no branch was resolved speculatively.
    pub fn branch_accuracy(&self) -> Option<f64> {
        let resolved = self.branch_predicted_correct + self.branch_mispredictions;
        if resolved == 0 {
            return None;
        }
        Some(self.branch_predicted_correct as f64 / resolved as f64)
    }

    /// Prints a formatted summary of all simulation statistics.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_retired.max(1) as f64;

        println!("\n==========================================================");
        println!("SUPERSCALAR PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {:.4}", self.ipc());
        println!("sim_cpi                  {:.4}", self.cpi());
        println!("----------------------------------------------------------");
        println!("STALLS");
        println!(
            "  stalls.data            {} ({:.2}%)",
            self.stalls_data,
            (self.stalls_data as f64 / cyc) * 100.0
        );
        println!(
            "  stalls.barrier         {} ({:.2}%)",
            self.stalls_barrier,
            (self.stalls_barrier as f64 / cyc) * 100.0
        );
        println!(
            "  stalls.fetch           {} ({:.2}%)",
            self.stalls_fetch,
            (self.stalls_fetch as f64 / cyc) * 100.0
        );
        println!("----------------------------------------------------------");
        println!("INSTRUCTION MIX");
        let mix = [
            ("op.alu", self.inst_alu),
            ("op.memory", self.inst_memory),
            ("op.vector", self.inst_vector),
            ("op.branch", self.inst_branch),
            ("op.nop", self.inst_nop),
        ];
        for (name, count) in mix {
            println!(
                "  {:<22} {} ({:.2}%)",
                name,
                count,
                (count as f64 / instr) * 100.0
            );
        }
        println!("----------------------------------------------------------");
        println!("BRANCHES");
        println!("  br.certain_taken       {}", self.branch_certain_taken);
        println!("  br.certain_not_taken   {}", self.branch_certain_not_taken);
        println!("  bp.lookups             {}", self.branch_predictions);
        println!("  bp.mispredicts         {}", self.branch_mispredictions);
        match self.branch_accuracy() {
            Some(acc) => println!("  bp.accuracy            {:.2}%", acc * 100.0),
            None => println!("  bp.accuracy            n/a"),
        }
        println!("  squashed               {}", self.squashed_instructions);
        println!("==========================================================");
    }
}
