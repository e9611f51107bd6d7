//! Register File.
//!
//! This module implements the architectural register state: 32 scalar
//! registers (`r0`-`r31`) and 8 vector registers (`v0`-`v7`) of
//! [`VECTOR_LANES`] words each. Every register carries a "changed this
//! commit cycle" flag that is set on write and cleared once per cycle, before
//! any pipeline stage runs. `r0` is an ordinary register.

use std::fmt;

use super::constants::{NUM_GPRS, NUM_VREGS, VECTOR_LANES};

/// Machine word held by a scalar register or memory cell.
pub type Word = i32;

/// Contents of a vector register.
pub type VectorWord = [Word; VECTOR_LANES];

/// Architectural register name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    /// Scalar general-purpose register `rN`.
    Gpr(u8),
    /// Vector register `vN`.
    Vec(u8),
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpr(n) => write!(f, "r{n}"),
            Self::Vec(n) => write!(f, "v{n}"),
        }
    }
}

/// Register file with per-register dirty tracking.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    gprs: [Word; NUM_GPRS],
    gpr_dirty: [bool; NUM_GPRS],
    vregs: [VectorWord; NUM_VREGS],
    vreg_dirty: [bool; NUM_VREGS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register zeroed and clean.
    pub fn new() -> Self {
        Self {
            gprs: [0; NUM_GPRS],
            gpr_dirty: [false; NUM_GPRS],
            vregs: [[0; VECTOR_LANES]; NUM_VREGS],
            vreg_dirty: [false; NUM_VREGS],
        }
    }

    /// Reads a scalar register.
    ///
    /// Indices are validated by the decoder, so `idx` is always below
    /// [`NUM_GPRS`] for decoded instructions.
    pub fn read(&self, idx: usize) -> Word {
        self.gprs[idx]
    }

    /// Writes a scalar register and marks it dirty.
    pub fn write(&mut self, idx: usize, val: Word) {
        self.gprs[idx] = val;
        self.gpr_dirty[idx] = true;
    }

    /// Reads a vector register.
    pub fn read_vec(&self, idx: usize) -> VectorWord {
        self.vregs[idx]
    }

    /// Writes a vector register and marks it dirty.
    pub fn write_vec(&mut self, idx: usize, val: VectorWord) {
        self.vregs[idx] = val;
        self.vreg_dirty[idx] = true;
    }

    /// Reads a scalar register by name. Vector registers read their first lane.
    pub fn read_reg(&self, reg: Reg) -> Word {
        match reg {
            Reg::Gpr(n) => self.read(n as usize),
            Reg::Vec(n) => self.read_vec(n as usize)[0],
        }
    }

    /// Whether the register was written since the last [`commit_dirty_reset`](Self::commit_dirty_reset).
    pub fn is_dirty(&self, reg: Reg) -> bool {
        match reg {
            Reg::Gpr(n) => self.gpr_dirty[n as usize],
            Reg::Vec(n) => self.vreg_dirty[n as usize],
        }
    }

    /// Clears every dirty flag. Called once at the start of each cycle.
    pub fn commit_dirty_reset(&mut self) {
        self.gpr_dirty = [false; NUM_GPRS];
        self.vreg_dirty = [false; NUM_VREGS];
    }

    /// Number of scalar registers.
    pub const fn count(&self) -> usize {
        NUM_GPRS
    }

    /// Renders the register file, four scalar registers per line.
    ///
    /// With `dirty_only`, only registers written this cycle are listed.
    pub fn dump(&self, dirty_only: bool) -> String {
        let mut out = String::new();
        let mut column = 0;
        for i in 0..NUM_GPRS {
            if dirty_only && !self.gpr_dirty[i] {
                continue;
            }
            out.push_str(&format!("r{:<2}={:#010x}", i, self.gprs[i]));
            column += 1;
            out.push(if column % 4 == 0 { '\n' } else { ' ' });
        }
        if column % 4 != 0 {
            out.push('\n');
        }
        for i in 0..NUM_VREGS {
            if dirty_only && !self.vreg_dirty[i] {
                continue;
            }
            out.push_str(&format!("v{} = {:?}\n", i, self.vregs[i]));
        }
        out
    }
}
