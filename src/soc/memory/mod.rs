//! Cell-Addressed Main Memory.
//!
//! Memory is byte-addressed but organised as 4-byte cells. Each cell holds
//! either an encoded instruction or a data word. Fetch treats a data cell (or
//! an address past the end of memory) as "nothing to fetch", which is how a
//! program signals its end. Loads and stores must be cell-aligned and may only
//! touch data cells when reading.

use std::fmt;

use crate::common::{MemoryError, Word, INSTRUCTION_WIDTH};
use crate::isa::EncodedInstruction;

/// Contents of one memory cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Encoded instruction text.
    Instruction(EncodedInstruction),
    /// Data word.
    Data(Word),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction(inst) => write!(f, "{inst}"),
            Self::Data(word) => write!(f, "{word:#010x}"),
        }
    }
}

/// Main memory.
#[derive(Clone, Debug)]
pub struct Memory {
    cells: Vec<Cell>,
}

impl Memory {
    /// Creates a memory of `size_bytes` bytes, zero-filled with data cells.
    pub fn new(size_bytes: u32) -> Self {
        let count = (size_bytes / INSTRUCTION_WIDTH) as usize;
        Self {
            cells: vec![Cell::Data(0); count],
        }
    }

    /// One past the highest valid byte address.
    pub fn max_address(&self) -> u32 {
        self.cells.len() as u32 * INSTRUCTION_WIDTH
    }

    /// Reads a cell for fetch.
    ///
    /// Returns `None` for misaligned or out-of-range addresses; fetch treats
    /// that exactly like a data cell.
    pub fn read_cell(&self, address: u32) -> Option<&Cell> {
        if address % INSTRUCTION_WIDTH != 0 {
            return None;
        }
        self.cells.get((address / INSTRUCTION_WIDTH) as usize)
    }

    /// Reads a data word.
    ///
    /// # Errors
    ///
    /// Fails on misaligned or out-of-range addresses and on instruction cells.
    pub fn read_word(&self, address: i64) -> Result<Word, MemoryError> {
        let idx = self.index(address)?;
        match &self.cells[idx] {
            Cell::Data(word) => Ok(*word),
            Cell::Instruction(_) => Err(MemoryError::NotData(address as u32)),
        }
    }

    /// Validates a data address without reading it.
    ///
    /// # Errors
    ///
    /// Fails on misaligned or out-of-range addresses.
    pub fn check_address(&self, address: i64) -> Result<u32, MemoryError> {
        self.index(address).map(|_| address as u32)
    }

    /// Writes a data word, replacing whatever the cell held.
    ///
    /// # Errors
    ///
    /// Fails on misaligned or out-of-range addresses.
    pub fn write_word(&mut self, address: i64, value: Word) -> Result<(), MemoryError> {
        let idx = self.index(address)?;
        self.cells[idx] = Cell::Data(value);
        Ok(())
    }

    /// Places an instruction at `address` while loading a program.
    ///
    /// # Errors
    ///
    /// Fails on misaligned or out-of-range addresses.
    pub fn place_instruction(
        &mut self,
        address: u32,
        inst: EncodedInstruction,
    ) -> Result<(), MemoryError> {
        let idx = self.index(i64::from(address))?;
        self.cells[idx] = Cell::Instruction(inst);
        Ok(())
    }

    /// Renders every cell, one per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, cell) in self.cells.iter().enumerate() {
            out.push_str(&format!(
                "{:#06x}: {}\n",
                i as u32 * INSTRUCTION_WIDTH,
                cell
            ));
        }
        out
    }

    fn index(&self, address: i64) -> Result<usize, MemoryError> {
        if address < 0 || address >= i64::from(self.max_address()) {
            return Err(MemoryError::OutOfBounds(address));
        }
        if address % i64::from(INSTRUCTION_WIDTH) != 0 {
            return Err(MemoryError::Misaligned(address));
        }
        Ok((address / i64::from(INSTRUCTION_WIDTH)) as usize)
    }
}
