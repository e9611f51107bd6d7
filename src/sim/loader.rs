//! Program Loader.
//!
//! Reads assembly text and lays it out in main memory starting at address 0,
//! one 4-byte cell per line. Loading is done in two passes:
//! 1. **Layout:** strip comments, record label addresses, and assign every
//!    instruction or `.word` directive the next cell.
//! 2. **Resolve:** substitute label operands with their addresses and
//!    trial-decode each instruction so malformed text is reported with its
//!    line number instead of surfacing mid-run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::{DecodeError, RegisterFile, SimError, SimResult, Word, INSTRUCTION_WIDTH};
use crate::config::Config;
use crate::core::Cpu;
use crate::isa::decode::{decode_operation, parse_immediate, parse_register};
use crate::isa::EncodedInstruction;
use crate::soc::Memory;

const WORD_DIRECTIVE: &str = ".word";
const IN_MEMORY_PATH: &str = "<memory>";

/// One loaded memory cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramItem {
    /// Instruction text with labels already substituted.
    Instruction(EncodedInstruction),
    /// `.word` data.
    Data(Word),
}

/// A parsed program, ready to be placed in memory.
#[derive(Clone, Debug, Default)]
pub struct Program {
    items: Vec<ProgramItem>,
    labels: BTreeMap<String, u32>,
}

struct PendingLine<'a> {
    line: usize,
    text: &'a str,
    label: Option<&'a str>,
}

impl Program {
    /// Parses program text that did not come from a file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Load`] for malformed lines, undefined labels, or
    /// duplicate labels.
    pub fn parse(source: &str) -> SimResult<Self> {
        Self::parse_named(source, Path::new(IN_MEMORY_PATH))
    }

    /// Reads and parses a program file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise see
    /// [`parse`](Self::parse).
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Self::parse_named(&source, path)
    }

    /// Parses program text, attributing errors to `path`.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_named(source: &str, path: &Path) -> SimResult<Self> {
        let load_error = |line: usize, source: DecodeError| SimError::Load {
            path: PathBuf::from(path),
            line,
            source,
        };

        let mut labels = BTreeMap::new();
        let mut pending = Vec::new();
        let mut waiting_label: Option<&str> = None;

        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let mut text = raw.split(';').next().unwrap_or_default().trim();

            while let Some((head, rest)) = text.split_once(':') {
                let name = head.trim();
                if !is_identifier(name) {
                    break;
                }
                let address = pending.len() as u32 * INSTRUCTION_WIDTH;
                if labels.insert(name.to_string(), address).is_some() {
                    return Err(load_error(line, DecodeError::DuplicateLabel(name.to_string())));
                }
                waiting_label.get_or_insert(name);
                text = rest.trim();
            }

            if text.is_empty() {
                continue;
            }
            pending.push(PendingLine {
                line,
                text,
                label: waiting_label.take(),
            });
        }

        let regs = RegisterFile::new();
        let mut items = Vec::with_capacity(pending.len());
        for entry in pending {
            let item = resolve_line(&entry, &labels, &regs).map_err(|e| load_error(entry.line, e))?;
            items.push(item);
        }

        Ok(Self { items, labels })
    }

    /// Loaded cells in address order.
    pub fn items(&self) -> &[ProgramItem] {
        &self.items
    }

    /// Label table.
    pub fn labels(&self) -> &BTreeMap<String, u32> {
        &self.labels
    }

    /// Address a label resolved to.
    pub fn label_address(&self, name: &str) -> Option<u32> {
        self.labels.get(name).copied()
    }

    /// Bytes of memory the program occupies.
    pub fn size_bytes(&self) -> u32 {
        self.items.len() as u32 * INSTRUCTION_WIDTH
    }

    /// Builds a memory of `size_bytes` holding the program at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ProgramTooLarge`] if the program does not fit.
    pub fn to_memory(&self, size_bytes: u32) -> SimResult<Memory> {
        let needed = self.size_bytes();
        if needed > size_bytes {
            return Err(SimError::ProgramTooLarge {
                needed,
                available: size_bytes,
            });
        }

        let mut memory = Memory::new(size_bytes);
        for (i, item) in self.items.iter().enumerate() {
            let address = i as u32 * INSTRUCTION_WIDTH;
            match item {
                ProgramItem::Instruction(inst) => memory.place_instruction(address, inst.clone())?,
                ProgramItem::Data(word) => memory.write_word(i64::from(address), *word)?,
            }
        }
        Ok(memory)
    }
}

/// Parses `source` and builds a core ready to run it.
///
/// # Errors
///
/// Fails on invalid configuration or program text, or if the program does
/// not fit in the configured memory.
pub fn load_cpu(source: &str, config: &Config) -> SimResult<Cpu> {
    config.validate()?;
    let program = Program::parse(source)?;
    build_cpu(&program, config)
}

/// Builds a core around an already parsed program.
///
/// # Errors
///
/// Returns [`SimError::ProgramTooLarge`] if the program does not fit.
pub fn build_cpu(program: &Program, config: &Config) -> SimResult<Cpu> {
    let memory = program.to_memory(config.memory.size_bytes)?;
    info!(
        cells = program.items().len(),
        labels = program.labels().len(),
        bytes = program.size_bytes(),
        "program loaded"
    );
    Ok(Cpu::new(memory, config))
}

fn resolve_line(
    entry: &PendingLine<'_>,
    labels: &BTreeMap<String, u32>,
    regs: &RegisterFile,
) -> Result<ProgramItem, DecodeError> {
    let (head, rest) = entry
        .text
        .split_once(char::is_whitespace)
        .map_or((entry.text, ""), |(h, r)| (h, r.trim()));

    if head.eq_ignore_ascii_case(WORD_DIRECTIVE) {
        let value = resolve_operand(rest, labels)?;
        return parse_immediate(&value)
            .map(ProgramItem::Data)
            .ok_or_else(|| DecodeError::InvalidOperand(rest.to_string()));
    }

    let text = if rest.is_empty() {
        head.to_string()
    } else {
        let operands = rest
            .split(',')
            .map(|op| resolve_operand(op.trim(), labels))
            .collect::<Result<Vec<_>, _>>()?;
        format!("{head} {}", operands.join(", "))
    };

    decode_operation(&text, regs)?;
    let encoded = match entry.label {
        Some(label) => EncodedInstruction::with_label(&text, label),
        None => EncodedInstruction::new(&text),
    };
    Ok(ProgramItem::Instruction(encoded))
}

/// Replaces a label operand with its hex address. Registers, numbers, and
/// malformed tokens pass through for the decoder to judge.
fn resolve_operand(token: &str, labels: &BTreeMap<String, u32>) -> Result<String, DecodeError> {
    if !is_identifier(token) || !matches!(parse_register(token), Ok(None)) {
        return Ok(token.to_string());
    }
    labels
        .get(token)
        .map(|addr| format!("{addr:#x}"))
        .ok_or_else(|| DecodeError::UndefinedLabel(token.to_string()))
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
