//! Instruction Model.
//!
//! An instruction exists in two forms:
//! 1. **Encoded:** the raw assembly text of one memory cell, plus the label
//!    that pointed at it. Immutable once loaded.
//! 2. **Decoded:** a closed tagged variant over the operation kinds. Source
//!    operands are snapshotted from the register file at decode time and are
//!    never re-read late, except by a speculative branch being re-evaluated
//!    after its blocking instruction commits.
//!
//! Execution results are staged on the decoded instruction as an [`Outcome`]
//! and only applied to architectural state at write-back.

use std::fmt;

use crate::common::{MemoryError, Reg, RegisterFile, Status, VectorWord, Word, INSTRUCTION_WIDTH};

/// Program-order identity of an in-flight instruction, assigned at fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub u64);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw textual instruction as stored in an instruction memory cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedInstruction {
    text: String,
    label: Option<String>,
}

impl EncodedInstruction {
    /// Creates an encoded instruction, stripping any trailing `;` comment.
    pub fn new(text: &str) -> Self {
        let text = text.split(';').next().unwrap_or_default().trim().to_string();
        Self { text, label: None }
    }

    /// Creates an encoded instruction that a label points at.
    pub fn with_label(text: &str, label: &str) -> Self {
        let mut inst = Self::new(text);
        inst.label = Some(label.trim().trim_end_matches(':').to_string());
        inst
    }

    /// Instruction text without comments.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label that named this instruction's address, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for EncodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// An encoded instruction that has been fetched and tagged.
#[derive(Clone, Debug)]
pub struct FetchedInstruction {
    /// Program-order identity.
    pub id: InstId,
    /// Address the instruction was fetched from.
    pub address: u32,
    /// Raw instruction text.
    pub encoded: EncodedInstruction,
}

/// Operation kinds of the instruction set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Scalar addition.
    Add,
    /// Scalar subtraction.
    Sub,
    /// Scalar multiplication.
    Mul,
    /// Register move / load immediate.
    Mov,
    /// Signed comparison producing a [`Status`].
    Cmp,
    /// Load word from memory.
    Ldm,
    /// Store word to memory.
    Stm,
    /// Pipeline barrier and halt marker.
    Nop,
    /// Branch if greater or equal.
    Bge,
    /// Branch if greater than.
    Bgt,
    /// Branch if equal.
    Beq,
    /// Unconditional jump.
    Jmp,
    /// Vector load.
    Vldm,
    /// Vector store.
    Vstm,
    /// Lane-wise vector addition.
    Vadd,
    /// Lane-wise vector multiplication.
    Vmul,
}

/// Functional unit class an instruction is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Scalar ALU lanes.
    Alu,
    /// Scalar memory lanes.
    Memory,
    /// The single vector lane.
    Vector,
    /// Resolved inside decode by the branch speculation unit.
    Branch,
    /// Pipeline barrier, never dispatched.
    Barrier,
}

impl Opcode {
    /// Parses a mnemonic, case-insensitively.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mul" => Self::Mul,
            "mov" => Self::Mov,
            "cmp" => Self::Cmp,
            "ldm" => Self::Ldm,
            "stm" => Self::Stm,
            "nop" => Self::Nop,
            "bge" => Self::Bge,
            "bgt" => Self::Bgt,
            "beq" => Self::Beq,
            "jmp" => Self::Jmp,
            "vldm" => Self::Vldm,
            "vstm" => Self::Vstm,
            "vadd" => Self::Vadd,
            "vmul" => Self::Vmul,
            _ => return None,
        })
    }

    /// Lower-case assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Mov => "mov",
            Self::Cmp => "cmp",
            Self::Ldm => "ldm",
            Self::Stm => "stm",
            Self::Nop => "nop",
            Self::Bge => "bge",
            Self::Bgt => "bgt",
            Self::Beq => "beq",
            Self::Jmp => "jmp",
            Self::Vldm => "vldm",
            Self::Vstm => "vstm",
            Self::Vadd => "vadd",
            Self::Vmul => "vmul",
        }
    }

    /// Functional unit class for this operation.
    pub const fn unit(self) -> UnitKind {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Mov | Self::Cmp => UnitKind::Alu,
            Self::Ldm | Self::Stm => UnitKind::Memory,
            Self::Vldm | Self::Vstm | Self::Vadd | Self::Vmul => UnitKind::Vector,
            Self::Bge | Self::Bgt | Self::Beq | Self::Jmp => UnitKind::Branch,
            Self::Nop => UnitKind::Barrier,
        }
    }
}

/// Arithmetic operation shared by the scalar and vector units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
}

/// Lane-wise vector operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorOp {
    /// Wrapping lane-wise addition.
    Add,
    /// Wrapping lane-wise multiplication.
    Mul,
}

/// Branch condition tested against a [`Status`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Taken on `EQ` or `GT`.
    GreaterEqual,
    /// Taken on `GT`.
    Greater,
    /// Taken on `EQ`.
    Equal,
}

impl Condition {
    /// Tests a raw status register value.
    pub fn holds(self, status: Word) -> bool {
        matches!(
            (self, Status::from_word(status)),
            (Self::GreaterEqual, Some(Status::Eq | Status::Gt))
                | (Self::Greater, Some(Status::Gt))
                | (Self::Equal, Some(Status::Eq))
        )
    }
}

/// Scalar source operand with its decode-time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Register operand and the value it held at decode.
    Reg {
        /// Register read.
        reg: Reg,
        /// Snapshotted value.
        value: Word,
    },
    /// Immediate operand.
    Imm(Word),
}

impl Operand {
    /// Snapshotted or immediate value.
    pub fn value(&self) -> Word {
        match self {
            Self::Reg { value, .. } | Self::Imm(value) => *value,
        }
    }

    /// Register this operand reads, if any.
    pub fn reg(&self) -> Option<Reg> {
        match self {
            Self::Reg { reg, .. } => Some(*reg),
            Self::Imm(_) => None,
        }
    }

    fn refresh(&mut self, regs: &RegisterFile) {
        if let Self::Reg { reg, value } = self {
            *value = regs.read_reg(*reg);
        }
    }
}

/// Vector source operand with its decode-time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorOperand {
    /// Vector register index.
    pub reg: u8,
    /// Snapshotted lanes.
    pub value: VectorWord,
}

impl VectorOperand {
    /// Register name of the operand.
    pub fn reg(&self) -> Reg {
        Reg::Vec(self.reg)
    }
}

/// Decoded operation with its snapshotted operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// `add`/`sub`/`mul rd, lhs, rhs`.
    Arith {
        /// Operation.
        op: ArithOp,
        /// Destination register.
        rd: u8,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// `mov rd, src`.
    Mov {
        /// Destination register.
        rd: u8,
        /// Source operand.
        src: Operand,
    },
    /// `cmp rd, lhs, rhs`.
    Cmp {
        /// Destination register receiving the status.
        rd: u8,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// `ldm rd, base, offset`.
    Load {
        /// Destination register.
        rd: u8,
        /// Base address.
        base: Operand,
        /// Offset added to the base.
        offset: Operand,
    },
    /// `stm value, base, offset`.
    Store {
        /// Value to store.
        value: Operand,
        /// Base address.
        base: Operand,
        /// Offset added to the base.
        offset: Operand,
    },
    /// `bge`/`bgt`/`beq status, target`.
    Branch {
        /// Condition tested.
        cond: Condition,
        /// Status operand.
        status: Operand,
        /// Taken target address.
        target: u32,
    },
    /// `jmp target`.
    Jump {
        /// Target address.
        target: u32,
    },
    /// `nop`.
    Nop,
    /// `vldm vd, base, offset`.
    VectorLoad {
        /// Destination vector register.
        vd: u8,
        /// Base address.
        base: Operand,
        /// Offset added to the base.
        offset: Operand,
    },
    /// `vstm vs, base, offset`.
    VectorStore {
        /// Vector register to store.
        value: VectorOperand,
        /// Base address.
        base: Operand,
        /// Offset added to the base.
        offset: Operand,
    },
    /// `vadd`/`vmul vd, lhs, rhs`.
    VectorArith {
        /// Operation.
        op: VectorOp,
        /// Destination vector register.
        vd: u8,
        /// Left operand.
        lhs: VectorOperand,
        /// Right operand.
        rhs: VectorOperand,
    },
}

/// Result computed at execute, committed at write-back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Write a scalar register.
    WriteReg(u8, Word),
    /// Write a vector register.
    WriteVec(u8, VectorWord),
    /// Store one word.
    Store(u32, Word),
    /// Store a vector to consecutive cells.
    StoreVec(u32, VectorWord),
    /// No architectural effect.
    Nothing,
}

/// A decoded, in-flight instruction.
#[derive(Clone, Debug)]
pub struct DecodedInstruction {
    /// Program-order identity.
    pub id: InstId,
    /// Address the instruction was fetched from.
    pub address: u32,
    /// Original text, for tracing.
    pub text: String,
    /// Operation and snapshotted operands.
    pub op: Operation,
    /// Result staged by execute.
    pub outcome: Option<Outcome>,
    /// Fault raised by execute, reported at write-back.
    pub fault: Option<MemoryError>,
}

impl DecodedInstruction {
    /// Wraps a decoded operation.
    pub fn new(id: InstId, address: u32, text: &str, op: Operation) -> Self {
        Self {
            id,
            address,
            text: text.to_string(),
            op,
            outcome: None,
            fault: None,
        }
    }

    /// Operation kind.
    pub fn opcode(&self) -> Opcode {
        match &self.op {
            Operation::Arith { op, .. } => match op {
                ArithOp::Add => Opcode::Add,
                ArithOp::Sub => Opcode::Sub,
                ArithOp::Mul => Opcode::Mul,
            },
            Operation::Mov { .. } => Opcode::Mov,
            Operation::Cmp { .. } => Opcode::Cmp,
            Operation::Load { .. } => Opcode::Ldm,
            Operation::Store { .. } => Opcode::Stm,
            Operation::Branch { cond, .. } => match cond {
                Condition::GreaterEqual => Opcode::Bge,
                Condition::Greater => Opcode::Bgt,
                Condition::Equal => Opcode::Beq,
            },
            Operation::Jump { .. } => Opcode::Jmp,
            Operation::Nop => Opcode::Nop,
            Operation::VectorLoad { .. } => Opcode::Vldm,
            Operation::VectorStore { .. } => Opcode::Vstm,
            Operation::VectorArith { op, .. } => match op {
                VectorOp::Add => Opcode::Vadd,
                VectorOp::Mul => Opcode::Vmul,
            },
        }
    }

    /// Functional unit class.
    pub fn unit(&self) -> UnitKind {
        self.opcode().unit()
    }

    /// Whether this is a conditional branch or jump.
    pub fn is_branch(&self) -> bool {
        matches!(self.op, Operation::Branch { .. } | Operation::Jump { .. })
    }

    /// Whether this is the `nop` barrier.
    pub fn is_nop(&self) -> bool {
        matches!(self.op, Operation::Nop)
    }

    /// Register written at commit, if any.
    pub fn destination_register(&self) -> Option<Reg> {
        match &self.op {
            Operation::Arith { rd, .. }
            | Operation::Mov { rd, .. }
            | Operation::Cmp { rd, .. }
            | Operation::Load { rd, .. } => Some(Reg::Gpr(*rd)),
            Operation::VectorLoad { vd, .. } | Operation::VectorArith { vd, .. } => {
                Some(Reg::Vec(*vd))
            }
            Operation::Store { .. }
            | Operation::Branch { .. }
            | Operation::Jump { .. }
            | Operation::Nop
            | Operation::VectorStore { .. } => None,
        }
    }

    /// Registers read at decode, in operand order.
    pub fn source_registers(&self) -> impl Iterator<Item = Reg> {
        let sources: [Option<Reg>; 3] = match &self.op {
            Operation::Arith { lhs, rhs, .. } | Operation::Cmp { lhs, rhs, .. } => {
                [lhs.reg(), rhs.reg(), None]
            }
            Operation::Mov { src, .. } => [src.reg(), None, None],
            Operation::Load { base, offset, .. } | Operation::VectorLoad { base, offset, .. } => {
                [base.reg(), offset.reg(), None]
            }
            Operation::Store {
                value,
                base,
                offset,
            } => [value.reg(), base.reg(), offset.reg()],
            Operation::VectorStore {
                value,
                base,
                offset,
            } => [Some(value.reg()), base.reg(), offset.reg()],
            Operation::VectorArith { lhs, rhs, .. } => [Some(lhs.reg()), Some(rhs.reg()), None],
            Operation::Branch { status, .. } => [status.reg(), None, None],
            Operation::Jump { .. } | Operation::Nop => [None, None, None],
        };
        sources.into_iter().flatten()
    }

    /// Whether this instruction reads the register `producer` will write.
    pub fn depends_on(&self, producer: &Self) -> bool {
        producer
            .destination_register()
            .is_some_and(|rd| self.source_registers().any(|rs| rs == rd))
    }

    /// Taken target of a branch or jump.
    pub fn branch_target(&self) -> Option<u32> {
        match &self.op {
            Operation::Branch { target, .. } | Operation::Jump { target } => Some(*target),
            _ => None,
        }
    }

    /// Address of the next sequential instruction.
    pub fn fall_through(&self) -> u32 {
        self.address.wrapping_add(INSTRUCTION_WIDTH)
    }

    /// Evaluates the branch condition against the snapshotted status.
    ///
    /// Jumps are always taken. Non-branches are never taken.
    pub fn should_take_branch(&self) -> bool {
        match &self.op {
            Operation::Branch { cond, status, .. } => cond.holds(status.value()),
            Operation::Jump { .. } => true,
            _ => false,
        }
    }

    /// Re-reads a branch's status register from committed state.
    ///
    /// Used to re-evaluate a speculatively predicted branch once its
    /// blocking instruction has committed. Other instructions are left as
    /// decoded.
    pub fn refresh_status(&mut self, regs: &RegisterFile) {
        if let Operation::Branch { status, .. } = &mut self.op {
            status.refresh(regs);
        }
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#06x} `{}`", self.id, self.address, self.text)
    }
}
