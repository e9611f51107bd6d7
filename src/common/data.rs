//! Comparison Status Values.
//!
//! `CMP` writes the outcome of a signed comparison into an ordinary scalar
//! register. Branch instructions later read that register as a plain source
//! operand and test it against their condition. The reset value of a register
//! (zero) decodes to no status at all, so an uninitialised status register
//! never satisfies a branch condition.

use std::cmp::Ordering;

use super::reg::Word;

/// Result of the most recent comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Left-hand side was less than the right-hand side.
    Lt,
    /// Both sides were equal.
    Eq,
    /// Left-hand side was greater than the right-hand side.
    Gt,
}

impl Status {
    /// Compares two signed words.
    pub fn compare(lhs: Word, rhs: Word) -> Self {
        match lhs.cmp(&rhs) {
            Ordering::Less => Self::Lt,
            Ordering::Equal => Self::Eq,
            Ordering::Greater => Self::Gt,
        }
    }

    /// Register encoding of the status.
    pub const fn to_word(self) -> Word {
        match self {
            Self::Lt => 1,
            Self::Eq => 2,
            Self::Gt => 3,
        }
    }

    /// Decodes a register value back into a status, if it holds one.
    pub const fn from_word(value: Word) -> Option<Self> {
        match value {
            1 => Some(Self::Lt),
            2 => Some(Self::Eq),
            3 => Some(Self::Gt),
            _ => None,
        }
    }
}
