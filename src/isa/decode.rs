//! Instruction Decoder.
//!
//! Translates the text of a fetched instruction into a [`DecodedInstruction`].
//! Register operands are read from the supplied register file immediately,
//! so the decoded instruction carries a snapshot of its inputs. The pipeline
//! re-decodes a stalled instruction every cycle, which is how it picks up a
//! value once the producing instruction has committed.

use crate::common::{DecodeError, Reg, RegisterFile, Word, NUM_GPRS, NUM_VREGS};

use super::instruction::{
    ArithOp, Condition, DecodedInstruction, FetchedInstruction, Opcode, Operand, Operation,
    VectorOp, VectorOperand,
};

/// Decodes a fetched instruction against the current register values.
///
/// # Errors
///
/// Returns [`DecodeError`] when the mnemonic is unknown or the operands do
/// not match the instruction form.
pub fn decode(
    fetched: &FetchedInstruction,
    regs: &RegisterFile,
) -> Result<DecodedInstruction, DecodeError> {
    let text = fetched.encoded.text();
    let op = decode_operation(text, regs)?;
    Ok(DecodedInstruction::new(
        fetched.id,
        fetched.address,
        text,
        op,
    ))
}

/// Decodes instruction text into an [`Operation`].
///
/// # Errors
///
/// Returns [`DecodeError`] for malformed text.
pub fn decode_operation(text: &str, regs: &RegisterFile) -> Result<Operation, DecodeError> {
    let text = text.trim();
    let (mnemonic, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(m, r)| (m, r.trim()));

    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| DecodeError::UnknownOperation(mnemonic.to_string()))?;
    let args = split_operands(rest);

    let op = match opcode {
        Opcode::Nop => {
            expect_count(opcode, &args, 0)?;
            Operation::Nop
        }
        Opcode::Add | Opcode::Sub | Opcode::Mul => {
            expect_count(opcode, &args, 3)?;
            let op = match opcode {
                Opcode::Add => ArithOp::Add,
                Opcode::Sub => ArithOp::Sub,
                _ => ArithOp::Mul,
            };
            Operation::Arith {
                op,
                rd: gpr_index(args[0])?,
                lhs: scalar_operand(args[1], regs)?,
                rhs: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Mov => {
            expect_count(opcode, &args, 2)?;
            Operation::Mov {
                rd: gpr_index(args[0])?,
                src: scalar_operand(args[1], regs)?,
            }
        }
        Opcode::Cmp => {
            expect_count(opcode, &args, 3)?;
            Operation::Cmp {
                rd: gpr_index(args[0])?,
                lhs: scalar_operand(args[1], regs)?,
                rhs: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Ldm => {
            expect_count(opcode, &args, 3)?;
            Operation::Load {
                rd: gpr_index(args[0])?,
                base: scalar_operand(args[1], regs)?,
                offset: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Stm => {
            expect_count(opcode, &args, 3)?;
            let value = scalar_operand(args[0], regs)?;
            if value.reg().is_none() {
                return Err(DecodeError::RegisterClass {
                    operand: args[0].to_string(),
                    expected: "scalar",
                });
            }
            Operation::Store {
                value,
                base: scalar_operand(args[1], regs)?,
                offset: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Bge | Opcode::Bgt | Opcode::Beq => {
            expect_count(opcode, &args, 2)?;
            let cond = match opcode {
                Opcode::Bge => Condition::GreaterEqual,
                Opcode::Bgt => Condition::Greater,
                _ => Condition::Equal,
            };
            Operation::Branch {
                cond,
                status: scalar_operand(args[0], regs)?,
                target: address(args[1])?,
            }
        }
        Opcode::Jmp => {
            expect_count(opcode, &args, 1)?;
            Operation::Jump {
                target: address(args[0])?,
            }
        }
        Opcode::Vldm => {
            expect_count(opcode, &args, 3)?;
            Operation::VectorLoad {
                vd: vreg_index(args[0])?,
                base: scalar_operand(args[1], regs)?,
                offset: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Vstm => {
            expect_count(opcode, &args, 3)?;
            Operation::VectorStore {
                value: vector_operand(args[0], regs)?,
                base: scalar_operand(args[1], regs)?,
                offset: scalar_operand(args[2], regs)?,
            }
        }
        Opcode::Vadd | Opcode::Vmul => {
            expect_count(opcode, &args, 3)?;
            let op = if opcode == Opcode::Vadd {
                VectorOp::Add
            } else {
                VectorOp::Mul
            };
            Operation::VectorArith {
                op,
                vd: vreg_index(args[0])?,
                lhs: vector_operand(args[1], regs)?,
                rhs: vector_operand(args[2], regs)?,
            }
        }
    };
    Ok(op)
}

fn split_operands(rest: &str) -> Vec<&str> {
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split(',').map(str::trim).collect()
}

fn expect_count(opcode: Opcode, args: &[&str], expected: usize) -> Result<(), DecodeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::OperandCount {
            mnemonic: opcode.mnemonic(),
            expected,
            found: args.len(),
        })
    }
}

/// Parses a register name such as `r3` or `v1`.
///
/// Returns `Ok(None)` when the token is not register-shaped at all.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidRegister`] when the index is out of range.
pub fn parse_register(token: &str) -> Result<Option<Reg>, DecodeError> {
    let mut chars = token.chars();
    let Some(class) = chars.next().map(|c| c.to_ascii_lowercase()) else {
        return Ok(None);
    };
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let idx: usize = digits
        .parse()
        .map_err(|_| DecodeError::InvalidRegister(token.to_string()))?;
    match class {
        'r' if idx < NUM_GPRS => Ok(Some(Reg::Gpr(idx as u8))),
        'v' if idx < NUM_VREGS => Ok(Some(Reg::Vec(idx as u8))),
        'r' | 'v' => Err(DecodeError::InvalidRegister(token.to_string())),
        _ => Ok(None),
    }
}

/// Parses a numeric literal: decimal, negative decimal, or `0x` hex.
pub fn parse_immediate(token: &str) -> Option<Word> {
    let (negative, body) = token
        .strip_prefix('-')
        .map_or((false, token), |rest| (true, rest));
    let magnitude = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()? as i64
    } else {
        body.parse::<i64>().ok()?
    };
    let value = if negative { -magnitude } else { magnitude };
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return None;
    }
    Some(value as Word)
}

fn gpr_index(token: &str) -> Result<u8, DecodeError> {
    match parse_register(token)? {
        Some(Reg::Gpr(n)) => Ok(n),
        _ => Err(DecodeError::RegisterClass {
            operand: token.to_string(),
            expected: "scalar",
        }),
    }
}

fn vreg_index(token: &str) -> Result<u8, DecodeError> {
    match parse_register(token)? {
        Some(Reg::Vec(n)) => Ok(n),
        _ => Err(DecodeError::RegisterClass {
            operand: token.to_string(),
            expected: "vector",
        }),
    }
}

fn scalar_operand(token: &str, regs: &RegisterFile) -> Result<Operand, DecodeError> {
    match parse_register(token)? {
        Some(reg @ Reg::Gpr(n)) => Ok(Operand::Reg {
            reg,
            value: regs.read(n as usize),
        }),
        Some(Reg::Vec(_)) => Err(DecodeError::RegisterClass {
            operand: token.to_string(),
            expected: "scalar",
        }),
        None => parse_immediate(token)
            .map(Operand::Imm)
            .ok_or_else(|| DecodeError::InvalidOperand(token.to_string())),
    }
}

fn vector_operand(token: &str, regs: &RegisterFile) -> Result<VectorOperand, DecodeError> {
    let reg = vreg_index(token)?;
    Ok(VectorOperand {
        reg,
        value: regs.read_vec(reg as usize),
    })
}

fn address(token: &str) -> Result<u32, DecodeError> {
    parse_immediate(token)
        .map(|v| v as u32)
        .ok_or_else(|| DecodeError::InvalidOperand(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::instruction::{EncodedInstruction, InstId};

    fn fetched(text: &str) -> FetchedInstruction {
        FetchedInstruction {
            id: InstId(7),
            address: 0x10,
            encoded: EncodedInstruction::new(text),
        }
    }

    #[test]
    fn snapshots_register_values() {
        let mut regs = RegisterFile::new();
        regs.write(2, 40);
        let inst = decode(&fetched("add r1, r2, 2"), &regs).unwrap();
        assert_eq!(
            inst.op,
            Operation::Arith {
                op: ArithOp::Add,
                rd: 1,
                lhs: Operand::Reg {
                    reg: Reg::Gpr(2),
                    value: 40
                },
                rhs: Operand::Imm(2),
            }
        );
        assert_eq!(inst.id, InstId(7));
        assert_eq!(inst.address, 0x10);
    }

    #[test]
    fn parses_immediates() {
        assert_eq!(parse_immediate("42"), Some(42));
        assert_eq!(parse_immediate("-3"), Some(-3));
        assert_eq!(parse_immediate("0x1f"), Some(31));
        assert_eq!(parse_immediate("0xFFFFFFFF"), Some(-1));
        assert_eq!(parse_immediate("loop"), None);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let regs = RegisterFile::new();
        assert_eq!(
            decode(&fetched("frob r1, r2"), &regs).unwrap_err(),
            DecodeError::UnknownOperation("frob".to_string())
        );
    }

    #[test]
    fn rejects_out_of_range_register() {
        let regs = RegisterFile::new();
        assert_eq!(
            decode(&fetched("mov r32, 1"), &regs).unwrap_err(),
            DecodeError::InvalidRegister("r32".to_string())
        );
    }
}
