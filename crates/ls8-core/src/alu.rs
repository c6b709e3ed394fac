//! Arithmetic/logic unit.
//!
//! The ALU is a pure function of its operation and two operand values. It
//! never touches machine state; the execution core decides where the output
//! goes.

use thiserror::Error;

use crate::encoding::Opcode;
use crate::state::{FLAG_E, FLAG_G, FLAG_L};

/// Operation selected by an ALU-class opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Cmp,
    And,
    Or,
    Xor,
    Not,
}

impl AluOp {
    /// Maps an opcode to its ALU operation, if it has one.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Add => Some(Self::Add),
            Opcode::Sub => Some(Self::Sub),
            Opcode::Mul => Some(Self::Mul),
            Opcode::Div => Some(Self::Div),
            Opcode::Mod => Some(Self::Mod),
            Opcode::Inc => Some(Self::Inc),
            Opcode::Dec => Some(Self::Dec),
            Opcode::Cmp => Some(Self::Cmp),
            Opcode::And => Some(Self::And),
            Opcode::Or => Some(Self::Or),
            Opcode::Xor => Some(Self::Xor),
            Opcode::Not => Some(Self::Not),
            _ => None,
        }
    }

    /// Returns `true` for operations that ignore the second operand.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Inc | Self::Dec | Self::Not)
    }
}

/// Where the ALU result belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOutput {
    /// New value for the destination register.
    Register(u8),
    /// New value for `FL`; no register changes.
    Flags(u8),
}

/// Operations with no defined result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AluError {
    /// `DIV` or `MOD` with a zero divisor.
    #[error("division by zero")]
    DivideByZero,
}

/// Applies `op` to `a` (destination) and `b` (source).
///
/// Arithmetic wraps at 8 bits. Unary operations ignore `b`.
///
/// # Errors
///
/// Returns [`AluError::DivideByZero`] for `DIV` or `MOD` when `b` is zero.
pub const fn apply(op: AluOp, a: u8, b: u8) -> Result<AluOutput, AluError> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => match a.checked_div(b) {
            Some(quotient) => quotient,
            None => return Err(AluError::DivideByZero),
        },
        AluOp::Mod => match a.checked_rem(b) {
            Some(remainder) => remainder,
            None => return Err(AluError::DivideByZero),
        },
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::Cmp => return Ok(AluOutput::Flags(compare(a, b))),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,
    };
    Ok(AluOutput::Register(value))
}

/// Flags value for `CMP a, b`: exactly one of `E`, `G`, `L`.
#[must_use]
pub const fn compare(a: u8, b: u8) -> u8 {
    if a == b {
        FLAG_E
    } else if a > b {
        FLAG_G
    } else {
        FLAG_L
    }
}
