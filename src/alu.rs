use std::cmp::Ordering;

use crate::opcode::Opcode;
use crate::vm::REGISTER_COUNT;

bitflags::bitflags! {
  /// The flags register, written only by `CMP`.
  ///
  /// ```text
  /// 00000LGE
  /// ```
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct Flags: u8 {
    const EQUAL = 0b0000_0001;
    const GREATER = 0b0000_0010;
    const LESS = 0b0000_0100;
  }
}

/// An operation the arithmetic/logic unit knows how to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
  Add,
  Sub,
  Mul,
  Div,
  Cmp,
  Or,
  Xor,
  Not,
  Shl,
  Shr,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluError {
  #[error("division by zero")]
  DivisionByZero,

  #[error("unsupported ALU operation {0:#010b}")]
  UnsupportedOperation(u8),
}

impl TryFrom<Opcode> for AluOp {
  type Error = AluError;

  fn try_from(op: Opcode) -> Result<Self, Self::Error> {
    Ok(match op {
      Opcode::Add => Self::Add,
      Opcode::Sub => Self::Sub,
      Opcode::Mul => Self::Mul,
      Opcode::Div => Self::Div,
      Opcode::Cmp => Self::Cmp,
      Opcode::Or => Self::Or,
      Opcode::Xor => Self::Xor,
      Opcode::Not => Self::Not,
      Opcode::Shl => Self::Shl,
      Opcode::Shr => Self::Shr,
      other => return Err(AluError::UnsupportedOperation(other.into())),
    })
  }
}

/// Perform `op` on registers `a` and `b`, leaving the result in `a`.
///
/// All arithmetic wraps at 8 bits. `Cmp` leaves the registers alone and
/// replaces `flags` with exactly one of `EQUAL`, `GREATER` or `LESS`. `Not`
/// ignores `b`.
///
/// Both indices must already be known to lie inside the register file.
pub(crate) fn execute(
  op: AluOp,
  registers: &mut [u8; REGISTER_COUNT],
  flags: &mut Flags,
  a: usize,
  b: usize,
) -> Result<(), AluError> {
  let x = registers[a];
  let y = registers[b];
  registers[a] = match op {
    AluOp::Add => x.wrapping_add(y),
    AluOp::Sub => x.wrapping_sub(y),
    AluOp::Mul => x.wrapping_mul(y),
    AluOp::Div => x.checked_div(y).ok_or(AluError::DivisionByZero)?,
    AluOp::Cmp => {
      *flags = match x.cmp(&y) {
        Ordering::Equal => Flags::EQUAL,
        Ordering::Greater => Flags::GREATER,
        Ordering::Less => Flags::LESS,
      };
      x
    }
    AluOp::Or => x | y,
    AluOp::Xor => x ^ y,
    AluOp::Not => !x,
    // anything shifted by a full byte or more is gone
    AluOp::Shl => x.checked_shl(u32::from(y)).unwrap_or(0),
    AluOp::Shr => x.checked_shr(u32::from(y)).unwrap_or(0),
  };
  Ok(())
}
