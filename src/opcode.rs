//! LS-8 opcode bytes and their decoded form.
//!
//! Every opcode carries its own shape:
//!
//! ```text
//! AABCDDDD
//! ││││└┴┴┴─ instruction identifier
//! │││└───── sets the program counter itself
//! ││└────── handled by the ALU
//! └┴─────── number of operand bytes that follow
//! ```

pub const NOP: u8 = 0b0000_0000;
pub const HLT: u8 = 0b0000_0001;
pub const RET: u8 = 0b0001_0001;
pub const PUSH: u8 = 0b0100_0101;
pub const POP: u8 = 0b0100_0110;
pub const PRN: u8 = 0b0100_0111;
pub const CALL: u8 = 0b0101_0000;
pub const JMP: u8 = 0b0101_0100;
pub const JEQ: u8 = 0b0101_0101;
pub const JNE: u8 = 0b0101_0110;
pub const NOT: u8 = 0b0110_1001;
pub const LDI: u8 = 0b1000_0010;
pub const ADD: u8 = 0b1010_0000;
pub const SUB: u8 = 0b1010_0001;
pub const MUL: u8 = 0b1010_0010;
pub const DIV: u8 = 0b1010_0011;
pub const CMP: u8 = 0b1010_0111;
pub const OR: u8 = 0b1010_1010;
pub const XOR: u8 = 0b1010_1011;
pub const SHL: u8 = 0b1010_1100;
pub const SHR: u8 = 0b1010_1101;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Padding. Does nothing and leaves the program counter where it is.
  Nop,

  /// | Operation | Semantics/RTL      | Assembly  |
  /// |-----------|--------------------|-----------|
  /// | Halt      | `(stop execution)` | `HLT`     |
  Halt,

  /// Loads an immediate value into a register.
  ///
  /// | Operation      | Semantics/RTL | Assembly         |
  /// |----------------|---------------|------------------|
  /// | Load Immediate | `r[a] ← imm`  | `LDI ra, imm`    |
  LoadImmediate,

  /// Writes the decimal value of a register to the console.
  ///
  /// | Operation | Semantics/RTL    | Assembly |
  /// |-----------|------------------|----------|
  /// | Print     | `out ← dec(r[a])`| `PRN ra` |
  Print,

  /// | Operation | Semantics/RTL          | Assembly     |
  /// |-----------|------------------------|--------------|
  /// | Add       | `r[a] ← r[a] + r[b]`   | `ADD ra, rb` |
  Add,

  /// | Operation | Semantics/RTL          | Assembly     |
  /// |-----------|------------------------|--------------|
  /// | Subtract  | `r[a] ← r[a] − r[b]`   | `SUB ra, rb` |
  Sub,

  /// | Operation | Semantics/RTL          | Assembly     |
  /// |-----------|------------------------|--------------|
  /// | Multiply  | `r[a] ← r[a] × r[b]`   | `MUL ra, rb` |
  Mul,

  /// | Operation | Semantics/RTL          | Assembly     |
  /// |-----------|------------------------|--------------|
  /// | Divide    | `r[a] ← r[a] ÷ r[b]`   | `DIV ra, rb` |
  Div,

  /// Compares two registers and records the outcome in the flags register.
  ///
  /// | Operation | Semantics/RTL                     | Assembly     |
  /// |-----------|-----------------------------------|--------------|
  /// | Compare   | `fl ← (r[a] <=> r[b])` as `00000LGE` | `CMP ra, rb` |
  Cmp,

  /// | Operation  | Semantics/RTL          | Assembly    |
  /// |------------|------------------------|-------------|
  /// | Logical OR | `r[a] ← r[a] \| r[b]`  | `OR ra, rb` |
  Or,

  /// | Operation   | Semantics/RTL         | Assembly     |
  /// |-------------|-----------------------|--------------|
  /// | Logical XOR | `r[a] ← r[a] ^ r[b]`  | `XOR ra, rb` |
  Xor,

  /// | Operation   | Semantics/RTL  | Assembly |
  /// |-------------|----------------|----------|
  /// | Logical NOT | `r[a] ← ~r[a]` | `NOT ra` |
  Not,

  /// | Operation  | Semantics/RTL          | Assembly     |
  /// |------------|------------------------|--------------|
  /// | Shift Left | `r[a] ← r[a] << r[b]`  | `SHL ra, rb` |
  Shl,

  /// | Operation   | Semantics/RTL          | Assembly     |
  /// |-------------|------------------------|--------------|
  /// | Shift Right | `r[a] ← r[a] >> r[b]`  | `SHR ra, rb` |
  Shr,

  /// | Operation | Semantics/RTL                 | Assembly  |
  /// |-----------|-------------------------------|-----------|
  /// | Push      | `sp ← sp − 1; m[sp] ← r[a]`   | `PUSH ra` |
  Push,

  /// | Operation | Semantics/RTL                 | Assembly |
  /// |-----------|-------------------------------|----------|
  /// | Pop       | `r[a] ← m[sp]; sp ← sp + 1`   | `POP ra` |
  Pop,

  /// Calls the subroutine whose address is held in a register.
  ///
  /// | Operation | Semantics/RTL                             | Assembly  |
  /// |-----------|-------------------------------------------|-----------|
  /// | Call      | `sp ← sp − 1; m[sp] ← pc + 2; pc ← r[a]`  | `CALL ra` |
  Call,

  /// | Operation | Semantics/RTL                | Assembly |
  /// |-----------|------------------------------|----------|
  /// | Return    | `pc ← m[sp]; sp ← sp + 1`    | `RET`    |
  Ret,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Jump      | `pc ← r[a]`   | `JMP ra` |
  Jmp,

  /// | Operation     | Semantics/RTL         | Assembly |
  /// |---------------|-----------------------|----------|
  /// | Jump If Equal | `if E : pc ← r[a]`    | `JEQ ra` |
  Jeq,

  /// | Operation         | Semantics/RTL      | Assembly |
  /// |-------------------|--------------------|----------|
  /// | Jump If Not Equal | `if !E : pc ← r[a]`| `JNE ra` |
  Jne,

  /// A byte that names no instruction.
  Unknown(u8),
}

impl Opcode {
  /// Number of operand bytes following the opcode.
  pub fn operand_count(self) -> u8 {
    u8::from(self) >> 6
  }

  /// Size of the whole instruction in memory.
  pub fn size(self) -> u8 {
    1 + self.operand_count()
  }

  pub fn is_alu(self) -> bool {
    u8::from(self) & 0b0010_0000 != 0
  }

  /// Whether the instruction may overwrite the program counter itself.
  pub fn sets_pc(self) -> bool {
    u8::from(self) & 0b0001_0000 != 0
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      Self::Nop => "NOP",
      Self::Halt => "HLT",
      Self::LoadImmediate => "LDI",
      Self::Print => "PRN",
      Self::Add => "ADD",
      Self::Sub => "SUB",
      Self::Mul => "MUL",
      Self::Div => "DIV",
      Self::Cmp => "CMP",
      Self::Or => "OR",
      Self::Xor => "XOR",
      Self::Not => "NOT",
      Self::Shl => "SHL",
      Self::Shr => "SHR",
      Self::Push => "PUSH",
      Self::Pop => "POP",
      Self::Call => "CALL",
      Self::Ret => "RET",
      Self::Jmp => "JMP",
      Self::Jeq => "JEQ",
      Self::Jne => "JNE",
      Self::Unknown(_) => "???",
    }
  }
}

impl From<u8> for Opcode {
  fn from(byte: u8) -> Self {
    match byte {
      NOP => Self::Nop,
      HLT => Self::Halt,
      LDI => Self::LoadImmediate,
      PRN => Self::Print,
      ADD => Self::Add,
      SUB => Self::Sub,
      MUL => Self::Mul,
      DIV => Self::Div,
      CMP => Self::Cmp,
      OR => Self::Or,
      XOR => Self::Xor,
      NOT => Self::Not,
      SHL => Self::Shl,
      SHR => Self::Shr,
      PUSH => Self::Push,
      POP => Self::Pop,
      CALL => Self::Call,
      RET => Self::Ret,
      JMP => Self::Jmp,
      JEQ => Self::Jeq,
      JNE => Self::Jne,
      other => Self::Unknown(other),
    }
  }
}

impl From<Opcode> for u8 {
  fn from(op: Opcode) -> Self {
    match op {
      Opcode::Nop => NOP,
      Opcode::Halt => HLT,
      Opcode::LoadImmediate => LDI,
      Opcode::Print => PRN,
      Opcode::Add => ADD,
      Opcode::Sub => SUB,
      Opcode::Mul => MUL,
      Opcode::Div => DIV,
      Opcode::Cmp => CMP,
      Opcode::Or => OR,
      Opcode::Xor => XOR,
      Opcode::Not => NOT,
      Opcode::Shl => SHL,
      Opcode::Shr => SHR,
      Opcode::Push => PUSH,
      Opcode::Pop => POP,
      Opcode::Call => CALL,
      Opcode::Ret => RET,
      Opcode::Jmp => JMP,
      Opcode::Jeq => JEQ,
      Opcode::Jne => JNE,
      Opcode::Unknown(byte) => byte,
    }
  }
}
