use std::fmt::Write as _;
use std::io::{self, Write};

use crate::alu::{self, AluError, AluOp, Flags};
use crate::opcode::{self, Opcode};
use crate::region::Region;

/// The type of a single register in our virtual machine
pub type Register = u8;

pub const MEMORY_SIZE: usize = 256;
pub const REGISTER_COUNT: usize = 8;

/// Index of the register that doubles as the stack pointer
pub const SP: usize = 7;

/// Where the stack pointer starts; the stack grows down from here
pub const STACK_TOP: u8 = 0xF4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
  Active,
  Halted,
}

/// Knobs for a single run of the machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
  /// Write a `TRACE:` line to the output before every instruction
  pub trace: bool,
  /// Give up after this many instructions
  pub max_steps: Option<u64>,
}

impl Config {
  pub fn trace(mut self, trace: bool) -> Self {
    self.trace = trace;
    self
  }

  pub fn max_steps(mut self, limit: u64) -> Self {
    self.max_steps = Some(limit);
    self
  }
}

/// An LS-8 machine: 256 bytes of memory shared by program, data and stack,
/// eight 8-bit registers, and a flags register written by `CMP`.
///
/// Addresses are bytes, so every memory access is in range by construction,
/// and the program counter and stack pointer wrap at 256.
#[derive(Debug)]
pub struct Vm {
  // address of the next instruction to fetch
  pc: u8,
  flags: Flags,
  memory: [u8; MEMORY_SIZE],
  registers: [Register; REGISTER_COUNT],
  state: State,
  config: Config,
  steps: u64,
}

/// An error that stops the machine
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("unknown instruction {opcode:#010b} at address {pc}")]
  UnknownOpcode { opcode: u8, pc: u8 },

  #[error("register index {index} out of range at address {pc}")]
  InvalidRegister { index: u8, pc: u8 },

  #[error("instruction {opcode:#010b} at address {pc} failed")]
  Alu {
    opcode: u8,
    pc: u8,
    #[source]
    source: AluError,
  },

  #[error("stuck on an empty opcode at address {pc}")]
  Stalled { pc: u8 },

  #[error("gave up after {0} instructions")]
  StepLimitExceeded(u64),

  #[error("program is {0} bytes but memory only holds 256")]
  ProgramTooLarge(usize),

  #[error("machine is halted")]
  MachineHalted,

  #[error("could not write output")]
  Io(#[from] io::Error),
}

impl Vm {
  /// Create a new, empty virtual machine
  pub fn new() -> Self {
    Self::with_config(Config::default())
  }

  pub fn with_config(config: Config) -> Self {
    let mut registers = [0; REGISTER_COUNT];
    registers[SP] = STACK_TOP;
    Self {
      pc: 0,
      flags: Flags::empty(),
      memory: [0; MEMORY_SIZE],
      registers,
      state: State::Active,
      config,
      steps: 0,
    }
  }

  /// Copy a program into memory, starting at address zero
  pub fn load<R>(&mut self, region: &R) -> Result<(), Error>
  where
    R: Region,
  {
    let program = region.instructions();
    if program.len() > MEMORY_SIZE {
      return Err(Error::ProgramTooLarge(program.len()));
    }
    self.memory[..program.len()].copy_from_slice(program);
    log::debug!("loaded {} byte program", program.len());
    Ok(())
  }

  /// Execute a single instruction, writing anything it prints to `out`
  pub fn step<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    if self.state == State::Halted {
      return Err(Error::MachineHalted);
    }
    if self.config.trace {
      writeln!(out, "{}", self.trace())?;
    }
    let mut task = Task::new(self, out);
    task.run()?;
    self.steps += 1;
    Ok(())
  }

  /// Execute instructions until `HLT`, returning how many were executed
  ///
  /// Unlike [`Vm::step`], an empty opcode is fatal here: it leaves the
  /// machine exactly as it was, so the loop could never make progress.
  pub fn run<W>(&mut self, out: &mut W) -> Result<u64, Error>
  where
    W: Write,
  {
    while self.state == State::Active {
      if self.read_byte(self.pc) == opcode::NOP {
        log::debug!("empty opcode at {:#04x}, stopping", self.pc);
        return Err(Error::Stalled { pc: self.pc });
      }
      if let Some(limit) = self.config.max_steps {
        if self.steps >= limit {
          log::debug!("step limit of {limit} reached at {:#04x}", self.pc);
          return Err(Error::StepLimitExceeded(limit));
        }
      }
      self.step(out)?;
    }
    log::info!("halted after {} instructions", self.steps);
    Ok(self.steps)
  }

  pub fn read_byte(&self, address: u8) -> u8 {
    self.memory[usize::from(address)]
  }

  pub fn write_byte(&mut self, address: u8, value: u8) {
    self.memory[usize::from(address)] = value;
  }

  pub fn register(&self, index: usize) -> Option<Register> {
    self.registers.get(index).copied()
  }

  pub fn set_register(&mut self, index: usize, value: Register) -> Option<()> {
    self.registers.get_mut(index).map(|prev| {
      *prev = value;
    })
  }

  pub fn registers(&self) -> &[Register; REGISTER_COUNT] {
    &self.registers
  }

  pub fn pc(&self) -> u8 {
    self.pc
  }

  pub fn sp(&self) -> u8 {
    self.registers[SP]
  }

  pub fn flags(&self) -> Flags {
    self.flags
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  /// Instructions executed so far
  pub fn steps(&self) -> u64 {
    self.steps
  }

  /// One line of machine state: the program counter, the three bytes at it,
  /// then every register, all in hex
  ///
  /// ```text
  /// TRACE: 03 | 47 00 01 | 08 00 00 00 00 00 00 F4
  /// ```
  pub fn trace(&self) -> String {
    let pc = self.pc;
    let mut line = format!(
      "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
      pc,
      self.read_byte(pc),
      self.read_byte(pc.wrapping_add(1)),
      self.read_byte(pc.wrapping_add(2)),
    );
    for register in self.registers {
      let _ = write!(line, " {register:02X}");
    }
    line
  }

  fn push(&mut self, value: u8) {
    let sp = self.registers[SP].wrapping_sub(1);
    self.registers[SP] = sp;
    self.write_byte(sp, value);
  }

  fn pop(&mut self) -> u8 {
    let sp = self.registers[SP];
    self.registers[SP] = sp.wrapping_add(1);
    self.read_byte(sp)
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

struct Task<'vm, 'out, W> {
  vm: &'vm mut Vm,
  out: &'out mut W,
  // address of the instruction being executed
  pc: u8,
}

impl<'vm, 'out, W> Task<'vm, 'out, W>
where
  W: Write,
{
  fn new(vm: &'vm mut Vm, out: &'out mut W) -> Self {
    let pc = vm.pc;
    Self { vm, out, pc }
  }

  #[inline]
  fn eat(&mut self) -> u8 {
    let byte = self.vm.read_byte(self.vm.pc);
    self.vm.pc = self.vm.pc.wrapping_add(1);
    byte
  }

  fn eat_register(&mut self) -> Result<usize, Error> {
    let index = self.eat();
    if usize::from(index) < REGISTER_COUNT {
      Ok(usize::from(index))
    } else {
      Err(Error::InvalidRegister {
        index,
        pc: self.pc,
      })
    }
  }

  fn run(&mut self) -> Result<(), Error> {
    let op: Opcode = self.eat().into();
    log::trace!("{:#04x}: {}", self.pc, op.mnemonic());
    match op {
      Opcode::Nop => nop(self),
      Opcode::Halt => halt(self),
      Opcode::LoadImmediate => load_immediate(self)?,
      Opcode::Print => print(self)?,
      Opcode::Add
      | Opcode::Sub
      | Opcode::Mul
      | Opcode::Div
      | Opcode::Cmp
      | Opcode::Or
      | Opcode::Xor
      | Opcode::Not
      | Opcode::Shl
      | Opcode::Shr => arithmetic(self, op)?,
      Opcode::Push => push(self)?,
      Opcode::Pop => pop(self)?,
      Opcode::Call => call(self)?,
      Opcode::Ret => ret(self),
      Opcode::Jmp => jump(self)?,
      Opcode::Jeq => jump_if(self, true)?,
      Opcode::Jne => jump_if(self, false)?,
      Opcode::Unknown(opcode) => {
        self.vm.pc = self.pc;
        return Err(Error::UnknownOpcode {
          opcode,
          pc: self.pc,
        });
      }
    }
    debug_assert!(
      op == Opcode::Nop
        || op.sets_pc()
        || self.vm.pc == self.pc.wrapping_add(op.size()),
      "{} did not consume exactly its operands",
      op.mnemonic()
    );
    Ok(())
  }
}

// (do nothing, stay put)
fn nop<W>(task: &mut Task<'_, '_, W>)
where
  W: Write,
{
  task.vm.pc = task.pc;
}

// (stop execution)
fn halt<W>(task: &mut Task<'_, '_, W>)
where
  W: Write,
{
  task.vm.state = State::Halted;
}

// r[a] ← imm
fn load_immediate<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  let imm = task.eat();
  task.vm.registers[a] = imm;
  Ok(())
}

// out ← dec(r[a])
fn print<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  writeln!(task.out, "{}", task.vm.registers[a])?;
  Ok(())
}

// r[a] ← r[a] ∘ r[b]
fn arithmetic<W>(task: &mut Task<'_, '_, W>, op: Opcode) -> Result<(), Error>
where
  W: Write,
{
  let pc = task.pc;
  let fail = move |source| Error::Alu {
    opcode: op.into(),
    pc,
    source,
  };
  let alu_op = AluOp::try_from(op).map_err(fail)?;
  let a = task.eat_register()?;
  let b = if op.operand_count() == 2 {
    task.eat_register()?
  } else {
    a
  };
  let vm = &mut *task.vm;
  alu::execute(alu_op, &mut vm.registers, &mut vm.flags, a, b).map_err(fail)
}

// sp ← sp − 1; m[sp] ← r[a]
fn push<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  // sp moves first, so `PUSH R7` stores the decremented pointer
  let sp = task.vm.registers[SP].wrapping_sub(1);
  task.vm.registers[SP] = sp;
  let value = task.vm.registers[a];
  task.vm.write_byte(sp, value);
  Ok(())
}

// r[a] ← m[sp]; sp ← sp + 1
fn pop<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  // the register is written first, so `POP R7` ends one past the popped value
  task.vm.registers[a] = task.vm.read_byte(task.vm.registers[SP]);
  task.vm.registers[SP] = task.vm.registers[SP].wrapping_add(1);
  Ok(())
}

// sp ← sp − 1; m[sp] ← pc + 2; pc ← r[a]
fn call<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  // pc already sits on the next instruction
  let return_address = task.vm.pc;
  task.vm.push(return_address);
  task.vm.pc = task.vm.registers[a];
  Ok(())
}

// pc ← m[sp]; sp ← sp + 1
fn ret<W>(task: &mut Task<'_, '_, W>)
where
  W: Write,
{
  task.vm.pc = task.vm.pop();
}

// pc ← r[a]
fn jump<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  task.vm.pc = task.vm.registers[a];
  Ok(())
}

// if E == equal : pc ← r[a]
fn jump_if<W>(task: &mut Task<'_, '_, W>, equal: bool) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat_register()?;
  if task.vm.flags.contains(Flags::EQUAL) == equal {
    task.vm.pc = task.vm.registers[a];
  }
  Ok(())
}
