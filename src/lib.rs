//! Emulator for the LS-8, a toy 8-bit computer
//!
//! 256 bytes of memory, eight registers (the last one is the stack pointer),
//! a flags register for `CMP`, and a handful of instructions. Programs are
//! written one byte per line as binary literals, see [`region::Chunk`].
//!
//! ```
//! use emulator::region::Chunk;
//! use emulator::vm::Vm;
//!
//! let program: Chunk = "10000010\n00000000\n00001000\n01000111\n00000000\n00000001"
//!   .parse()
//!   .unwrap();
//! let mut vm = Vm::new();
//! vm.load(&program).unwrap();
//!
//! let mut out = Vec::new();
//! vm.run(&mut out).unwrap();
//! assert_eq!(out, b"8\n");
//! ```

pub mod alu;
pub mod opcode;
pub mod region;
pub mod vm;
