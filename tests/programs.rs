//! Sample programs from `programs/`, run start to finish.

use emulator::region::Chunk;
use emulator::vm::{Config, Error, Vm, STACK_TOP};

fn boot(config: Config, source: &str) -> Vm {
  let chunk: Chunk = source.parse().expect("program should parse");
  let mut vm = Vm::with_config(config);
  vm.load(&chunk).expect("program should fit in memory");
  vm
}

fn execute(source: &str) -> String {
  let mut vm = boot(Config::default().max_steps(10_000), source);
  let mut out = Vec::new();
  vm.run(&mut out).expect("program should halt");
  assert!(vm.is_halted());
  String::from_utf8(out).unwrap()
}

#[test]
fn print8() {
  assert_eq!(execute(include_str!("../programs/print8.ls8")), "8\n");
}

#[test]
fn mult() {
  assert_eq!(execute(include_str!("../programs/mult.ls8")), "72\n");
}

#[test]
fn stack() {
  let mut vm = boot(Config::default(), include_str!("../programs/stack.ls8"));
  let mut out = Vec::new();
  vm.run(&mut out).unwrap();
  assert_eq!(out, b"2\n4\n1\n");
  assert_eq!(vm.sp(), STACK_TOP);
}

#[test]
fn call() {
  assert_eq!(
    execute(include_str!("../programs/call.ls8")),
    "20\n30\n36\n60\n"
  );
}

#[test]
fn countdown() {
  assert_eq!(
    execute(include_str!("../programs/countdown.ls8")),
    "3\n2\n1\n"
  );
}

#[test]
fn multiply_three_by_four() {
  let source = "\
10000010 # LDI R0,3
00000000
00000011
10000010 # LDI R1,4
00000001
00000100
10100010 # MUL R0,R1
00000000
00000001
01000111 # PRN R0
00000000
00000001 # HLT
";
  assert_eq!(execute(source), "12\n");
}

#[test]
fn runaway_subroutine_hits_step_limit() {
  let source = "\
10000010 # LDI R1,6
00000001
00000110
01010000 # CALL R1
00000001
00000001 # HLT, never reached

# 6: spin forever
01010100 # JMP R1
00000001
";
  let mut vm = boot(Config::default().max_steps(1_000), source);
  let mut out = Vec::new();
  assert!(matches!(
    vm.run(&mut out),
    Err(Error::StepLimitExceeded(1_000))
  ));
  assert!(!vm.is_halted());
  assert_eq!(vm.pc(), 6);
  // the return address is still on the stack
  assert_eq!(vm.read_byte(vm.sp()), 5);
}
