//! Drives the `ls8` binary and checks what a user sees.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn ls8<I, S>(args: I) -> Output
where
  I: IntoIterator<Item = S>,
  S: AsRef<std::ffi::OsStr>,
{
  Command::new(env!("CARGO_BIN_EXE_ls8"))
    .args(args)
    .output()
    .expect("failed to launch ls8")
}

fn sample(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("programs")
    .join(name)
}

/// Write a throwaway program image and return its path
fn scratch(name: &str, source: &str) -> PathBuf {
  let path = std::env::temp_dir().join(format!("ls8-{}-{name}.ls8", std::process::id()));
  fs::write(&path, source).unwrap();
  path
}

fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn runs_print8() {
  let output = ls8([sample("print8.ls8")]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "8\n");
}

#[test]
fn runs_call() {
  let output = ls8([sample("call.ls8")]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "20\n30\n36\n60\n");
}

#[test]
fn no_arguments_prints_usage() {
  let output = ls8(Vec::<&str>::new());
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).contains("Usage"), "{}", stdout(&output));
}

#[test]
fn too_many_arguments_prints_usage() {
  let output = ls8([sample("print8.ls8"), sample("mult.ls8")]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).contains("Usage"));
}

#[test]
fn missing_file() {
  let output = ls8(["/no/such/program.ls8"]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("/no/such/program.ls8"));
}

#[test]
fn malformed_image() {
  let path = scratch("malformed", "10000010\nbanana\n");
  let output = ls8([&path]);
  fs::remove_file(&path).ok();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("line 2"));
}

#[test]
fn division_by_zero() {
  let path = scratch(
    "div0",
    "\
10000010 # LDI R0,1
00000000
00000001
10000010 # LDI R1,0
00000001
00000000
10100011 # DIV R0,R1
00000000
00000001
01000111 # PRN R0
00000000
00000001 # HLT
",
  );
  let output = ls8([&path]);
  fs::remove_file(&path).ok();
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("division by zero"));
}

#[test]
fn unknown_opcode() {
  let path = scratch(
    "unknown",
    "\
10000010 # LDI R0,8
00000000
00001000
11111111 # not an instruction
01000111 # PRN R0
00000000
00000001 # HLT
",
  );
  let output = ls8([&path]);
  fs::remove_file(&path).ok();
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  let stderr = stderr(&output);
  assert!(stderr.contains("0b11111111"), "{stderr}");
  assert!(stderr.contains("at address 3"), "{stderr}");
}

#[test]
fn trace_flag() {
  let program = sample("print8.ls8");
  let output = ls8([Path::new("--trace"), program.as_path()]);
  assert_eq!(output.status.code(), Some(0));
  let stdout = stdout(&output);
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(
    lines,
    [
      "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4",
      "TRACE: 03 | 47 00 01 | 08 00 00 00 00 00 00 F4",
      "8",
      "TRACE: 05 | 01 00 00 | 08 00 00 00 00 00 00 F4",
    ]
  );
}

#[test]
fn step_ceiling() {
  let program = sample("mult.ls8");
  let output = ls8([Path::new("--max-steps"), Path::new("2"), program.as_path()]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  let stderr = stderr(&output);
  assert!(stderr.contains("gave up after 2 instructions"));
  assert_eq!(stderr.lines().count(), 1, "{stderr}");
}

#[test]
fn stall_reported_once() {
  let path = scratch("stall", "00000000\n");
  let output = ls8([&path]);
  fs::remove_file(&path).ok();
  assert_eq!(output.status.code(), Some(1));
  let stderr = stderr(&output);
  assert!(stderr.starts_with("error: "), "{stderr}");
  assert_eq!(stderr.lines().count(), 1, "{stderr}");
}
