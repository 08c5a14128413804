use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use emulator::region::Chunk;
use emulator::vm::{Config, Vm};

/// Run an LS-8 program
#[derive(Parser)]
#[command(version)]
struct Args {
  /// Program image, one binary byte per line
  program: PathBuf,

  /// Print the machine state before every instruction
  #[arg(long)]
  trace: bool,

  /// Give up after this many instructions
  #[arg(long, value_name = "N")]
  max_steps: Option<u64>,

  /// Log more (-v for progress, -vv for every instruction)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
}

fn main() -> ExitCode {
  let args = match Args::try_parse() {
    Ok(args) => args,
    // --help and --version
    Err(err) if !err.use_stderr() => err.exit(),
    Err(_) => {
      println!("{}", Args::command().render_usage());
      return ExitCode::FAILURE;
    }
  };

  let level = match args.verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    _ => LevelFilter::Trace,
  };
  if let Err(err) = SimpleLogger::new().with_level(level).init() {
    eprintln!("warning: logging disabled: {err}");
  }

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(args: &Args) -> anyhow::Result<()> {
  let program = Chunk::open(&args.program)?;
  let mut vm = Vm::with_config(Config {
    trace: args.trace,
    max_steps: args.max_steps,
  });
  vm.load(&program)
    .with_context(|| format!("could not load `{}`", args.program.display()))?;

  let mut out = io::stdout().lock();
  let result = vm.run(&mut out);
  out.flush()?;
  result?;
  Ok(())
}
