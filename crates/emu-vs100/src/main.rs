//! VAXstation 100 runner.
//!
//! Boots the ROM image, optionally connects to a host, and runs until a
//! fatal error or the step limit. Logging goes to stderr at the level named
//! by `VS100_LOG`.

mod logger;

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_core::{Observable, Ticks};
use machine_vs100::memory::load_rom;
use machine_vs100::{MachineError, Vs100, Vs100Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 16 KiB boot ROM image
    #[arg(long)]
    rom: PathBuf,

    /// Host to connect the fibre link to
    #[arg(long)]
    host: Option<String>,

    /// TCP port on the host
    #[arg(long, default_value_t = 7000_u16)]
    port: u16,

    /// Stop after this many instructions
    #[arg(long)]
    steps: Option<u64>,

    /// Ticks between a BBA go command and the operation
    #[arg(long, default_value_t = 1000)]
    bba_latency: u64,

    /// Log every instruction
    #[arg(long)]
    trace: bool,

    /// Write the screen as a PBM image when the run ends
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

/// State reported when the run ends.
const SUMMARY: [&str; 5] = ["cpu.pc", "cpu.sr", "ticks", "bus_errors", "leds.pattern"];

fn run(args: &Args) -> Result<(), MachineError> {
    let mut config = Vs100Config::new(load_rom(&args.rom)?);
    config.host = args.host.as_ref().map(|host| format!("{host}:{}", args.port));
    config.bba_latency = Ticks::new(args.bba_latency);
    config.trace = args.trace;

    let mut machine = Vs100::new(config)?;
    let outcome = match args.steps {
        Some(steps) => machine.run(steps),
        None => loop {
            if let Err(error) = machine.step() {
                break Err(error);
            }
        },
    };

    for path in SUMMARY {
        if let Some(value) = machine.query(path) {
            log::info!("{path} = {value}");
        }
    }

    if let Some(path) = &args.screenshot {
        if let Err(e) = std::fs::write(path, machine.screen_pbm()) {
            eprintln!("cannot write {}: {e}", path.display());
        }
    }
    outcome
}

fn main() {
    let args = Args::parse();
    logger::init();

    if let Err(error) = run(&args) {
        eprintln!("emu-vs100: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}
