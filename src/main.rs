//! sectorfs - interactive shell over an in-memory sector file system.
//!
//! Usage:
//!   sectorfs                     # asks for the disk capacity
//!   sectorfs -c 128              # 128 sectors of 64 bytes
//!   sectorfs -c 16 -e /tmp -v    # save `get` results to /tmp, debug logging

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use sector_fs::{MAX_CAPACITY, SectorFS};
use sector_fs::shell::{Reply, Shell};

#[derive(Parser)]
#[command(name = "sectorfs")]
#[command(about = "In-memory file system on a simulated sector disk")]
struct Args {
    /// Disk capacity in sectors (asked interactively when omitted)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Host directory that receives files fetched with `get`
    #[arg(short, long, default_value = ".")]
    export_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: bool) -> anyhow::Result<()> {
    log::set_logger(&LOGGER).map_err(|e| anyhow!("{e}"))?;
    log::set_max_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
    Ok(())
}

/// Prompts until a positive sector count no larger than `MAX_CAPACITY` is entered.
fn ask_capacity(input: &mut impl BufRead) -> anyhow::Result<usize> {
    loop {
        print!("Enter disk capacity (number of sectors): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no disk capacity given");
        }
        match line.trim().parse::<i64>() {
            Ok(capacity) if capacity > MAX_CAPACITY as i64 => {
                eprintln!("Error: Disk capacity cannot exceed {MAX_CAPACITY} sectors")
            }
            Ok(capacity) if capacity > 0 => return Ok(capacity as usize),
            _ => eprintln!("Error: Disk capacity must be positive"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose)?;

    println!("=== File System ===");
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let capacity = match args.capacity {
        Some(capacity) => capacity,
        None => ask_capacity(&mut input)?,
    };

    let fs = SectorFS::new(capacity)?;
    println!("File system created with {capacity} sectors");
    let mut shell = Shell::new(fs, args.export_dir);
    println!("{}", sector_fs::shell::HELP);

    loop {
        print!("fs:$ ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match shell.execute(&line) {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Nothing) => {}
            Ok(Reply::Exit) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }
    Ok(())
}
