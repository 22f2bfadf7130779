//! segy - SEG-Y volume inspector
//!
//! Prints headers, trace samples and survey geometry of a SEG-Y file.

mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use segy_core::{ByteOrder, OpenOptions, ScanOptions, SegyError, SegyFile};

#[derive(Parser, Debug)]
#[command(name = "segy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SEG-Y file to read
    file: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Read header fields as big-endian regardless of the text header
    #[arg(long, global = true, conflicts_with = "native_endian")]
    big_endian: bool,

    /// Read header fields in host byte order regardless of the text header
    #[arg(long, global = true)]
    native_endian: bool,

    /// Scan on the calling thread only
    #[arg(long, global = true, default_value_t = false)]
    sequential: bool,

    /// Read through a file handle instead of a memory map
    #[arg(long, global = true, default_value_t = false)]
    no_mmap: bool,

    /// -v for scan progress, -vv for decoding details
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Textual header as 40 card images
    Text,
    /// Binary header fields
    Binary,
    /// Encoding, byte order and trace layout
    Info,
    /// Trace header fields, one column per trace number
    Headers {
        #[arg(required = true)]
        traces: Vec<u64>,
    },
    /// Survey geometry and amplitude range (full scan)
    Scan,
    /// Samples of one trace
    Trace { trace: u64 },
    /// All traces of an inline
    Inline { inline: i64 },
    /// One trace per inline at a crossline
    Crossline { crossline: i64 },
}

impl Args {
    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        if self.big_endian {
            options = options.with_byte_order(ByteOrder::Big);
        } else if self.native_endian {
            options = options.with_byte_order(ByteOrder::Native);
        }
        if self.no_mmap {
            options = options.without_mmap();
        }
        options
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut scan = ScanOptions::new().with_running(running);
    if args.sequential {
        scan = scan.sequential();
    }

    let file = SegyFile::open_with(&args.file, args.open_options())
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let result = commands::run(&file, &args.command, &scan, args.json);
    if let Err(e) = &result {
        if matches!(e.downcast_ref::<SegyError>(), Some(SegyError::Cancelled)) {
            eprintln!("Interrupted");
            std::process::exit(130);
        }
    }
    result
}
