//! commitlog CLI
//!
//! Command-line interface for inspecting and editing a log directory.

use std::io::Read;

use clap::{Parser, Subcommand};
use commitlog::{Config, Log, Record};
use tracing_subscriber::{fmt, EnvFilter};

/// commitlog CLI
#[derive(Parser, Debug)]
#[command(name = "commitlog")]
#[command(about = "Append to, read from, and truncate a segmented commit log")]
#[command(version)]
struct Args {
    /// Log directory
    #[arg(short, long, default_value = "./commitlog_data")]
    dir: String,

    /// Store size in bytes that triggers segment rotation
    #[arg(long, default_value = "1024")]
    max_store_bytes: u64,

    /// Index capacity in bytes (12 bytes per record)
    #[arg(long, default_value = "1024")]
    max_index_bytes: u64,

    /// Base offset of the first segment of a new log
    #[arg(long, default_value = "0")]
    initial_offset: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one record per value
    Append {
        /// The values to append
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Read the record at an offset
    Read {
        /// The offset to read
        offset: u64,
    },

    /// Print the lowest offset and one past the highest
    Range,

    /// Drop every segment whose records all lie at or below an offset
    Truncate {
        /// The offset to truncate up to
        offset: u64,
    },

    /// Print every record in the log
    Dump,

    /// List segment base offsets
    Segments,

    /// Print the total size of the raw store bytes
    Size,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,commitlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .max_store_bytes(args.max_store_bytes)
        .max_index_bytes(args.max_index_bytes)
        .initial_offset(args.initial_offset)
        .build();

    let log = match Log::open(&args.dir, config) {
        Ok(log) => log,
        Err(e) => {
            tracing::error!("Failed to open log: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&log, args.command).and_then(|_| log.close());
    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(log: &Log, command: Commands) -> commitlog::Result<()> {
    match command {
        Commands::Append { values } => {
            for value in values {
                let offset = log.append(&Record::new(value.into_bytes()))?;
                println!("{}", offset);
            }
        }
        Commands::Read { offset } => {
            let record = log.read(offset)?;
            println!("{}", String::from_utf8_lossy(&record.value));
        }
        Commands::Range => {
            let (lowest, highest) = log.offset_range();
            println!("{} {}", lowest, highest);
        }
        Commands::Truncate { offset } => {
            log.truncate(offset)?;
            let (lowest, highest) = log.offset_range();
            println!("{} {}", lowest, highest);
        }
        Commands::Dump => {
            let (lowest, highest) = log.offset_range();
            for offset in lowest..highest {
                let record = log.read(offset)?;
                println!("{}\t{}", offset, String::from_utf8_lossy(&record.value));
            }
        }
        Commands::Segments => {
            for base_offset in log.segment_base_offsets() {
                println!("{}", base_offset);
            }
        }
        Commands::Size => {
            let mut bytes = Vec::new();
            log.reader().read_to_end(&mut bytes)?;
            println!("{}", bytes.len());
        }
    }
    Ok(())
}
