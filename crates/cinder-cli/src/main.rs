//! Cinder CLI.
//!
//! Drives a single segment file handle from the command line.
//!
//! # Quick Start
//!
//! ```bash
//! # Create a fresh segment, seek past its end and write into the gap
//! cinder probe ./data/segment_000000.dat
//!
//! # Write 16 MiB in 4 KiB pages and report latency per batch
//! cinder fill ./data/big.dat --count 4096 --report-every 512
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cinder_config::{CinderConfig, ConfigLoader};
use clap::{Parser, Subcommand};

/// Cinder - positioned file handles for segment storage.
#[derive(Parser)]
#[command(name = "cinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory to load cinder.toml from.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Load this TOML file only, skipping the layered sources.
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exclusive-create a file, seek to 10, write 12 zero bytes, close.
    Probe {
        /// File to create. Defaults to segment 0 in the data directory.
        path: Option<PathBuf>,
    },

    /// Write fixed-size chunks in a loop and report per-batch latency.
    Fill {
        /// File to create or truncate.
        path: PathBuf,

        /// Bytes per write.
        #[arg(short, long, default_value = "4096")]
        chunk: usize,

        /// Number of writes.
        #[arg(short = 'n', long, default_value = "1024")]
        count: u64,

        /// Print a latency line every this many writes.
        #[arg(short, long, default_value = "256")]
        report_every: u64,
    },

    /// Print the length of an existing file.
    Stat {
        /// File to inspect.
        path: PathBuf,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Probe { path } => {
            let path = path.unwrap_or_else(|| config.data.segment_path(0));
            commands::probe::run(&path, &config.io)
        }
        Commands::Fill {
            path,
            chunk,
            count,
            report_every,
        } => commands::fill::run(&path, &config.io, chunk, count, report_every),
        Commands::Stat { path } => commands::stat::run(&path, &config.io),
        Commands::Config => commands::config::show(&config),
    }
}

fn load_config(cli: &Cli) -> Result<CinderConfig> {
    match &cli.config_file {
        Some(file) => CinderConfig::from_file(file)
            .with_context(|| format!("Failed to load {}", file.display())),
        None => ConfigLoader::new().with_project_dir(&cli.project).load(),
    }
}
