use anyhow::Result;
use clap::{Parser, Subcommand};
use courierlog::cli::{run_parse, run_review, run_stats};
use courierlog::config::Config;
use courierlog::transcript::{ReviewFilter, Severity, TranscriptParser};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "courierlog")]
#[command(about = "Attribute chat-export delivery blocks to drivers and dates")]
struct Cli {
    /// Config file (default: ~/.config/courierlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transcript and print its blocks
    Parse {
        file: PathBuf,
        /// Blocks to show in text mode (0 = all)
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Print blocks and import log as JSON
        #[arg(long)]
        json: bool,
    },
    /// List blocks pending human review
    Review {
        file: PathBuf,
        /// Only blocks attributed to this driver
        #[arg(long)]
        driver: Option<String>,
        /// Only blocks whose worst issue has this severity (critical, warning, info)
        #[arg(long)]
        severity: Option<Severity>,
        #[arg(long)]
        json: bool,
    },
    /// Review counts by status, severity and category
    Stats {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!(drivers = ?config.drivers, lookahead = config.trailer_lookahead, "config loaded");

    let parser = TranscriptParser::new(&config)?;

    match cli.command {
        Commands::Parse { file, limit, json } => run_parse(&parser, &file, limit, json)?,
        Commands::Review {
            file,
            driver,
            severity,
            json,
        } => {
            let filter = ReviewFilter { driver, severity };
            run_review(&parser, &file, &filter, json)?;
        }
        Commands::Stats { file, json } => run_stats(&parser, &file, json)?,
    }

    Ok(())
}
