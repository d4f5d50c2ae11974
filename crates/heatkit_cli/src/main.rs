mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::commands::{ExpandArgs, HeatsArgs, SourceArgs, run_columns, run_expand, run_heats};
use crate::config::load_config;

#[derive(Parser)]
#[command(name = "heatkit", version)]
#[command(about = "Split athletics registrations into balanced event heats", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./heatkit.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List source columns and the field each one maps to
    Columns(SourceArgs),
    /// Write one row per (athlete, event)
    Expand(ExpandArgs),
    /// Assign athletes to heats and export workbook and PDF heat sheets
    Heats(HeatsArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_line_number(cli.verbose >= 2)
        .init();

    debug!("heatkit started with verbosity level: {}", cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Columns(args) => run_columns(args, &config),
        Commands::Expand(args) => run_expand(args, &config),
        Commands::Heats(args) => run_heats(args, &config),
    });

    if let Err(e) = result {
        error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
