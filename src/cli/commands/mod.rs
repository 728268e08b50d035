//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod collect;
mod domains;
mod results;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use adstream::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "adstream")]
#[command(about = "Classify websites by streaming video and ad-network presence")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding result CSV files (overrides config and ADSTREAM_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Visit domains in a headless browser and store the classification
    Collect {
        /// Domains to analyze (defaults to the configured list)
        domains: Vec<String>,
        /// Maximum number of pages open at once
        #[arg(short, long)]
        concurrency: Option<usize>,
        /// Navigation timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Dataset name to write (defaults to the configured dataset)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind: PORT, HOST, or HOST:PORT
        bind: Option<String>,
    },

    /// Print a stored result file
    Results {
        /// Dataset name (defaults to the configured dataset)
        #[arg(short, long)]
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the configured domains
    Domains,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };
    let (mut settings, _config) = load_settings(options).await?;

    match cli.command {
        Commands::Collect {
            domains,
            concurrency,
            timeout,
            output,
        } => {
            if let Some(concurrency) = concurrency {
                settings.concurrency = concurrency;
            }
            if let Some(timeout) = timeout {
                settings.navigation_timeout = timeout;
            }
            collect::cmd_collect(&settings, &domains, output.as_deref()).await
        }
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Results { name, json } => {
            results::cmd_results(&settings, name.as_deref(), json).await
        }
        Commands::Domains => domains::cmd_domains(&settings).await,
    }
}
