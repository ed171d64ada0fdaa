//! newsidx CLI
//!
//! Builds inverted indexes over a news-article dataset and measures
//! search latency across backends.
//!
//! # Commands
//!
//! - `build` - Index a dataset directory and optionally save the index
//! - `search` - Run one query against a saved index
//! - `inspect` - Display structural statistics of a saved index
//! - `experiment` - Replay generated search sets and log timings to CSV

mod commands;

use clap::{Parser, Subcommand};
use newsidx_core::BackendKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inverted-index builder and search benchmark for news articles.
#[derive(Parser)]
#[command(name = "newsidx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a dataset directory
    Build {
        /// Root folder of the dataset
        #[arg(short, long)]
        dataset: PathBuf,

        /// Index backend (bst, avl, hash, array)
        #[arg(short, long, default_value = "avl")]
        backend: BackendKind,

        /// Initial bucket count for the hash backend
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Save the built index to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every key in ascending order
        #[arg(long)]
        print_keys: bool,
    },

    /// Search a saved index
    Search {
        /// Saved index file
        #[arg(short, long)]
        index: PathBuf,

        /// Query words; documents must contain all of them
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Display index statistics
    Inspect {
        /// Saved index file
        #[arg(short, long)]
        index: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Replay generated search sets and log timings
    Experiment {
        /// Saved index file
        #[arg(short, long)]
        index: PathBuf,

        /// Number of search sets
        #[arg(short, long, default_value_t = newsidx_corpus::experiment::DEFAULT_RUNS)]
        runs: usize,

        /// Seed of the first search set
        #[arg(short, long, default_value_t = newsidx_corpus::experiment::DEFAULT_BASE_SEED)]
        seed: u64,

        /// CSV file to append timings to
        #[arg(short, long, default_value = newsidx_corpus::DEFAULT_CSV_FILENAME)]
        csv: PathBuf,

        /// Documents in the indexed corpus (default: counted from the index)
        #[arg(long)]
        num_docs: Option<usize>,

        /// CPU description recorded in the log
        #[arg(long, default_value = std::env::consts::ARCH)]
        proc_type: String,

        /// Main memory in GB recorded in the log
        #[arg(long, default_value_t = 8)]
        memory_gb: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Build {
            dataset,
            backend,
            capacity,
            output,
            print_keys,
        } => {
            commands::build::run(&dataset, backend, capacity, output.as_deref(), print_keys)?;
        }
        Commands::Search { index, query } => {
            commands::search::run(&index, &query.join(" "))?;
        }
        Commands::Inspect { index, format } => {
            commands::inspect::run(&index, &format)?;
        }
        Commands::Experiment {
            index,
            runs,
            seed,
            csv,
            num_docs,
            proc_type,
            memory_gb,
        } => {
            let options = commands::experiment::ExperimentOptions {
                runs,
                seed,
                csv,
                num_docs,
                proc_type,
                memory_gb,
            };
            commands::experiment::run(&index, &options)?;
        }
        Commands::Version => {
            println!("newsidx CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("newsidx core v{}", newsidx_core::VERSION);
        }
    }

    Ok(())
}
