//! Trellis CLI - pipeline dependency graphs from the command line.
//!
//! Trellis scans a project for comment-declared inputs and outputs and
//! reports the resulting dependency structure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Trellis: comment-annotation dependency scanning for research pipelines.
#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Code directory prefix under the project root
    #[arg(long, global = true)]
    code_prefix: Option<String>,

    /// Data directory prefix under the project root
    #[arg(long, global = true)]
    data_prefix: Option<String>,

    /// Analyzer kind to apply, in order (repeatable; sas, stata, notebook,
    /// statanotebook, python, latex, manual)
    #[arg(short, long = "kind", global = true)]
    kinds: Vec<String>,

    /// Folder name to skip anywhere in the tree (repeatable)
    #[arg(long = "ignore", global = true)]
    ignores: Vec<String>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the project and print per-file annotations
    Scan {
        /// Emit machine-readable JSON records instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build the dependency graph and write it as DOT
    Graph {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep dataset nodes that nothing consumes
        #[arg(long)]
        keep_dangling: bool,

        /// Leave unproduced inputs uncolored
        #[arg(long)]
        plain_orphans: bool,
    },

    /// Report circular dependencies
    Cycles,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // Set up logging based on verbosity
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let options = match cli::ScanOptions::resolve(
        args.root,
        args.code_prefix,
        args.data_prefix,
        &args.kinds,
        &args.ignores,
    ) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Scan { json } => cli::scan::run(&options, json),
        Commands::Graph {
            output,
            keep_dangling,
            plain_orphans,
        } => cli::graph::run(&options, output.as_deref(), keep_dangling, plain_orphans),
        Commands::Cycles => cli::cycles::run(&options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
