#![deny(missing_docs)]

//! # OAP CLI
//!
//! Command Line Interface for the OpenAPI type resolution core.
//!
//! Supported Commands:
//! - `resolve`: Resolves an API description with mapping files and prints the type report.
//! - `check-mapping`: Validates mapping files.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod check;
mod error;
mod resolve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI type resolution CLI")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve schemas and endpoints into the type report.
    Resolve(resolve::ResolveArgs),
    /// Parse mapping files and summarize their rules.
    CheckMapping(check::CheckArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(args)?,
        Commands::CheckMapping(args) => check::execute(args)?,
    }

    Ok(())
}
