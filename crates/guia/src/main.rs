//! guia CLI - build entry point for the documentation site.
//!
//! Provides commands for:
//! - `build`: Validate the configuration and build the static site
//! - `dev`: Validate the configuration and start the development server
//!
//! Rendering itself is done by the external renderer configured in
//! `[renderer]`; these commands validate first and never start it with an
//! invalid configuration.

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, RenderMode};
use output::Output;

/// guia - documentation site builder.
#[derive(Parser)]
#[command(name = "guia", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site.
    Build(RenderArgs),
    /// Start the development server.
    Dev(RenderArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) | Commands::Dev(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(RenderMode::Build),
        Commands::Dev(args) => args.execute(RenderMode::Dev),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&err);
            ExitCode::FAILURE
        }
    }
}
