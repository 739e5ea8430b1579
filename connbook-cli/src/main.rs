//! `ConnBook` CLI - Command-line interface for the `ConnBook` connection book
//!
//! Provides commands for listing, adding, updating, moving and deleting
//! connections and folders, addressing nodes by positional path, importing
//! and exporting OpenSSH client configuration, and merging documents.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use connbook_core::config::LoggingSettings;
use connbook_core::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

use crate::error::CliError;
use crate::util::Context;

fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    if let Err(e) = run(cli) {
        if !quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let context = Context::new(cli.config.as_deref(), cli.document)?;
    init_logging(&context.settings.logging, cli.verbose, cli.quiet);
    commands::dispatch(&context, cli.command)
}

/// Starts tracing at the configured level raised by `-v` flags
fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) {
    let level = if quiet {
        TracingLevel::Error
    } else {
        settings.level.raised_by(verbose)
    };
    let output = settings
        .file
        .clone()
        .map_or(TracingOutput::Stderr, TracingOutput::File);
    let config = TracingConfig::new().with_level(level).with_output(output);

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
}
