//! jsmarker CLI
//!
//! Lints the JavaScript files of a project directory and keeps the issues as
//! markers between runs.

mod cli;
mod commands;
mod output;
mod progress;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, NatureCommands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_markers) => {
            if has_markers {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Init { force } => commands::init::run_init(&cli, *force).map(|_| false),
        Commands::Build { full, format } => commands::build::run_build(&cli, *full, *format),
        Commands::Markers { format } => {
            commands::markers::run_markers(&cli, *format).map(|_| false)
        }
        Commands::Clean => commands::clean::run_clean(&cli).map(|_| false),
        Commands::Nature { command } => match command {
            NatureCommands::Toggle => commands::nature::run_toggle(&cli).map(|_| false),
            NatureCommands::Status => commands::nature::run_status(&cli).map(|_| false),
        },
    }
}
