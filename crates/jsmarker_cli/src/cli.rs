//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// jsmarker - JavaScript lint markers with incremental builds
#[derive(Parser)]
#[command(name = "jsmarker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root directory
    #[arg(short, long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and enable linting for the project
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Run a build pass
    Build {
        /// Lint every file instead of only the changed ones
        #[arg(long)]
        full: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print published markers
    Markers {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Delete all markers and the change snapshot
    Clean,

    /// Manage the lint nature of the project
    Nature {
        #[command(subcommand)]
        command: NatureCommands,
    },
}

#[derive(Subcommand)]
pub enum NatureCommands {
    /// Enable linting if disabled, disable it otherwise
    Toggle,

    /// Show whether linting is enabled
    Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
