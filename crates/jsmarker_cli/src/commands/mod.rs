pub mod build;
pub mod clean;
pub mod init;
pub mod markers;
pub mod nature;

use jsmarker_core::Workspace;
use miette::{IntoDiagnostic, Result};

use crate::cli::Cli;

/// Opens the project named on the command line.
pub fn open_workspace(cli: &Cli) -> Result<Workspace> {
    Workspace::open(&cli.project, cli.config.clone()).into_diagnostic()
}
