//! Clean command implementation

use miette::{IntoDiagnostic, Result};

use crate::cli::Cli;

use super::open_workspace;

pub fn run_clean(cli: &Cli) -> Result<()> {
    let workspace = open_workspace(cli)?;
    workspace.clean().into_diagnostic()?;
    Ok(())
}
