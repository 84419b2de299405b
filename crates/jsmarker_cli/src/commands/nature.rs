//! Nature command implementation

use jsmarker_core::{NatureToggle, is_enabled};
use miette::{IntoDiagnostic, Result};

use crate::cli::Cli;

use super::open_workspace;

pub fn run_toggle(cli: &Cli) -> Result<()> {
    let workspace = open_workspace(cli)?;
    let enabled = NatureToggle::new()
        .toggle(workspace.project())
        .into_diagnostic()?;
    print_status(enabled);
    Ok(())
}

pub fn run_status(cli: &Cli) -> Result<()> {
    let workspace = open_workspace(cli)?;
    print_status(is_enabled(workspace.project()).into_diagnostic()?);
    Ok(())
}

fn print_status(enabled: bool) {
    if enabled {
        println!("enabled");
    } else {
        println!("disabled");
    }
}
