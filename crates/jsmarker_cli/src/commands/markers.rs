//! Markers command implementation

use miette::Result;

use crate::cli::{Cli, OutputFormat};
use crate::output::output_markers;

use super::open_workspace;

pub fn run_markers(cli: &Cli, format: OutputFormat) -> Result<()> {
    let workspace = open_workspace(cli)?;
    output_markers(&workspace.markers().all(), format)
}
