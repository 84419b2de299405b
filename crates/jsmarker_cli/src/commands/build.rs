//! Build command implementation

use jsmarker_core::{BuildKind, BuildScheduler, CommandEngine, PassStatus};
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat};
use crate::output::output_report;
use crate::progress::LogProgress;

use super::open_workspace;

/// Runs one pass. Returns whether any marker exists afterwards.
pub fn run_build(cli: &Cli, full: bool, format: OutputFormat) -> Result<bool> {
    let workspace = open_workspace(cli)?;

    let engine_config = workspace.config().resolved_engine().ok_or_else(|| {
        miette::miette!(
            help = "Add an \"engine\" section with the lint command to the config file.",
            "No lint engine configured"
        )
    })?;
    let engine = CommandEngine::from_config(&engine_config).in_dir(workspace.project().root());
    let mut scheduler = BuildScheduler::new(engine);

    let kind = if full {
        BuildKind::Full
    } else {
        BuildKind::Incremental
    };
    let report = workspace
        .build(&mut scheduler, kind, &LogProgress::new())
        .into_diagnostic()?;

    match report.status {
        PassStatus::Skipped => {
            warn!("Linting is not enabled for this project. Run `jsmarker nature toggle`.")
        }
        PassStatus::Canceled => info!("Build canceled"),
        PassStatus::Completed => {}
    }

    let markers = workspace.markers().all();
    output_report(&report, &markers, format)?;

    Ok(!markers.is_empty())
}
