//! Text output formatter

use std::path::Path;

use jsmarker_core::{BuildMode, BuildReport, Marker, PassStatus, Severity};

pub fn output_report(report: &BuildReport, markers: &[Marker]) {
    if report.status == PassStatus::Skipped {
        println!("Build skipped: linting is not enabled");
        return;
    }

    output_markers(markers);

    for (path, error) in &report.failures {
        println!("\n{}: not linted: {}", path.display(), error);
    }

    let mode = match report.mode {
        Some(BuildMode::Full) => "full",
        Some(BuildMode::Incremental) => "incremental",
        None => "no",
    };
    let canceled = if report.status == PassStatus::Canceled {
        " (canceled)"
    } else {
        ""
    };

    println!();
    println!(
        "Ran {} build{}: linted {} files, {} markers in project",
        mode,
        canceled,
        report.files.len(),
        markers.len()
    );
}

pub fn output_markers(markers: &[Marker]) {
    let mut current: Option<&Path> = None;
    for marker in markers {
        if current != Some(marker.path.as_path()) {
            println!("\n{}:", marker.path.display());
            current = Some(marker.path.as_path());
        }
        let severity = match marker.attributes.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        println!(
            "  {} {}: {}",
            marker.attributes.line, severity, marker.attributes.message
        );
    }
}
