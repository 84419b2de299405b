//! JSON output formatter

use jsmarker_core::{BuildReport, Marker};
use miette::{IntoDiagnostic, Result};

pub fn output_report(report: &BuildReport, markers: &[Marker]) -> Result<()> {
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|(path, error)| {
            serde_json::json!({
                "path": path.display().to_string(),
                "error": error.to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "status": report.status,
        "mode": report.mode,
        "files": report.files,
        "failures": failures,
        "markers": markers,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}

pub fn output_markers(markers: &[Marker]) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(markers).into_diagnostic()?
    );
    Ok(())
}
