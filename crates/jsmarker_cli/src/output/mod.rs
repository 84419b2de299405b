//! Output formatting module

mod json;
mod text;

use jsmarker_core::{BuildReport, Marker};
use miette::Result;

use crate::cli::OutputFormat;

pub fn output_report(
    report: &BuildReport,
    markers: &[Marker],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => json::output_report(report, markers)?,
        OutputFormat::Text => text::output_report(report, markers),
    }
    Ok(())
}

pub fn output_markers(markers: &[Marker], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => json::output_markers(markers)?,
        OutputFormat::Text => text::output_markers(markers),
    }
    Ok(())
}
