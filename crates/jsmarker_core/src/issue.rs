//! Issues reported by the lint engine.

use serde::{Deserialize, Serialize};

/// Severity level for issues and markers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    /// Every marker this system creates carries this severity.
    #[default]
    Warning,
    Info,
}

/// A single problem found by the lint engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable reason.
    #[serde(alias = "reason")]
    pub message: String,

    /// 1-based line number.
    pub line: u32,

    /// 1-based column, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<u32>,

    /// The offending source line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    #[serde(default)]
    pub severity: Severity,
}

impl Issue {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line,
            character: None,
            evidence: None,
            severity: Severity::Warning,
        }
    }

    pub fn with_character(mut self, character: u32) -> Self {
        self.character = Some(character);
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
