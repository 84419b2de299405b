//! Diagnostic markers and their per-file synchronization.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::BuildError;
use crate::host::MarkerStore;
use crate::issue::{Issue, Severity};
use crate::resource::Resource;

/// Marker type owned by this system.
pub const MARKER_TYPE: &str = "jslint4java.javaScriptLintProblem";

/// Source tag stored on every marker this system creates.
pub const SOURCE_ID: &str = "jslint4java";

/// Identifier assigned by a marker store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

/// How far below a resource a deletion reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDepth {
    /// The resource itself.
    Zero,
    /// The resource and its direct members.
    One,
    /// The resource and everything below it.
    Infinite,
}

impl MarkerDepth {
    /// Returns true when a marker on `path` is reached by an operation on `target`.
    pub fn covers(self, path: &Path, target: &Path) -> bool {
        match self {
            MarkerDepth::Zero => path == target,
            MarkerDepth::One => path == target || path.parent() == Some(target),
            MarkerDepth::Infinite => path.starts_with(target),
        }
    }
}

/// Attributes carried by a marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerAttributes {
    pub message: String,
    pub severity: Severity,
    pub line: u32,
    pub source_id: String,
}

impl MarkerAttributes {
    /// Attributes for a lint issue. The issue's own severity is not carried over.
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            message: issue.message.clone(),
            severity: Severity::Warning,
            line: issue.line,
            source_id: SOURCE_ID.to_string(),
        }
    }
}

/// A persisted marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub path: PathBuf,
    pub marker_type: String,
    #[serde(flatten)]
    pub attributes: MarkerAttributes,
}

/// Result of synchronizing one resource.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub created: usize,
    pub failures: Vec<BuildError>,
}

impl SyncOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replaces the markers of a resource with those of its latest lint.
pub struct MarkerSynchronizer<'a> {
    store: &'a dyn MarkerStore,
}

impl<'a> MarkerSynchronizer<'a> {
    pub fn new(store: &'a dyn MarkerStore) -> Self {
        Self { store }
    }

    /// Deletes this system's markers on `resource`, then creates one per issue.
    ///
    /// Store failures are logged and collected; they never abort the caller.
    pub fn synchronize(&self, resource: &Resource, issues: &[Issue]) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        if let Err(e) = self.clear(resource) {
            outcome.failures.push(e);
        }

        for issue in issues {
            match self.add_marker(resource, issue) {
                Ok(()) => outcome.created += 1,
                Err(e) => {
                    error!("Failed to add marker to {}: {}", resource.path().display(), e);
                    outcome.failures.push(e);
                }
            }
        }

        debug!(
            "Published {} markers on {}",
            outcome.created,
            resource.path().display()
        );
        outcome
    }

    /// Deletes this system's markers on exactly `resource`.
    pub fn clear(&self, resource: &Resource) -> Result<(), BuildError> {
        self.store
            .delete(resource, MARKER_TYPE, MarkerDepth::Zero)
            .inspect_err(|e| {
                error!(
                    "Failed to delete markers on {}: {}",
                    resource.path().display(),
                    e
                )
            })
    }

    fn add_marker(&self, resource: &Resource, issue: &Issue) -> Result<(), BuildError> {
        let id = self
            .store
            .create(resource, MARKER_TYPE, MarkerAttributes::from_issue(issue))?;
        if !self.store.exists(id) {
            return Err(BuildError::marker_store(format!(
                "marker {} vanished after creation",
                id.0
            )));
        }
        Ok(())
    }
}
