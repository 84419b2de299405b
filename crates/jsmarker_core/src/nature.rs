//! Per-project opt-in to lint builds.

use tracing::{error, info};

use crate::error::BuildError;
use crate::host::ProjectDescription;

/// Nature identifier marking a project as linted.
pub const NATURE_ID: &str = "jslint4java.jsLintNature";

/// Builder identifier the host associates with [`NATURE_ID`].
pub const BUILDER_ID: &str = "jslint4java.jsLintBuilder";

/// Returns whether `project` carries the lint nature.
pub fn is_enabled(project: &dyn ProjectDescription) -> Result<bool, BuildError> {
    Ok(project.nature_ids()?.iter().any(|id| id == NATURE_ID))
}

/// Flips projects in and out of the eligibility set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NatureToggle;

impl NatureToggle {
    pub fn new() -> Self {
        Self
    }

    /// Adds the nature if absent, removes it otherwise, and returns the new state.
    ///
    /// On failure nothing is written and the error is logged.
    pub fn toggle(&self, project: &dyn ProjectDescription) -> Result<bool, BuildError> {
        let result = Self::flip(project);
        match &result {
            Ok(true) => info!("Enabled {}", NATURE_ID),
            Ok(false) => info!("Disabled {}", NATURE_ID),
            Err(e) => error!("Failed to toggle {}: {}", NATURE_ID, e),
        }
        result
    }

    /// Toggles every project of a selection. Failed projects are skipped.
    ///
    /// Returns the new state per project, `None` where toggling failed.
    pub fn toggle_all(&self, projects: &[&dyn ProjectDescription]) -> Vec<Option<bool>> {
        projects
            .iter()
            .map(|project| self.toggle(*project).ok())
            .collect()
    }

    fn flip(project: &dyn ProjectDescription) -> Result<bool, BuildError> {
        let mut natures = project.nature_ids()?;
        let enabled = if let Some(pos) = natures.iter().position(|id| id == NATURE_ID) {
            natures.remove(pos);
            false
        } else {
            natures.push(NATURE_ID.to_string());
            true
        };
        project.set_nature_ids(natures)?;
        Ok(enabled)
    }
}
