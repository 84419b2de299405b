//! Collaborators supplied by the host environment.
//!
//! The scheduler never touches storage directly: the project tree, the marker
//! store, the preference store and the project description are all reached
//! through these traits. [`crate::memory`] and [`crate::workspace`] provide
//! implementations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::BuildError;
use crate::marker::{Marker, MarkerAttributes, MarkerDepth, MarkerId};
use crate::options::OptionValue;
use crate::resource::{Resource, ResourceContents};

/// Read access to the resources of one project.
pub trait ProjectTree {
    /// Human-readable project name.
    fn name(&self) -> &str;

    /// Every resource under the project root, in tree order.
    ///
    /// A failure here is a [`BuildError::HostEnumeration`] and ends the pass.
    fn members(&self) -> Result<Vec<Resource>, BuildError>;

    /// Reads the raw content of a file resource.
    fn read(&self, resource: &Resource) -> Result<ResourceContents, BuildError>;
}

/// Persisted, positioned annotations on resources.
pub trait MarkerStore {
    fn create(
        &self,
        resource: &Resource,
        marker_type: &str,
        attributes: MarkerAttributes,
    ) -> Result<MarkerId, BuildError>;

    fn exists(&self, id: MarkerId) -> bool;

    fn delete(
        &self,
        resource: &Resource,
        marker_type: &str,
        depth: MarkerDepth,
    ) -> Result<(), BuildError>;

    /// Markers of `marker_type` attached to exactly `resource`.
    fn markers(&self, resource: &Resource, marker_type: &str) -> Result<Vec<Marker>, BuildError>;
}

/// Source of lint option values.
pub trait PreferenceStore {
    /// Loads the stored option values, keyed by option name.
    fn load(&self) -> Result<BTreeMap<String, OptionValue>, BuildError>;
}

/// Access to a project's nature list.
pub trait ProjectDescription {
    fn nature_ids(&self) -> Result<Vec<String>, BuildError>;

    fn set_nature_ids(&self, ids: Vec<String>) -> Result<(), BuildError>;
}

/// Progress reporting and cooperative cancellation for a pass.
pub trait ProgressMonitor {
    fn begin_task(&self, _name: &str, _total: Option<usize>) {}

    fn sub_task(&self, _name: &str) {}

    fn worked(&self, _units: usize) {}

    fn is_canceled(&self) -> bool {
        false
    }

    fn done(&self) {}
}

/// A monitor that reports nothing and is never canceled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressMonitor;

impl ProgressMonitor for NullProgressMonitor {}

/// A monitor backed by a shared cancellation flag.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for CancelFlag {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
