//! Marker store persisted as a JSON file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BuildError;
use crate::host::MarkerStore;
use crate::marker::{Marker, MarkerAttributes, MarkerDepth, MarkerId};
use crate::resource::Resource;

#[derive(Debug, Default, Serialize, Deserialize)]
struct MarkerDocument {
    next_id: u64,
    markers: Vec<Marker>,
}

/// Markers of a project, loaded from and saved to a JSON file.
///
/// Changes are kept in memory until [`MarkerFile::save`].
#[derive(Debug)]
pub struct MarkerFile {
    path: PathBuf,
    document: Mutex<MarkerDocument>,
}

impl MarkerFile {
    /// Loads the marker file at `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let path = path.into();
        let document = if path.exists() {
            let content = fs::read(&path).map_err(|e| {
                BuildError::marker_store(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_slice(&content).map_err(|e| {
                BuildError::marker_store(format!("Corrupt marker file {}: {}", path.display(), e))
            })?
        } else {
            MarkerDocument::default()
        };

        debug!(
            "Loaded {} markers from {}",
            document.markers.len(),
            path.display()
        );
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all markers to disk.
    pub fn save(&self) -> Result<(), BuildError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = {
            let document = self.document.lock();
            serde_json::to_vec_pretty(&*document).map_err(|e| {
                BuildError::marker_store(format!("Failed to serialize markers: {}", e))
            })?
        };
        fs::write(&self.path, json).map_err(|e| {
            BuildError::marker_store(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    /// All markers, ordered by path and then creation.
    pub fn all(&self) -> Vec<Marker> {
        let mut markers = self.document.lock().markers.clone();
        markers.sort_by(|a, b| a.path.cmp(&b.path).then(a.id.cmp(&b.id)));
        markers
    }

    /// Drops markers whose resource is not among `members`.
    ///
    /// Markers go away together with their resource, whether it was deleted
    /// or left the project tree through an exclude pattern.
    pub fn retain_members(&self, members: &HashSet<PathBuf>) -> usize {
        let mut document = self.document.lock();
        let before = document.markers.len();
        document.markers.retain(|m| members.contains(&m.path));
        let dropped = before - document.markers.len();
        if dropped > 0 {
            info!("Dropped {} marker(s) of resources outside the project", dropped);
        }
        dropped
    }
}

impl MarkerStore for MarkerFile {
    fn create(
        &self,
        resource: &Resource,
        marker_type: &str,
        attributes: MarkerAttributes,
    ) -> Result<MarkerId, BuildError> {
        let mut document = self.document.lock();
        document.next_id += 1;
        let id = MarkerId(document.next_id);
        document.markers.push(Marker {
            id,
            path: resource.path().to_path_buf(),
            marker_type: marker_type.to_string(),
            attributes,
        });
        Ok(id)
    }

    fn exists(&self, id: MarkerId) -> bool {
        self.document.lock().markers.iter().any(|m| m.id == id)
    }

    fn delete(
        &self,
        resource: &Resource,
        marker_type: &str,
        depth: MarkerDepth,
    ) -> Result<(), BuildError> {
        self.document.lock().markers.retain(|m| {
            m.marker_type != marker_type || !depth.covers(&m.path, resource.path())
        });
        Ok(())
    }

    fn markers(&self, resource: &Resource, marker_type: &str) -> Result<Vec<Marker>, BuildError> {
        Ok(self
            .document
            .lock()
            .markers
            .iter()
            .filter(|m| m.path == resource.path() && m.marker_type == marker_type)
            .cloned()
            .collect())
    }
}
