//! In-memory host collaborators.
//!
//! Useful for embedding the scheduler in a host that keeps its own state, and
//! as the reference host in tests. Every collaborator can be told to fail so
//! that error isolation can be exercised.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::BuildError;
use crate::host::{MarkerStore, PreferenceStore, ProjectDescription, ProjectTree};
use crate::marker::{Marker, MarkerAttributes, MarkerDepth, MarkerId};
use crate::options::OptionValue;
use crate::resource::{Resource, ResourceContents};

#[derive(Debug, Default)]
struct ProjectState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    inaccessible: BTreeSet<PathBuf>,
    natures: Vec<String>,
    fail_enumeration: bool,
    fail_description: bool,
}

/// A project whose files live in memory.
#[derive(Debug)]
pub struct MemoryProject {
    name: String,
    charset: Option<String>,
    state: Mutex<ProjectState>,
}

impl MemoryProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            charset: None,
            state: Mutex::new(ProjectState::default()),
        }
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.write_file(path, content);
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_natures(self, natures: &[&str]) -> Self {
        self.state.lock().natures = natures.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn write_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.state.lock().files.insert(path.into(), content.into());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.state.lock().files.remove(path.as_ref());
    }

    /// Marks a file as present but unreadable.
    pub fn set_inaccessible(&self, path: impl Into<PathBuf>) {
        self.state.lock().inaccessible.insert(path.into());
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.state.lock().fail_enumeration = fail;
    }

    pub fn fail_description(&self, fail: bool) {
        self.state.lock().fail_description = fail;
    }
}

impl ProjectTree for MemoryProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Result<Vec<Resource>, BuildError> {
        let state = self.state.lock();
        if state.fail_enumeration {
            return Err(BuildError::host_enumeration(format!(
                "project '{}' is closed",
                self.name
            )));
        }

        // Component-wise ordering puts every container before its members.
        let mut entries: BTreeMap<PathBuf, Resource> = BTreeMap::new();
        for path in state.files.keys() {
            for ancestor in path.ancestors().skip(1) {
                if ancestor.as_os_str().is_empty() {
                    break;
                }
                entries
                    .entry(ancestor.to_path_buf())
                    .or_insert_with(|| Resource::container(ancestor));
            }
            let accessible = !state.inaccessible.contains(path);
            entries.insert(
                path.clone(),
                Resource::file(path.clone()).with_accessible(accessible),
            );
        }

        Ok(entries.into_values().collect())
    }

    fn read(&self, resource: &Resource) -> Result<ResourceContents, BuildError> {
        let state = self.state.lock();
        if state.inaccessible.contains(resource.path()) {
            return Err(BuildError::read(format!(
                "{} is not readable",
                resource.path().display()
            )));
        }
        let bytes = state.files.get(resource.path()).ok_or_else(|| {
            BuildError::read(format!("{} does not exist", resource.path().display()))
        })?;

        let mut contents = ResourceContents::new(bytes.clone());
        contents.charset = self.charset.clone();
        Ok(contents)
    }
}

impl ProjectDescription for MemoryProject {
    fn nature_ids(&self) -> Result<Vec<String>, BuildError> {
        let state = self.state.lock();
        if state.fail_description {
            return Err(BuildError::project_description("description is locked"));
        }
        Ok(state.natures.clone())
    }

    fn set_nature_ids(&self, ids: Vec<String>) -> Result<(), BuildError> {
        let mut state = self.state.lock();
        if state.fail_description {
            return Err(BuildError::project_description("description is locked"));
        }
        state.natures = ids;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MarkerState {
    next_id: u64,
    markers: Vec<Marker>,
    fail_deletes: bool,
    fail_creates: bool,
    drop_created: bool,
}

/// Marker store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    state: Mutex<MarkerState>,
}

impl MemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All markers, in creation order.
    pub fn all(&self) -> Vec<Marker> {
        self.state.lock().markers.clone()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().fail_deletes = fail;
    }

    pub fn fail_creates(&self, fail: bool) {
        self.state.lock().fail_creates = fail;
    }

    /// Makes `create` hand out ids without keeping the marker.
    pub fn drop_created(&self, drop: bool) {
        self.state.lock().drop_created = drop;
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn create(
        &self,
        resource: &Resource,
        marker_type: &str,
        attributes: MarkerAttributes,
    ) -> Result<MarkerId, BuildError> {
        let mut state = self.state.lock();
        if state.fail_creates {
            return Err(BuildError::marker_store("marker store is read-only"));
        }
        state.next_id += 1;
        let id = MarkerId(state.next_id);
        if !state.drop_created {
            state.markers.push(Marker {
                id,
                path: resource.path().to_path_buf(),
                marker_type: marker_type.to_string(),
                attributes,
            });
        }
        Ok(id)
    }

    fn exists(&self, id: MarkerId) -> bool {
        self.state.lock().markers.iter().any(|m| m.id == id)
    }

    fn delete(
        &self,
        resource: &Resource,
        marker_type: &str,
        depth: MarkerDepth,
    ) -> Result<(), BuildError> {
        let mut state = self.state.lock();
        if state.fail_deletes {
            return Err(BuildError::marker_store("marker store is read-only"));
        }
        state.markers.retain(|m| {
            m.marker_type != marker_type || !depth.covers(&m.path, resource.path())
        });
        Ok(())
    }

    fn markers(&self, resource: &Resource, marker_type: &str) -> Result<Vec<Marker>, BuildError> {
        Ok(self
            .state
            .lock()
            .markers
            .iter()
            .filter(|m| m.path == resource.path() && m.marker_type == marker_type)
            .cloned()
            .collect())
    }
}

/// Preference values kept in memory.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, OptionValue>>,
    fail: Mutex<bool>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: OptionValue) {
        self.values.lock().insert(name.to_string(), value);
    }

    pub fn fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self) -> Result<BTreeMap<String, OptionValue>, BuildError> {
        if *self.fail.lock() {
            return Err(BuildError::preference_access("preference store unavailable"));
        }
        Ok(self.values.lock().clone())
    }
}

/// Test engine: one issue per line containing a loose `==` when `eqeqeq` is on.
#[cfg(test)]
pub(crate) fn eqeqeq_engine(
    _name: &str,
    source: &str,
    options: &crate::options::LintOptions,
) -> Result<Vec<crate::issue::Issue>, BuildError> {
    if options.get_bool("eqeqeq") != Some(true) {
        return Ok(Vec::new());
    }
    Ok(source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.replace("===", "").replace("!==", "").contains("=="))
        .map(|(i, _)| {
            crate::issue::Issue::new(i as u32 + 1, "Expected '===' and instead saw '=='.")
        })
        .collect())
}
