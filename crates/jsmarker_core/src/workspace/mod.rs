//! Filesystem host: a directory treated as a project.
//!
//! State lives next to the sources:
//! - `.jsmarker/project.json`: the nature list
//! - `.jsmarker/markers.json`: published markers
//! - `.jsmarker/snapshot.json`: content hashes of the last pass
//!
//! Preferences come from `.jsmarker.jsonc` in the project root.

mod markers;
mod snapshot;

pub use markers::MarkerFile;
pub use snapshot::Snapshot;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{ConfigPreferences, ProjectConfig};
use crate::delta::{BuildKind, BuildTrigger};
use crate::error::BuildError;
use crate::host::{MarkerStore, ProgressMonitor, ProjectDescription, ProjectTree};
use crate::marker::{MARKER_TYPE, MarkerDepth};
use crate::options::LintOptions;
use crate::resource::{Resource, ResourceContents};
use crate::scheduler::{BuildContext, BuildReport, BuildScheduler, PassStatus};

/// Directory, relative to the project root, holding host state.
pub const STATE_DIR: &str = ".jsmarker";

const DESCRIPTION_FILE: &str = "project.json";
const MARKERS_FILE: &str = "markers.json";
const SNAPSHOT_FILE: &str = "snapshot.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DescriptionDocument {
    #[serde(default)]
    natures: Vec<String>,
}

/// A project rooted at a directory.
#[derive(Debug)]
pub struct FsProject {
    root: PathBuf,
    name: String,
    charset: Option<String>,
    exclude: Option<GlobSet>,
}

impl FsProject {
    /// Opens the project rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, config: &ProjectConfig) -> Result<Self, BuildError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BuildError::config(format!(
                "Project root is not a directory: {}",
                root.display()
            )));
        }

        let name = root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| root.display().to_string());

        Ok(Self {
            root,
            name,
            charset: config.charset.clone(),
            exclude: build_globset(&config.exclude)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        if relative.starts_with(STATE_DIR) {
            return true;
        }
        self.exclude
            .as_ref()
            .is_some_and(|excludes| excludes.is_match(relative))
    }

    fn relative<'p>(&self, path: &'p Path) -> Option<&'p Path> {
        path.strip_prefix(&self.root).ok()
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, BuildError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| BuildError::config(format!("Invalid glob pattern: {}", e)))?;
        builder.add(glob);
    }

    let globset = builder
        .build()
        .map_err(|e| BuildError::config(format!("Failed to build globset: {}", e)))?;

    Ok(Some(globset))
}

impl ProjectTree for FsProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn members(&self) -> Result<Vec<Resource>, BuildError> {
        let mut resources = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                self.relative(entry.path())
                    .is_none_or(|relative| !self.is_excluded(relative))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(BuildError::host_enumeration(format!(
                        "Cannot walk {}: {}",
                        self.root.display(),
                        e
                    )));
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let Some(relative) = self.relative(entry.path()) else {
                continue;
            };
            let file_type = entry.file_type();
            if file_type.is_dir() {
                resources.push(Resource::container(relative));
            } else if file_type.is_file() {
                resources.push(Resource::file(relative));
            }
        }

        Ok(resources)
    }

    fn read(&self, resource: &Resource) -> Result<ResourceContents, BuildError> {
        let path = self.root.join(resource.path());
        let bytes = fs::read(&path)
            .map_err(|e| BuildError::read(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut contents = ResourceContents::new(bytes);
        contents.charset = self.charset.clone();
        Ok(contents)
    }
}

impl ProjectDescription for FsProject {
    fn nature_ids(&self) -> Result<Vec<String>, BuildError> {
        let path = self.state_dir().join(DESCRIPTION_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read(&path).map_err(|e| {
            BuildError::project_description(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let document: DescriptionDocument = serde_json::from_slice(&content).map_err(|e| {
            BuildError::project_description(format!("Invalid {}: {}", path.display(), e))
        })?;
        Ok(document.natures)
    }

    fn set_nature_ids(&self, ids: Vec<String>) -> Result<(), BuildError> {
        let path = self.state_dir().join(DESCRIPTION_FILE);
        let json = serde_json::to_vec_pretty(&DescriptionDocument { natures: ids })
            .map_err(|e| BuildError::project_description(e.to_string()))?;
        fs::create_dir_all(self.state_dir())
            .and_then(|()| fs::write(&path, json))
            .map_err(|e| {
                BuildError::project_description(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                ))
            })
    }
}

/// A project directory together with its marker file and preferences.
#[derive(Debug)]
pub struct Workspace {
    project: FsProject,
    config: ProjectConfig,
    config_path: Option<PathBuf>,
    markers: MarkerFile,
}

impl Workspace {
    /// Opens the project at `root`, discovering its configuration unless one is given.
    pub fn open(
        root: impl Into<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, BuildError> {
        let root = root.into();
        let config_path = config_path.or_else(|| ProjectConfig::discover(&root));
        let config = match &config_path {
            Some(path) => {
                info!("Using config: {}", path.display());
                ProjectConfig::from_file(path)?
            }
            None => ProjectConfig::new(),
        };

        let project = FsProject::open(root, &config)?;
        let markers = MarkerFile::load(project.state_dir().join(MARKERS_FILE))?;

        Ok(Self {
            project,
            config,
            config_path,
            markers,
        })
    }

    pub fn project(&self) -> &FsProject {
        &self.project
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn markers(&self) -> &MarkerFile {
        &self.markers
    }

    fn snapshot_path(&self) -> PathBuf {
        self.project.state_dir().join(SNAPSHOT_FILE)
    }

    fn preferences(&self) -> ConfigPreferences {
        ConfigPreferences::new(self.config_path.clone())
    }

    /// Runs one pass and persists markers and the change snapshot.
    ///
    /// Non-full passes use the delta against the previous snapshot; without
    /// one the scheduler falls back to a full build.
    pub fn build(
        &self,
        scheduler: &mut BuildScheduler,
        kind: BuildKind,
        monitor: &dyn ProgressMonitor,
    ) -> Result<BuildReport, BuildError> {
        let preferences = self.preferences();
        let options = LintOptions::resolve(&preferences, scheduler.last_options());
        let members = self.project.members()?;
        let current = Snapshot::from_members(
            &self.project,
            &members,
            Snapshot::fingerprint(&options, &self.config),
        );

        let delta = match kind {
            BuildKind::Full => None,
            BuildKind::Incremental | BuildKind::Auto => {
                current.delta_since(Snapshot::load(&self.snapshot_path()).as_ref())
            }
        };

        let member_paths: HashSet<PathBuf> = members
            .iter()
            .filter(|r| r.is_file())
            .map(|r| r.path().to_path_buf())
            .collect();
        self.markers.retain_members(&member_paths);

        let ctx = BuildContext {
            project: &self.project,
            description: &self.project,
            markers: &self.markers,
            preferences: &preferences,
            monitor,
        };
        let report = scheduler.build(&ctx, &BuildTrigger { kind, delta })?;

        self.markers.save()?;

        // A canceled pass keeps the old snapshot so unprocessed changes are retried.
        if report.status == PassStatus::Completed {
            let mut snapshot = current;
            for (path, _) in &report.failures {
                snapshot.forget(path);
            }
            snapshot.save(&self.snapshot_path())?;
        }

        Ok(report)
    }

    /// Deletes every marker of this system and the snapshot.
    ///
    /// Returns the number of markers removed.
    pub fn clean(&self) -> Result<usize, BuildError> {
        let before = self.markers.all().len();
        self.markers
            .delete(&Resource::container(""), MARKER_TYPE, MarkerDepth::Infinite)?;
        let removed = before - self.markers.all().len();
        self.markers.save()?;

        match fs::remove_file(self.snapshot_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        info!("Removed {} marker(s)", removed);
        Ok(removed)
    }
}
