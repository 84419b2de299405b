//! Content snapshots used to derive a change delta between passes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ProjectConfig;
use crate::delta::ChangeEvent;
use crate::error::BuildError;
use crate::host::ProjectTree;
use crate::options::LintOptions;
use crate::resource::Resource;

/// Content hashes of the lintable files at the end of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hash of everything besides content that decides how files lint.
    pub fingerprint: String,
    /// BLAKE3 content hash per project-relative path.
    pub files: BTreeMap<PathBuf, String>,
}

impl Snapshot {
    /// Computes the BLAKE3 hash of content.
    pub fn hash_content(content: &[u8]) -> String {
        blake3::hash(content).to_hex().to_string()
    }

    /// Hash of the lint options and the configuration that shapes a pass.
    ///
    /// Covers the exclude globs, the charset and the engine command line.
    pub fn fingerprint(options: &LintOptions, config: &ProjectConfig) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(options.hash().as_bytes());
        for pattern in &config.exclude {
            hasher.update(b"\0exclude:");
            hasher.update(pattern.as_bytes());
        }
        if let Some(charset) = &config.charset {
            hasher.update(b"\0charset:");
            hasher.update(charset.as_bytes());
        }
        if let Some(engine) = &config.engine {
            hasher.update(b"\0engine:");
            hasher.update(engine.command.as_bytes());
            for arg in &engine.args {
                hasher.update(b"\0");
                hasher.update(arg.as_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Hashes every lintable file of `tree`.
    pub fn capture(
        tree: &dyn ProjectTree,
        fingerprint: impl Into<String>,
    ) -> Result<Self, BuildError> {
        Ok(Self::from_members(tree, &tree.members()?, fingerprint))
    }

    /// Hashes the lintable files among already enumerated `members`.
    ///
    /// Unreadable files are left out, so they show up as added once they can
    /// be read again.
    pub fn from_members(
        tree: &dyn ProjectTree,
        members: &[Resource],
        fingerprint: impl Into<String>,
    ) -> Self {
        let mut files = BTreeMap::new();
        for resource in members {
            if !resource.is_lintable() || !resource.is_accessible() {
                continue;
            }
            match tree.read(resource) {
                Ok(contents) => {
                    files.insert(
                        resource.path().to_path_buf(),
                        Self::hash_content(&contents.bytes),
                    );
                }
                Err(e) => debug!("Not hashing {}: {}", resource.path().display(), e),
            }
        }

        Self {
            fingerprint: fingerprint.into(),
            files,
        }
    }

    /// Events that turn `previous` into `self`, ordered by path.
    pub fn diff(&self, previous: &Snapshot) -> Vec<ChangeEvent> {
        let mut events: Vec<ChangeEvent> = Vec::new();

        for (path, hash) in &self.files {
            match previous.files.get(path) {
                None => events.push(ChangeEvent::added(Resource::file(path.clone()))),
                Some(old) if old != hash => {
                    events.push(ChangeEvent::changed(Resource::file(path.clone())))
                }
                Some(_) => {}
            }
        }
        for path in previous.files.keys() {
            if !self.files.contains_key(path) {
                events.push(ChangeEvent::removed(Resource::file(path.clone())));
            }
        }

        events.sort_by(|a, b| a.resource.path().cmp(b.resource.path()));
        events
    }

    /// The delta since `previous`, or `None` when there is no usable history.
    ///
    /// A snapshot with a different fingerprint cannot be trusted: every file
    /// may lint differently now.
    pub fn delta_since(&self, previous: Option<&Snapshot>) -> Option<Vec<ChangeEvent>> {
        let previous = previous?;
        if previous.fingerprint != self.fingerprint {
            debug!("Lint options or configuration changed since the last pass, discarding delta");
            return None;
        }
        Some(self.diff(previous))
    }

    /// Removes a file so the next pass sees it as added.
    pub fn forget(&mut self, path: &Path) {
        self.files.remove(path);
    }

    /// Loads a snapshot. Missing or unreadable snapshots yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read(path).ok()?;
        match serde_json::from_slice(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring corrupt snapshot {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(self)
            .map_err(|e| BuildError::Internal(format!("Failed to serialize snapshot: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }
}
