//! Resources of a managed project tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name suffix of the files that are linted.
pub const LINTED_SUFFIX: &str = ".js";

/// Whether a resource is a leaf file or a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Container,
}

/// A file or container in the project tree.
///
/// Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    path: PathBuf,
    kind: ResourceKind,
    accessible: bool,
}

impl Resource {
    /// Creates an accessible file resource.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::File,
            accessible: true,
        }
    }

    /// Creates a container resource.
    pub fn container(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ResourceKind::Container,
            accessible: true,
        }
    }

    /// Sets whether the content of this resource can be read.
    pub fn with_accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// Last path segment, or an empty string for the project root.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Returns true for files whose name ends with [`LINTED_SUFFIX`].
    ///
    /// The comparison is a literal, case-sensitive suffix match.
    pub fn is_lintable(&self) -> bool {
        self.is_file() && self.name().ends_with(LINTED_SUFFIX)
    }
}

/// Raw content of a resource and its declared text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContents {
    pub bytes: Vec<u8>,
    /// Encoding label such as `utf-8` or `windows-1252`. `None` means UTF-8.
    pub charset: Option<String>,
}

impl ResourceContents {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            charset: None,
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}
