//! Build error types.

use thiserror::Error;

/// Errors that can occur during a build pass.
///
/// Only [`BuildError::HostEnumeration`] ends a pass; every other variant is
/// isolated to the file or collaborator that produced it.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Resource content could not be read or decoded.
    #[error("Read error: {0}")]
    Read(String),

    /// Marker creation or deletion failed.
    #[error("Marker store error: {0}")]
    MarkerStore(String),

    /// Preferences could not be loaded.
    #[error("Preference access error: {0}")]
    PreferenceAccess(String),

    /// The project tree could not be walked at all.
    #[error("Host enumeration error: {0}")]
    HostEnumeration(String),

    /// The external lint engine failed.
    #[error("Lint engine error: {0}")]
    Engine(String),

    /// The project description (nature list) could not be read or written.
    #[error("Project description error: {0}")]
    ProjectDescription(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BuildError {
    /// Creates a read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Creates a marker store error.
    pub fn marker_store(message: impl Into<String>) -> Self {
        Self::MarkerStore(message.into())
    }

    /// Creates a preference access error.
    pub fn preference_access(message: impl Into<String>) -> Self {
        Self::PreferenceAccess(message.into())
    }

    /// Creates a host enumeration error.
    pub fn host_enumeration(message: impl Into<String>) -> Self {
        Self::HostEnumeration(message.into())
    }

    /// Creates a lint engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Creates a project description error.
    pub fn project_description(message: impl Into<String>) -> Self {
        Self::ProjectDescription(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if this error must abort the whole pass.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HostEnumeration(_) | Self::Internal(_))
    }
}
