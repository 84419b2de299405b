//! # jsmarker_core
//!
//! Incremental build scheduler that lints JavaScript files and publishes the
//! issues as markers.
//!
//! This crate provides:
//! - The `BuildScheduler` that runs full and incremental passes
//! - Change classification of resource deltas
//! - Marker synchronization against a host marker store
//! - The lint nature toggle
//! - A filesystem host (`Workspace`) and an in-memory one (`memory`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use jsmarker_core::{BuildKind, BuildScheduler, CommandEngine, NullProgressMonitor, Workspace};
//!
//! let workspace = Workspace::open(".", None)?;
//! let engine = CommandEngine::new("jslint", vec!["--json".into()]);
//! let mut scheduler = BuildScheduler::new(engine);
//!
//! let report = workspace.build(&mut scheduler, BuildKind::Auto, &NullProgressMonitor)?;
//! println!("{} issue(s)", report.total_issues());
//! ```

mod classifier;
mod config;
mod delta;
mod engine;
mod error;
pub mod host;
mod invoker;
mod issue;
mod marker;
pub mod memory;
mod nature;
mod options;
mod resource;
mod scheduler;
pub mod workspace;

pub use classifier::ChangeClassifier;
pub use config::{ConfigPreferences, EngineConfig, ProjectConfig};
pub use delta::{BuildKind, BuildMode, BuildRequest, BuildTrigger, ChangeEvent, ChangeKind};
pub use engine::{CommandEngine, OPTIONS_ENV, parse_issues};
pub use error::BuildError;
pub use host::{
    CancelFlag, MarkerStore, NullProgressMonitor, PreferenceStore, ProgressMonitor,
    ProjectDescription, ProjectTree,
};
pub use invoker::{LintEngine, LintInvoker, decode};
pub use issue::{Issue, Severity};
pub use marker::{
    MARKER_TYPE, Marker, MarkerAttributes, MarkerDepth, MarkerId, MarkerSynchronizer, SOURCE_ID,
    SyncOutcome,
};
pub use nature::{BUILDER_ID, NATURE_ID, NatureToggle, is_enabled};
pub use options::{DEFAULT_INDENT, DEFAULT_MAXERR, LintOptions, OptionValue};
pub use resource::{LINTED_SUFFIX, Resource, ResourceContents, ResourceKind};
pub use scheduler::{
    BuildContext, BuildReport, BuildScheduler, FileReport, PassStatus, SchedulerState, TASK_NAME,
};
pub use workspace::{FsProject, MarkerFile, STATE_DIR, Snapshot, Workspace};
