//! Orchestration of one build pass.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::classifier::ChangeClassifier;
use crate::delta::{BuildMode, BuildRequest, BuildTrigger};
use crate::error::BuildError;
use crate::host::{MarkerStore, PreferenceStore, ProgressMonitor, ProjectDescription, ProjectTree};
use crate::invoker::{LintEngine, LintInvoker};
use crate::marker::MarkerSynchronizer;
use crate::nature;
use crate::options::LintOptions;

/// Task name reported to the progress monitor.
pub const TASK_NAME: &str = "jslint4java";

/// The host collaborators a pass works against.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub project: &'a dyn ProjectTree,
    pub description: &'a dyn ProjectDescription,
    pub markers: &'a dyn MarkerStore,
    pub preferences: &'a dyn PreferenceStore,
    pub monitor: &'a dyn ProgressMonitor,
}

/// Lifecycle of the scheduler.
///
/// `build` takes `&mut self`, so passes never overlap. `Running` outlives a
/// pass only when the engine panicked mid-pass; such a scheduler refuses
/// further passes because its options and marker state are unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running(BuildMode),
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    Completed,
    Canceled,
    /// The project does not carry the lint nature.
    Skipped,
}

/// A file that was linted and synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub issues: usize,
}

/// Outcome of one pass.
#[derive(Debug)]
pub struct BuildReport {
    pub mode: Option<BuildMode>,
    pub status: PassStatus,
    pub files: Vec<FileReport>,
    /// Files whose processing failed, with the cause. Markers of a file that
    /// failed to read or lint are left untouched.
    pub failures: Vec<(PathBuf, BuildError)>,
    pub markers_created: usize,
}

impl BuildReport {
    fn new(mode: BuildMode) -> Self {
        Self {
            mode: Some(mode),
            status: PassStatus::Completed,
            files: Vec::new(),
            failures: Vec::new(),
            markers_created: 0,
        }
    }

    fn skipped() -> Self {
        Self {
            mode: None,
            status: PassStatus::Skipped,
            files: Vec::new(),
            failures: Vec::new(),
            markers_created: 0,
        }
    }

    pub fn total_issues(&self) -> usize {
        self.files.iter().map(|f| f.issues).sum()
    }
}

/// Runs build passes for a project.
pub struct BuildScheduler {
    invoker: LintInvoker,
    classifier: ChangeClassifier,
    state: SchedulerState,
    last_options: Option<LintOptions>,
}

impl BuildScheduler {
    pub fn new(engine: impl LintEngine + 'static) -> Self {
        Self {
            invoker: LintInvoker::new(engine),
            classifier: ChangeClassifier::new(),
            state: SchedulerState::Idle,
            last_options: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Options resolved by the most recent pass.
    pub fn last_options(&self) -> Option<&LintOptions> {
        self.last_options.as_ref()
    }

    /// Runs one pass for `trigger`.
    ///
    /// Per-file failures are logged and collected in the report. Only a
    /// failure to enumerate the project ends the pass with `Err`.
    pub fn build(
        &mut self,
        ctx: &BuildContext<'_>,
        trigger: &BuildTrigger,
    ) -> Result<BuildReport, BuildError> {
        // Left over from a pass that unwound.
        if let SchedulerState::Running(mode) = self.state {
            return Err(BuildError::Internal(format!(
                "a {:?} pass did not finish for '{}'",
                mode,
                ctx.project.name()
            )));
        }

        match nature::is_enabled(ctx.description) {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    "Project '{}' does not have {}, skipping build",
                    ctx.project.name(),
                    nature::NATURE_ID
                );
                return Ok(BuildReport::skipped());
            }
            Err(e) => {
                error!(
                    "Cannot read natures of '{}', skipping build: {}",
                    ctx.project.name(),
                    e
                );
                return Ok(BuildReport::skipped());
            }
        }

        let request = BuildRequest::from_trigger(trigger);
        self.state = SchedulerState::Running(request.mode());
        let result = self.run(ctx, &request);
        self.state = SchedulerState::Idle;
        result
    }

    fn run(
        &mut self,
        ctx: &BuildContext<'_>,
        request: &BuildRequest,
    ) -> Result<BuildReport, BuildError> {
        let options = LintOptions::resolve(ctx.preferences, self.last_options.as_ref());
        self.last_options = Some(options.clone());

        let resources = self
            .classifier
            .classify(ctx.project, request)
            .inspect_err(|e| error!("Build of '{}' failed: {}", ctx.project.name(), e))?;

        let sync = MarkerSynchronizer::new(ctx.markers);
        let mut report = BuildReport::new(request.mode());

        ctx.monitor.begin_task(TASK_NAME, Some(resources.len()));
        for resource in &resources {
            if ctx.monitor.is_canceled() {
                info!(
                    "Build of '{}' canceled after {} file(s)",
                    ctx.project.name(),
                    report.files.len() + report.failures.len()
                );
                report.status = PassStatus::Canceled;
                break;
            }

            ctx.monitor.sub_task(&format!("Linting {}", resource.name()));
            let path = resource.path().to_path_buf();

            match self.invoker.lint(ctx.project, resource, &options) {
                Ok(issues) => {
                    let outcome = sync.synchronize(resource, &issues);
                    report.markers_created += outcome.created;
                    report.failures.extend(
                        outcome
                            .failures
                            .into_iter()
                            .map(|e| (path.clone(), e)),
                    );
                    report.files.push(FileReport {
                        path,
                        issues: issues.len(),
                    });
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.failures.push((path, e));
                }
            }

            ctx.monitor.worked(1);
        }
        ctx.monitor.done();

        info!(
            "{:?} build of '{}': linted {} file(s), {} issue(s), {} failure(s)",
            request.mode(),
            ctx.project.name(),
            report.files.len(),
            report.total_issues(),
            report.failures.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::ChangeEvent;
    use crate::host::{CancelFlag, NullProgressMonitor};
    use crate::issue::Issue;
    use crate::marker::MARKER_TYPE;
    use crate::memory::{MemoryMarkerStore, MemoryPreferences, MemoryProject, eqeqeq_engine};
    use crate::nature::NATURE_ID;
    use crate::options::OptionValue;
    use crate::resource::Resource;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Host {
        project: MemoryProject,
        markers: MemoryMarkerStore,
        preferences: MemoryPreferences,
    }

    impl Host {
        fn new(project: MemoryProject) -> Self {
            Self {
                project: project.with_natures(&[NATURE_ID]),
                markers: MemoryMarkerStore::new(),
                preferences: MemoryPreferences::new(),
            }
        }

        fn ctx<'a>(&'a self, monitor: &'a dyn ProgressMonitor) -> BuildContext<'a> {
            BuildContext {
                project: &self.project,
                description: &self.project,
                markers: &self.markers,
                preferences: &self.preferences,
                monitor,
            }
        }

        fn marker_lines(&self, path: &str) -> Vec<u32> {
            self.markers
                .markers(&Resource::file(path), MARKER_TYPE)
                .unwrap()
                .iter()
                .map(|m| m.attributes.line)
                .collect()
        }
    }

    /// Records every monitor call and cancels after `limit` sub tasks.
    #[derive(Default)]
    struct RecordingMonitor {
        calls: RefCell<Vec<String>>,
        limit: Option<usize>,
    }

    impl ProgressMonitor for RecordingMonitor {
        fn begin_task(&self, name: &str, total: Option<usize>) {
            self.calls
                .borrow_mut()
                .push(format!("begin {} {:?}", name, total));
        }

        fn sub_task(&self, name: &str) {
            self.calls.borrow_mut().push(name.to_string());
        }

        fn is_canceled(&self) -> bool {
            let started = self
                .calls
                .borrow()
                .iter()
                .filter(|c| c.starts_with("Linting"))
                .count();
            self.limit.is_some_and(|limit| started >= limit)
        }

        fn done(&self) {
            self.calls.borrow_mut().push("done".to_string());
        }
    }

    #[test]
    fn test_full_build_marks_loose_equality_only_in_js() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "var a = 1;\nif (a == 2) {}\n")
                .with_file("b.txt", "a == b\n"),
        );
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Completed);
        assert_eq!(report.mode, Some(BuildMode::Full));
        assert_eq!(host.marker_lines("a.js"), vec![2]);
        assert!(host.marker_lines("b.txt").is_empty());
        assert_eq!(
            report.files,
            vec![FileReport {
                path: PathBuf::from("a.js"),
                issues: 1
            }]
        );
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_fixed_file_loses_its_markers() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "x == y\n"));
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);
        let changed = || {
            BuildTrigger::incremental(Some(vec![ChangeEvent::changed(Resource::file("a.js"))]))
        };

        scheduler
            .build(&host.ctx(&NullProgressMonitor), &changed())
            .unwrap();
        assert_eq!(host.marker_lines("a.js"), vec![1]);

        host.project.write_file("a.js", "x === y\n");
        scheduler
            .build(&host.ctx(&NullProgressMonitor), &changed())
            .unwrap();

        assert!(host.marker_lines("a.js").is_empty());
    }

    #[test]
    fn test_repeated_builds_do_not_accumulate() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\nc == d\n"));
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        for _ in 0..3 {
            scheduler
                .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
                .unwrap();
        }

        assert_eq!(host.marker_lines("a.js"), vec![1, 2]);
    }

    #[test]
    fn test_project_without_nature_is_skipped() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\n"));
        host.project.set_nature_ids(Vec::new()).unwrap();
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Skipped);
        assert!(host.markers.all().is_empty());
    }

    #[test]
    fn test_unreadable_description_skips_pass() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\n"));
        host.project.fail_description(true);
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Skipped);
    }

    #[test]
    fn test_read_failure_is_isolated_and_keeps_markers() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "a == b\n")
                .with_file("b.js", "c == d\n"),
        );
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);
        scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        host.project.set_inaccessible("a.js");
        host.project.write_file("b.js", "c === d\n");
        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, PathBuf::from("a.js"));
        assert!(matches!(report.failures[0].1, BuildError::Read(_)));
        assert_eq!(host.marker_lines("a.js"), vec![1]);
        assert!(host.marker_lines("b.js").is_empty());
    }

    #[test]
    fn test_engine_failure_is_isolated() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("bad.js", "")
                .with_file("good.js", "a == b\n"),
        );
        let mut scheduler = BuildScheduler::new(
            |name: &str, source: &str, options: &LintOptions| -> Result<Vec<Issue>, BuildError> {
                if name == "bad.js" {
                    return Err(BuildError::engine("parser crashed"));
                }
                eqeqeq_engine(name, source, options)
            },
        );

        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(host.marker_lines("good.js"), vec![1]);
    }

    #[test]
    fn test_marker_store_failure_does_not_abort_pass() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "a == b\n")
                .with_file("b.js", "c == d\n"),
        );
        host.markers.fail_creates(true);
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.markers_created, 0);
    }

    #[test]
    fn test_enumeration_failure_fails_pass() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", ""));
        host.project.fail_enumeration(true);
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let err = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap_err();

        assert!(matches!(err, BuildError::HostEnumeration(_)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_options_are_resolved_once_per_pass() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "a == b\n")
                .with_file("b.js", "a == b\n"),
        );
        host.preferences.set("eqeqeq", OptionValue::Bool(false));
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let record = seen.clone();
        let mut scheduler = BuildScheduler::new(
            move |_: &str, _: &str, options: &LintOptions| -> Result<Vec<Issue>, BuildError> {
                record.borrow_mut().push(options.clone());
                Ok(Vec::new())
            },
        );

        scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0].get_bool("eqeqeq"), Some(false));
    }

    #[test]
    fn test_preference_failure_uses_last_known_options() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\n"));
        host.preferences.set("indent", OptionValue::Int(2));
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);
        scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        host.preferences.fail(true);
        let report = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Completed);
        assert_eq!(scheduler.last_options().unwrap().indent(), Some(2));
    }

    #[test]
    fn test_cancellation_stops_remaining_files() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "a == b\n")
                .with_file("b.js", "a == b\n")
                .with_file("c.js", "a == b\n"),
        );
        let monitor = RecordingMonitor {
            limit: Some(1),
            ..Default::default()
        };
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&monitor), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Canceled);
        assert_eq!(report.files.len(), 1);
        assert_eq!(host.marker_lines("a.js"), vec![1]);
        assert!(host.marker_lines("b.js").is_empty());
        assert_eq!(
            *monitor.calls.borrow(),
            vec![
                "begin jslint4java Some(3)".to_string(),
                "Linting a.js".to_string(),
                "done".to_string(),
            ]
        );
    }

    #[test]
    fn test_cancel_flag_before_pass_lints_nothing() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\n"));
        let flag = CancelFlag::new();
        flag.cancel();
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(&host.ctx(&flag), &BuildTrigger::full())
            .unwrap();

        assert_eq!(report.status, PassStatus::Canceled);
        assert!(host.markers.all().is_empty());
    }

    #[test]
    fn test_incremental_build_only_touches_delta() {
        let host = Host::new(
            MemoryProject::new("demo")
                .with_file("a.js", "a == b\n")
                .with_file("b.js", "a == b\n"),
        );
        let mut scheduler = BuildScheduler::new(eqeqeq_engine);

        let report = scheduler
            .build(
                &host.ctx(&NullProgressMonitor),
                &BuildTrigger::auto(Some(vec![ChangeEvent::added(Resource::file("b.js"))])),
            )
            .unwrap();

        assert_eq!(report.mode, Some(BuildMode::Incremental));
        assert!(host.marker_lines("a.js").is_empty());
        assert_eq!(host.marker_lines("b.js"), vec![1]);
    }

    fn panicking_engine(
        _name: &str,
        _source: &str,
        _options: &LintOptions,
    ) -> Result<Vec<Issue>, BuildError> {
        panic!("engine crashed")
    }

    #[test]
    fn test_scheduler_is_unusable_after_a_panicked_pass() {
        let host = Host::new(MemoryProject::new("demo").with_file("a.js", "a == b\n"));
        let mut scheduler = BuildScheduler::new(panicking_engine);

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scheduler.build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
        }));
        assert!(unwound.is_err());
        assert_eq!(scheduler.state(), SchedulerState::Running(BuildMode::Full));

        let err = scheduler
            .build(&host.ctx(&NullProgressMonitor), &BuildTrigger::full())
            .unwrap_err();
        assert!(matches!(err, BuildError::Internal(_)));
        assert!(err.to_string().contains("did not finish"), "{}", err);
        assert!(host.marker_lines("a.js").is_empty());
    }
}
