//! End-to-end build passes against a project directory.

use std::fs;
use std::path::{Path, PathBuf};

use jsmarker_core::{
    BuildError, BuildKind, BuildMode, BuildScheduler, CancelFlag, Issue, LintOptions,
    MARKER_TYPE, NatureToggle, NullProgressMonitor, PassStatus, Severity, Workspace,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

/// Flags every line with a loose `==` while `eqeqeq` is on.
fn eqeqeq(_name: &str, source: &str, options: &LintOptions) -> Result<Vec<Issue>, BuildError> {
    if options.get_bool("eqeqeq") != Some(true) {
        return Ok(Vec::new());
    }
    Ok(source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.replace("===", "").replace("!==", "").contains("=="))
        .map(|(i, _)| Issue::new(i as u32 + 1, "Expected '===' and instead saw '=='."))
        .collect())
}

struct Fixture {
    dir: TempDir,
    scheduler: BuildScheduler,
}

impl Fixture {
    /// A project with the lint nature enabled.
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            write(dir.path(), path, content);
        }
        let workspace = Workspace::open(dir.path(), None).unwrap();
        assert!(NatureToggle::new().toggle(workspace.project()).unwrap());

        Self {
            dir,
            scheduler: BuildScheduler::new(eqeqeq),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn build(&mut self, kind: BuildKind) -> jsmarker_core::BuildReport {
        let workspace = Workspace::open(self.root(), None).unwrap();
        workspace
            .build(&mut self.scheduler, kind, &NullProgressMonitor)
            .unwrap()
    }

    /// Published markers as `(path, line)`, read back from disk.
    fn markers(&self) -> Vec<(String, u32)> {
        Workspace::open(self.root(), None)
            .unwrap()
            .markers()
            .all()
            .into_iter()
            .map(|m| {
                assert_eq!(m.marker_type, MARKER_TYPE);
                (
                    m.path.to_string_lossy().replace('\\', "/"),
                    m.attributes.line,
                )
            })
            .collect()
    }
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn linted(report: &jsmarker_core::BuildReport) -> Vec<PathBuf> {
    report.files.iter().map(|f| f.path.clone()).collect()
}

#[test]
fn full_build_marks_only_javascript_files() {
    let mut fixture = Fixture::new(&[
        ("a.js", "var a = 1;\nif (a == 1) {}\n"),
        ("b.txt", "x == y\n"),
    ]);

    let report = fixture.build(BuildKind::Full);

    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(report.status, PassStatus::Completed);
    assert_eq!(linted(&report), vec![PathBuf::from("a.js")]);
    assert_eq!(fixture.markers(), vec![("a.js".to_string(), 2)]);

    let workspace = Workspace::open(fixture.root(), None).unwrap();
    let marker = &workspace.markers().all()[0];
    assert_eq!(marker.attributes.severity, Severity::Warning);
    assert_eq!(marker.attributes.source_id, "jslint4java");
    assert_eq!(
        marker.attributes.message,
        "Expected '===' and instead saw '=='."
    );
}

#[test]
fn fixing_a_file_clears_its_markers() {
    let mut fixture = Fixture::new(&[("a.js", "if (a == 1) {}\n"), ("b.js", "b == 2;\n")]);
    fixture.build(BuildKind::Full);
    assert_eq!(fixture.markers().len(), 2);

    write(fixture.root(), "a.js", "if (a === 1) {}\n");
    let report = fixture.build(BuildKind::Incremental);

    assert_eq!(report.mode, Some(BuildMode::Incremental));
    assert_eq!(linted(&report), vec![PathBuf::from("a.js")]);
    assert_eq!(fixture.markers(), vec![("b.js".to_string(), 1)]);
}

#[test]
fn incremental_build_relints_only_changed_files() {
    let mut fixture = Fixture::new(&[
        ("src/a.js", "a == 1;\n"),
        ("src/b.js", "b === 1;\n"),
        ("src/c.js", "c === 1;\n"),
    ]);
    fixture.build(BuildKind::Full);

    write(fixture.root(), "src/b.js", "b === 1;\nb == 2;\n");
    write(fixture.root(), "src/d.js", "d === 1;\n");
    let report = fixture.build(BuildKind::Auto);

    assert_eq!(report.mode, Some(BuildMode::Incremental));
    assert_eq!(
        linted(&report),
        vec![PathBuf::from("src/b.js"), PathBuf::from("src/d.js")]
    );
    assert_eq!(
        fixture.markers(),
        vec![("src/a.js".to_string(), 1), ("src/b.js".to_string(), 2)]
    );
}

#[test]
fn unchanged_project_lints_nothing_incrementally() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n")]);
    fixture.build(BuildKind::Full);

    let report = fixture.build(BuildKind::Incremental);

    assert!(report.files.is_empty());
    assert_eq!(fixture.markers(), vec![("a.js".to_string(), 1)]);
}

#[test]
fn first_incremental_build_falls_back_to_full() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n")]);

    let report = fixture.build(BuildKind::Incremental);

    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(fixture.markers(), vec![("a.js".to_string(), 1)]);
}

#[test]
fn changed_options_force_a_full_build() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n"), ("b.js", "b == 1;\n")]);
    fixture.build(BuildKind::Full);
    assert_eq!(fixture.markers().len(), 2);

    write(
        fixture.root(),
        ".jsmarker.jsonc",
        "{\n  // loose equality is fine here\n  \"options\": { \"eqeqeq\": false }\n}\n",
    );
    let report = fixture.build(BuildKind::Auto);

    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(report.files.len(), 2);
    assert!(fixture.markers().is_empty());
}

#[test]
fn removed_files_lose_their_markers() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n"), ("b.js", "b == 1;\n")]);
    fixture.build(BuildKind::Full);

    fs::remove_file(fixture.root().join("a.js")).unwrap();
    let report = fixture.build(BuildKind::Incremental);

    assert!(report.files.is_empty());
    assert_eq!(fixture.markers(), vec![("b.js".to_string(), 1)]);
}

#[test]
fn project_without_nature_is_skipped() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n")]);
    let workspace = Workspace::open(fixture.root(), None).unwrap();
    assert!(!NatureToggle::new().toggle(workspace.project()).unwrap());

    let report = fixture.build(BuildKind::Full);

    assert_eq!(report.status, PassStatus::Skipped);
    assert_eq!(report.mode, None);
    assert!(fixture.markers().is_empty());
}

#[test]
fn canceled_build_is_retried_in_full() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n")]);
    let workspace = Workspace::open(fixture.root(), None).unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let report = workspace
        .build(&mut fixture.scheduler, BuildKind::Full, &cancel)
        .unwrap();

    assert_eq!(report.status, PassStatus::Canceled);
    assert!(fixture.markers().is_empty());

    let report = fixture.build(BuildKind::Auto);
    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(fixture.markers(), vec![("a.js".to_string(), 1)]);
}

#[test]
fn undecodable_file_keeps_previous_markers() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n"), ("b.js", "b == 1;\n")]);
    fixture.build(BuildKind::Full);

    fs::write(fixture.root().join("a.js"), [0x61, 0xFF, 0xFE, 0x0A]).unwrap();
    let report = fixture.build(BuildKind::Incremental);

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].1, BuildError::Read(_)));
    assert_eq!(
        fixture.markers(),
        vec![("a.js".to_string(), 1), ("b.js".to_string(), 1)]
    );

    // The failed file is retried on the next pass.
    fs::write(fixture.root().join("a.js"), "a === 1;\n").unwrap();
    let report = fixture.build(BuildKind::Incremental);
    assert_eq!(linted(&report), vec![PathBuf::from("a.js")]);
    assert_eq!(fixture.markers(), vec![("b.js".to_string(), 1)]);
}

#[test]
fn excluded_directories_are_not_linted() {
    let mut fixture = Fixture::new(&[
        ("app.js", "a === 1;\n"),
        ("vendor/lib.js", "x == 1;\n"),
        (".jsmarker.jsonc", "{ \"exclude\": [\"vendor\"] }"),
    ]);

    let report = fixture.build(BuildKind::Full);

    assert_eq!(linted(&report), vec![PathBuf::from("app.js")]);
    assert!(fixture.markers().is_empty());
}

#[rstest]
#[case::full(BuildKind::Full)]
#[case::incremental(BuildKind::Incremental)]
fn newly_excluded_files_lose_their_markers(#[case] kind: BuildKind) {
    let mut fixture = Fixture::new(&[("app.js", "a === 1;\n"), ("vendor/lib.js", "x == 1;\n")]);
    fixture.build(BuildKind::Full);
    assert_eq!(fixture.markers(), vec![("vendor/lib.js".to_string(), 1)]);

    write(fixture.root(), ".jsmarker.jsonc", "{ \"exclude\": [\"vendor\"] }");
    let report = fixture.build(kind);

    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(linted(&report), vec![PathBuf::from("app.js")]);
    assert!(fixture.markers().is_empty());
}

#[test]
fn changed_charset_forces_a_full_build() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n"), ("b.js", "b === 1;\n")]);
    fixture.build(BuildKind::Full);

    write(fixture.root(), ".jsmarker.jsonc", "{ \"charset\": \"ISO-8859-1\" }");
    let report = fixture.build(BuildKind::Incremental);

    assert_eq!(report.mode, Some(BuildMode::Full));
    assert_eq!(report.files.len(), 2);
}

#[test]
fn clean_removes_all_markers() {
    let mut fixture = Fixture::new(&[("a.js", "a == 1;\n"), ("lib/b.js", "b == 1;\n")]);
    fixture.build(BuildKind::Full);

    let workspace = Workspace::open(fixture.root(), None).unwrap();
    assert_eq!(workspace.clean().unwrap(), 2);

    assert!(fixture.markers().is_empty());
    let report = fixture.build(BuildKind::Incremental);
    assert_eq!(report.mode, Some(BuildMode::Full));
}
