//! Full runs over a working copy with an in-memory diff provider and remote.

use std::cell::RefCell;
use std::fs;

use tempfile::TempDir;

use quire_core::{ChangeKind, ChangeRecord, ContentDocument, Operation};
use quire_sync::pipeline::{run, RunMode};
use quire_sync::{
    CommitRange, Comparison, DiffProvider, RemoteClient, RemoteEntry, RemoteError, SyncError,
    WorkingCopyLoader,
};

struct FakeDiff {
    status: &'static str,
    files: Vec<ChangeRecord>,
}

impl DiffProvider for FakeDiff {
    fn compare(&self, _range: &CommitRange) -> Result<Comparison, SyncError> {
        Ok(Comparison {
            status: self.status.to_string(),
            files: self.files.clone(),
        })
    }
}

/// Records every call; entries are keyed by slug.
#[derive(Default)]
struct RecordingRemote {
    entries: RefCell<Vec<RemoteEntry>>,
    calls: RefCell<Vec<String>>,
    bodies: RefCell<Vec<(String, String)>>,
}

impl RecordingRemote {
    fn with_entry(slug: &str, id: &str) -> Self {
        let remote = Self::default();
        remote.entries.borrow_mut().push(RemoteEntry {
            id: id.to_string(),
            slug: slug.to_string(),
            updated_at: None,
        });
        remote
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl RemoteClient for RecordingRemote {
    fn find_by_slug(&self, slug: &str) -> Result<Option<RemoteEntry>, RemoteError> {
        self.calls.borrow_mut().push(format!("find {slug}"));
        Ok(self.entries.borrow().iter().find(|e| e.slug == slug).cloned())
    }

    fn create(&self, slug: &str, doc: &ContentDocument) -> Result<String, RemoteError> {
        self.calls.borrow_mut().push(format!("create {slug}"));
        self.bodies
            .borrow_mut()
            .push((slug.to_string(), doc.body.clone()));
        let id = format!("id-{slug}");
        self.entries.borrow_mut().push(RemoteEntry {
            id: id.clone(),
            slug: slug.to_string(),
            updated_at: None,
        });
        Ok(id)
    }

    fn update(&self, entry: &RemoteEntry, slug: &str, _doc: &ContentDocument) -> Result<(), RemoteError> {
        self.calls
            .borrow_mut()
            .push(format!("update {} -> {slug}", entry.id));
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(format!("delete {id}"));
        self.entries.borrow_mut().retain(|e| e.id != id);
        Ok(())
    }
}

fn range() -> CommitRange {
    CommitRange {
        base: "base-sha".into(),
        head: "head-sha".into(),
    }
}

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir_all(dir.path().join("posts")).expect("mkdir posts");
    fs::create_dir_all(dir.path().join("other")).expect("mkdir other");
    fs::write(dir.path().join("posts/a.md"), "# A\n\nfirst post\n").expect("write a.md");
    fs::write(dir.path().join("other/c.md"), "not synced\n").expect("write c.md");
    dir
}

#[test]
fn added_and_removed_files_under_target_folder_are_applied() {
    let dir = workspace();
    let diff = FakeDiff {
        status: "ahead",
        files: vec![
            ChangeRecord::new("posts/a.md", ChangeKind::Added),
            ChangeRecord::new("posts/b.md", ChangeKind::Removed),
            ChangeRecord::new("other/c.md", ChangeKind::Added),
        ],
    };
    let loader = WorkingCopyLoader::new(dir.path());
    let remote = RecordingRemote::with_entry("b", "id-b");

    let summary = run(
        &diff,
        &range(),
        "posts",
        RunMode::Apply {
            loader: &loader,
            remote: &remote,
        },
    )
    .expect("run succeeds");

    let report = summary.report.expect("applied run has a report");
    assert_eq!(report.len(), 2, "foreign file must produce no outcome");
    assert!(report.is_clean(), "outcomes: {:?}", report.outcomes);
    assert_eq!(report.outcomes[0].path, "posts/a.md");
    assert_eq!(report.outcomes[0].operation, Operation::Create);
    assert_eq!(report.outcomes[1].path, "posts/b.md");
    assert_eq!(report.outcomes[1].operation, Operation::Delete);

    let calls = remote.calls();
    assert!(calls.contains(&"create a".to_string()), "calls: {calls:?}");
    assert!(calls.contains(&"delete id-b".to_string()), "calls: {calls:?}");
    assert!(calls.iter().all(|c| !c.ends_with(" c")), "calls: {calls:?}");

    let bodies = remote.bodies.borrow();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].1.contains("first post"));
}

#[test]
fn missing_file_fails_alone() {
    let dir = workspace();
    let diff = FakeDiff {
        status: "ahead",
        files: vec![
            ChangeRecord::new("posts/gone.md", ChangeKind::Modified),
            ChangeRecord::new("posts/a.md", ChangeKind::Modified),
        ],
    };
    let loader = WorkingCopyLoader::new(dir.path());
    let remote = RecordingRemote::default();

    let summary = run(
        &diff,
        &range(),
        "posts",
        RunMode::Apply {
            loader: &loader,
            remote: &remote,
        },
    )
    .expect("per-file failures do not abort");

    assert!(!summary.is_clean());
    let report = summary.report.expect("report");
    assert_eq!(report.len(), 2);
    assert_eq!(report.failed(), 1);
    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.path, "posts/gone.md");
}

#[test]
fn not_ahead_aborts_before_any_remote_call() {
    let dir = workspace();
    let diff = FakeDiff {
        status: "behind",
        files: vec![ChangeRecord::new("posts/a.md", ChangeKind::Added)],
    };
    let loader = WorkingCopyLoader::new(dir.path());
    let remote = RecordingRemote::default();

    let err = run(
        &diff,
        &range(),
        "posts",
        RunMode::Apply {
            loader: &loader,
            remote: &remote,
        },
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::NotAhead { ref status } if status == "behind"));
    assert!(remote.calls().is_empty());
}

#[test]
fn empty_comparison_aborts_before_any_remote_call() {
    let dir = workspace();
    let diff = FakeDiff {
        status: "ahead",
        files: vec![],
    };
    let loader = WorkingCopyLoader::new(dir.path());
    let remote = RecordingRemote::default();

    let err = run(
        &diff,
        &range(),
        "posts",
        RunMode::Apply {
            loader: &loader,
            remote: &remote,
        },
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::EmptyComparison));
    assert!(remote.calls().is_empty());
}

#[test]
fn plan_mode_does_not_touch_remote() {
    let diff = FakeDiff {
        status: "ahead",
        files: vec![
            ChangeRecord::new("posts/a.md", ChangeKind::Added),
            ChangeRecord::renamed("posts/old.md", "posts/new.md"),
        ],
    };

    let summary = run(&diff, &range(), "posts", RunMode::Plan).expect("dry run");
    assert!(summary.report.is_none());
    let planned: Vec<_> = summary
        .planned
        .iter()
        .map(|m| (m.operation, m.slug.as_str()))
        .collect();
    assert_eq!(
        planned,
        vec![(Operation::Create, "a"), (Operation::Rename, "new")]
    );
}
