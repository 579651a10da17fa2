//! Run entrypoint: compare → classify → reconcile.

use serde::Serialize;

use quire_core::{classify, validate_target_folder, ChangeRecord, ClassifiedSet, SyncReport};

use crate::content::ContentLoader;
use crate::event::CommitRange;
use crate::github::DiffProvider;
use crate::reconcile::{plan, reconcile, PlannedMutation};
use crate::remote::RemoteClient;
use crate::SyncError;

/// What happens after classification.
pub enum RunMode<'a> {
    /// Classify and report the planned mutations without calling the CMS.
    Plan,
    /// Apply mutations to the CMS.
    Apply {
        loader: &'a dyn ContentLoader,
        remote: &'a dyn RemoteClient,
    },
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub range: CommitRange,
    pub classified: ClassifiedSet,
    pub planned: Vec<PlannedMutation>,
    /// `None` unless the run applied mutations.
    pub report: Option<SyncReport>,
}

impl RunSummary {
    /// `true` unless an applied run recorded a failed file.
    pub fn is_clean(&self) -> bool {
        self.report.as_ref().map_or(true, SyncReport::is_clean)
    }
}

/// Fetch the change list for `range`, enforcing run preconditions.
///
/// The head must be ahead of the base and at least one file must differ.
pub fn fetch_changes(
    diff: &dyn DiffProvider,
    range: &CommitRange,
) -> Result<Vec<ChangeRecord>, SyncError> {
    let comparison = diff.compare(range)?;
    if comparison.status != "ahead" {
        return Err(SyncError::NotAhead {
            status: comparison.status,
        });
    }
    if comparison.files.is_empty() {
        return Err(SyncError::EmptyComparison);
    }
    for file in &comparison.files {
        tracing::debug!("changed: {} ({})", file.path, file.kind);
    }
    Ok(comparison.files)
}

/// Run the pipeline for one commit range.
///
/// Fatal errors (bad target folder, failed preconditions) return `Err` before
/// any remote mutation. Per-file failures are in [`RunSummary::report`].
pub fn run(
    diff: &dyn DiffProvider,
    range: &CommitRange,
    target_folder: &str,
    mode: RunMode<'_>,
) -> Result<RunSummary, SyncError> {
    validate_target_folder(target_folder)?;
    tracing::info!("base commit: {}", range.base);
    tracing::info!("head commit: {}", range.head);

    let records = fetch_changes(diff, range)?;
    let classified = classify(&records, target_folder);
    tracing::info!(
        "{} of {} changed file(s) under '{target_folder}'",
        classified.routed_len() + classified.rejected.len(),
        records.len()
    );

    let planned = plan(&classified);
    let report = match mode {
        RunMode::Plan => None,
        RunMode::Apply { loader, remote } => Some(reconcile(&classified, loader, remote)),
    };

    Ok(RunSummary {
        range: range.clone(),
        classified,
        planned,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use quire_core::ChangeKind;

    use crate::github::Comparison;

    struct FixedDiff {
        status: &'static str,
        files: Vec<ChangeRecord>,
        calls: Cell<usize>,
    }

    impl FixedDiff {
        fn new(status: &'static str, files: Vec<ChangeRecord>) -> Self {
            Self {
                status,
                files,
                calls: Cell::new(0),
            }
        }
    }

    impl DiffProvider for FixedDiff {
        fn compare(&self, _range: &CommitRange) -> Result<Comparison, SyncError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Comparison {
                status: self.status.to_string(),
                files: self.files.clone(),
            })
        }
    }

    fn range() -> CommitRange {
        CommitRange {
            base: "b".into(),
            head: "h".into(),
        }
    }

    #[test]
    fn not_ahead_is_fatal() {
        let diff = FixedDiff::new(
            "diverged",
            vec![ChangeRecord::new("posts/a.md", ChangeKind::Added)],
        );
        let err = run(&diff, &range(), "posts", RunMode::Plan).unwrap_err();
        assert!(matches!(err, SyncError::NotAhead { .. }), "got: {err}");
    }

    #[test]
    fn empty_file_list_is_fatal() {
        let diff = FixedDiff::new("ahead", vec![]);
        let err = run(&diff, &range(), "posts", RunMode::Plan).unwrap_err();
        assert!(matches!(err, SyncError::EmptyComparison), "got: {err}");
    }

    #[test]
    fn invalid_target_folder_fails_before_comparing() {
        let diff = FixedDiff::new("ahead", vec![]);
        let err = run(&diff, &range(), "a/b", RunMode::Plan).unwrap_err();
        assert!(matches!(err, SyncError::Core(_)), "got: {err}");
        assert_eq!(diff.calls.get(), 0, "no provider call on config error");
    }

    #[test]
    fn plan_mode_has_no_report() {
        let diff = FixedDiff::new(
            "ahead",
            vec![
                ChangeRecord::new("posts/a.md", ChangeKind::Added),
                ChangeRecord::new("src/lib.rs", ChangeKind::Modified),
            ],
        );
        let summary = run(&diff, &range(), "posts", RunMode::Plan).expect("run");
        assert_eq!(summary.classified.created.len(), 1);
        assert_eq!(summary.planned.len(), 1);
        assert!(summary.report.is_none());
        assert!(summary.is_clean());
    }
}
