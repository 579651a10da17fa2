//! Change classification.
//!
//! Partitions a flat diff into the four categories the reconciler acts on.
//! Filtering is by exact path segment: with target folder `posts`,
//! `blog/posts/a.md` is in scope while `blog/posts-old/a.md` and
//! `posts.md` are not.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{ChangeKind, ChangeRecord};

/// A record the classifier could not route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub record: ChangeRecord,
    pub error: String,
}

/// Output of [`classify`]. Each sequence keeps input order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClassifiedSet {
    pub created: Vec<ChangeRecord>,
    pub updated: Vec<ChangeRecord>,
    pub deleted: Vec<ChangeRecord>,
    pub renamed: Vec<ChangeRecord>,
    pub rejected: Vec<Rejection>,
}

impl ClassifiedSet {
    /// Created records followed by updated records.
    pub fn created_or_updated(&self) -> Vec<&ChangeRecord> {
        self.created.iter().chain(self.updated.iter()).collect()
    }

    /// Number of records routed to one of the four categories.
    pub fn routed_len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deleted.len() + self.renamed.len()
    }

    /// `true` when nothing is in scope, routed or rejected.
    pub fn is_empty(&self) -> bool {
        self.routed_len() == 0 && self.rejected.is_empty()
    }
}

/// Classify `records` against `target_folder`.
///
/// Records outside the folder are dropped. Records with an unsupported status
/// land in [`ClassifiedSet::rejected`] instead of any category.
pub fn classify(records: &[ChangeRecord], target_folder: &str) -> ClassifiedSet {
    let mut set = ClassifiedSet::default();

    for record in records {
        if !in_target_folder(&record.path, target_folder) {
            tracing::debug!("out of scope: {} ({})", record.path, record.kind);
            continue;
        }

        let bucket = match &record.kind {
            ChangeKind::Added => &mut set.created,
            ChangeKind::Modified => &mut set.updated,
            ChangeKind::Removed => &mut set.deleted,
            ChangeKind::Renamed => &mut set.renamed,
            ChangeKind::Other(status) => {
                let err = CoreError::UnsupportedStatus {
                    path: record.path.clone(),
                    status: status.clone(),
                };
                tracing::warn!("{err}");
                set.rejected.push(Rejection {
                    record: record.clone(),
                    error: err.to_string(),
                });
                continue;
            }
        };
        tracing::info!("{} file: {}", record.kind, record.path);
        bucket.push(record.clone());
    }

    set
}

/// `true` when `target_folder` is one of the `/`-separated segments of `path`.
pub fn in_target_folder(path: &str, target_folder: &str) -> bool {
    path.split('/').any(|segment| segment == target_folder)
}

/// Check that `value` is usable as a single-segment target folder.
pub fn validate_target_folder(value: &str) -> Result<(), CoreError> {
    let reason = if value.trim().is_empty() {
        Some("must not be empty")
    } else if value.contains('/') || value.contains('\\') {
        Some("must be a single folder name without slashes")
    } else if value == "." || value == ".." {
        Some("must name a folder")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidTargetFolder {
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
