//! Domain types shared by the classifier, the reconciler, and the CLI.
//!
//! Paths are kept as repository-relative `String`s with `/` separators, exactly
//! as the diff provider reports them. They are never resolved against the
//! local filesystem here.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// How a file changed between two commits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
    /// A provider status with no mapping (e.g. `copied`, `changed`).
    Other(String),
}

impl ChangeKind {
    /// Parse a provider status string. Unknown statuses are preserved verbatim
    /// in [`ChangeKind::Other`].
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "added" => Self::Added,
            "modified" => Self::Modified,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Other(status.to_string()),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Removed => write!(f, "removed"),
            ChangeKind::Renamed => write!(f, "renamed"),
            ChangeKind::Other(status) => write!(f, "{status}"),
        }
    }
}

/// A single changed file in a commit range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
    /// Path before the change, reported for renames only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            previous_path: None,
        }
    }

    /// A rename from `previous_path` to `path`.
    pub fn renamed(previous_path: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Renamed,
            previous_path: Some(previous_path.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A markdown document split into front-matter metadata and body text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    pub body: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ContentDocument {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The remote operation attempted for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// The record never left the classifier (unsupported status).
    Classify,
    Create,
    Update,
    Delete,
    Rename,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Classify => write!(f, "classify"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Rename => write!(f, "rename"),
        }
    }
}

/// Success or failure of a single file's operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote_id: Option<String>,
    },
    Failure {
        reason: String,
    },
}

/// Per-file result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub path: String,
    pub operation: Operation,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl SyncOutcome {
    pub fn success(path: impl Into<String>, operation: Operation, remote_id: Option<String>) -> Self {
        Self {
            path: path.into(),
            operation,
            status: OutcomeStatus::Success { remote_id },
        }
    }

    pub fn failure(path: impl Into<String>, operation: Operation, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operation,
            status: OutcomeStatus::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }
}

/// Append-only collection of outcomes for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn push(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// `true` when every attempted file succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
