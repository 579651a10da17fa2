//! Workflow event context: which commit range a run covers.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{io_err, SyncError};

/// Base and head commits of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRange {
    pub base: String,
    pub head: String,
}

/// The triggering event name and its JSON payload.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub name: String,
    pub payload: Value,
}

impl EventContext {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Read the payload from the file the runner wrote (`GITHUB_EVENT_PATH`).
    pub fn from_path(name: impl Into<String>, path: &Path) -> Result<Self, SyncError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let payload = serde_json::from_str(&contents)?;
        Ok(Self::new(name, payload))
    }

    /// Extract the commit range.
    ///
    /// `pull_request` uses the PR base and head shas; `push` uses
    /// `before`/`after`. An all-zero sha (branch creation) counts as missing.
    pub fn commit_range(&self) -> Result<CommitRange, SyncError> {
        let (base, head) = match self.name.as_str() {
            "pull_request" => (
                self.payload.pointer("/pull_request/base/sha"),
                self.payload.pointer("/pull_request/head/sha"),
            ),
            "push" => (self.payload.get("before"), self.payload.get("after")),
            other => {
                return Err(SyncError::UnsupportedEvent {
                    event: other.to_string(),
                })
            }
        };

        match (usable_sha(base), usable_sha(head)) {
            (Some(base), Some(head)) => Ok(CommitRange { base, head }),
            _ => Err(SyncError::MissingCommitRefs {
                event: self.name.clone(),
            }),
        }
    }
}

fn usable_sha(value: Option<&Value>) -> Option<String> {
    let sha = value?.as_str()?.trim();
    if sha.is_empty() || sha.chars().all(|c| c == '0') {
        return None;
    }
    Some(sha.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn push_uses_before_and_after() {
        let ctx = EventContext::new("push", json!({ "before": "b1", "after": "h1" }));
        let range = ctx.commit_range().unwrap();
        assert_eq!(range.base, "b1");
        assert_eq!(range.head, "h1");
    }

    #[test]
    fn pull_request_uses_pr_shas() {
        let ctx = EventContext::new(
            "pull_request",
            json!({ "pull_request": { "base": { "sha": "b2" }, "head": { "sha": "h2" } } }),
        );
        let range = ctx.commit_range().unwrap();
        assert_eq!(range, CommitRange { base: "b2".into(), head: "h2".into() });
    }

    #[test]
    fn other_events_are_unsupported() {
        let ctx = EventContext::new("workflow_dispatch", json!({}));
        let err = ctx.commit_range().unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedEvent { .. }), "got: {err}");
        assert!(err.to_string().contains("workflow_dispatch"));
    }

    #[test]
    fn missing_refs_are_reported() {
        let ctx = EventContext::new("push", json!({ "after": "h1" }));
        let err = ctx.commit_range().unwrap_err();
        assert!(matches!(err, SyncError::MissingCommitRefs { .. }), "got: {err}");
    }

    #[test]
    fn branch_creation_push_has_no_base() {
        let ctx = EventContext::new(
            "push",
            json!({ "before": "0000000000000000000000000000000000000000", "after": "h1" }),
        );
        assert!(matches!(
            ctx.commit_range(),
            Err(SyncError::MissingCommitRefs { .. })
        ));
    }

    #[test]
    fn payload_loads_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"before":"b","after":"h"}"#).unwrap();
        let ctx = EventContext::from_path("push", &path).unwrap();
        assert_eq!(ctx.commit_range().unwrap().head, "h");
    }

    #[test]
    fn missing_payload_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = EventContext::from_path("push", &dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }
}
