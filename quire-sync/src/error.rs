//! Error types for quire-sync.
//!
//! [`SyncError`] is fatal and aborts a run. [`ContentError`], [`RemoteError`]
//! and [`CredentialError`] are per-file: the reconciler records them in the
//! report and moves on.

use std::path::PathBuf;

use thiserror::Error;

/// Run-aborting failures: configuration and precondition errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required configuration option is missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The target folder is not a single path segment.
    #[error(transparent)]
    Core(#[from] quire_core::CoreError),

    /// Only `push` and `pull_request` events carry a commit range.
    #[error(
        "only pull_request and push events are supported, '{event}' events are not"
    )]
    UnsupportedEvent { event: String },

    /// The event payload lacks a base or head commit.
    #[error("the base and head commits are missing from the payload for this {event} event")]
    MissingCommitRefs { event: String },

    /// The comparison reported something other than `ahead`.
    #[error("head commit is not ahead of base commit (comparison status: {status})")]
    NotAhead { status: String },

    /// The comparison contained no files.
    #[error("there is no difference between the base and head commits")]
    EmptyComparison,

    /// The diff provider could not be reached or answered with an error.
    #[error("diff provider request failed: {0}")]
    Provider(String),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON decoding error (event payload, provider response).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Failure to read or parse a document from the working copy.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    NotText { path: PathBuf },

    #[error("malformed front matter in {path}: {reason}")]
    FrontMatter { path: PathBuf, reason: String },
}

/// The admin key is not an `id:secret` pair with a hex secret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("invalid admin key format: {0}")]
    InvalidCredentialFormat(&'static str),

    #[error("failed to sign admin token: {0}")]
    Signing(String),
}

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote answered with a non-2xx status.
    #[error("remote rejected request with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Per-file failure while reconciling: either side of a file operation.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The file name has no ASCII letters or digits to build a slug from.
    #[error("cannot derive a slug from {path}")]
    NoSlug { path: String },
}
