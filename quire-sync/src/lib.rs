//! # quire-sync
//!
//! Reconciles classified repository changes with a Ghost site.
//!
//! Call [`pipeline::run`] with a [`DiffProvider`] and a [`pipeline::RunMode`];
//! the collaborators ([`GitHubCompare`], [`WorkingCopyLoader`],
//! [`GhostAdminClient`]) are plain structs behind traits so tests can swap
//! them out.

pub mod content;
pub mod error;
pub mod event;
pub mod ghost;
pub mod github;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod token;

pub use content::{ContentLoader, WorkingCopyLoader};
pub use error::{ContentError, CredentialError, FileError, RemoteError, SyncError};
pub use event::{CommitRange, EventContext};
pub use ghost::GhostAdminClient;
pub use github::{Comparison, DiffProvider, GitHubCompare};
pub use pipeline::{RunMode, RunSummary};
pub use reconcile::{plan, reconcile, PlannedMutation};
pub use remote::{RemoteClient, RemoteEntry};
