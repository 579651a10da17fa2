//! quire core library: change records, classification, slugs, outcomes.
//!
//! - [`types`] — change records, documents, per-file outcomes
//! - [`classify`] — pure diff classification
//! - [`slug`] — remote identifier derivation
//! - [`error`] — [`CoreError`]

pub mod classify;
pub mod error;
pub mod slug;
pub mod types;

pub use classify::{classify, in_target_folder, validate_target_folder, ClassifiedSet, Rejection};
pub use error::CoreError;
pub use types::{
    ChangeKind, ChangeRecord, ContentDocument, Operation, OutcomeStatus, SyncOutcome, SyncReport,
};
