//! Remote content API seam.
//!
//! The reconciler only speaks to [`RemoteClient`]; [`crate::ghost`] provides
//! the HTTP implementation. Entries are addressed by slug for lookups and by
//! remote id for mutation.
//!
//! Implementations are expected to treat a `create` for a slug that already
//! exists as an update of that entry rather than a duplicate. The reconciler
//! relies on this for repeated runs over the same commit range. Local slugs
//! are ASCII-only so the remote's own slug normalization leaves them as sent.

use quire_core::ContentDocument;

use crate::error::RemoteError;

/// An existing remote entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub slug: String,
    /// Last-modified marker echoed back on update for collision detection.
    pub updated_at: Option<String>,
}

/// Authenticated access to the remote content store.
pub trait RemoteClient {
    /// Look up an entry by slug. `Ok(None)` when it does not exist.
    fn find_by_slug(&self, slug: &str) -> Result<Option<RemoteEntry>, RemoteError>;

    /// Create an entry for `doc` under `slug`, returning the remote id.
    fn create(&self, slug: &str, doc: &ContentDocument) -> Result<String, RemoteError>;

    /// Replace `entry` with `doc`, re-keying it to `slug`.
    fn update(&self, entry: &RemoteEntry, slug: &str, doc: &ContentDocument) -> Result<(), RemoteError>;

    /// Remove the entry with remote id `id`.
    fn delete(&self, id: &str) -> Result<(), RemoteError>;
}
