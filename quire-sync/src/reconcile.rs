//! Reconciliation: apply a [`ClassifiedSet`] to the remote.
//!
//! Categories are processed in order (rejected, created, updated, deleted,
//! renamed) and files within a category in input order. Each file is attempted
//! exactly once and its failure is recorded without stopping the run.
//!
//! Remote entries are matched by a slug derived from the file path, for every
//! operation. A removed file can only be identified by its path, so a
//! front-matter `slug` is never used as identity.
//!
//! | category | lookup                       | found   | not found |
//! |----------|------------------------------|---------|-----------|
//! | created  | none                         | n/a     | create    |
//! | updated  | path slug                    | update  | create    |
//! | deleted  | path slug                    | delete  | no-op     |
//! | renamed  | previous path slug, then new | re-key  | create    |

use serde::Serialize;

use quire_core::{
    slug::slug_for_path,
    ChangeRecord, ClassifiedSet, ContentDocument, Operation, SyncOutcome, SyncReport,
};

use crate::content::ContentLoader;
use crate::error::FileError;
use crate::remote::{RemoteClient, RemoteEntry};

/// A mutation reconcile would attempt, computed without I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMutation {
    pub path: String,
    pub operation: Operation,
    /// Remote slug, derived from the path.
    pub slug: String,
}

/// Describe what [`reconcile`] would do for `classified`.
pub fn plan(classified: &ClassifiedSet) -> Vec<PlannedMutation> {
    let planned = |record: &ChangeRecord, operation| PlannedMutation {
        path: record.path.clone(),
        operation,
        slug: slug_for_path(&record.path),
    };

    let mut mutations = Vec::with_capacity(classified.routed_len());
    mutations.extend(classified.created.iter().map(|r| planned(r, Operation::Create)));
    mutations.extend(classified.updated.iter().map(|r| planned(r, Operation::Update)));
    mutations.extend(classified.deleted.iter().map(|r| planned(r, Operation::Delete)));
    mutations.extend(classified.renamed.iter().map(|r| planned(r, Operation::Rename)));
    mutations
}

/// Apply every classified record and collect one outcome per record.
pub fn reconcile(
    classified: &ClassifiedSet,
    loader: &dyn ContentLoader,
    remote: &dyn RemoteClient,
) -> SyncReport {
    let mut report = SyncReport::default();

    for rejection in &classified.rejected {
        tracing::warn!("skipped {}: {}", rejection.record.path, rejection.error);
        report.push(SyncOutcome::failure(
            &rejection.record.path,
            Operation::Classify,
            &rejection.error,
        ));
    }

    for record in &classified.created {
        let result = create_file(record, loader, remote).map(Some);
        report.push(outcome(record, Operation::Create, result));
    }
    for record in &classified.updated {
        let result = update_file(record, loader, remote).map(Some);
        report.push(outcome(record, Operation::Update, result));
    }
    for record in &classified.deleted {
        let result = delete_file(record, remote);
        report.push(outcome(record, Operation::Delete, result));
    }
    for record in &classified.renamed {
        let result = rename_file(record, loader, remote).map(Some);
        report.push(outcome(record, Operation::Rename, result));
    }

    tracing::info!(
        "reconciled {} file(s): {} succeeded, {} failed",
        report.len(),
        report.succeeded(),
        report.failed()
    );
    report
}

fn outcome(
    record: &ChangeRecord,
    operation: Operation,
    result: Result<Option<String>, FileError>,
) -> SyncOutcome {
    match result {
        Ok(remote_id) => {
            tracing::info!("{operation} ok: {}", record.path);
            SyncOutcome::success(&record.path, operation, remote_id)
        }
        Err(err) => {
            tracing::error!("{operation} failed: {}: {err}", record.path);
            SyncOutcome::failure(&record.path, operation, err.to_string())
        }
    }
}

fn remote_slug(path: &str) -> Result<String, FileError> {
    let slug = slug_for_path(path);
    if slug.is_empty() {
        return Err(FileError::NoSlug {
            path: path.to_string(),
        });
    }
    Ok(slug)
}

fn load(record: &ChangeRecord, loader: &dyn ContentLoader) -> Result<(String, ContentDocument), FileError> {
    let slug = remote_slug(&record.path)?;
    let doc = loader.load(&record.path)?;
    if let Some(custom) = doc.meta("slug").filter(|custom| *custom != slug) {
        tracing::warn!(
            "{}: ignoring front-matter slug '{custom}', remote slug is '{slug}'",
            record.path
        );
    }
    Ok((slug, doc))
}

fn create_file(
    record: &ChangeRecord,
    loader: &dyn ContentLoader,
    remote: &dyn RemoteClient,
) -> Result<String, FileError> {
    let (slug, doc) = load(record, loader)?;
    Ok(remote.create(&slug, &doc)?)
}

fn update_file(
    record: &ChangeRecord,
    loader: &dyn ContentLoader,
    remote: &dyn RemoteClient,
) -> Result<String, FileError> {
    let (slug, doc) = load(record, loader)?;
    match remote.find_by_slug(&slug)? {
        Some(entry) => apply_update(remote, &entry, &slug, &doc),
        None => {
            tracing::info!("no remote entry for '{slug}', creating");
            Ok(remote.create(&slug, &doc)?)
        }
    }
}

fn delete_file(record: &ChangeRecord, remote: &dyn RemoteClient) -> Result<Option<String>, FileError> {
    let slug = remote_slug(&record.path)?;
    match remote.find_by_slug(&slug)? {
        Some(entry) => {
            remote.delete(&entry.id)?;
            Ok(Some(entry.id))
        }
        None => {
            tracing::info!("no remote entry for '{slug}', nothing to delete");
            Ok(None)
        }
    }
}

fn rename_file(
    record: &ChangeRecord,
    loader: &dyn ContentLoader,
    remote: &dyn RemoteClient,
) -> Result<String, FileError> {
    let (slug, doc) = load(record, loader)?;
    let old_slug = remote_slug(record.previous_path.as_deref().unwrap_or(&record.path))?;

    let existing = match remote.find_by_slug(&old_slug)? {
        Some(entry) => Some(entry),
        None if old_slug != slug => remote.find_by_slug(&slug)?,
        None => None,
    };

    match existing {
        Some(entry) => {
            tracing::info!("re-keying '{}' to '{slug}'", entry.slug);
            apply_update(remote, &entry, &slug, &doc)
        }
        None => {
            tracing::info!("no remote entry for '{old_slug}' or '{slug}', creating");
            Ok(remote.create(&slug, &doc)?)
        }
    }
}

fn apply_update(
    remote: &dyn RemoteClient,
    entry: &RemoteEntry,
    slug: &str,
    doc: &ContentDocument,
) -> Result<String, FileError> {
    remote.update(entry, slug, doc)?;
    Ok(entry.id.clone())
}
