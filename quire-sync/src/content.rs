//! Document loading from the checked-out working copy.
//!
//! A document may start with a YAML front-matter block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! tags: [rust, sync]
//! ---
//! Body text.
//! ```
//!
//! Scalar values are stringified, sequences of scalars are joined with `", "`,
//! nulls are skipped. Anything nested deeper is rejected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use quire_core::ContentDocument;

use crate::error::ContentError;

/// Source of document content for a repository-relative path.
pub trait ContentLoader {
    fn load(&self, path: &str) -> Result<ContentDocument, ContentError>;
}

/// Reads documents from a directory (the checkout of the head commit).
#[derive(Debug, Clone)]
pub struct WorkingCopyLoader {
    root: PathBuf,
}

impl WorkingCopyLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentLoader for WorkingCopyLoader {
    fn load(&self, path: &str) -> Result<ContentDocument, ContentError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|source| ContentError::Read {
            path: full.clone(),
            source,
        })?;
        let raw = String::from_utf8(bytes).map_err(|_| ContentError::NotText { path: full.clone() })?;
        tracing::debug!("loaded {} ({} bytes)", full.display(), raw.len());
        parse_document(&full, &raw)
    }
}

/// Split `raw` into front matter and body. `path` is used for error context only.
pub fn parse_document(path: &Path, raw: &str) -> Result<ContentDocument, ContentError> {
    let normalized = raw.replace("\r\n", "\n");
    let Some(after_open) = normalized.strip_prefix("---\n") else {
        return Ok(ContentDocument::new(normalized));
    };

    let (front, body) = split_closing_fence(after_open).ok_or_else(|| ContentError::FrontMatter {
        path: path.to_path_buf(),
        reason: "missing closing '---' delimiter".to_string(),
    })?;

    let metadata = parse_front_matter(front).map_err(|reason| ContentError::FrontMatter {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(ContentDocument {
        body: body.trim_start_matches('\n').to_string(),
        metadata,
    })
}

/// Find the first line that is exactly `---` and split around it.
fn split_closing_fence(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches('\n') == "---" {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_front_matter(front: &str) -> Result<BTreeMap<String, String>, String> {
    if front.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value = serde_yaml::from_str(front).map_err(|e| e.to_string())?;
    let mapping = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err("front matter must be a mapping".to_string()),
    };

    let mut metadata = BTreeMap::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key).ok_or("front matter keys must be scalars")?;
        let rendered = match value {
            Value::Null => continue,
            Value::Sequence(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    let part = scalar_to_string(item)
                        .ok_or_else(|| format!("'{key}' must be a list of scalars"))?;
                    parts.push(part);
                }
                parts.join(", ")
            }
            other => scalar_to_string(&other)
                .ok_or_else(|| format!("'{key}' has an unsupported nested value"))?,
        };
        metadata.insert(key, rendered);
    }
    Ok(metadata)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
