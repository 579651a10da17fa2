//! Commit comparison via the GitHub REST API.

use std::time::Duration;

use serde::Deserialize;

use quire_core::{ChangeKind, ChangeRecord};

use crate::error::SyncError;
use crate::event::CommitRange;

/// Default REST endpoint; GitHub Enterprise sets `GITHUB_API_URL`.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;
// The compare endpoint stops listing files after 3000.
const MAX_PAGES: usize = 30;

/// Result of comparing two commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// `ahead`, `behind`, `diverged` or `identical`.
    pub status: String,
    pub files: Vec<ChangeRecord>,
}

/// Source of the file-change list for a commit range.
pub trait DiffProvider {
    fn compare(&self, range: &CommitRange) -> Result<Comparison, SyncError>;
}

/// `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
pub struct GitHubCompare {
    api_url: String,
    repository: String,
    token: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    status: String,
    #[serde(default)]
    files: Option<Vec<CompareFile>>,
}

#[derive(Debug, Deserialize)]
struct CompareFile {
    filename: String,
    status: String,
    #[serde(default)]
    previous_filename: Option<String>,
}

impl From<CompareFile> for ChangeRecord {
    fn from(file: CompareFile) -> Self {
        ChangeRecord {
            path: file.filename,
            kind: ChangeKind::from_status(&file.status),
            previous_path: file.previous_filename,
        }
    }
}

impl GitHubCompare {
    /// `repository` is `owner/repo`.
    pub fn new(api_url: &str, repository: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.into(),
            token: token.into(),
            agent,
        }
    }

    fn page(&self, range: &CommitRange, page: usize) -> Result<CompareResponse, SyncError> {
        let url = format!(
            "{}/repos/{}/compare/{}...{}?per_page={PER_PAGE}&page={page}",
            self.api_url, self.repository, range.base, range.head
        );
        tracing::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => SyncError::Provider(format!(
                    "comparing {}...{} returned {status}, expected 200: {}",
                    range.base,
                    range.head,
                    response.into_string().unwrap_or_default()
                )),
                ureq::Error::Transport(t) => SyncError::Provider(t.to_string()),
            })?;
        response
            .into_json()
            .map_err(|e| SyncError::Provider(format!("invalid compare response: {e}")))
    }
}

impl DiffProvider for GitHubCompare {
    fn compare(&self, range: &CommitRange) -> Result<Comparison, SyncError> {
        let first = self.page(range, 1)?;
        let status = first.status;
        let mut batch = first.files.unwrap_or_default();
        let mut files = Vec::with_capacity(batch.len());

        let mut page = 1;
        loop {
            let full_page = batch.len() == PER_PAGE;
            files.extend(batch.into_iter().map(ChangeRecord::from));
            if !full_page || page >= MAX_PAGES {
                break;
            }
            page += 1;
            batch = self.page(range, page)?.files.unwrap_or_default();
        }

        tracing::info!(
            "compared {}...{}: {status}, {} file(s)",
            range.base,
            range.head,
            files.len()
        );
        Ok(Comparison { status, files })
    }
}
