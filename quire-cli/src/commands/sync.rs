//! `quire sync` — classify a commit range and apply it to Ghost.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use quire_core::{validate_target_folder, OutcomeStatus};
use quire_sync::{
    github::DEFAULT_API_URL,
    pipeline::{self, RunMode, RunSummary},
    CommitRange, EventContext, GhostAdminClient, GitHubCompare, SyncError, WorkingCopyLoader,
};

use super::non_empty;

/// Arguments for `quire sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Folder name whose markdown files are synced; a single path segment.
    #[arg(long, env = "INPUT_TARGET_FOLDER")]
    pub target_folder: Option<String>,

    /// Token used to read the commit comparison.
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Ghost site domain, e.g. `blog.example.com`.
    #[arg(long, env = "INPUT_GHOST_ADMIN_DOMAIN")]
    pub ghost_admin_domain: Option<String>,

    /// Ghost Admin API key as `<id>:<hex secret>`.
    #[arg(long, env = "INPUT_GHOST_ADMIN_KEY", hide_env_values = true)]
    pub ghost_admin_key: Option<String>,

    /// Triggering event (`push` or `pull_request`).
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// JSON payload of the triggering event.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Repository as `owner/repo`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Checkout root that changed paths are read from.
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Base commit; overrides the event payload.
    #[arg(long, requires = "head")]
    pub base: Option<String>,

    /// Head commit; overrides the event payload.
    #[arg(long, requires = "base")]
    pub head: Option<String>,

    /// Show the planned mutations without calling Ghost.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when any file fails to sync.
    #[arg(long)]
    pub strict: bool,
}

/// Ghost credentials; both or neither must be configured.
struct GhostConfig {
    domain: String,
    admin_key: String,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let target_folder = require(
            self.target_folder.clone(),
            "TARGET_FOLDER is required (set INPUT_TARGET_FOLDER or --target-folder)",
        )?;
        validate_target_folder(&target_folder)?;
        let github_token = require(
            self.github_token.clone(),
            "GITHUB_TOKEN is required (set INPUT_GITHUB_TOKEN or --github-token)",
        )?;
        let repository = require(
            self.repository.clone(),
            "repository is required (set GITHUB_REPOSITORY or --repository)",
        )?;
        let ghost = self.ghost_config()?;

        let range = self.commit_range()?;
        let diff = GitHubCompare::new(&self.api_url, repository, github_token);

        let summary = match &ghost {
            None => {
                tracing::info!("Ghost credentials not configured, classifying only");
                pipeline::run(&diff, &range, &target_folder, RunMode::Plan)
            }
            Some(_) if self.dry_run => pipeline::run(&diff, &range, &target_folder, RunMode::Plan),
            Some(ghost) => {
                let loader = WorkingCopyLoader::new(&self.workspace);
                let remote = GhostAdminClient::new(&ghost.domain, ghost.admin_key.clone());
                tracing::info!("syncing to {}", remote.base_url());
                pipeline::run(
                    &diff,
                    &range,
                    &target_folder,
                    RunMode::Apply {
                        loader: &loader,
                        remote: &remote,
                    },
                )
            }
        }
        .with_context(|| format!("sync of '{target_folder}' failed"))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            let prefix = match &ghost {
                None => "[classify-only] ",
                Some(_) if self.dry_run => "[dry-run] ",
                Some(_) => "",
            };
            print_summary(&summary, prefix);
        }

        if self.strict && !summary.is_clean() {
            let failed = summary.report.as_ref().map_or(0, |r| r.failed());
            bail!("{failed} file(s) failed to sync");
        }
        Ok(())
    }

    fn ghost_config(&self) -> Result<Option<GhostConfig>> {
        let domain = non_empty(self.ghost_admin_domain.clone());
        let admin_key = non_empty(self.ghost_admin_key.clone());
        match (domain, admin_key) {
            (Some(domain), Some(admin_key)) => Ok(Some(GhostConfig { domain, admin_key })),
            (None, None) => Ok(None),
            _ => Err(SyncError::Config(
                "GHOST_ADMIN_DOMAIN and GHOST_ADMIN_KEY must be set together".to_string(),
            )
            .into()),
        }
    }

    fn commit_range(&self) -> Result<CommitRange> {
        if let (Some(base), Some(head)) = (
            non_empty(self.base.clone()),
            non_empty(self.head.clone()),
        ) {
            return Ok(CommitRange { base, head });
        }

        let name = require(
            self.event_name.clone(),
            "event name is required (set GITHUB_EVENT_NAME or pass --base and --head)",
        )?;
        let path = self.event_path.as_ref().ok_or_else(|| {
            SyncError::Config(
                "event payload is required (set GITHUB_EVENT_PATH or pass --base and --head)"
                    .to_string(),
            )
        })?;
        let event = EventContext::from_path(name, path)?;
        Ok(event.commit_range()?)
    }
}

fn require(value: Option<String>, message: &str) -> Result<String, SyncError> {
    non_empty(value).ok_or_else(|| SyncError::Config(message.to_string()))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "category")]
    category: &'static str,
    #[tabled(rename = "files")]
    files: usize,
}

fn print_summary(summary: &RunSummary, prefix: &str) {
    let classified = &summary.classified;
    println!(
        "{} {}...{}",
        "compared".bold(),
        summary.range.base,
        summary.range.head
    );

    match &summary.report {
        Some(report) => {
            for outcome in &report.outcomes {
                match &outcome.status {
                    OutcomeStatus::Success { .. } => println!(
                        "  {} {:<8} {}",
                        "✓".green(),
                        outcome.operation,
                        outcome.path
                    ),
                    OutcomeStatus::Failure { reason } => println!(
                        "  {} {:<8} {}: {}",
                        "✗".red(),
                        outcome.operation,
                        outcome.path,
                        reason.red()
                    ),
                }
            }
        }
        None => {
            for mutation in &summary.planned {
                println!(
                    "  {prefix}{} {:<8} {} ({})",
                    "~".yellow(),
                    mutation.operation,
                    mutation.path,
                    mutation.slug.dimmed()
                );
            }
            for rejection in &classified.rejected {
                println!(
                    "  {prefix}{} {:<8} {}: {}",
                    "!".red(),
                    "skip",
                    rejection.record.path,
                    rejection.error
                );
            }
        }
    }

    let rows = vec![
        CategoryRow { category: "created", files: classified.created.len() },
        CategoryRow { category: "updated", files: classified.updated.len() },
        CategoryRow { category: "deleted", files: classified.deleted.len() },
        CategoryRow { category: "renamed", files: classified.renamed.len() },
        CategoryRow { category: "rejected", files: classified.rejected.len() },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if let Some(report) = &summary.report {
        let line = format!(
            "{} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        if report.is_clean() {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    } else if summary.planned.is_empty() && classified.rejected.is_empty() {
        println!("nothing to sync");
    }
}
