//! `quire token` — mint a Ghost admin token for manual API calls.

use anyhow::{Context, Result};
use clap::Args;

use quire_sync::{token, SyncError};

use super::non_empty;

/// Arguments for `quire token`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Admin API key as `<id>:<hex secret>`.
    #[arg(long, env = "INPUT_GHOST_ADMIN_KEY", hide_env_values = true)]
    pub ghost_admin_key: Option<String>,
}

impl TokenArgs {
    pub fn run(self) -> Result<()> {
        let key = non_empty(self.ghost_admin_key).ok_or_else(|| {
            SyncError::Config(
                "GHOST_ADMIN_KEY is required (set INPUT_GHOST_ADMIN_KEY or --ghost-admin-key)"
                    .to_string(),
            )
        })?;
        let jwt = token::prepare(&key).context("could not mint admin token")?;
        println!("{jwt}");
        Ok(())
    }
}
