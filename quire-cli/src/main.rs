//! quire: sync a folder of markdown documents to a Ghost site.
//!
//! # Usage
//!
//! ```text
//! quire sync [--target-folder <name>] [--base <sha> --head <sha>] [--dry-run] [--json] [--strict]
//! quire token [--ghost-admin-key <id:secret>]
//! ```
//!
//! Every option also reads the matching GitHub Actions variable
//! (`INPUT_TARGET_FOLDER`, `INPUT_GITHUB_TOKEN`, `GITHUB_EVENT_NAME`, ...), so
//! the binary runs unchanged as an action step.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{sync::SyncArgs, token::TokenArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "quire",
    version,
    about = "Sync markdown documents changed in a commit range to a Ghost site",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the files changed between two commits and apply them to Ghost.
    Sync(SyncArgs),

    /// Print a freshly minted Ghost admin token.
    Token(TokenArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Token(args) => args.run(),
    };
    if let Err(err) = &result {
        annotate_failure(err);
    }
    result
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Surface a fatal error as a workflow annotation when running in Actions.
fn annotate_failure(err: &anyhow::Error) {
    if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
        // Workflow commands are single-line.
        let message = format!("{err:#}").replace('\n', "%0A");
        println!("::error::{message}");
    }
}
