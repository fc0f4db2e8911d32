//! Roster: sync directory groups into Coder groups.
//!
//! # Usage
//!
//! ```text
//! roster sync [--dry-run] [--domain <domain>] [--target-url <url>]
//! roster users
//! roster check
//! ```
//!
//! Connection settings come from `ROSTER_*` environment variables; see
//! `roster_core::config`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{sync::SyncArgs, ConnectionArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Reconcile directory group membership into Coder groups",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one reconciliation pass.
    Sync(SyncArgs),

    /// List the directory's users.
    Users,

    /// Verify both systems are reachable with the configured credentials.
    Check,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(&cli.connection),
        Commands::Users => commands::users::run(&cli.connection),
        Commands::Check => commands::check::run(&cli.connection),
    }
}
