//! `roster sync`: one reconciliation pass.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use roster_sync::{ChangeReport, Outcome, Reconciler, RunMode};

use super::{connect_directory, connect_target, ConnectionArgs};

/// Arguments for `roster sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Compute and print the changes without creating or patching groups.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, connection: &ConnectionArgs) -> Result<()> {
        let settings = connection.settings()?;
        let directory = connect_directory(&settings)?;
        let target = connect_target(&settings);
        let mode = if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        };

        tracing::info!(
            "syncing {} users into {}",
            settings.domain,
            settings.target_url
        );
        let report = Reconciler::new(directory, target, settings.domain.clone())
            .run(mode)
            .context("group sync failed")?;

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &ChangeReport) {
    let header = match report.outcome {
        Outcome::NoChanges => "✓ up to date".green().bold(),
        Outcome::Planned => "~ changes planned".yellow().bold(),
        Outcome::Applied if report.failed_groups.is_empty() => "✓ changes applied".green().bold(),
        Outcome::Applied => "! changes applied with skipped groups".yellow().bold(),
    };
    println!("{header}");
    for line in report.render() {
        println!("  {line}");
    }
}
