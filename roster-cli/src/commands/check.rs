//! `roster check`: verify credentials and the default organization.

use anyhow::{Context, Result};
use colored::Colorize;

use roster_core::TargetAdapter;

use super::{connect_directory, connect_target, ConnectionArgs};

pub fn run(connection: &ConnectionArgs) -> Result<()> {
    let settings = connection.settings()?;

    let target = connect_target(&settings);
    let me = target
        .current_user()
        .with_context(|| format!("cannot authenticate to {}", settings.target_url))?;
    println!("{} target: signed in as {}", "✓".green(), me.username);

    let default_org = target
        .list_organizations()
        .context("failed to list organizations")?
        .into_iter()
        .find(|org| org.is_default)
        .context("default organization not found")?;
    println!(
        "{} target: default organization {} ({})",
        "✓".green(),
        default_org.name,
        default_org.id
    );

    let directory = connect_directory(&settings)?;
    directory
        .authenticate()
        .with_context(|| format!("cannot impersonate {}", settings.admin_email))?;
    println!(
        "{} directory: authenticated as {}",
        "✓".green(),
        settings.admin_email
    );
    Ok(())
}
