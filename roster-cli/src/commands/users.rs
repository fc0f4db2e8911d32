//! `roster users`: list the directory's users.

use anyhow::{Context, Result};
use colored::Colorize;

use roster_core::DirectoryAdapter;

use super::{connect_directory, ConnectionArgs};

pub fn run(connection: &ConnectionArgs) -> Result<()> {
    let settings = connection.settings()?;
    let directory = connect_directory(&settings)?;

    let users = directory
        .list_all_users(&settings.customer_id)
        .with_context(|| format!("failed to list users of customer {}", settings.customer_id))?;

    if users.is_empty() {
        println!("No directory users found.");
        return Ok(());
    }
    for user in &users {
        let marker = if user.suspended {
            "suspended".red().to_string()
        } else {
            "active".green().to_string()
        };
        println!("{}  {}  [{marker}]", user.primary_email, user.full_name);
    }
    println!("{} users", users.len());
    Ok(())
}
