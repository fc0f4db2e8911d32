pub mod check;
pub mod sync;
pub mod users;

use anyhow::{Context, Result};
use clap::Args;
use secrecy::{ExposeSecret, SecretString};

use roster_core::Settings;
use roster_directory::{GoogleDirectory, ServiceAccountTokens};
use roster_target::CoderClient;

/// Overrides for the environment-sourced connection settings.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Only sync target users whose email is under this domain.
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Coder deployment base URL.
    #[arg(long, global = true)]
    pub target_url: Option<String>,
}

impl ConnectionArgs {
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::from_env().context("invalid configuration")?;
        if let Some(url) = &self.target_url {
            settings = settings
                .with_target_url(url.clone())
                .context("invalid --target-url")?;
        }
        if let Some(domain) = &self.domain {
            settings.domain = domain.clone();
        }
        Ok(settings)
    }
}

pub fn connect_directory(settings: &Settings) -> Result<GoogleDirectory<ServiceAccountTokens>> {
    GoogleDirectory::connect(
        &settings.credentials_path,
        &settings.admin_email,
        settings.directory_url.clone(),
    )
    .with_context(|| {
        format!(
            "failed to load directory credentials from {}",
            settings.credentials_path.display()
        )
    })
}

pub fn connect_target(settings: &Settings) -> CoderClient {
    let token = SecretString::from(settings.session_token.expose_secret().to_owned());
    CoderClient::new(settings.target_url.clone(), token)
}
