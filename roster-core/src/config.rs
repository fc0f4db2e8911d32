//! Environment-sourced run configuration.
//!
//! Every option has a placeholder fallback so a dry configuration can be
//! assembled locally; real deployments override them through the
//! environment.
//!
//! # API pattern
//!
//! - [`Settings::from_lookup`]: explicit lookup function; used in tests
//! - [`Settings::from_env`]: reads the process environment, delegates to
//!   `from_lookup`

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const ENV_ADMIN_EMAIL: &str = "ROSTER_ADMIN_EMAIL";
pub const ENV_DOMAIN: &str = "ROSTER_DOMAIN";
pub const ENV_CREDENTIALS_FILE: &str = "ROSTER_CREDENTIALS_FILE";
pub const ENV_TARGET_URL: &str = "ROSTER_TARGET_URL";
pub const ENV_SESSION_TOKEN: &str = "ROSTER_SESSION_TOKEN";
pub const ENV_CUSTOMER_ID: &str = "ROSTER_CUSTOMER_ID";
pub const ENV_DIRECTORY_URL: &str = "ROSTER_DIRECTORY_URL";

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_DOMAIN: &str = "example.com";
const DEFAULT_TARGET_URL: &str = "https://coder.example.com";
// Directory alias for "the customer that owns the admin account".
const DEFAULT_CUSTOMER_ID: &str = "my_customer";
const DEFAULT_DIRECTORY_URL: &str = "https://admin.googleapis.com";

/// Everything one reconciliation run needs to reach both systems.
#[derive(Debug)]
pub struct Settings {
    /// Directory admin the service account impersonates.
    pub admin_email: String,
    /// Only target users with an `@<domain>` email are synced.
    pub domain: String,
    /// Service-account JSON key file.
    pub credentials_path: PathBuf,
    pub target_url: String,
    /// Session token of a target-system owner account.
    pub session_token: SecretString,
    pub customer_id: String,
    pub directory_url: String,
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// The credential fallback `~/.roster/credentials.json` is only resolved
    /// when no explicit path is configured.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let take = |key: &str, fallback: &str| lookup(key).unwrap_or_else(|| fallback.to_string());

        let credentials_path = match lookup(ENV_CREDENTIALS_FILE) {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .ok_or(ConfigError::HomeNotFound)?
                .join(".roster")
                .join("credentials.json"),
        };

        let target_url = checked_url(ENV_TARGET_URL, take(ENV_TARGET_URL, DEFAULT_TARGET_URL))?;
        let directory_url = checked_url(
            ENV_DIRECTORY_URL,
            take(ENV_DIRECTORY_URL, DEFAULT_DIRECTORY_URL),
        )?;

        Ok(Self {
            admin_email: take(ENV_ADMIN_EMAIL, DEFAULT_ADMIN_EMAIL),
            domain: take(ENV_DOMAIN, DEFAULT_DOMAIN),
            credentials_path,
            target_url,
            session_token: SecretString::from(take(ENV_SESSION_TOKEN, "")),
            customer_id: take(ENV_CUSTOMER_ID, DEFAULT_CUSTOMER_ID),
            directory_url,
        })
    }

    /// Replace the target base URL (CLI override).
    pub fn with_target_url(mut self, url: String) -> Result<Self, ConfigError> {
        self.target_url = checked_url(ENV_TARGET_URL, url)?;
        Ok(self)
    }
}

/// Require an absolute http(s) URL and drop any trailing slash so paths can
/// be appended with `format!("{base}/api/...")`.
fn checked_url(variable: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { variable, value });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_values_win() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_ADMIN_EMAIL, "root@corp.test"),
            (ENV_DOMAIN, "corp.test"),
            (ENV_CREDENTIALS_FILE, "/etc/roster/key.json"),
            (ENV_TARGET_URL, "https://coder.corp.test/"),
            (ENV_SESSION_TOKEN, "s3cret"),
            (ENV_CUSTOMER_ID, "C0abc"),
        ]))
        .expect("settings");

        assert_eq!(settings.admin_email, "root@corp.test");
        assert_eq!(settings.domain, "corp.test");
        assert_eq!(settings.credentials_path, PathBuf::from("/etc/roster/key.json"));
        assert_eq!(settings.target_url, "https://coder.corp.test");
        assert_eq!(settings.session_token.expose_secret(), "s3cret");
        assert_eq!(settings.customer_id, "C0abc");
        assert_eq!(settings.directory_url, DEFAULT_DIRECTORY_URL);
    }

    #[test]
    fn fallbacks_apply_when_unset() {
        let settings =
            Settings::from_lookup(lookup_from(&[(ENV_CREDENTIALS_FILE, "/tmp/key.json")]))
                .expect("settings");
        assert_eq!(settings.domain, DEFAULT_DOMAIN);
        assert_eq!(settings.target_url, DEFAULT_TARGET_URL);
        assert_eq!(settings.customer_id, DEFAULT_CUSTOMER_ID);
        assert!(settings.session_token.expose_secret().is_empty());
    }

    #[test]
    fn rejects_non_http_target_url() {
        let err = Settings::from_lookup(lookup_from(&[
            (ENV_CREDENTIALS_FILE, "/tmp/key.json"),
            (ENV_TARGET_URL, "coder.internal"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { variable: ENV_TARGET_URL, .. }));
    }

    #[test]
    fn debug_output_redacts_session_token() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_CREDENTIALS_FILE, "/tmp/key.json"),
            (ENV_SESSION_TOKEN, "very-secret-token"),
        ]))
        .expect("settings");
        assert!(!format!("{settings:?}").contains("very-secret-token"));
    }
}
