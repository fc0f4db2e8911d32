//! Service-account key file loading.

use std::fmt;
use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use roster_core::DirectoryError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account JSON key that the token exchange needs.
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    /// PEM-encoded RSA private key.
    pub private_key: SecretString,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct KeyFile {
    client_email: String,
    #[serde(default)]
    private_key_id: Option<String>,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read and parse the key file at `path`.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read(path).map_err(|source| DirectoryError::Credentials {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, DirectoryError> {
        let file: KeyFile = serde_json::from_slice(raw).map_err(|e| {
            DirectoryError::CredentialsFormat(format!("{e} (bytes={})", raw.len()))
        })?;
        Ok(Self {
            client_email: file.client_email,
            private_key_id: file.private_key_id,
            private_key: SecretString::from(file.private_key),
            token_uri: file.token_uri,
        })
    }
}
