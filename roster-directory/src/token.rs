//! Access tokens for the directory API.
//!
//! [`ServiceAccountTokens`] implements the OAuth2 JWT bearer grant with
//! domain-wide delegation: an RS256 assertion signed with the service-account
//! key, whose `sub` is the admin being impersonated, is exchanged for a
//! short-lived access token. Tokens are cached until shortly before expiry.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use roster_core::DirectoryError;

use crate::credentials::ServiceAccountKey;
use crate::http::ureq_error;

/// Read-only scopes for directory groups and users.
pub const DIRECTORY_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/admin.directory.group.readonly",
    "https://www.googleapis.com/auth/admin.directory.user.readonly",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_GRACE_SECS: i64 = 60;

/// Something that can hand out a bearer token for directory requests.
pub trait TokenSource {
    fn access_token(&self) -> Result<SecretString, DirectoryError>;
}

/// A fixed token, for tests and for tokens minted outside the process.
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<SecretString, DirectoryError> {
        Ok(SecretString::from(self.0.expose_secret().to_string()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_GRACE_SECS) < self.expires_at
    }
}

/// Delegated service-account token source.
pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    subject: String,
    agent: ureq::Agent,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    /// Prepare a token source that impersonates `subject`.
    ///
    /// Fails if the key's private key is not a PEM-encoded RSA key.
    pub fn new(
        key: ServiceAccountKey,
        subject: impl Into<String>,
        agent: ureq::Agent,
    ) -> Result<Self, DirectoryError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| DirectoryError::CredentialsFormat(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            signing_key,
            subject: subject.into(),
            agent,
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, DirectoryError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.subject,
            scope: DIRECTORY_SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        encode(&header, &claims, &self.signing_key)
            .map_err(|e| DirectoryError::Auth(format!("failed to sign assertion: {e}")))
    }

    fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, DirectoryError> {
        let assertion = self.assertion(now)?;
        debug!(subject = %self.subject, token_uri = %self.key.token_uri, "requesting directory access token");

        let response: TokenResponse = self
            .agent
            .post(&self.key.token_uri)
            .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .map_err(|e| match ureq_error(e) {
                DirectoryError::Http { status, message } => {
                    DirectoryError::Auth(format!("token exchange rejected (HTTP {status}): {message}"))
                }
                other => other,
            })?
            .into_json()
            .map_err(|e| DirectoryError::Decode(format!("token response: {e}")))?;

        Ok(CachedToken {
            value: SecretString::from(response.access_token),
            expires_at: now + Duration::seconds(response.expires_in),
        })
    }
}

impl TokenSource for ServiceAccountTokens {
    fn access_token(&self) -> Result<SecretString, DirectoryError> {
        let now = Utc::now();
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now) {
                return Ok(SecretString::from(token.value.expose_secret().to_string()));
            }
        }
        let fresh = self.exchange(now)?;
        let value = SecretString::from(fresh.value.expose_secret().to_string());
        *cached = Some(fresh);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_token_expires_inside_grace_window() {
        let now = Utc::now();
        let token = CachedToken {
            value: SecretString::from("t".to_string()),
            expires_at: now + Duration::seconds(30),
        };
        assert!(!token.is_fresh(now));

        let token = CachedToken {
            value: SecretString::from("t".to_string()),
            expires_at: now + Duration::seconds(600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn rejects_non_rsa_private_key() {
        let key = ServiceAccountKey::from_json(
            br#"{"client_email":"a@b","private_key":"not a pem"}"#,
        )
        .expect("parse");
        let err = ServiceAccountTokens::new(key, "admin@example.com", ureq::agent())
            .err()
            .expect("invalid key must fail");
        assert!(matches!(err, DirectoryError::CredentialsFormat(_)));
    }

    #[test]
    fn static_token_is_returned_verbatim() {
        let token = StaticToken::new("abc").access_token().expect("token");
        assert_eq!(token.expose_secret(), "abc");
    }
}
