//! Error types for roster-core and the adapter contracts.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`crate::DirectoryAdapter`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The service-account credential file could not be read.
    #[error("failed to read credentials from {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credential file was read but is not a usable service-account key.
    #[error("invalid service-account credentials: {0}")]
    CredentialsFormat(String),

    /// Token signing or token exchange failed.
    #[error("directory authentication failed: {0}")]
    Auth(String),

    /// The directory API answered with a non-success status.
    #[error("directory request failed (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("directory transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode directory response: {0}")]
    Decode(String),
}

/// Errors raised by a [`crate::TargetAdapter`].
#[derive(Debug, Error)]
pub enum TargetError {
    /// The target API answered with a non-success status.
    #[error("target request failed (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("target transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode target response: {0}")]
    Decode(String),
}

/// Errors raised while assembling [`crate::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `dirs::home_dir()` returned `None` and no credential path was given.
    #[error("cannot determine home directory; set $HOME or ROSTER_CREDENTIALS_FILE")]
    HomeNotFound,

    /// A configured base URL is not an absolute http(s) URL.
    #[error("{variable} must be an http(s) URL, got {value:?}")]
    InvalidUrl { variable: &'static str, value: String },
}
