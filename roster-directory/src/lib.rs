//! # roster-directory
//!
//! Source-of-truth directory adapter over the Admin Directory REST API.
//!
//! Construct a [`GoogleDirectory`] with [`GoogleDirectory::connect`] for
//! delegated service-account access, or with
//! [`GoogleDirectory::with_token_source`] and a [`StaticToken`] when the
//! bearer token is obtained elsewhere.

pub mod client;
pub mod credentials;
pub mod http;
pub mod token;

pub use client::GoogleDirectory;
pub use credentials::ServiceAccountKey;
pub use token::{ServiceAccountTokens, StaticToken, TokenSource, DIRECTORY_SCOPES};
