//! # roster-target
//!
//! Target-system adapter: a blocking client for the deployment's `/api/v2`
//! REST API, authenticated with an owner session token.

pub mod client;

pub use client::{CoderClient, SESSION_TOKEN_HEADER};
