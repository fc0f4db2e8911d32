//! Roster core library: domain types, adapter contracts, errors.
//!
//! - [`types`]: identifier newtypes and the entities of both systems
//! - [`adapter`]: [`DirectoryAdapter`] and [`TargetAdapter`]
//! - [`normalize`]: source group name → canonical target group name
//! - [`paging`]: continuation-cursor pagination
//! - [`http`]: the blocking agent both adapters send requests through
//! - [`config`]: environment-sourced [`Settings`]
//! - [`error`]: [`DirectoryError`], [`TargetError`], [`ConfigError`]

pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod paging;
pub mod types;

pub use adapter::{DirectoryAdapter, TargetAdapter};
pub use config::Settings;
pub use error::{ConfigError, DirectoryError, TargetError};
pub use normalize::canonical_group_name;
pub use types::{
    GroupId, GroupName, Identity, LoginType, MembershipPatch, NewGroup, Organization,
    OrganizationId, SourceGroup, SourceUser, TargetGroup, UserId, CREATED_GROUP_AVATAR,
};
