//! Domain types shared by the adapters and the reconciliation engine.
//!
//! Identifiers are UUID newtypes so a group id can never be passed where a
//! user id is expected. Target-side structs deserialize straight from the
//! target API's snake_case JSON; directory-side structs use camelCase.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a target-system user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Opaque identifier of a target-system group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for GroupId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Opaque identifier of a target-system organization (the sync scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub Uuid);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for OrganizationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Name of a target group, used as the matching key between both systems.
///
/// Values built by [`crate::normalize::canonical_group_name`] are lowercase
/// and space-free; names read back from the target are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(pub String);

impl GroupName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GroupName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a target-system user authenticates.
///
/// Only [`LoginType::Oidc`] users are backed by the directory and therefore
/// eligible for group sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    Oidc,
    Password,
    Github,
    Token,
    None,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for LoginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginType::Oidc => write!(f, "oidc"),
            LoginType::Password => write!(f, "password"),
            LoginType::Github => write!(f, "github"),
            LoginType::Token => write!(f, "token"),
            LoginType::None => write!(f, "none"),
            LoginType::Unknown => write!(f, "unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Target-side entities
// ---------------------------------------------------------------------------

/// A user in the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login_type: LoginType,
}

/// An organization in the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A group in the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub id: GroupId,
    pub name: GroupName,
    #[serde(default)]
    pub display_name: String,
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub quota_allowance: i64,
}

impl TargetGroup {
    /// True for the organization's implicit all-members group, whose id is
    /// the organization id itself.
    pub fn is_everyone_group(&self, org: OrganizationId) -> bool {
        self.id.0 == org.0
    }
}

/// Attributes for a group the engine is about to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGroup {
    pub name: GroupName,
    pub display_name: String,
    pub avatar_url: String,
    pub quota_allowance: i64,
}

/// Marker icon for groups created by a sync run.
pub const CREATED_GROUP_AVATAR: &str = "/emojis/1f195.png";

impl NewGroup {
    /// Default attributes for a group created by a sync run: no display name,
    /// the "NEW" marker icon and zero quota.
    pub fn synced(name: GroupName) -> Self {
        Self {
            name,
            display_name: String::new(),
            avatar_url: CREATED_GROUP_AVATAR.to_string(),
            quota_allowance: 0,
        }
    }
}

/// One membership mutation for a single group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MembershipPatch {
    pub add_users: Vec<UserId>,
    pub remove_users: Vec<UserId>,
}

// ---------------------------------------------------------------------------
// Directory-side entities
// ---------------------------------------------------------------------------

/// A group in the source-of-truth directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    /// Free-text display name; may be empty.
    #[serde(default)]
    pub name: String,
}

/// A user in the source-of-truth directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceUser {
    pub id: String,
    pub primary_email: String,
    pub full_name: String,
    pub suspended: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
