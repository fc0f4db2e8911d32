//! Error types for roster-sync.

use thiserror::Error;

use roster_core::{DirectoryError, GroupName, TargetError};

/// Fatal errors that abort a reconciliation run.
///
/// A failed group creation is not one of them: it only drops that group's
/// pending changes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No organization is marked as the default.
    #[error("default organization not found")]
    NoDefaultScope,

    /// Loading the target-system snapshot failed.
    #[error("failed to get target {what}: {source}")]
    LoadTarget {
        what: &'static str,
        #[source]
        source: TargetError,
    },

    /// The directory could not list a user's groups.
    #[error("failed to get directory groups for {email}: {source}")]
    SourceGroups {
        email: String,
        #[source]
        source: DirectoryError,
    },

    /// The target could not list a user's current groups.
    #[error("failed to get target groups for user {username}: {source}")]
    TargetGroups {
        username: String,
        #[source]
        source: TargetError,
    },

    /// A group in the change set exists neither in the snapshot nor among
    /// the groups created this run.
    #[error("group {group} not found, unable to apply group sync")]
    UnresolvedGroup { group: GroupName },

    /// Applying a membership patch failed.
    #[error("failed to patch group {group}: {source}")]
    PatchGroup {
        group: GroupName,
        #[source]
        source: TargetError,
    },
}
