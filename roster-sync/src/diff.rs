//! Per-user desired-vs-actual membership diff.

use std::collections::BTreeSet;

use tracing::warn;

use roster_core::{canonical_group_name, GroupName, OrganizationId, SourceGroup, TargetGroup};

/// Name assumed for the organization-wide group when the user's current
/// groups do not reveal it.
pub const DEFAULT_EVERYONE_GROUP: &str = "Everyone";

/// Groups one user must join and leave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: BTreeSet<GroupName>,
    pub to_remove: BTreeSet<GroupName>,
}

impl MembershipDiff {
    /// `to_add = expected − actual`, `to_remove = actual − expected`.
    pub fn between(actual: &BTreeSet<GroupName>, expected: &BTreeSet<GroupName>) -> Self {
        Self {
            to_add: expected.difference(actual).cloned().collect(),
            to_remove: actual.difference(expected).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Target group names a user should hold, given their directory groups.
///
/// `everyone` is always included, so it is never removed.
pub fn expected_groups(source: &[SourceGroup], everyone: GroupName) -> BTreeSet<GroupName> {
    let mut expected: BTreeSet<GroupName> = source
        .iter()
        .filter_map(|group| {
            let name = canonical_group_name(&group.name);
            if name.is_none() {
                warn!(email = %group.email, "directory group has no usable name, skipping");
            }
            name
        })
        .collect();
    expected.insert(everyone);
    expected
}

/// Name of the organization-wide group among `current`, falling back to
/// [`DEFAULT_EVERYONE_GROUP`].
pub fn everyone_group_name(current: &[TargetGroup], org: OrganizationId) -> GroupName {
    current
        .iter()
        .find(|group| group.is_everyone_group(org))
        .map(|group| group.name.clone())
        .unwrap_or_else(|| GroupName::from(DEFAULT_EVERYONE_GROUP))
}
