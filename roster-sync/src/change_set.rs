//! Accumulated membership changes for one run, keyed by group.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use roster_core::{GroupName, MembershipPatch, UserId};

use crate::diff::MembershipDiff;

/// Users to add to and remove from one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    pub add: BTreeSet<UserId>,
    pub remove: BTreeSet<UserId>,
}

impl MembershipDelta {
    pub fn to_patch(&self) -> MembershipPatch {
        MembershipPatch {
            add_users: self.add.iter().copied().collect(),
            remove_users: self.remove.iter().copied().collect(),
        }
    }
}

/// Per-group deltas merged across every user of a run.
///
/// Entries iterate in group-name order, which fixes the order groups are
/// created and patched in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: BTreeMap<GroupName, MembershipDelta>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, group: GroupName, user: UserId) {
        let delta = self.entries.entry(group).or_default();
        debug_assert!(!delta.remove.contains(&user), "user both added and removed");
        delta.add.insert(user);
    }

    pub fn remove_user(&mut self, group: GroupName, user: UserId) {
        let delta = self.entries.entry(group).or_default();
        debug_assert!(!delta.add.contains(&user), "user both added and removed");
        delta.remove.insert(user);
    }

    /// Merge one user's diff.
    pub fn record(&mut self, user: UserId, diff: MembershipDiff) {
        for group in diff.to_add {
            self.add_user(group, user);
        }
        for group in diff.to_remove {
            self.remove_user(group, user);
        }
    }

    /// Remove a group's pending changes, returning them.
    pub fn drop_group(&mut self, group: &GroupName) -> Option<MembershipDelta> {
        self.entries.remove(group)
    }

    pub fn get(&self, group: &GroupName) -> Option<&MembershipDelta> {
        self.entries.get(group)
    }

    pub fn contains(&self, group: &GroupName) -> bool {
        self.entries.contains_key(group)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of groups with pending changes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, GroupName, MembershipDelta> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a GroupName, &'a MembershipDelta);
    type IntoIter = btree_map::Iter<'a, GroupName, MembershipDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use roster_testkit::uuid;

    use super::*;

    fn user(n: u128) -> UserId {
        UserId(uuid(n))
    }

    fn diff(add: &[&str], remove: &[&str]) -> MembershipDiff {
        MembershipDiff {
            to_add: add.iter().map(|s| GroupName::from(*s)).collect(),
            to_remove: remove.iter().map(|s| GroupName::from(*s)).collect(),
        }
    }

    #[test]
    fn merges_diffs_of_many_users_per_group() {
        let mut changes = ChangeSet::new();
        changes.record(user(1), diff(&["ops"], &["catlovers"]));
        changes.record(user(2), diff(&["ops", "sre"], &[]));

        let ops = changes.get(&GroupName::from("ops")).expect("ops");
        assert_eq!(ops.add, BTreeSet::from([user(1), user(2)]));
        assert!(ops.remove.is_empty());
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn merge_order_does_not_matter() {
        let mut forward = ChangeSet::new();
        forward.record(user(1), diff(&["a"], &["b"]));
        forward.record(user(2), diff(&["b"], &["a"]));

        let mut backward = ChangeSet::new();
        backward.record(user(2), diff(&["b"], &["a"]));
        backward.record(user(1), diff(&["a"], &["b"]));

        assert_eq!(forward, backward);
    }

    #[test]
    fn duplicate_records_collapse() {
        let mut changes = ChangeSet::new();
        changes.add_user(GroupName::from("ops"), user(1));
        changes.add_user(GroupName::from("ops"), user(1));
        assert_eq!(changes.get(&GroupName::from("ops")).expect("ops").add.len(), 1);
    }

    #[test]
    fn dropping_a_group_discards_its_changes() {
        let mut changes = ChangeSet::new();
        changes.record(user(1), diff(&["x", "y"], &[]));
        let dropped = changes.drop_group(&GroupName::from("x")).expect("x present");
        assert_eq!(dropped.add, BTreeSet::from([user(1)]));
        assert!(!changes.contains(&GroupName::from("x")));
        assert!(changes.contains(&GroupName::from("y")));
    }

    #[test]
    fn patch_lists_are_sorted() {
        let mut changes = ChangeSet::new();
        changes.add_user(GroupName::from("ops"), user(3));
        changes.add_user(GroupName::from("ops"), user(1));
        changes.remove_user(GroupName::from("ops"), user(2));
        let patch = changes.get(&GroupName::from("ops")).expect("ops").to_patch();
        assert_eq!(patch.add_users, vec![user(1), user(3)]);
        assert_eq!(patch.remove_users, vec![user(2)]);
    }
}
