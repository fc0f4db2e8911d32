//! Human-readable summary of a reconciliation run.

use std::collections::BTreeMap;
use std::fmt;

use roster_core::{GroupName, Identity, TargetGroup, UserId};

use crate::change_set::ChangeSet;

/// Resolves user ids to display labels: email, then username, then the id.
#[derive(Debug, Default)]
pub struct IdentityIndex {
    labels: BTreeMap<UserId, String>,
}

impl IdentityIndex {
    pub fn new(identities: &[Identity]) -> Self {
        let labels = identities
            .iter()
            .filter_map(|identity| {
                let label = if !identity.email.is_empty() {
                    identity.email.clone()
                } else if !identity.username.is_empty() {
                    identity.username.clone()
                } else {
                    return None;
                };
                Some((identity.id, label))
            })
            .collect();
        Self { labels }
    }

    pub fn label(&self, id: UserId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every eligible user already matched the directory.
    NoChanges,
    /// Dry run: changes were computed but not applied.
    Planned,
    /// Groups were created and patches applied.
    Applied,
}

/// Resolved membership changes for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChange {
    pub group: GroupName,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    pub outcome: Outcome,
    pub eligible_users: usize,
    /// Groups created this run (empty for dry runs).
    pub created_groups: Vec<TargetGroup>,
    /// Groups a dry run would have created.
    pub pending_groups: Vec<GroupName>,
    /// Groups whose creation failed; their changes were dropped.
    pub failed_groups: Vec<GroupName>,
    pub group_changes: Vec<GroupChange>,
}

impl ChangeReport {
    pub fn no_changes(eligible_users: usize) -> Self {
        Self {
            outcome: Outcome::NoChanges,
            eligible_users,
            created_groups: Vec::new(),
            pending_groups: Vec::new(),
            failed_groups: Vec::new(),
            group_changes: Vec::new(),
        }
    }

    pub fn planned(
        eligible_users: usize,
        pending_groups: Vec<GroupName>,
        changes: &ChangeSet,
        index: &IdentityIndex,
    ) -> Self {
        Self {
            outcome: Outcome::Planned,
            pending_groups,
            group_changes: resolve(changes, index),
            ..Self::no_changes(eligible_users)
        }
    }

    pub fn applied(
        eligible_users: usize,
        created_groups: Vec<TargetGroup>,
        failed_groups: Vec<GroupName>,
        changes: &ChangeSet,
        index: &IdentityIndex,
    ) -> Self {
        Self {
            outcome: Outcome::Applied,
            created_groups,
            failed_groups,
            group_changes: resolve(changes, index),
            ..Self::no_changes(eligible_users)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outcome == Outcome::NoChanges
    }

    /// Report lines, in output order.
    pub fn render(&self) -> Vec<String> {
        if self.outcome == Outcome::NoChanges {
            return vec![format!(
                "No changes, {} eligible users already correct",
                self.eligible_users
            )];
        }

        let mut lines = Vec::new();
        if self.outcome == Outcome::Planned {
            lines.push("[dry-run] nothing was changed".to_string());
            for name in &self.pending_groups {
                lines.push(format!("Would create group: {name}"));
            }
        }
        for group in &self.created_groups {
            lines.push(format!("Created group: {} :: {}", group.name, group.id));
        }
        for name in &self.failed_groups {
            lines.push(format!("Skipped group: {name} (creation failed)"));
        }
        for change in &self.group_changes {
            lines.push(format!(
                "Group {}: {} added, {} removed",
                change.group,
                change.added.len(),
                change.removed.len()
            ));
            lines.push(format!("  Added: {}", label_list(&change.added)));
            lines.push(format!("  Removed: {}", label_list(&change.removed)));
        }
        lines
    }

    /// Write every report line to the log.
    pub fn emit(&self) {
        for line in self.render() {
            tracing::info!("{line}");
        }
    }
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn resolve(changes: &ChangeSet, index: &IdentityIndex) -> Vec<GroupChange> {
    changes
        .iter()
        .map(|(group, delta)| GroupChange {
            group: group.clone(),
            added: delta.add.iter().map(|id| index.label(*id)).collect(),
            removed: delta.remove.iter().map(|id| index.label(*id)).collect(),
        })
        .collect()
}

fn label_list(labels: &[String]) -> String {
    if labels.is_empty() {
        "(none)".to_string()
    } else {
        format!("[{}]", labels.join(", "))
    }
}
