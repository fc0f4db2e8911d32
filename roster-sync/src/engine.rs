//! One-shot reconciliation of directory groups into target groups.

use std::collections::{BTreeMap, BTreeSet};

use roster_core::{
    DirectoryAdapter, GroupName, Identity, LoginType, NewGroup, Organization, TargetAdapter,
    TargetGroup,
};

use crate::change_set::ChangeSet;
use crate::diff::{everyone_group_name, expected_groups, MembershipDiff};
use crate::error::SyncError;
use crate::report::{ChangeReport, IdentityIndex};

/// Whether a run mutates the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Apply,
    /// Compute the change set and report it without creating or patching.
    DryRun,
}

/// Target state read at the start of a run.
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub organization: Organization,
    pub groups: BTreeMap<GroupName, TargetGroup>,
    pub identities: Vec<Identity>,
}

/// Result of creating the groups a change set refers to.
#[derive(Debug, Default)]
pub struct Creation {
    pub created: Vec<TargetGroup>,
    pub failed: Vec<GroupName>,
}

/// Identities synced from the directory: OIDC logins under `domain`.
pub fn is_eligible(identity: &Identity, domain: &str) -> bool {
    identity.login_type == LoginType::Oidc
        && identity
            .email
            .strip_suffix(domain)
            .is_some_and(|local| local.ends_with('@'))
}

/// Drives a run against a directory and a target.
pub struct Reconciler<D, T> {
    directory: D,
    target: T,
    domain: String,
}

impl<D: DirectoryAdapter, T: TargetAdapter> Reconciler<D, T> {
    pub fn new(directory: D, target: T, domain: impl Into<String>) -> Self {
        Self {
            directory,
            target,
            domain: domain.into(),
        }
    }

    /// Run once: load the target, diff every eligible identity, then create
    /// and patch groups (or only report them in [`RunMode::DryRun`]).
    ///
    /// The report is also written to the log.
    pub fn run(&self, mode: RunMode) -> Result<ChangeReport, SyncError> {
        let mut snapshot = self.load_target_state()?;
        let (mut changes, eligible) = self.plan(&snapshot)?;

        let report = if changes.is_empty() {
            ChangeReport::no_changes(eligible)
        } else {
            self.execute(mode, eligible, &mut snapshot, &mut changes)?
        };
        report.emit();
        Ok(report)
    }

    fn execute(
        &self,
        mode: RunMode,
        eligible: usize,
        snapshot: &mut TargetSnapshot,
        changes: &mut ChangeSet,
    ) -> Result<ChangeReport, SyncError> {
        let index = IdentityIndex::new(&snapshot.identities);
        match mode {
            RunMode::DryRun => {
                let pending: Vec<GroupName> = changes
                    .groups()
                    .filter(|name| !snapshot.groups.contains_key(*name))
                    .cloned()
                    .collect();
                Ok(ChangeReport::planned(eligible, pending, changes, &index))
            }
            RunMode::Apply => {
                let creation = create_missing_groups(&self.target, snapshot, changes);
                let patched = apply_changes(&self.target, &snapshot.groups, changes)?;
                tracing::debug!(
                    created = creation.created.len(),
                    failed = creation.failed.len(),
                    patched,
                    "group sync applied"
                );
                Ok(ChangeReport::applied(
                    eligible,
                    creation.created,
                    creation.failed,
                    changes,
                    &index,
                ))
            }
        }
    }

    /// Fetch the default organization, its groups and all identities.
    pub fn load_target_state(&self) -> Result<TargetSnapshot, SyncError> {
        let organization = self
            .target
            .list_organizations()
            .map_err(|source| SyncError::LoadTarget {
                what: "organizations",
                source,
            })?
            .into_iter()
            .find(|org| org.is_default)
            .ok_or(SyncError::NoDefaultScope)?;

        let groups: BTreeMap<GroupName, TargetGroup> = self
            .target
            .list_groups(organization.id)
            .map_err(|source| SyncError::LoadTarget {
                what: "groups",
                source,
            })?
            .into_iter()
            .map(|group| (group.name.clone(), group))
            .collect();

        let identities = self
            .target
            .list_users()
            .map_err(|source| SyncError::LoadTarget {
                what: "users",
                source,
            })?;

        tracing::debug!(
            organization = %organization.name,
            groups = groups.len(),
            users = identities.len(),
            "loaded target state"
        );
        Ok(TargetSnapshot {
            organization,
            groups,
            identities,
        })
    }

    /// Diff every eligible identity, returning the merged changes and the
    /// number of identities considered.
    fn plan(&self, snapshot: &TargetSnapshot) -> Result<(ChangeSet, usize), SyncError> {
        snapshot
            .identities
            .iter()
            .filter(|identity| {
                let eligible = is_eligible(identity, &self.domain);
                if !eligible {
                    tracing::debug!("skipping {}: not a directory user", identity.username);
                }
                eligible
            })
            .try_fold((ChangeSet::new(), 0), |(mut changes, eligible), identity| {
                let diff = self.diff_user(identity, snapshot)?;
                changes.record(identity.id, diff);
                Ok((changes, eligible + 1))
            })
    }

    fn diff_user(
        &self,
        identity: &Identity,
        snapshot: &TargetSnapshot,
    ) -> Result<MembershipDiff, SyncError> {
        let source = self
            .directory
            .list_groups_for_user(&identity.email)
            .map_err(|source| SyncError::SourceGroups {
                email: identity.email.clone(),
                source,
            })?;
        let current = self
            .target
            .list_groups_for_user(snapshot.organization.id, &identity.username)
            .map_err(|source| SyncError::TargetGroups {
                username: identity.username.clone(),
                source,
            })?;

        let current: Vec<TargetGroup> = current
            .into_iter()
            .filter(|group| group.organization_id == snapshot.organization.id)
            .collect();

        let everyone = everyone_group_name(&current, snapshot.organization.id);
        let expected = expected_groups(&source, everyone);
        let actual: BTreeSet<GroupName> = current.into_iter().map(|group| group.name).collect();
        let diff = MembershipDiff::between(&actual, &expected);
        if !diff.is_empty() {
            tracing::debug!(
                "{}: +{} -{} groups",
                identity.email,
                diff.to_add.len(),
                diff.to_remove.len()
            );
        }
        Ok(diff)
    }
}

/// Create every change-set group missing from the snapshot.
///
/// A failed creation drops that group's changes and the run continues.
/// Created groups are added to the snapshot.
pub(crate) fn create_missing_groups<T: TargetAdapter>(
    target: &T,
    snapshot: &mut TargetSnapshot,
    changes: &mut ChangeSet,
) -> Creation {
    let missing: Vec<GroupName> = changes
        .groups()
        .filter(|name| !snapshot.groups.contains_key(*name))
        .cloned()
        .collect();

    let mut creation = Creation::default();
    for name in missing {
        match target.create_group(snapshot.organization.id, &NewGroup::synced(name.clone())) {
            Ok(group) => {
                tracing::debug!("created group {} :: {}", group.name, group.id);
                snapshot.groups.insert(name, group.clone());
                creation.created.push(group);
            }
            Err(e) => {
                tracing::warn!("failed to create group {name}, skipping its changes: {e}");
                changes.drop_group(&name);
                creation.failed.push(name);
            }
        }
    }
    creation
}

/// Issue one membership patch per change-set group, in name order.
/// Returns the number of patches applied.
pub(crate) fn apply_changes<T: TargetAdapter>(
    target: &T,
    groups: &BTreeMap<GroupName, TargetGroup>,
    changes: &ChangeSet,
) -> Result<usize, SyncError> {
    let mut patched = 0;
    for (name, delta) in changes {
        let group = groups
            .get(name)
            .ok_or_else(|| SyncError::UnresolvedGroup {
                group: name.clone(),
            })?;
        target
            .patch_group_membership(group.id, &delta.to_patch())
            .map_err(|source| SyncError::PatchGroup {
                group: name.clone(),
                source,
            })?;
        tracing::debug!(
            "patched group {name}: {} added, {} removed",
            delta.add.len(),
            delta.remove.len()
        );
        patched += 1;
    }
    Ok(patched)
}
