//! In-memory adapters for roster tests.
//!
//! [`MemoryTarget`] behaves like the target system closely enough for the
//! reconciliation engine: the default organization's "Everyone" group shares
//! the organization id and contains every user, created groups become
//! visible to later listings, and membership patches mutate state so a second
//! run observes the first run's effects. Individual operations can be made
//! to fail to exercise error paths.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use roster_core::{
    DirectoryAdapter, DirectoryError, GroupId, GroupName, Identity, LoginType, MembershipPatch,
    NewGroup, Organization, OrganizationId, SourceGroup, SourceUser, TargetAdapter, TargetError,
    TargetGroup, UserId,
};

/// Deterministic id for fixtures: `Uuid::from_u128(n)`.
pub fn uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// An identity that signs in through the directory (OIDC).
pub fn oidc_user(n: u128, username: &str, email: &str) -> Identity {
    Identity {
        id: UserId(uuid(n)),
        username: username.to_string(),
        email: email.to_string(),
        login_type: LoginType::Oidc,
    }
}

/// A directory group with the given display name.
pub fn source_group(name: &str) -> SourceGroup {
    let slug: String = name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    SourceGroup {
        id: format!("grp-{slug}"),
        email: format!("{slug}@groups.example.com"),
        name: name.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Directory with fixed memberships keyed by email.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    groups: BTreeMap<String, Vec<SourceGroup>>,
    users: Vec<SourceUser>,
    failing: BTreeSet<String>,
    lookups: RefCell<Vec<String>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the groups `email` belongs to.
    pub fn with_member(mut self, email: &str, groups: Vec<SourceGroup>) -> Self {
        self.groups.insert(email.to_string(), groups);
        self
    }

    pub fn with_user(mut self, user: SourceUser) -> Self {
        self.users.push(user);
        self
    }

    /// Make group lookups for `email` fail with a transport error.
    pub fn failing_for(mut self, email: &str) -> Self {
        self.failing.insert(email.to_string());
        self
    }

    /// Emails whose groups were requested, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl DirectoryAdapter for MemoryDirectory {
    fn list_groups_for_user(&self, email: &str) -> Result<Vec<SourceGroup>, DirectoryError> {
        self.lookups.borrow_mut().push(email.to_string());
        if self.failing.contains(email) {
            return Err(DirectoryError::Transport(format!("lookup of {email} failed")));
        }
        Ok(self.groups.get(email).cloned().unwrap_or_default())
    }

    fn list_all_users(&self, _customer_id: &str) -> Result<Vec<SourceUser>, DirectoryError> {
        Ok(self.users.clone())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TargetState {
    organizations: Vec<Organization>,
    groups: Vec<TargetGroup>,
    members: BTreeMap<GroupId, BTreeSet<UserId>>,
    users: Vec<Identity>,
}

/// Stateful stand-in for the target system.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    state: RefCell<TargetState>,
    next_id: Cell<u128>,
    fail_create: BTreeSet<GroupName>,
    fail_patch: BTreeSet<GroupName>,
    fail_member_lookup: BTreeSet<String>,
    unscoped_member_lookup: bool,
    created: RefCell<Vec<GroupName>>,
    patches: RefCell<Vec<(GroupName, MembershipPatch)>>,
}

/// Id of the default organization (and its Everyone group).
pub const DEFAULT_ORG: u128 = 0xd0;

/// Id of the non-default organization every deployment carries.
pub const SIDE_ORG: u128 = 0xe0;

impl MemoryTarget {
    /// A deployment with a default organization and its "Everyone" group.
    pub fn new() -> Self {
        let target = Self::without_default_org();
        let org = OrganizationId(uuid(DEFAULT_ORG));
        {
            let mut state = target.state.borrow_mut();
            state.organizations.push(Organization {
                id: org,
                name: "coder".to_string(),
                is_default: true,
            });
            state.groups.push(group(GroupId(org.0), "Everyone", org));
        }
        target
    }

    /// A deployment whose organizations are all non-default.
    pub fn without_default_org() -> Self {
        let target = Self::default();
        target.next_id.set(0x1000);
        target.state.borrow_mut().organizations.push(Organization {
            id: OrganizationId(uuid(SIDE_ORG)),
            name: "side".to_string(),
            is_default: false,
        });
        target
    }

    pub fn default_org(&self) -> OrganizationId {
        OrganizationId(uuid(DEFAULT_ORG))
    }

    /// Register a user; the target puts every user in the Everyone group.
    pub fn with_user(self, identity: Identity) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let everyone = GroupId(uuid(DEFAULT_ORG));
            state.members.entry(everyone).or_default().insert(identity.id);
            state.users.push(identity);
        }
        self
    }

    /// Create a group in the default organization.
    pub fn with_group(self, name: &str) -> Self {
        let id = self.allocate_id();
        let org = self.default_org();
        self.state
            .borrow_mut()
            .groups
            .push(group(GroupId(id), name, org));
        self
    }

    /// Create a group in the non-default organization.
    pub fn with_side_group(self, name: &str) -> Self {
        let id = self.allocate_id();
        self.state
            .borrow_mut()
            .groups
            .push(group(GroupId(id), name, OrganizationId(uuid(SIDE_ORG))));
        self
    }

    /// Put `user` into the existing group `name`.
    pub fn with_membership(self, name: &str, user: UserId) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = state
                .groups
                .iter()
                .find(|g| g.name.as_str() == name)
                .map(|g| g.id)
                .unwrap_or_else(|| panic!("group {name} not registered"));
            state.members.entry(id).or_default().insert(user);
        }
        self
    }

    pub fn failing_create(mut self, name: &str) -> Self {
        self.fail_create.insert(GroupName::from(name));
        self
    }

    pub fn failing_patch(mut self, name: &str) -> Self {
        self.fail_patch.insert(GroupName::from(name));
        self
    }

    pub fn failing_member_lookup(mut self, username: &str) -> Self {
        self.fail_member_lookup.insert(username.to_string());
        self
    }

    /// Make member-group lookups ignore the organization filter and return
    /// groups of every organization.
    pub fn unscoped_member_lookup(mut self) -> Self {
        self.unscoped_member_lookup = true;
        self
    }

    /// Names of groups created so far, in call order.
    pub fn created(&self) -> Vec<GroupName> {
        self.created.borrow().clone()
    }

    /// Patches applied so far, in call order.
    pub fn patches(&self) -> Vec<(GroupName, MembershipPatch)> {
        self.patches.borrow().clone()
    }

    /// Current member ids of group `name`, or `None` if it does not exist.
    pub fn members_of(&self, name: &str) -> Option<BTreeSet<UserId>> {
        let state = self.state.borrow();
        let group = state.groups.iter().find(|g| g.name.as_str() == name)?;
        Some(state.members.get(&group.id).cloned().unwrap_or_default())
    }

    /// Forget recorded calls while keeping state (for second-run assertions).
    pub fn reset_calls(&self) {
        self.created.borrow_mut().clear();
        self.patches.borrow_mut().clear();
    }

    fn allocate_id(&self) -> Uuid {
        let n = self.next_id.get();
        self.next_id.set(n + 1);
        uuid(n)
    }
}

fn group(id: GroupId, name: &str, org: OrganizationId) -> TargetGroup {
    TargetGroup {
        id,
        name: GroupName::from(name),
        display_name: String::new(),
        organization_id: org,
        avatar_url: String::new(),
        quota_allowance: 0,
    }
}

fn http(status: u16, message: impl Into<String>) -> TargetError {
    TargetError::Http {
        status,
        message: message.into(),
    }
}

impl TargetAdapter for MemoryTarget {
    fn current_user(&self) -> Result<Identity, TargetError> {
        self.state
            .borrow()
            .users
            .first()
            .cloned()
            .ok_or_else(|| http(401, "no session"))
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, TargetError> {
        Ok(self.state.borrow().organizations.clone())
    }

    fn list_groups(&self, org: OrganizationId) -> Result<Vec<TargetGroup>, TargetError> {
        Ok(self
            .state
            .borrow()
            .groups
            .iter()
            .filter(|g| g.organization_id == org)
            .cloned()
            .collect())
    }

    fn list_users(&self) -> Result<Vec<Identity>, TargetError> {
        Ok(self.state.borrow().users.clone())
    }

    fn list_groups_for_user(
        &self,
        org: OrganizationId,
        username: &str,
    ) -> Result<Vec<TargetGroup>, TargetError> {
        if self.fail_member_lookup.contains(username) {
            return Err(TargetError::Transport(format!("lookup of {username} failed")));
        }
        let state = self.state.borrow();
        let user = state
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| http(404, format!("user {username} not found")))?;
        Ok(state
            .groups
            .iter()
            .filter(|g| self.unscoped_member_lookup || g.organization_id == org)
            .filter(|g| {
                state
                    .members
                    .get(&g.id)
                    .is_some_and(|members| members.contains(&user.id))
            })
            .cloned()
            .collect())
    }

    fn create_group(
        &self,
        org: OrganizationId,
        new: &NewGroup,
    ) -> Result<TargetGroup, TargetError> {
        if self.fail_create.contains(&new.name) {
            return Err(http(500, format!("cannot create {}", new.name)));
        }
        if self.state.borrow().groups.iter().any(|g| g.name == new.name) {
            return Err(http(409, format!("group {} already exists", new.name)));
        }
        let mut created = group(GroupId(self.allocate_id()), new.name.as_str(), org);
        created.display_name = new.display_name.clone();
        created.avatar_url = new.avatar_url.clone();
        created.quota_allowance = new.quota_allowance;
        self.state.borrow_mut().groups.push(created.clone());
        self.created.borrow_mut().push(new.name.clone());
        Ok(created)
    }

    fn patch_group_membership(
        &self,
        id: GroupId,
        patch: &MembershipPatch,
    ) -> Result<TargetGroup, TargetError> {
        let mut state = self.state.borrow_mut();
        let group = state
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| http(404, format!("group {id} not found")))?;
        if self.fail_patch.contains(&group.name) {
            return Err(http(500, format!("cannot patch {}", group.name)));
        }
        let members = state.members.entry(id).or_default();
        members.extend(patch.add_users.iter().copied());
        for user in &patch.remove_users {
            members.remove(user);
        }
        self.patches
            .borrow_mut()
            .push((group.name.clone(), patch.clone()));
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_user_lands_in_everyone() {
        let target = MemoryTarget::new().with_user(oidc_user(1, "alice", "alice@example.com"));
        let groups = target.list_groups_for_user(target.default_org(), "alice").expect("groups");
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_everyone_group(target.default_org()));
    }

    #[test]
    fn member_lookup_is_bounded_to_the_organization() {
        let alice = oidc_user(1, "alice", "alice@example.com");
        let target = MemoryTarget::new()
            .with_user(alice.clone())
            .with_side_group("sideops")
            .with_membership("sideops", alice.id);

        let scoped = target
            .list_groups_for_user(target.default_org(), "alice")
            .expect("groups");
        assert_eq!(scoped.len(), 1);

        let side = target
            .list_groups_for_user(OrganizationId(uuid(SIDE_ORG)), "alice")
            .expect("groups");
        assert_eq!(side.len(), 1);
        assert_eq!(side[0].name.as_str(), "sideops");
    }

    #[test]
    fn patch_mutates_membership() {
        let alice = oidc_user(1, "alice", "alice@example.com");
        let target = MemoryTarget::new().with_user(alice.clone()).with_group("ops");
        let ops = target
            .list_groups(target.default_org())
            .expect("groups")
            .into_iter()
            .find(|g| g.name.as_str() == "ops")
            .expect("ops");
        target
            .patch_group_membership(
                ops.id,
                &MembershipPatch {
                    add_users: vec![alice.id],
                    remove_users: vec![],
                },
            )
            .expect("patch");
        assert_eq!(target.members_of("ops"), Some(BTreeSet::from([alice.id])));
    }
}
