//! Contracts the reconciliation engine needs from the two remote systems.
//!
//! Implementations block until the remote call returns and hide pagination:
//! every `list_*` method returns the complete result set.

use crate::error::{DirectoryError, TargetError};
use crate::types::{
    GroupId, Identity, MembershipPatch, NewGroup, Organization, OrganizationId, SourceGroup,
    SourceUser, TargetGroup,
};

/// Read-only access to the source-of-truth directory.
pub trait DirectoryAdapter {
    /// Every group the user identified by `email` belongs to.
    fn list_groups_for_user(&self, email: &str) -> Result<Vec<SourceGroup>, DirectoryError>;

    /// Every user of the directory customer `customer_id`.
    fn list_all_users(&self, customer_id: &str) -> Result<Vec<SourceUser>, DirectoryError>;
}

/// Read/write access to the target access-control system.
pub trait TargetAdapter {
    /// The user the adapter is authenticated as.
    fn current_user(&self) -> Result<Identity, TargetError>;

    fn list_organizations(&self) -> Result<Vec<Organization>, TargetError>;

    /// All groups inside `org`.
    fn list_groups(&self, org: OrganizationId) -> Result<Vec<TargetGroup>, TargetError>;

    /// All users of the deployment.
    fn list_users(&self) -> Result<Vec<Identity>, TargetError>;

    /// Groups inside `org` that currently have `username` as a member.
    fn list_groups_for_user(
        &self,
        org: OrganizationId,
        username: &str,
    ) -> Result<Vec<TargetGroup>, TargetError>;

    fn create_group(&self, org: OrganizationId, group: &NewGroup)
        -> Result<TargetGroup, TargetError>;

    /// Add and remove members of `group` in one request.
    fn patch_group_membership(
        &self,
        group: GroupId,
        patch: &MembershipPatch,
    ) -> Result<TargetGroup, TargetError>;
}

impl<A: DirectoryAdapter + ?Sized> DirectoryAdapter for &A {
    fn list_groups_for_user(&self, email: &str) -> Result<Vec<SourceGroup>, DirectoryError> {
        (**self).list_groups_for_user(email)
    }

    fn list_all_users(&self, customer_id: &str) -> Result<Vec<SourceUser>, DirectoryError> {
        (**self).list_all_users(customer_id)
    }
}

impl<A: TargetAdapter + ?Sized> TargetAdapter for &A {
    fn current_user(&self) -> Result<Identity, TargetError> {
        (**self).current_user()
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, TargetError> {
        (**self).list_organizations()
    }

    fn list_groups(&self, org: OrganizationId) -> Result<Vec<TargetGroup>, TargetError> {
        (**self).list_groups(org)
    }

    fn list_users(&self) -> Result<Vec<Identity>, TargetError> {
        (**self).list_users()
    }

    fn list_groups_for_user(
        &self,
        org: OrganizationId,
        username: &str,
    ) -> Result<Vec<TargetGroup>, TargetError> {
        (**self).list_groups_for_user(org, username)
    }

    fn create_group(
        &self,
        org: OrganizationId,
        group: &NewGroup,
    ) -> Result<TargetGroup, TargetError> {
        (**self).create_group(org, group)
    }

    fn patch_group_membership(
        &self,
        group: GroupId,
        patch: &MembershipPatch,
    ) -> Result<TargetGroup, TargetError> {
        (**self).patch_group_membership(group, patch)
    }
}
