//! # roster-sync
//!
//! Reconciliation engine: diffs each eligible target identity's group
//! membership against the directory, merges the results into a
//! [`ChangeSet`], creates missing groups and applies one patch per group.
//!
//! Call [`Reconciler::run`] with [`RunMode::Apply`] to mutate the target, or
//! [`RunMode::DryRun`] to only report what would change.

pub mod change_set;
pub mod diff;
pub mod engine;
pub mod error;
pub mod report;

pub use change_set::{ChangeSet, MembershipDelta};
pub use diff::{MembershipDiff, DEFAULT_EVERYONE_GROUP};
pub use engine::{is_eligible, Reconciler, RunMode, TargetSnapshot};
pub use error::SyncError;
pub use report::{ChangeReport, GroupChange, IdentityIndex, Outcome};
