//! Source group name → canonical target group name.

use crate::types::GroupName;

/// Canonical form of a directory group name: lowercased, every U+0020 space
/// removed.
///
/// Returns `None` for names that are empty before or after normalization;
/// such groups cannot be matched and are left out of the expected set.
/// Distinct source names that normalize to the same value intentionally map
/// to the same target group.
pub fn canonical_group_name(raw: &str) -> Option<GroupName> {
    if raw.is_empty() {
        return None;
    }
    let normalized: String = raw.to_lowercase().chars().filter(|c| *c != ' ').collect();
    if normalized.is_empty() {
        return None;
    }
    Some(GroupName(normalized))
}
