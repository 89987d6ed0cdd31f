//! Process-wide behavior toggles.

#![cfg_attr(not(windows), allow(dead_code))]

use core::sync::atomic::{AtomicBool, Ordering};

use crate::sid_type::SidType;

static ENUMERATE_MEMBERS: AtomicBool = AtomicBool::new(true);

/// Controls whether group lookups enumerate direct members.
///
/// Enumeration hits the directory service and can be slow on large
/// domain groups; disabling it makes group lookups return records with
/// an empty member list.
pub fn set_enumerate_members(enabled: bool) {
    ENUMERATE_MEMBERS.store(enabled, Ordering::Relaxed);
}

/// Whether group lookups currently enumerate members. Defaults to `true`.
#[must_use]
pub fn enumerate_members() -> bool {
    ENUMERATE_MEMBERS.load(Ordering::Relaxed)
}

/// Whether a lookup of a principal of kind `sid_type` should enumerate
/// members under the given flag value.
#[must_use]
pub(crate) fn should_enumerate(enabled: bool, sid_type: SidType) -> bool {
    enabled && sid_type.has_members()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_requires_flag_and_member_bearing_kind() {
        assert!(should_enumerate(true, SidType::Group));
        assert!(should_enumerate(true, SidType::Alias));
        assert!(!should_enumerate(true, SidType::WellKnownGroup));
        assert!(!should_enumerate(true, SidType::Label));
        assert!(!should_enumerate(false, SidType::Group));
    }
}
