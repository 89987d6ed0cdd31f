use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The kind of principal a SID names, as reported by account lookup
/// (`SID_NAME_USE` in the Windows headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SidType {
    /// A SID for a user account.
    User = 1,

    /// A SID for a group account.
    Group = 2,

    /// A SID that identifies a domain.
    Domain = 3,

    /// A SID for an alias (local group).
    Alias = 4,

    /// A well-known group SID (e.g., Everyone).
    WellKnownGroup = 5,

    /// A SID for an account that has been deleted.
    DeletedAccount = 6,

    /// An invalid SID (not a valid account/domain SID).
    Invalid = 7,

    /// A SID of unknown type (could not be determined).
    Unknown = 8,

    /// A SID that identifies a computer (machine account).
    Computer = 9,

    /// A mandatory integrity label SID.
    Label = 10,

    /// A logon session SID.
    LogonSession = 11,
}

impl SidType {
    /// Whether this kind is acceptable where a user principal is expected.
    #[must_use]
    pub const fn is_user_kind(self) -> bool {
        matches!(self, Self::User)
    }

    /// Whether this kind is acceptable where a group principal is expected.
    ///
    /// Aliases, labels and well-known groups all resolve through group
    /// lookups even though only groups and aliases can list members.
    #[must_use]
    pub const fn is_group_kind(self) -> bool {
        matches!(
            self,
            Self::Group | Self::Alias | Self::Label | Self::WellKnownGroup
        )
    }

    /// Whether member enumeration is meaningful for this kind.
    #[must_use]
    pub const fn has_members(self) -> bool {
        matches!(self, Self::Group | Self::Alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_match_sid_name_use() {
        assert_eq!(i32::from(SidType::User), 1, "SidTypeUser");
        assert_eq!(i32::from(SidType::Group), 2, "SidTypeGroup");
        assert_eq!(i32::from(SidType::Alias), 4, "SidTypeAlias");
        assert_eq!(SidType::try_from(5), Ok(SidType::WellKnownGroup), "raw 5");
        assert!(SidType::try_from(42).is_err(), "unknown raw value");
    }

    #[test]
    fn group_kind_accepts_what_user_kind_rejects() {
        for t in [
            SidType::Group,
            SidType::Alias,
            SidType::Label,
            SidType::WellKnownGroup,
        ] {
            assert!(t.is_group_kind(), "{t:?} is a group kind");
            assert!(!t.is_user_kind(), "{t:?} is not a user kind");
        }
        assert!(SidType::User.is_user_kind(), "user kind");
        assert!(!SidType::Domain.is_group_kind(), "domains are neither");
    }

    #[test]
    fn only_groups_and_aliases_enumerate_members() {
        assert!(SidType::Group.has_members(), "domain groups");
        assert!(SidType::Alias.has_members(), "local groups");
        assert!(!SidType::WellKnownGroup.has_members(), "well-known");
        assert!(!SidType::Label.has_members(), "labels");
    }
}
