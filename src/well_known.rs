//! Well-known SID constructors used by account resolution.

use crate::sid::SecurityId;
use crate::sid_identifier_authority::SidIdentifierAuthority;

/// First sub-authority of SIDs under the BUILTIN domain (`S-1-5-32`).
pub const SECURITY_BUILTIN_DOMAIN_RID: u32 = 32;

/// RID of the BUILTIN\Administrators alias; the lowest builtin alias RID.
///
/// Primary-group RIDs at or above this value name builtin aliases rather
/// than relative accounts of the user's own domain.
pub const DOMAIN_ALIAS_RID_ADMINS: u32 = 544;

/// RID of the BUILTIN\Users alias.
pub const DOMAIN_ALIAS_RID_USERS: u32 = 545;

/// The null SID, `S-1-0-0`.
#[must_use]
pub fn null_sid() -> SecurityId {
    sid(SidIdentifierAuthority::NULL_AUTHORITY, &[0])
}

/// A builtin alias SID, `S-1-5-32-<rid>`.
#[must_use]
pub fn builtin_alias(rid: u32) -> SecurityId {
    sid(
        SidIdentifierAuthority::NT_AUTHORITY,
        &[SECURITY_BUILTIN_DOMAIN_RID, rid],
    )
}

/// BUILTIN\Users, `S-1-5-32-545`.
#[must_use]
pub fn builtin_users() -> SecurityId {
    builtin_alias(DOMAIN_ALIAS_RID_USERS)
}

fn sid(authority: SidIdentifierAuthority, sub_authorities: &[u32]) -> SecurityId {
    // Every caller passes 1..=15 sub-authorities.
    SecurityId::try_new(authority, sub_authorities).unwrap_or_else(|| unreachable!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textual_forms() {
        assert_eq!(null_sid().to_string(), "S-1-0-0");
        assert_eq!(builtin_users().to_string(), "S-1-5-32-545");
        assert_eq!(builtin_alias(544).to_string(), "S-1-5-32-544");
    }

    #[test]
    fn builtin_alias_rid_is_last_sub_authority() {
        let admins = builtin_alias(DOMAIN_ALIAS_RID_ADMINS);
        assert_eq!(admins.rid(), DOMAIN_ALIAS_RID_ADMINS);
        assert_eq!(admins.sub_authorities().len(), 2);
    }
}
