//! User and group account resolution.
//!
//! Lookups resolve a name or SID, classify where the account lives, and
//! enrich the result from the matching account database. An unknown
//! principal is `Ok(None)`; a principal of the wrong kind is an error; a
//! database the caller may not read degrades the record instead of
//! failing it.

#![cfg_attr(not(windows), allow(dead_code))]

use crate::qualified_name::QualifiedName;
use crate::sid::SecurityId;
use crate::well_known::{self, DOMAIN_ALIAS_RID_ADMINS};

/// Where an account's authoritative database lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The local machine's SAM database.
    Local,
    /// The BUILTIN domain of the local machine.
    Builtin,
    /// A network domain, served by its domain controller.
    Domain,
}

/// Classifies the referenced domain of a resolved account against the
/// local machine name.
#[must_use]
pub(crate) fn classify_scope(domain: &str, computer: &str) -> Scope {
    if domain.is_empty() || domain.eq_ignore_ascii_case(computer) {
        Scope::Local
    } else if domain.eq_ignore_ascii_case("BUILTIN") {
        Scope::Builtin
    } else {
        Scope::Domain
    }
}

/// Builds a user's primary-group SID from its relative ID.
///
/// RIDs at or above the first builtin alias RID (544) name builtin
/// aliases under `S-1-5-32`; anything lower is relative to the user's
/// own domain, so the user SID with its last sub-authority swapped.
#[must_use]
pub(crate) fn primary_group_sid(user_sid: &SecurityId, rid: u32) -> SecurityId {
    if rid >= DOMAIN_ALIAS_RID_ADMINS {
        well_known::builtin_alias(rid)
    } else {
        user_sid.with_rid(rid)
    }
}

/// Whether a resolved group is the SAM artifact `None`, the placeholder
/// primary group of local accounts on domain-joined machines.
#[must_use]
pub(crate) fn is_none_group(scope: Scope, name: &QualifiedName) -> bool {
    scope == Scope::Local && name.account.eq_ignore_ascii_case("None")
}

/// Rewrites the `None` artifact to the conventional `Users` account
/// name. Only the name changes; the record keeps the SID the lookup
/// actually resolved.
#[must_use]
pub(crate) fn fixup_none_group(scope: Scope, name: QualifiedName) -> QualifiedName {
    if is_none_group(scope, &name) {
        QualifiedName::new(name.domain, "Users")
    } else {
        name
    }
}

#[cfg(windows)]
pub use self::os::{group_by_name, group_by_sid, user_by_name, user_by_sid};

#[cfg(windows)]
mod os {
    use core::ffi::c_void;

    use windows_sys::Win32::Foundation::ERROR_ACCESS_DENIED;
    use windows_sys::Win32::NetworkManagement::NetManagement::{NetUserGetInfo, USER_INFO_4};

    use super::{classify_scope, fixup_none_group, primary_group_sid, Scope};
    use crate::config;
    use crate::error::{Error, OsError};
    use crate::lookup::{self, Resolved, SidName};
    use crate::membership;
    use crate::qualified_name::QualifiedName;
    use crate::records::{GroupRecord, UserRecord};
    use crate::resource::{NetApiMem, Owned};
    use crate::sid::SecurityId;
    use crate::sid_type::SidType;
    use crate::wide::{optional_field, to_wide};

    /// A resolved account plus the context lookups downstream need.
    struct Account {
        name: QualifiedName,
        sid: SecurityId,
        sid_type: SidType,
        scope: Scope,
        /// Server to direct account-database queries at; `None` means
        /// the local machine.
        server: Option<String>,
    }

    fn account_from_name(
        name: &str,
        accept: fn(SidType) -> bool,
    ) -> Result<Option<Account>, Error> {
        let Some(Resolved {
            sid,
            sid_type,
            domain,
        }) = lookup::resolve_name(name, None)?
        else {
            return Ok(None);
        };
        if !accept(sid_type) {
            return Err(Error::UnexpectedType { sid_type });
        }
        let account: QualifiedName = match name.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        };
        finish_account(QualifiedName::new(domain, account.account), sid, sid_type).map(Some)
    }

    fn account_from_sid(
        sid: &SecurityId,
        accept: fn(SidType) -> bool,
    ) -> Result<Option<Account>, Error> {
        let Some(SidName { name, sid_type }) = lookup::resolve_sid(sid, None)? else {
            return Ok(None);
        };
        if !accept(sid_type) {
            return Err(Error::UnexpectedType { sid_type });
        }
        finish_account(name, sid.clone(), sid_type).map(Some)
    }

    /// Classifies scope and, for domain accounts, locates the domain
    /// controller. Runs only after the principal kind was accepted, so
    /// a wrong-kind SID never triggers a network call.
    fn finish_account(
        name: QualifiedName,
        sid: SecurityId,
        sid_type: SidType,
    ) -> Result<Account, Error> {
        let computer = lookup::computer_name()?;
        let scope = classify_scope(&name.domain, &computer);
        let server = if scope == Scope::Domain {
            lookup::domain_controller(&name.domain)?
        } else {
            None
        };
        Ok(Account {
            name,
            sid,
            sid_type,
            scope,
            server,
        })
    }

    /// Fills a user record from `NetUserGetInfo` level 4.
    ///
    /// An access-denied answer leaves the record as resolved but
    /// unenriched; the caller may simply lack rights to read the
    /// account database.
    fn enrich_user(record: &mut UserRecord, server: Option<&str>) -> Result<(), Error> {
        let wide_server = server.map(to_wide).transpose()?;
        let server_ptr = wide_server
            .as_ref()
            .map_or(core::ptr::null(), |s| s.as_ptr());
        let wide_account = to_wide(&record.name.account)?;

        let mut buffer: Owned<USER_INFO_4, NetApiMem> = Owned::empty();
        let slot: *mut *mut c_void = buffer.slot();
        // SAFETY: the out pointer receives a NetApi buffer the wrapper
        // then owns.
        let status =
            unsafe { NetUserGetInfo(server_ptr, wide_account.as_ptr(), 4, slot.cast()) };
        if status == ERROR_ACCESS_DENIED {
            return Ok(());
        }
        if status != 0 {
            return Err(OsError::new("NetUserGetInfo", status).into());
        }

        // SAFETY: status 0 means the buffer holds a USER_INFO_4.
        let info = unsafe { buffer.as_ptr().read() };
        record.gid = Some(primary_group_sid(&record.uid, info.usri4_primary_group_id));
        // SAFETY: string fields of a live USER_INFO_4 are null or
        // NUL-terminated, and `buffer` outlives these reads.
        unsafe {
            record.gecos = optional_field(info.usri4_full_name)?;
            record.dir = optional_field(info.usri4_home_dir)?;
            record.shell = optional_field(info.usri4_script_path)?;
        }
        Ok(())
    }

    fn build_user(account: Account) -> Result<UserRecord, Error> {
        let server = account.server;
        let mut record = UserRecord::new(account.name, account.sid);
        enrich_user(&mut record, server.as_deref())?;
        Ok(record)
    }

    fn build_group(account: Account) -> Result<GroupRecord, Error> {
        // The name may be the domain-join `None` artifact; the SID the
        // lookup resolved stays either way.
        let name = fixup_none_group(account.scope, account.name);
        let members = if config::should_enumerate(config::enumerate_members(), account.sid_type) {
            membership::members(account.scope, account.server.as_deref(), &name)?
        } else {
            Vec::new()
        };
        let mut record = GroupRecord::new(name, account.sid);
        record.members = members;
        Ok(record)
    }

    /// Looks up a user account by name. Unknown names are `Ok(None)`.
    ///
    /// # Errors
    /// [`Error::UnexpectedType`] when the name resolves to a non-user
    /// principal; [`Error::Os`] when an OS call other than an
    /// access-denied database read fails.
    pub fn user_by_name(name: &str) -> Result<Option<UserRecord>, Error> {
        account_from_name(name, SidType::is_user_kind)?
            .map(build_user)
            .transpose()
    }

    /// Looks up a user account by SID. Unmapped SIDs are `Ok(None)`.
    pub fn user_by_sid(sid: &SecurityId) -> Result<Option<UserRecord>, Error> {
        account_from_sid(sid, SidType::is_user_kind)?
            .map(build_user)
            .transpose()
    }

    /// Looks up a group by name. Unknown names are `Ok(None)`.
    ///
    /// Member enumeration honors
    /// [`config::set_enumerate_members`](crate::config::set_enumerate_members)
    /// and is skipped for kinds that cannot have members.
    pub fn group_by_name(name: &str) -> Result<Option<GroupRecord>, Error> {
        account_from_name(name, SidType::is_group_kind)?
            .map(build_group)
            .transpose()
    }

    /// Looks up a group by SID. Unmapped SIDs are `Ok(None)`.
    pub fn group_by_sid(sid: &SecurityId) -> Result<Option<GroupRecord>, Error> {
        account_from_sid(sid, SidType::is_group_kind)?
            .map(build_group)
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn scope_matches_machine_name_case_insensitively() {
        assert_eq!(classify_scope("workpc", "WORKPC"), Scope::Local);
        assert_eq!(classify_scope("", "WORKPC"), Scope::Local);
        assert_eq!(classify_scope("BUILTIN", "WORKPC"), Scope::Builtin);
        assert_eq!(classify_scope("builtin", "WORKPC"), Scope::Builtin);
        assert_eq!(classify_scope("NT AUTHORITY", "WORKPC"), Scope::Domain);
        assert_eq!(classify_scope("CORP", "WORKPC"), Scope::Domain);
    }

    #[test]
    fn primary_group_rid_splits_at_first_builtin_alias() {
        let user: SecurityId = "S-1-5-21-1-2-3-1001".parse().unwrap();
        assert_eq!(
            primary_group_sid(&user, 513).to_string(),
            "S-1-5-21-1-2-3-513",
            "domain RIDs replace the user's last sub-authority"
        );
        assert_eq!(
            primary_group_sid(&user, 544).to_string(),
            "S-1-5-32-544",
            "544 and up are builtin aliases"
        );
        assert_eq!(primary_group_sid(&user, 545).to_string(), "S-1-5-32-545");
    }

    #[test]
    fn none_group_detection_is_local_only() {
        let name = QualifiedName::new("WORKPC", "None");
        assert!(is_none_group(Scope::Local, &name));
        assert!(is_none_group(Scope::Local, &QualifiedName::new("WORKPC", "none")));
        assert!(!is_none_group(Scope::Domain, &name));
        assert!(!is_none_group(
            Scope::Local,
            &QualifiedName::new("WORKPC", "Users")
        ));
    }

    #[test]
    fn none_fixup_rewrites_the_name_in_place() {
        let fixed = fixup_none_group(Scope::Local, QualifiedName::new("WORKPC", "None"));
        assert_eq!(fixed.to_string(), "WORKPC\\Users");

        let domain = fixup_none_group(Scope::Domain, QualifiedName::new("CORP", "None"));
        assert_eq!(domain.to_string(), "CORP\\None");
        let other = fixup_none_group(Scope::Local, QualifiedName::new("WORKPC", "Backup"));
        assert_eq!(other.to_string(), "WORKPC\\Backup");
    }
}
