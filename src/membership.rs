//! Direct-member enumeration for groups and aliases.

use core::ffi::c_void;
use core::sync::atomic::{AtomicU64, Ordering};

use windows_sys::Win32::Foundation::ERROR_ACCESS_DENIED;
use windows_sys::Win32::NetworkManagement::NetManagement::{
    NetGroupGetUsers, NetLocalGroupGetMembers, GROUP_USERS_INFO_0, LOCALGROUP_MEMBERS_INFO_3,
    MAX_PREFERRED_LENGTH,
};

use crate::accounts::Scope;
use crate::error::{Error, OsError};
use crate::qualified_name::QualifiedName;
use crate::resource::{NetApiMem, Owned};
use crate::wide::{optional_field, to_wide};

/// Count of enumeration calls issued since process start. A testing
/// seam for verifying that disabling enumeration really skips the
/// directory round-trip.
static CALLS: AtomicU64 = AtomicU64::new(0);

pub(crate) fn call_count() -> u64 {
    CALLS.load(Ordering::Relaxed)
}

/// Enumerates the direct members of the group `name`.
///
/// Domain groups with a reachable domain controller are asked of that
/// controller; local groups, builtin aliases, and domain groups with no
/// controller go through the local query. A database the caller may not
/// read yields an empty list rather than an error.
pub(crate) fn members(
    scope: Scope,
    server: Option<&str>,
    name: &QualifiedName,
) -> Result<Vec<QualifiedName>, Error> {
    CALLS.fetch_add(1, Ordering::Relaxed);
    match domain_query_target(scope, server) {
        Some(dc) => domain_members(dc, name),
        None => local_members(&name.account),
    }
}

/// Only domain groups with a located controller use the domain query;
/// everything else, a controller-less domain group included, goes
/// through the local one.
fn domain_query_target<'a>(scope: Scope, server: Option<&'a str>) -> Option<&'a str> {
    match scope {
        Scope::Domain => server,
        Scope::Local | Scope::Builtin => None,
    }
}

/// Normalizes one enumerated member name: names that already carry a
/// scope prefix are kept as-is, bare names get the group's own domain.
fn qualify_member(raw: String, domain: &str) -> QualifiedName {
    match raw.parse::<QualifiedName>() {
        Ok(parsed) => parsed.qualify(domain),
        Err(never) => match never {},
    }
}

/// `NetGroupGetUsers` returns mostly bare account names; each is
/// qualified with the group's own domain unless already qualified.
fn domain_members(server: &str, name: &QualifiedName) -> Result<Vec<QualifiedName>, Error> {
    let wide_server = to_wide(server)?;
    let server_ptr = wide_server.as_ptr();
    let wide_group = to_wide(&name.account)?;

    let mut buffer: Owned<GROUP_USERS_INFO_0, NetApiMem> = Owned::empty();
    let slot: *mut *mut c_void = buffer.slot();
    let mut read = 0_u32;
    let mut total = 0_u32;
    // SAFETY: the out pointer receives a NetApi buffer the wrapper then
    // owns; MAX_PREFERRED_LENGTH lets the OS size it.
    let status = unsafe {
        NetGroupGetUsers(
            server_ptr,
            wide_group.as_ptr(),
            0,
            slot.cast(),
            MAX_PREFERRED_LENGTH,
            &mut read,
            &mut total,
            core::ptr::null_mut(),
        )
    };
    if status == ERROR_ACCESS_DENIED {
        return Ok(Vec::new());
    }
    if status != 0 {
        return Err(OsError::new("NetGroupGetUsers", status).into());
    }

    let mut members = Vec::with_capacity(read as usize);
    for i in 0..read as usize {
        // SAFETY: status 0 means `read` entries are live behind the
        // buffer for as long as it is held.
        let entry = unsafe { buffer.as_ptr().add(i).read() };
        // SAFETY: entry names are NUL-terminated while the buffer lives.
        if let Some(account) = unsafe { optional_field(entry.grui0_name) }? {
            members.push(qualify_member(account, &name.domain));
        }
    }
    Ok(members)
}

/// `NetLocalGroupGetMembers` level 3 returns `domain\name` strings.
fn local_members(group: &str) -> Result<Vec<QualifiedName>, Error> {
    let wide_group = to_wide(group)?;

    let mut buffer: Owned<LOCALGROUP_MEMBERS_INFO_3, NetApiMem> = Owned::empty();
    let slot: *mut *mut c_void = buffer.slot();
    let mut read = 0_u32;
    let mut total = 0_u32;
    // SAFETY: as in `domain_members`.
    let status = unsafe {
        NetLocalGroupGetMembers(
            core::ptr::null(),
            wide_group.as_ptr(),
            3,
            slot.cast(),
            MAX_PREFERRED_LENGTH,
            &mut read,
            &mut total,
            core::ptr::null_mut(),
        )
    };
    if status == ERROR_ACCESS_DENIED {
        return Ok(Vec::new());
    }
    if status != 0 {
        return Err(OsError::new("NetLocalGroupGetMembers", status).into());
    }

    let mut members = Vec::with_capacity(read as usize);
    for i in 0..read as usize {
        // SAFETY: status 0 means `read` entries are live behind the
        // buffer for as long as it is held.
        let entry = unsafe { buffer.as_ptr().add(i).read() };
        // SAFETY: entry names are NUL-terminated while the buffer lives.
        if let Some(qualified) = unsafe { optional_field(entry.lgrmi3_domainandname) }? {
            match qualified.parse::<QualifiedName>() {
                Ok(parsed) => members.push(parsed),
                Err(never) => match never {},
            }
        }
    }
    Ok(members)
}
