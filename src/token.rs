//! Identity of the current process token.

use core::mem::offset_of;

use windows_sys::Win32::Security::{
    GetTokenInformation, TokenGroups, TokenPrimaryGroup, TokenUser, SID_AND_ATTRIBUTES,
    TOKEN_GROUPS, TOKEN_INFORMATION_CLASS, TOKEN_PRIMARY_GROUP, TOKEN_QUERY, TOKEN_USER,
};
use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

use crate::error::{Error, OsError};
use crate::probe;
use crate::resource::Handle;
use crate::sid::SecurityId;

fn open_query_token() -> Result<Handle, Error> {
    let mut token = Handle::empty();
    // SAFETY: GetCurrentProcess returns a pseudo-handle that needs no
    // closing; the out pointer receives the token handle the wrapper
    // then owns.
    if unsafe { OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, token.slot()) } == 0 {
        return Err(OsError::last("OpenProcessToken").into());
    }
    Ok(token)
}

fn token_information(class: TOKEN_INFORMATION_CLASS) -> Result<Vec<u8>, Error> {
    let token = open_query_token()?;
    let buffer = probe::query_buffer("GetTokenInformation", |ptr, len, needed| {
        // SAFETY: the token is open with TOKEN_QUERY and the buffer
        // described by `ptr`/`len` is writable (or absent on the probe).
        unsafe { GetTokenInformation(token.as_ptr(), class, ptr, len, needed) != 0 }
    })?;
    Ok(buffer)
}

/// The SID of the user the current process runs as.
pub fn current_user_sid() -> Result<SecurityId, Error> {
    let buffer = token_information(TokenUser)?;
    // SAFETY: the OS filled the buffer with a TOKEN_USER whose SID
    // pointer targets later bytes of the same buffer.
    let user = unsafe { buffer.as_ptr().cast::<TOKEN_USER>().read_unaligned() };
    // SAFETY: the pointed-to SID lives inside `buffer`, still held.
    Ok(unsafe { SecurityId::from_psid(user.User.Sid) }?)
}

/// The SID of the current process's primary group.
pub fn current_primary_group_sid() -> Result<SecurityId, Error> {
    let buffer = token_information(TokenPrimaryGroup)?;
    // SAFETY: the OS filled the buffer with a TOKEN_PRIMARY_GROUP whose
    // SID pointer targets later bytes of the same buffer.
    let group = unsafe {
        buffer
            .as_ptr()
            .cast::<TOKEN_PRIMARY_GROUP>()
            .read_unaligned()
    };
    // SAFETY: the pointed-to SID lives inside `buffer`, still held.
    Ok(unsafe { SecurityId::from_psid(group.PrimaryGroup) }?)
}

/// The SIDs of every group in the current process token, the primary
/// group included.
pub fn current_group_sids() -> Result<Vec<SecurityId>, Error> {
    let buffer = token_information(TokenGroups)?;
    let base = buffer.as_ptr();
    // SAFETY: the OS filled the buffer with a TOKEN_GROUPS header.
    let count = unsafe { base.cast::<TOKEN_GROUPS>().read_unaligned() }.GroupCount as usize;
    let entries = base.wrapping_add(offset_of!(TOKEN_GROUPS, Groups));

    let mut sids = Vec::with_capacity(count);
    for i in 0..count {
        // SAFETY: the OS wrote `count` entries starting at the Groups
        // offset, all within `buffer`.
        let entry = unsafe {
            entries
                .add(i * core::mem::size_of::<SID_AND_ATTRIBUTES>())
                .cast::<SID_AND_ATTRIBUTES>()
                .read_unaligned()
        };
        // SAFETY: each entry's SID pointer targets bytes of `buffer`.
        sids.push(unsafe { SecurityId::from_psid(entry.Sid) }?);
    }
    Ok(sids)
}
