//! Reading and changing the owner and primary group of securable objects.

use core::ffi::c_void;
use std::os::windows::io::{AsRawHandle, BorrowedHandle};
use std::path::Path;

use widestring::U16CString;
use windows_sys::Win32::Foundation::{ERROR_INVALID_NAME, HANDLE};
use windows_sys::Win32::Security::Authorization::{
    GetNamedSecurityInfoW, GetSecurityInfo, SetNamedSecurityInfoW, SetSecurityInfo,
    SE_FILE_OBJECT,
};
use windows_sys::Win32::Security::{
    GROUP_SECURITY_INFORMATION, OWNER_SECURITY_INFORMATION, PSID,
};

use crate::error::{Error, OsError};
use crate::privileges::PrivilegeWindow;
use crate::resource::{LocalMem, Owned};
use crate::sid::SecurityId;

/// A securable object to operate on: a filesystem path or an already
/// open handle.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Path(&'a Path),
    Handle(BorrowedHandle<'a>),
}

impl<'a> From<&'a Path> for Target<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<BorrowedHandle<'a>> for Target<'a> {
    fn from(handle: BorrowedHandle<'a>) -> Self {
        Self::Handle(handle)
    }
}

/// The owner and primary group of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub owner: SecurityId,
    pub group: SecurityId,
}

fn wide_path(path: &Path) -> Result<U16CString, Error> {
    U16CString::from_os_str(path)
        .map_err(|_| OsError::new("GetNamedSecurityInfoW", ERROR_INVALID_NAME).into())
}

/// Reads the owner and primary group of `target`.
pub fn owner(target: Target<'_>) -> Result<Ownership, Error> {
    let mut owner_psid: PSID = core::ptr::null_mut();
    let mut group_psid: PSID = core::ptr::null_mut();
    let mut descriptor: Owned<c_void, LocalMem> = Owned::empty();
    let info = OWNER_SECURITY_INFORMATION | GROUP_SECURITY_INFORMATION;

    let status = match target {
        Target::Path(path) => {
            let wide = wide_path(path)?;
            // SAFETY: all out pointers are live; the descriptor slot
            // receives LocalAlloc memory the wrapper then owns.
            unsafe {
                GetNamedSecurityInfoW(
                    wide.as_ptr(),
                    SE_FILE_OBJECT,
                    info,
                    &mut owner_psid,
                    &mut group_psid,
                    core::ptr::null_mut(),
                    core::ptr::null_mut(),
                    descriptor.slot(),
                )
            }
        }
        Target::Handle(handle) => {
            // SAFETY: the borrowed handle is open for the duration of
            // the call; out pointers as above.
            unsafe {
                GetSecurityInfo(
                    handle.as_raw_handle() as HANDLE,
                    SE_FILE_OBJECT,
                    info,
                    &mut owner_psid,
                    &mut group_psid,
                    core::ptr::null_mut(),
                    core::ptr::null_mut(),
                    descriptor.slot(),
                )
            }
        }
    };
    if status != 0 {
        return Err(OsError::new("GetSecurityInfo", status).into());
    }

    // SAFETY: both PSIDs point into the descriptor, which is still held.
    let owner = unsafe { SecurityId::from_psid(owner_psid) }?;
    // SAFETY: as above.
    let group = unsafe { SecurityId::from_psid(group_psid) }?;
    Ok(Ownership { owner, group })
}

/// Sets the owner and/or primary group of `target`.
///
/// Exactly the provided parts are written; asking for no change at all
/// is [`Error::NothingToChange`], detected before any OS call. The
/// required privileges are enabled around the write and disabled again
/// whether or not it succeeded.
pub fn set_owner(
    target: Target<'_>,
    owner: Option<&SecurityId>,
    group: Option<&SecurityId>,
) -> Result<(), Error> {
    if owner.is_none() && group.is_none() {
        return Err(Error::NothingToChange);
    }

    let owner_buf = owner.map(SecurityId::to_psid_buf);
    let group_buf = group.map(SecurityId::to_psid_buf);
    let owner_psid = owner_buf
        .as_ref()
        .map_or(core::ptr::null_mut(), |b| b.as_psid());
    let group_psid = group_buf
        .as_ref()
        .map_or(core::ptr::null_mut(), |b| b.as_psid());
    let mut info = 0_u32;
    if owner.is_some() {
        info |= OWNER_SECURITY_INFORMATION;
    }
    if group.is_some() {
        info |= GROUP_SECURITY_INFORMATION;
    }

    let window = PrivilegeWindow::enable()?;
    let applied = apply(target, info, owner_psid, group_psid);
    let disabled = window.disable();
    applied?;
    disabled
}

fn apply(
    target: Target<'_>,
    info: u32,
    owner_psid: PSID,
    group_psid: PSID,
) -> Result<(), Error> {
    let status = match target {
        Target::Path(path) => {
            let wide = wide_path(path)?;
            // SAFETY: the SID buffers outlive the call; null parts are
            // excluded by `info`.
            unsafe {
                SetNamedSecurityInfoW(
                    wide.as_ptr().cast_mut(),
                    SE_FILE_OBJECT,
                    info,
                    owner_psid,
                    group_psid,
                    core::ptr::null(),
                    core::ptr::null(),
                )
            }
        }
        Target::Handle(handle) => {
            // SAFETY: the borrowed handle is open for the duration of
            // the call; SID buffers outlive it.
            unsafe {
                SetSecurityInfo(
                    handle.as_raw_handle() as HANDLE,
                    SE_FILE_OBJECT,
                    info,
                    owner_psid,
                    group_psid,
                    core::ptr::null(),
                    core::ptr::null(),
                )
            }
        }
    };
    if status != 0 {
        return Err(OsError::new("SetSecurityInfo", status).into());
    }
    Ok(())
}

/// Sets ownership from textual SIDs; an empty string leaves that part
/// unchanged.
pub fn set_owner_text(target: Target<'_>, owner: &str, group: &str) -> Result<(), Error> {
    let owner_sid = parse_optional(owner)?;
    let group_sid = parse_optional(group)?;
    set_owner(target, owner_sid.as_ref(), group_sid.as_ref())
}

fn parse_optional(text: &str) -> Result<Option<SecurityId>, Error> {
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(text.parse()?))
}
