//! Name/SID resolution through the local security authority.

use core::ffi::c_void;

use smallvec::SmallVec;
use widestring::U16CStr;
use windows_sys::Win32::Foundation::{
    ERROR_INSUFFICIENT_BUFFER, ERROR_INVALID_FUNCTION, ERROR_NONE_MAPPED,
};
use windows_sys::Win32::NetworkManagement::NetManagement::{NetGetDCName, NERR_DCNotFound};
use windows_sys::Win32::Security::{LookupAccountNameW, LookupAccountSidW};
use windows_sys::Win32::System::SystemInformation::GetComputerNameW;

use crate::error::{Error, OsError};
use crate::qualified_name::QualifiedName;
use crate::resource::{NetApiMem, Owned};
use crate::sid::{SecurityId, MAX_SID_BYTES};
use crate::sid_type::SidType;
use crate::wide::{to_narrow, to_wide};

/// Expected stack capacity for referenced-domain buffers.
const DOMAIN_HINT: usize = 64;

/// Outcome of resolving an account name.
pub(crate) struct Resolved {
    pub(crate) sid: SecurityId,
    pub(crate) sid_type: SidType,
    pub(crate) domain: String,
}

/// Outcome of resolving a SID back to a name.
pub(crate) struct SidName {
    pub(crate) name: QualifiedName,
    pub(crate) sid_type: SidType,
}

fn sid_type_from_raw(raw: i32) -> SidType {
    SidType::try_from(raw).unwrap_or(SidType::Unknown)
}

/// Checks the outcome of a no-buffer sizing probe where an unknown
/// principal is a non-error.
fn probe_outcome(call: &'static str, succeeded: bool) -> Result<Option<()>, OsError> {
    if succeeded {
        return Err(OsError::new(call, ERROR_INVALID_FUNCTION));
    }
    let err = OsError::last(call);
    match err.code {
        ERROR_NONE_MAPPED => Ok(None),
        ERROR_INSUFFICIENT_BUFFER => Ok(Some(())),
        _ => Err(err),
    }
}

/// Resolves `name` to its SID on `system` (`None` for the local machine).
///
/// An unknown name is `Ok(None)`, not an error.
pub(crate) fn resolve_name(name: &str, system: Option<&str>) -> Result<Option<Resolved>, Error> {
    let wide_name = to_wide(name)?;
    let wide_system = system.map(to_wide).transpose()?;
    let system_ptr = wide_system
        .as_ref()
        .map_or(core::ptr::null(), |s| s.as_ptr());

    let mut sid_len = 0_u32;
    let mut domain_len = 0_u32;
    let mut sid_type_raw = 0_i32;
    // SAFETY: null buffers with zero lengths request sizing only.
    let probed = unsafe {
        LookupAccountNameW(
            system_ptr,
            wide_name.as_ptr(),
            core::ptr::null_mut(),
            &mut sid_len,
            core::ptr::null_mut(),
            &mut domain_len,
            &mut sid_type_raw,
        )
    } != 0;
    if probe_outcome("LookupAccountNameW", probed)?.is_none() {
        return Ok(None);
    }

    let mut sid_buf: SmallVec<[u8; MAX_SID_BYTES]> = SmallVec::from_elem(0, sid_len as usize);
    let mut domain_buf: SmallVec<[u16; DOMAIN_HINT]> = SmallVec::from_elem(0, domain_len as usize);
    // SAFETY: both buffers are exactly the sizes the probe reported.
    let filled = unsafe {
        LookupAccountNameW(
            system_ptr,
            wide_name.as_ptr(),
            sid_buf.as_mut_ptr().cast(),
            &mut sid_len,
            domain_buf.as_mut_ptr(),
            &mut domain_len,
            &mut sid_type_raw,
        )
    } != 0;
    if !filled {
        return Err(OsError::last("LookupAccountNameW").into());
    }

    // SAFETY: the OS wrote a valid SID into `sid_buf`.
    let sid = unsafe { SecurityId::from_psid(sid_buf.as_mut_ptr().cast()) }?;
    // SAFETY: the OS wrote a NUL-terminated domain into `domain_buf`.
    let domain = to_narrow(unsafe { U16CStr::from_ptr_str(domain_buf.as_ptr()) })?;
    Ok(Some(Resolved {
        sid,
        sid_type: sid_type_from_raw(sid_type_raw),
        domain,
    }))
}

/// Resolves `sid` to its qualified name on `system`.
///
/// A SID no account maps to is `Ok(None)`.
pub(crate) fn resolve_sid(sid: &SecurityId, system: Option<&str>) -> Result<Option<SidName>, Error> {
    let wide_system = system.map(to_wide).transpose()?;
    let system_ptr = wide_system
        .as_ref()
        .map_or(core::ptr::null(), |s| s.as_ptr());
    let sid_buf = sid.to_psid_buf();

    let mut name_len = 0_u32;
    let mut domain_len = 0_u32;
    let mut sid_type_raw = 0_i32;
    // SAFETY: null buffers with zero lengths request sizing only; the
    // PSID points into `sid_buf`, which outlives the call.
    let probed = unsafe {
        LookupAccountSidW(
            system_ptr,
            sid_buf.as_psid(),
            core::ptr::null_mut(),
            &mut name_len,
            core::ptr::null_mut(),
            &mut domain_len,
            &mut sid_type_raw,
        )
    } != 0;
    if probe_outcome("LookupAccountSidW", probed)?.is_none() {
        return Ok(None);
    }

    let mut name_buf: SmallVec<[u16; DOMAIN_HINT]> = SmallVec::from_elem(0, name_len as usize);
    let mut domain_buf: SmallVec<[u16; DOMAIN_HINT]> = SmallVec::from_elem(0, domain_len as usize);
    // SAFETY: both buffers are exactly the sizes the probe reported.
    let filled = unsafe {
        LookupAccountSidW(
            system_ptr,
            sid_buf.as_psid(),
            name_buf.as_mut_ptr(),
            &mut name_len,
            domain_buf.as_mut_ptr(),
            &mut domain_len,
            &mut sid_type_raw,
        )
    } != 0;
    if !filled {
        return Err(OsError::last("LookupAccountSidW").into());
    }

    // SAFETY: the OS wrote NUL-terminated strings into both buffers.
    let account = to_narrow(unsafe { U16CStr::from_ptr_str(name_buf.as_ptr()) })?;
    // SAFETY: as above.
    let domain = to_narrow(unsafe { U16CStr::from_ptr_str(domain_buf.as_ptr()) })?;
    Ok(Some(SidName {
        name: QualifiedName::new(domain, account),
        sid_type: sid_type_from_raw(sid_type_raw),
    }))
}

/// The NetBIOS name of the local machine.
pub(crate) fn computer_name() -> Result<String, Error> {
    let mut buf = [0_u16; 256];
    let mut len = buf.len() as u32;
    // SAFETY: `buf` holds `len` wide characters.
    if unsafe { GetComputerNameW(buf.as_mut_ptr(), &mut len) } == 0 {
        return Err(OsError::last("GetComputerNameW").into());
    }
    // SAFETY: on success the name is NUL-terminated within `buf`.
    Ok(to_narrow(unsafe { U16CStr::from_ptr_str(buf.as_ptr()) })?)
}

/// Finds the primary domain controller for `domain`.
///
/// A domain with no reachable controller is `Ok(None)`; that leaves
/// lookups scoped to the local machine instead of failing them.
pub(crate) fn domain_controller(domain: &str) -> Result<Option<String>, Error> {
    let wide_domain = to_wide(domain)?;
    let mut buffer: Owned<u16, NetApiMem> = Owned::empty();
    let slot: *mut *mut c_void = buffer.slot();
    // SAFETY: the out pointer receives a NetApi buffer that `buffer`
    // then owns.
    let status = unsafe { NetGetDCName(core::ptr::null(), wide_domain.as_ptr(), slot.cast()) };
    if status == NERR_DCNotFound {
        return Ok(None);
    }
    if status != 0 {
        return Err(OsError::new("NetGetDCName", status).into());
    }
    // SAFETY: on success the buffer holds a NUL-terminated wide string.
    let raw = to_narrow(unsafe { U16CStr::from_ptr_str(buffer.as_ptr()) })?;
    Ok(Some(raw.trim_start_matches('\\').to_owned()))
}
