//! UTF-8 / UTF-16 conversion helpers for OS call boundaries.

use widestring::{U16CStr, U16CString};
use windows_sys::Win32::Globalization::{MultiByteToWideChar, WideCharToMultiByte, CP_UTF8};
use windows_sys::Win32::System::Memory::{LocalAlloc, LMEM_FIXED};

use crate::error::OsError;
use crate::resource::{LocalMem, Owned};

/// Converts `s` to a NUL-terminated wide string for an OS call.
pub(crate) fn to_wide(s: &str) -> Result<U16CString, OsError> {
    if s.is_empty() {
        return U16CString::from_str("").map_err(|_| OsError::new("MultiByteToWideChar", 0));
    }
    let bytes = s.as_bytes();
    let len = i32::try_from(bytes.len()).map_err(|_| OsError::new("MultiByteToWideChar", 0))?;
    // SAFETY: the input pointer/length describe `bytes`; a zero output
    // length only sizes the buffer.
    let needed = unsafe {
        MultiByteToWideChar(CP_UTF8, 0, bytes.as_ptr(), len, core::ptr::null_mut(), 0)
    };
    if needed <= 0 {
        return Err(OsError::last("MultiByteToWideChar"));
    }
    let mut wide = vec![0_u16; needed as usize];
    // SAFETY: `wide` is exactly the size the sizing call reported.
    let written = unsafe {
        MultiByteToWideChar(CP_UTF8, 0, bytes.as_ptr(), len, wide.as_mut_ptr(), needed)
    };
    if written <= 0 {
        return Err(OsError::last("MultiByteToWideChar"));
    }
    wide.truncate(written as usize);
    U16CString::from_vec(wide).map_err(|_| OsError::new("MultiByteToWideChar", 0))
}

/// Converts a NUL-terminated wide string from an OS call back to UTF-8.
pub(crate) fn to_narrow(s: &U16CStr) -> Result<String, OsError> {
    if s.is_empty() {
        return Ok(String::new());
    }
    let units = s.as_slice();
    let len = i32::try_from(units.len()).map_err(|_| OsError::new("WideCharToMultiByte", 0))?;
    // SAFETY: the input pointer/length describe `units`; a null output
    // buffer with zero length only sizes the conversion.
    let needed = unsafe {
        WideCharToMultiByte(
            CP_UTF8,
            0,
            units.as_ptr(),
            len,
            core::ptr::null_mut(),
            0,
            core::ptr::null(),
            core::ptr::null_mut(),
        )
    };
    if needed <= 0 {
        return Err(OsError::last("WideCharToMultiByte"));
    }
    let mut narrow = vec![0_u8; needed as usize];
    // SAFETY: `narrow` is exactly the size the sizing call reported.
    let written = unsafe {
        WideCharToMultiByte(
            CP_UTF8,
            0,
            units.as_ptr(),
            len,
            narrow.as_mut_ptr(),
            needed,
            core::ptr::null(),
            core::ptr::null_mut(),
        )
    };
    if written <= 0 {
        return Err(OsError::last("WideCharToMultiByte"));
    }
    narrow.truncate(written as usize);
    String::from_utf8(narrow).map_err(|_| OsError::new("WideCharToMultiByte", 0))
}

/// Copies `text` as a NUL-terminated byte string into `LocalAlloc`
/// memory, the allocator family of OS calls like
/// `ConvertSidToStringSidW` whose results the caller frees.
#[allow(dead_code)]
pub(crate) fn duplicate_local(text: &str) -> Result<Owned<u8, LocalMem>, OsError> {
    let bytes = text.as_bytes();
    // SAFETY: allocating; no pointers are dereferenced.
    let raw = unsafe { LocalAlloc(LMEM_FIXED, bytes.len() + 1) };
    if raw.is_null() {
        return Err(OsError::last("LocalAlloc"));
    }
    // SAFETY: the allocation is `len + 1` bytes, disjoint from `bytes`.
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), raw.cast::<u8>(), bytes.len());
        raw.cast::<u8>().add(bytes.len()).write(0);
    }
    // SAFETY: `raw` is a live LocalAlloc block owned by no one else.
    Ok(unsafe { Owned::acquire(raw) })
}

/// Reads a wide string out of an OS-owned buffer; `None` for null or
/// empty strings, which account info calls use for absent fields.
///
/// # Safety
/// `ptr` must be null or point at a NUL-terminated wide string that
/// outlives the call.
pub(crate) unsafe fn optional_field(ptr: *const u16) -> Result<Option<String>, OsError> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: caller guarantees `ptr` is NUL-terminated and live.
    let s = unsafe { U16CStr::from_ptr_str(ptr) };
    if s.is_empty() {
        return Ok(None);
    }
    to_narrow(s).map(Some)
}
