//! The two-call probe-then-fill pattern for variable-size OS outputs.

use core::ffi::c_void;

use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, ERROR_INVALID_FUNCTION};

use crate::error::OsError;

/// Validates the outcome of a sizing probe that was handed no buffer.
///
/// The probe is supposed to fail with `ERROR_INSUFFICIENT_BUFFER` after
/// writing the required size. A probe that reports success got no buffer
/// to fill, so its output is unusable; surface it as
/// `ERROR_INVALID_FUNCTION` rather than reading garbage.
pub(crate) fn expect_insufficient_buffer(
    call: &'static str,
    succeeded: bool,
) -> Result<(), OsError> {
    if succeeded {
        return Err(OsError::new(call, ERROR_INVALID_FUNCTION));
    }
    let err = OsError::last(call);
    if err.code == ERROR_INSUFFICIENT_BUFFER {
        Ok(())
    } else {
        Err(err)
    }
}

/// Runs `fill(buffer, len, needed)` twice: once with no buffer to learn
/// the size, then with a buffer of exactly that size. Returns the filled
/// bytes.
pub(crate) fn query_buffer(
    call: &'static str,
    mut fill: impl FnMut(*mut c_void, u32, &mut u32) -> bool,
) -> Result<Vec<u8>, OsError> {
    let mut needed = 0_u32;
    let succeeded = fill(core::ptr::null_mut(), 0, &mut needed);
    expect_insufficient_buffer(call, succeeded)?;
    let mut buffer = vec![0_u8; needed as usize];
    let mut written = needed;
    if fill(buffer.as_mut_ptr().cast(), needed, &mut written) {
        Ok(buffer)
    } else {
        Err(OsError::last(call))
    }
}
