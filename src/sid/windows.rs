//! FFI bridge between [`SecurityId`] and the raw `PSID` form Windows APIs use.

use core::mem::offset_of;

use windows_sys::Win32::Security::PSID;

use parsing::InvalidSidFormat;

use super::{MAX_SID_BYTES, SecurityId};

/// Minimal mirror of the fixed SID header, used only for field offsets.
#[repr(C)]
struct RawSidHead {
    revision: u8,
    sub_authority_count: u8,
    identifier_authority: [u8; 6],
}

impl SecurityId {
    /// Reads an OS-provided SID into an owned [`SecurityId`].
    ///
    /// # Errors
    /// [`InvalidSidFormat`] when the pointed-to data is not a valid SID.
    ///
    /// # Safety
    /// `psid` must be non-null and point to a SID at least as long as its
    /// embedded sub-authority count claims, valid for the duration of the
    /// call. This is the guarantee every Windows API returning a `PSID`
    /// provides.
    pub unsafe fn from_psid(psid: PSID) -> Result<Self, InvalidSidFormat> {
        let base = psid.cast::<u8>();
        // SAFETY: the header is always present per the preconditions.
        let count = unsafe { *base.add(offset_of!(RawSidHead, sub_authority_count)) };
        let len = core::mem::size_of::<RawSidHead>() + core::mem::size_of::<u32>() * count as usize;
        if len > MAX_SID_BYTES {
            return Err(InvalidSidFormat);
        }
        // SAFETY: `len` is derived from the embedded count, which the
        // preconditions promise is backed by the allocation.
        let bytes = unsafe { core::slice::from_raw_parts(base, len) };
        Self::from_bytes(bytes)
    }

    /// Renders this SID into an aligned buffer usable as a `PSID` argument.
    ///
    /// The buffer borrows nothing; it must outlive every FFI call that was
    /// handed its `as_psid()` pointer.
    #[must_use]
    pub(crate) fn to_psid_buf(&self) -> SidBuffer {
        let mut words = [0u32; MAX_SID_BYTES / core::mem::size_of::<u32>()];
        let bytes = self.to_bytes();
        for (word, chunk) in words
            .iter_mut()
            .zip(bytes.chunks(core::mem::size_of::<u32>()))
        {
            let mut le = [0u8; 4];
            le[..chunk.len()].copy_from_slice(chunk);
            *word = u32::from_ne_bytes(le);
        }
        SidBuffer { words }
    }
}

/// `u32`-aligned scratch holding one SID in the Windows in-memory layout.
pub(crate) struct SidBuffer {
    words: [u32; MAX_SID_BYTES / core::mem::size_of::<u32>()],
}

impl SidBuffer {
    /// Pointer for FFI calls taking an input `PSID`.
    ///
    /// Valid only while `self` is alive and unmoved.
    pub(crate) fn as_psid(&self) -> PSID {
        self.words.as_ptr().cast_mut().cast()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::super::test::arb_security_id;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn psid_buffer_round_trip(sid in arb_security_id()) {
            let buf = sid.to_psid_buf();
            // SAFETY: the buffer holds a SID we just rendered.
            let back = unsafe { SecurityId::from_psid(buf.as_psid()) }.unwrap();
            prop_assert_eq!(back, sid);
        }
    }

    #[cfg(windows)]
    mod os {
        use super::*;
        use core::ffi::c_void;
        use core::mem::MaybeUninit;
        use widestring::U16CString;
        use windows_sys::Win32::Foundation::LocalFree;
        use windows_sys::Win32::Security::Authorization::ConvertStringSidToSidW;
        use windows_sys::Win32::Security::IsValidSid;

        proptest! {
            #[test]
            fn os_parses_our_binary_form(sid in arb_security_id()) {
                let buf = sid.to_psid_buf();
                // SAFETY: the buffer holds a complete SID encoding.
                let ok = unsafe { IsValidSid(buf.as_psid()) };
                prop_assert!(ok != 0, "IsValidSid rejected {}", sid);
            }

            #[test]
            fn matches_os_string_conversion(sid in arb_security_id()) {
                let wide = U16CString::from_str(sid.to_string()).unwrap();
                let mut raw = MaybeUninit::<*mut c_void>::uninit();
                // SAFETY: valid NUL-terminated input and out-parameter.
                let ok = unsafe { ConvertStringSidToSidW(wide.as_ptr(), raw.as_mut_ptr()) };
                prop_assert!(ok != 0, "ConvertStringSidToSidW failed for {}", sid);
                // SAFETY: success means the out-parameter was initialized.
                let raw = unsafe { raw.assume_init() };
                // SAFETY: the OS allocation is a valid SID.
                let back = unsafe { SecurityId::from_psid(raw) }.unwrap();
                // SAFETY: freeing the LocalAlloc'd SID exactly once.
                unsafe { LocalFree(raw) };
                prop_assert_eq!(back, sid);
            }
        }
    }
}
