#![cfg_attr(not(windows), allow(dead_code))]

use parsing::InvalidSidFormat;
use thiserror::Error;

use crate::sid_type::SidType;

/// Win32 error code reported for a lookup that resolved to the wrong
/// kind of principal.
const ERROR_BAD_ARGUMENTS: u32 = 160;

/// A failed OS call, carrying the raw Win32 error code and the name of
/// the call that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{call} failed with error {code}")]
pub struct OsError {
    pub code: u32,
    pub call: &'static str,
}

impl OsError {
    pub(crate) const fn new(call: &'static str, code: u32) -> Self {
        Self { code, call }
    }

    /// Captures `GetLastError` for `call`.
    #[cfg(windows)]
    pub(crate) fn last(call: &'static str) -> Self {
        // SAFETY: GetLastError reads thread-local state and cannot fail.
        let code = unsafe { windows_sys::Win32::Foundation::GetLastError() };
        Self::new(call, code)
    }
}

/// Errors produced by principal resolution and ownership mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An ownership update was requested with neither an owner nor a
    /// group to set.
    #[error("nothing to change")]
    NothingToChange,

    /// A textual SID did not parse.
    #[error(transparent)]
    InvalidSid(#[from] InvalidSidFormat),

    /// A name or SID resolved, but to a principal of the wrong kind for
    /// the requested lookup.
    #[error("principal is a {sid_type:?}, not the requested kind")]
    UnexpectedType { sid_type: SidType },

    /// An OS call failed.
    #[error(transparent)]
    Os(#[from] OsError),
}

impl Error {
    /// The Win32 error code closest to this error, for callers that
    /// surface numeric codes.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Os(os) => Some(os.code),
            Self::UnexpectedType { .. } => Some(ERROR_BAD_ARGUMENTS),
            Self::NothingToChange | Self::InvalidSid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_error_displays_call_and_code() {
        let err = OsError::new("LookupAccountNameW", 5);
        assert_eq!(err.to_string(), "LookupAccountNameW failed with error 5");
    }

    #[test]
    fn unexpected_type_maps_to_bad_arguments() {
        let err = Error::UnexpectedType {
            sid_type: SidType::User,
        };
        assert_eq!(err.code(), Some(ERROR_BAD_ARGUMENTS));
        assert_eq!(Error::NothingToChange.code(), None);
    }
}
