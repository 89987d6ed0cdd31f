//! Process-token privilege elevation for ownership changes.
//!
//! Taking ownership of an object the caller does not already control
//! needs `SeTakeOwnership`, `SeSecurity`, `SeBackup` and `SeRestore`
//! enabled on the process token. The token is process-global state:
//! two threads adjusting it concurrently would see each other's
//! privilege windows. A process-wide mutex serializes the whole
//! enable, apply, disable sequence so at most one window is open at a
//! time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use windows_sys::Win32::Foundation::LUID;
use windows_sys::Win32::Security::{
    AdjustTokenPrivileges, LookupPrivilegeValueW, LUID_AND_ATTRIBUTES, SE_BACKUP_NAME,
    SE_PRIVILEGE_ENABLED, SE_RESTORE_NAME, SE_SECURITY_NAME, SE_TAKE_OWNERSHIP_NAME,
    TOKEN_ADJUST_PRIVILEGES,
};
use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
use windows_sys::core::PCWSTR;

use crate::error::{Error, OsError};
use crate::resource::Handle;

const PRIVILEGE_NAMES: [PCWSTR; 4] = [
    SE_TAKE_OWNERSHIP_NAME,
    SE_SECURITY_NAME,
    SE_BACKUP_NAME,
    SE_RESTORE_NAME,
];

/// `TOKEN_PRIVILEGES` with room for all four privileges at once.
#[repr(C)]
struct TokenPrivileges4 {
    privilege_count: u32,
    privileges: [LUID_AND_ATTRIBUTES; 4],
}

static WINDOW: Mutex<()> = Mutex::new(());

/// An open privilege window on the process token.
///
/// Holds the serialization lock for its whole lifetime; dropping it
/// disables the privileges on a best-effort basis, [`disable`] does so
/// with error reporting.
///
/// [`disable`]: PrivilegeWindow::disable
pub(crate) struct PrivilegeWindow {
    token: Handle,
    enabled: bool,
    _serial: MutexGuard<'static, ()>,
}

impl PrivilegeWindow {
    /// Enables the ownership privileges on the process token.
    ///
    /// Privileges the process does not hold are simply not enabled;
    /// whether the window suffices is decided by the mutation call it
    /// wraps. A caller who owns the object needs none of them.
    pub(crate) fn enable() -> Result<Self, Error> {
        let serial = WINDOW.lock().unwrap_or_else(PoisonError::into_inner);

        let mut token = Handle::empty();
        // SAFETY: GetCurrentProcess returns a pseudo-handle that needs
        // no closing; the out pointer receives the token handle the
        // wrapper then owns.
        let opened = unsafe {
            OpenProcessToken(GetCurrentProcess(), TOKEN_ADJUST_PRIVILEGES, token.slot())
        };
        if opened == 0 {
            return Err(OsError::last("OpenProcessToken").into());
        }

        let mut window = Self {
            token,
            enabled: false,
            _serial: serial,
        };
        window.adjust(SE_PRIVILEGE_ENABLED)?;
        window.enabled = true;
        Ok(window)
    }

    /// Disables the privileges and closes the token, reporting any
    /// failure on the way down.
    pub(crate) fn disable(mut self) -> Result<(), Error> {
        self.adjust(0)?;
        self.enabled = false;
        if self.token.release() {
            Ok(())
        } else {
            Err(OsError::last("CloseHandle").into())
        }
    }

    /// Sets all four privileges to `attributes` on the token.
    fn adjust(&mut self, attributes: u32) -> Result<(), Error> {
        let mut state = TokenPrivileges4 {
            privilege_count: PRIVILEGE_NAMES.len() as u32,
            privileges: [LUID_AND_ATTRIBUTES {
                Luid: LUID {
                    LowPart: 0,
                    HighPart: 0,
                },
                Attributes: attributes,
            }; 4],
        };
        for (name, entry) in PRIVILEGE_NAMES.iter().zip(state.privileges.iter_mut()) {
            // SAFETY: `name` is a NUL-terminated privilege-name constant
            // and the out pointer is a live LUID.
            if unsafe { LookupPrivilegeValueW(core::ptr::null(), *name, &mut entry.Luid) } == 0 {
                return Err(OsError::last("LookupPrivilegeValueW").into());
            }
        }

        // SAFETY: `state` matches the TOKEN_PRIVILEGES layout for four
        // entries and the token was opened with TOKEN_ADJUST_PRIVILEGES.
        let adjusted = unsafe {
            AdjustTokenPrivileges(
                self.token.as_ptr(),
                0,
                core::ptr::from_ref(&state).cast(),
                0,
                core::ptr::null_mut(),
                core::ptr::null_mut(),
            )
        };
        if adjusted == 0 {
            return Err(OsError::last("AdjustTokenPrivileges").into());
        }
        // A partial grant (ERROR_NOT_ALL_ASSIGNED with a successful
        // return) is fine: the mutation call decides whether whatever
        // was enabled suffices.
        Ok(())
    }
}

impl Drop for PrivilegeWindow {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.adjust(0);
        }
    }
}
