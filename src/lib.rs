//! # POSIX-shaped security principal primitives for Windows
//!
//! User, group and file-ownership building blocks over Windows SIDs.
//! The crate provides:
//! - [`SecurityId`]: an owned SID value type with textual (`S-1-…`) and
//!   binary conversions.
//! - [`SidIdentifierAuthority`]: the 6-byte authority component of SIDs.
//! - [`SidType`]: Rust enum mirroring `SID_NAME_USE` for account lookup.
//! - [`QualifiedName`], [`UserRecord`], [`GroupRecord`]: resolved
//!   accounts in a `passwd`/`group`-like shape.
//! - (Windows) [`user_by_name`], [`user_by_sid`], [`group_by_name`],
//!   [`group_by_sid`]: principal resolution against the local machine,
//!   BUILTIN, or the account's domain controller.
//! - (Windows) [`ownership`]: reading and privileged changing of the
//!   owner and primary group of files and handles.
//! - (Windows) [`token`]: the identity of the current process.
//!
//! ## Lookup semantics
//! - A name or SID no account maps to resolves to `Ok(None)`, never an
//!   error.
//! - A principal of the wrong kind for the requested lookup is
//!   [`Error::UnexpectedType`].
//! - Account databases the caller may not read degrade the result (a
//!   user record without enrichment, a group without members) instead
//!   of failing it.
//! - Group member enumeration can be turned off process-wide with
//!   [`config::set_enumerate_members`].
//!
//! ## Examples
//! ### Parse and render a SID
//! ```rust
//! use win_principals::SecurityId;
//!
//! let sid: SecurityId = "S-1-5-32-544".parse().unwrap();
//! assert_eq!(sid.to_string(), "S-1-5-32-544"); // BUILTIN\Administrators
//! ```

mod accounts;
pub mod config;
mod error;
mod qualified_name;
mod records;
mod sid;
mod sid_identifier_authority;
mod sid_type;
pub mod well_known;

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        mod lookup;
        mod membership;
        pub mod ownership;
        mod privileges;
        mod probe;
        mod resource;
        pub mod token;
        mod wide;

        pub use accounts::{group_by_name, group_by_sid, user_by_name, user_by_sid};

        /// Number of member-enumeration calls issued so far. A testing
        /// seam, not API.
        #[doc(hidden)]
        #[must_use]
        pub fn member_enumeration_count() -> u64 {
            membership::call_count()
        }
    } else {
        mod resource;
    }
}

pub use accounts::Scope;
pub use error::{Error, OsError};
pub use qualified_name::QualifiedName;
pub use records::{GroupRecord, UserRecord};
pub use sid::{InvalidSidFormat, SecurityId, MAX_SID_BYTES};
pub use sid_identifier_authority::SidIdentifierAuthority;
pub use sid_type::SidType;
