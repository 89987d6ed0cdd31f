#![cfg_attr(not(windows), allow(dead_code))]

use crate::qualified_name::QualifiedName;
use crate::sid::SecurityId;

/// Placeholder password field carried by both record kinds.
pub(crate) const PASSWD_PLACEHOLDER: &str = "x";

/// A resolved user account.
///
/// `gid` is the user's primary group when it could be determined; lookups
/// against accounts the caller may not query leave it `None` rather than
/// failing outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: QualifiedName,
    pub uid: SecurityId,
    pub gid: Option<SecurityId>,
    pub passwd: String,
    pub gecos: Option<String>,
    pub shell: Option<String>,
    pub dir: Option<String>,
}

impl UserRecord {
    pub(crate) fn new(name: QualifiedName, uid: SecurityId) -> Self {
        Self {
            name,
            uid,
            gid: None,
            passwd: PASSWD_PLACEHOLDER.to_owned(),
            gecos: None,
            shell: None,
            dir: None,
        }
    }
}

/// A resolved group account with its direct members.
///
/// `members` is empty when enumeration is disabled, denied, or the
/// principal kind cannot have members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: QualifiedName,
    pub gid: SecurityId,
    pub passwd: String,
    pub members: Vec<QualifiedName>,
}

impl GroupRecord {
    pub(crate) fn new(name: QualifiedName, gid: SecurityId) -> Self {
        Self {
            name,
            gid,
            passwd: PASSWD_PLACEHOLDER.to_owned(),
            members: Vec::new(),
        }
    }
}
