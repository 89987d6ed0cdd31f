//! Owned Windows Security Identifier (SID) value type.
//!
//! `SecurityId` stores the components of a SID (revision, 6-byte identifier
//! authority, 1..=15 sub-authorities) and converts to and from the binary
//! layout Windows uses in memory: an 8-byte header followed by the
//! sub-authorities as native-endian `u32` values. Two identifiers are equal
//! iff their binary encodings are equal.

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::SidBuffer;

use core::fmt::{self, Debug, Display};
use core::str::FromStr;

use arrayvec::ArrayVec;
use parsing::{MAX_SUBAUTHORITY_COUNT, MIN_SUBAUTHORITY_COUNT, SidComponents};

pub use parsing::InvalidSidFormat;

use crate::SidIdentifierAuthority;

/// Size in bytes of the fixed SID header (revision, count, authority).
const SID_HEAD_BYTES: usize = 8;

/// Largest binary encoding of a SID: header plus 15 sub-authorities.
pub const MAX_SID_BYTES: usize =
    SID_HEAD_BYTES + core::mem::size_of::<u32>() * MAX_SUBAUTHORITY_COUNT as usize;

/// Owned security principal identifier.
///
/// Immutable once constructed; cheap to clone (inline storage, no heap).
///
/// # Examples
/// ```rust
/// use win_principals::{SecurityId, SidIdentifierAuthority};
///
/// // BUILTIN\Administrators
/// let sid = SecurityId::try_new(SidIdentifierAuthority::NT_AUTHORITY, &[32, 544]).unwrap();
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// assert_eq!(sid, "S-1-5-32-544".parse().unwrap());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecurityId {
    revision: u8,
    identifier_authority: SidIdentifierAuthority,
    sub_authorities: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

impl SecurityId {
    /// The only SID revision in use.
    pub const REVISION: u8 = 1;

    /// Creates a new `SecurityId`, validating the sub-authority count.
    ///
    /// Returns `None` when `sub_authorities` is empty or longer than 15.
    #[must_use]
    pub fn try_new<I: Into<SidIdentifierAuthority>>(
        identifier_authority: I,
        sub_authorities: &[u32],
    ) -> Option<Self> {
        if sub_authorities.is_empty() || sub_authorities.len() > MAX_SUBAUTHORITY_COUNT as usize {
            return None;
        }
        let mut subs = ArrayVec::new();
        subs.try_extend_from_slice(sub_authorities).ok()?;
        Some(Self {
            revision: Self::REVISION,
            identifier_authority: identifier_authority.into(),
            sub_authorities: subs,
        })
    }

    /// The SID revision, 1 for every SID Windows produces.
    #[must_use]
    pub const fn revision(&self) -> u8 {
        self.revision
    }

    /// The 6-byte identifier authority.
    #[must_use]
    pub const fn identifier_authority(&self) -> SidIdentifierAuthority {
        self.identifier_authority
    }

    /// The sub-authority values, 1..=15 of them.
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        self.sub_authorities.as_slice()
    }

    /// The relative identifier: the final sub-authority.
    #[must_use]
    pub fn rid(&self) -> u32 {
        // Invariant: sub_authorities is never empty.
        self.sub_authorities.last().copied().unwrap_or_default()
    }

    /// Returns a copy of this SID with the final sub-authority replaced.
    ///
    /// This is how the platform encodes a domain-relative principal (such as
    /// a user's primary group) against a known prefix: same authority and
    /// sub-authority chain, different trailing RID.
    #[must_use]
    pub fn with_rid(&self, rid: u32) -> Self {
        let mut out = self.clone();
        if let Some(last) = out.sub_authorities.last_mut() {
            *last = rid;
        }
        out
    }

    /// Binary encoding in the Windows in-memory SID layout.
    #[must_use]
    pub fn to_bytes(&self) -> ArrayVec<u8, MAX_SID_BYTES> {
        let mut out = ArrayVec::new();
        out.push(self.revision);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "sub-authority count is at most 15"
        )]
        out.push(self.sub_authorities.len() as u8);
        let _ = out.try_extend_from_slice(&self.identifier_authority.value);
        for sub in &self.sub_authorities {
            let _ = out.try_extend_from_slice(&sub.to_le_bytes());
        }
        out
    }

    /// Decodes a SID from its binary encoding.
    ///
    /// The buffer must be exactly the encoded size for its embedded
    /// sub-authority count; revision and count are validated the way
    /// `IsValidSid` would.
    ///
    /// # Errors
    /// [`InvalidSidFormat`] when the buffer is not a valid SID encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidSidFormat> {
        let (&revision, rest) = bytes.split_first().ok_or(InvalidSidFormat)?;
        let (&count, rest) = rest.split_first().ok_or(InvalidSidFormat)?;
        if revision != Self::REVISION
            || count < MIN_SUBAUTHORITY_COUNT
            || count > MAX_SUBAUTHORITY_COUNT
        {
            return Err(InvalidSidFormat);
        }
        if bytes.len() != SID_HEAD_BYTES + core::mem::size_of::<u32>() * count as usize {
            return Err(InvalidSidFormat);
        }
        let (authority, subs) = rest.split_at(6);
        let identifier_authority: [u8; 6] = authority.try_into().map_err(|_| InvalidSidFormat)?;
        let mut sub_authorities = ArrayVec::new();
        for chunk in subs.chunks_exact(core::mem::size_of::<u32>()) {
            let le: [u8; 4] = chunk.try_into().map_err(|_| InvalidSidFormat)?;
            sub_authorities
                .try_push(u32::from_le_bytes(le))
                .map_err(|_| InvalidSidFormat)?;
        }
        Ok(Self {
            revision,
            identifier_authority: identifier_authority.into(),
            sub_authorities,
        })
    }
}

impl Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.revision)?;

        // Identifier authority: decimal when it fits in u32, hex otherwise.
        let id_auth_value = self.identifier_authority.as_u64();
        if id_auth_value <= u64::from(u32::MAX) {
            write!(f, "-{id_auth_value}")?;
        } else {
            write!(f, "-0x{id_auth_value:X}")?;
        }

        for &sub_auth in self.sub_authorities() {
            write!(f, "-{sub_auth}")?;
        }
        Ok(())
    }
}

impl Debug for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecurityId({self})")
    }
}

impl FromStr for SecurityId {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = SidComponents::from_str(s)?;
        if components.revision != Self::REVISION {
            return Err(InvalidSidFormat);
        }
        Self::try_new(
            components.identifier_authority,
            components.sub_authority.as_slice(),
        )
        .ok_or(InvalidSidFormat)
    }
}

impl TryFrom<&[u8]> for SecurityId {
    type Error = InvalidSidFormat;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::expect_used, reason = "Expect is not an issue in test")]
pub(crate) mod test {
    use super::*;
    use crate::sid_identifier_authority::test::arb_identifier_authority;
    use proptest::prelude::*;

    pub(crate) fn arb_security_id() -> impl Strategy<Value = SecurityId> {
        (
            arb_identifier_authority(),
            proptest::collection::vec(any::<u32>(), 1..=15),
        )
            .prop_map(|(identifier_authority, sub_authorities)| {
                SecurityId::try_new(identifier_authority, sub_authorities.as_slice())
                    .expect("valid SID parts")
            })
    }

    proptest! {
        #[test]
        fn display_round_trip(sid in arb_security_id()) {
            let display = sid.to_string();
            prop_assert!(display.starts_with("S-1-"), "Display does not start with S-1-: {}", display);

            let dash_count = display.matches('-').count();
            let expected = sid.sub_authorities().len() + 2;
            prop_assert_eq!(dash_count, expected, "unexpected dash count in {}", display);
            prop_assert_eq!(display.parse::<SecurityId>().unwrap(), sid);
        }

        #[test]
        fn binary_round_trip(sid in arb_security_id()) {
            let bytes = sid.to_bytes();
            prop_assert_eq!(bytes.len(), 8 + 4 * sid.sub_authorities().len(), "encoded size");
            prop_assert_eq!(SecurityId::from_bytes(&bytes).unwrap(), sid);
        }

        #[test]
        fn equality_is_binary_equality(a in arb_security_id(), b in arb_security_id()) {
            prop_assert_eq!(a == b, a.to_bytes() == b.to_bytes());
        }

        #[test]
        fn with_rid_replaces_only_the_last_sub_authority(sid in arb_security_id(), rid in any::<u32>()) {
            let mapped = sid.with_rid(rid);
            prop_assert_eq!(mapped.rid(), rid);
            prop_assert_eq!(
                &mapped.sub_authorities()[..mapped.sub_authorities().len() - 1],
                &sid.sub_authorities()[..sid.sub_authorities().len() - 1]
            );
            prop_assert_eq!(mapped.identifier_authority(), sid.identifier_authority());
        }
    }

    #[test]
    fn known_binary_encoding() {
        // S-1-5-32-544 (BUILTIN\Administrators)
        let sid = SecurityId::try_new(crate::SidIdentifierAuthority::NT_AUTHORITY, &[32, 544])
            .unwrap();
        assert_eq!(
            sid.to_bytes().as_slice(),
            &[1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0],
            "binary layout must match the Windows SID layout"
        );
    }

    #[test]
    fn rejects_truncated_and_oversized_buffers() {
        let sid = SecurityId::try_new(crate::SidIdentifierAuthority::NT_AUTHORITY, &[32, 544])
            .unwrap();
        let bytes = sid.to_bytes();
        assert!(SecurityId::from_bytes(&bytes[..bytes.len() - 1]).is_err(), "truncated");
        let mut longer = bytes.to_vec();
        longer.push(0);
        assert!(SecurityId::from_bytes(&longer).is_err(), "trailing garbage");
    }

    #[test]
    fn debug_includes_textual_form() {
        let sid = crate::well_known::null_sid();
        assert_eq!(format!("{sid:?}"), "SecurityId(S-1-0-0)");
    }
}
