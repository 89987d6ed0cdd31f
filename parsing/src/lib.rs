//! Parsing of the canonical textual SID encoding (`S-R-A-S1-...-Sn`).
//!
//! This crate is the platform-independent half of `win-principals`: it turns
//! the dashed string form into raw SID components and nothing more. The
//! owning SID type lives in the main crate.

use core::fmt::{self, Display};
use core::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Smallest number of sub-authorities a valid SID carries.
pub const MIN_SUBAUTHORITY_COUNT: u8 = 1;
/// Largest number of sub-authorities a valid SID carries.
pub const MAX_SUBAUTHORITY_COUNT: u8 = 15;

/// Raw components of a SID as read from its canonical textual encoding.
pub struct SidComponents {
    /// The SID revision value, generally 1.
    pub revision: u8,
    /// The SID identifier authority value (big-endian 6-byte form).
    pub identifier_authority: [u8; 6],
    /// The SID sub-authority values, 1..=15 of them.
    pub sub_authority: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

/// Error type returned when parsing a SID string fails due to an invalid format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct InvalidSidFormat;

impl Display for InvalidSidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid SID format")
    }
}

/// Identifier authorities above `u32::MAX` are rendered in hex (`0x...`);
/// accept both spellings so `Display` output always parses back.
fn parse_authority(s: &str) -> Result<[u8; 6], InvalidSidFormat> {
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|_| InvalidSidFormat)?
    } else {
        s.parse::<u64>().map_err(|_| InvalidSidFormat)?
    };
    if value > 0x0000_FFFF_FFFF_FFFF {
        return Err(InvalidSidFormat);
    }
    let bytes = value.to_be_bytes();
    bytes[2..].try_into().map_err(|_| InvalidSidFormat)
}

impl FromStr for SidComponents {
    type Err = InvalidSidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s_cmp = s.split('-');
        if !s_cmp
            .next()
            .is_some_and(|head| head.eq_ignore_ascii_case("s"))
        {
            return Err(InvalidSidFormat);
        }
        let revision = s_cmp
            .next()
            .ok_or(InvalidSidFormat)?
            .parse::<u8>()
            .map_err(|_| InvalidSidFormat)?;

        let identifier_authority = s_cmp
            .next()
            .ok_or(InvalidSidFormat)
            .and_then(parse_authority)?;

        let mut sub_authority = ArrayVec::new();
        for item in s_cmp {
            let item = item.parse::<u32>().map_err(|_| InvalidSidFormat)?;
            sub_authority.try_push(item).map_err(|_| InvalidSidFormat)?;
        }
        if sub_authority.len() < MIN_SUBAUTHORITY_COUNT as usize {
            return Err(InvalidSidFormat);
        }

        Ok(Self {
            revision,
            identifier_authority,
            sub_authority,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_administrators() {
        let c = SidComponents::from_str("S-1-5-32-544").unwrap();
        assert_eq!(c.revision, 1, "revision");
        assert_eq!(c.identifier_authority, [0, 0, 0, 0, 0, 5], "authority");
        assert_eq!(c.sub_authority.as_slice(), &[32, 544], "sub-authorities");
    }

    #[test]
    fn accepts_lowercase_prefix_and_hex_authority() {
        let c = SidComponents::from_str("s-1-0x100000000-1").unwrap();
        assert_eq!(c.identifier_authority, [0, 1, 0, 0, 0, 0], "authority");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "S",
            "S-1",
            "S-1-5",
            "X-1-5-32",
            "S-1-5-abc",
            "S-256-5-32",
            "S-1-0x1000000000000-1",
            "S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16",
        ] {
            assert!(
                SidComponents::from_str(bad).is_err(),
                "should reject {bad:?}"
            );
        }
    }
}
