/// Identifier authority component of a SID (6-byte big-endian value).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SidIdentifierAuthority {
    /// Raw big-endian bytes of the authority.
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// Null authority (S-1-0).
    pub const NULL_AUTHORITY: Self = Self::from_u16(0);
    /// World authority (S-1-1).
    pub const WORLD_AUTHORITY: Self = Self::from_u16(1);
    /// Local authority (S-1-2).
    pub const LOCAL_AUTHORITY: Self = Self::from_u16(2);
    /// Creator authority (S-1-3).
    pub const CREATOR_AUTHORITY: Self = Self::from_u16(3);
    /// NT authority (S-1-5), the authority of account and builtin SIDs.
    pub const NT_AUTHORITY: Self = Self::from_u16(5);

    const fn from_u16(value: u16) -> Self {
        let [hi, lo] = value.to_be_bytes();
        Self {
            value: [0, 0, 0, 0, hi, lo],
        }
    }

    /// Numeric value of the authority, as printed in the textual encoding.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        let v = self.value;
        u64::from_be_bytes([0, 0, v[0], v[1], v[2], v[3], v[4], v[5]])
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        pub fn arb_identifier_authority()
            (val in 0u8..=5)
            -> SidIdentifierAuthority {
            let mut bytes = [0u8; 6];
            bytes[5] = val;
            SidIdentifierAuthority::from(bytes)
        }
    }

    #[test]
    fn numeric_value_matches_constants() {
        assert_eq!(SidIdentifierAuthority::NT_AUTHORITY.as_u64(), 5, "S-1-5");
        assert_eq!(SidIdentifierAuthority::NULL_AUTHORITY.as_u64(), 0, "S-1-0");
    }
}
