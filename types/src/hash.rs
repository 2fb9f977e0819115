//! Content hashes for transactions and blocks.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

type Blake2b256 = Blake2b<U32>;

/// Blake2b with a 32-byte digest; the identity of every stored record.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(data));
    out
}

fn parse_hex32(s: &str) -> Result<[u8; 32], TypesError> {
    let bytes = hex::decode(s.trim()).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        TypesError::InvalidHex(format!("expected 32 bytes, got {}", v.len()))
    })
}

macro_rules! digest_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                *self == Self::ZERO
            }
        }

        /// Short form: the first four bytes.
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}..)"), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex32(s).map(Self)
            }
        }
    };
}

digest_newtype! {
    /// Hash of an encoded transaction record.
    TxHash
}

digest_newtype! {
    /// Hash of an encoded block record. [`BlockHash::ZERO`] is the parent of
    /// the first block.
    BlockHash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_depends_on_input() {
        assert_eq!(blake2b_256(b"mindepth"), blake2b_256(b"mindepth"));
        assert_ne!(blake2b_256(b"ring"), blake2b_256(b"rings"));
    }

    #[test]
    fn debug_is_abbreviated() {
        let hash = BlockHash::new([0xab; 32]);
        assert_eq!(format!("{hash:?}"), "BlockHash(abababab..)");
    }

    #[test]
    fn tx_hash_parses_its_own_display() {
        let hash = TxHash::new([0xab; 32]);
        let parsed: TxHash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn short_hex_is_rejected() {
        let err = "abcd".parse::<TxHash>().unwrap_err();
        assert!(matches!(err, TypesError::InvalidHex(_)));
    }

    #[test]
    fn non_hex_is_rejected() {
        let input = "zz".repeat(32);
        assert!(input.parse::<BlockHash>().is_err());
    }
}
