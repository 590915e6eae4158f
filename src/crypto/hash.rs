//! Digest primitives
//!
//! Every digest in the simulator goes through a [`DigestOracle`]. The oracle is
//! chosen once at startup and handed to whoever needs to hash; there is no
//! process-wide hashing state.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::sync::Arc;

/// 32-byte digest output, rendered as 64 hex characters
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of leading `0` characters in the hex rendering
    pub fn leading_zero_digits(&self) -> u32 {
        let mut zeros = 0;
        for byte in self.0 {
            if byte == 0 {
                zeros += 2;
                continue;
            }
            if byte >> 4 == 0 {
                zeros += 1;
            }
            break;
        }
        zeros
    }

    /// Whether the first `digits` hex characters are all zero
    pub fn meets_difficulty(&self, digits: u32) -> bool {
        self.leading_zero_digits() >= digits
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hex rendering of an optional digest; `None` renders as the empty string
pub fn hex_or_empty(hash: Option<&Hash>) -> String {
    hash.map(Hash::to_hex).unwrap_or_default()
}

/// Deterministic payload -> digest function.
///
/// Implementations must return the same digest for the same payload for the
/// lifetime of the process. Nothing else is required of them.
pub trait DigestOracle: Send + Sync {
    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Digest an arbitrary payload
    fn digest(&self, payload: &[u8]) -> Hash;

    /// Digest two digests concatenated as hex text (Merkle inner nodes)
    fn digest_pair(&self, left: &Hash, right: &Hash) -> Hash {
        let mut text = String::with_capacity(128);
        text.push_str(&left.to_hex());
        text.push_str(&right.to_hex());
        self.digest(text.as_bytes())
    }
}

/// Shared handle to the oracle selected at startup
pub type SharedOracle = Arc<dyn DigestOracle>;

/// BLAKE3 oracle (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Oracle;

impl DigestOracle for Blake3Oracle {
    fn name(&self) -> &'static str {
        "blake3"
    }

    fn digest(&self, payload: &[u8]) -> Hash {
        Hash(*blake3::hash(payload).as_bytes())
    }
}

/// SHA-256 oracle
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Oracle;

impl DigestOracle for Sha256Oracle {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, payload: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Hash(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        for oracle in [&Blake3Oracle as &dyn DigestOracle, &Sha256Oracle] {
            let hash1 = oracle.digest(b"hello world");
            let hash2 = oracle.digest(b"hello world");
            assert_eq!(hash1, hash2);
            assert_ne!(hash1, oracle.digest(b"hello"));
        }
    }

    #[test]
    fn test_oracles_differ() {
        assert_ne!(Blake3Oracle.digest(b"x"), Sha256Oracle.digest(b"x"));
    }

    #[test]
    fn test_sha256_known_vector() {
        let hash = Sha256Oracle.digest(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hex_rendering() {
        let hash = Blake3Oracle.digest(b"test");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        assert_eq!(hash.to_string(), hex);
        assert_eq!(hex_or_empty(Some(&hash)), hex);
        assert_eq!(hex_or_empty(None), "");
    }

    #[test]
    fn test_leading_zero_digits() {
        let mut bytes = [0xffu8; 32];
        assert_eq!(Hash(bytes).leading_zero_digits(), 0);

        bytes[0] = 0x0f;
        assert_eq!(Hash(bytes).leading_zero_digits(), 1);

        bytes[0] = 0x00;
        bytes[1] = 0x01;
        let hash = Hash(bytes);
        assert_eq!(hash.leading_zero_digits(), 3);
        assert!(hash.to_hex().starts_with("000"));
        assert!(hash.meets_difficulty(3));
        assert!(!hash.meets_difficulty(4));

        assert_eq!(Hash([0u8; 32]).leading_zero_digits(), 64);
    }

    #[test]
    fn test_digest_pair_order_matters() {
        let left = Blake3Oracle.digest(b"left");
        let right = Blake3Oracle.digest(b"right");
        assert_eq!(
            Blake3Oracle.digest_pair(&left, &right),
            Blake3Oracle.digest_pair(&left, &right)
        );
        assert_ne!(
            Blake3Oracle.digest_pair(&left, &right),
            Blake3Oracle.digest_pair(&right, &left)
        );
    }

    #[test]
    fn test_hex_or_empty() {
        assert_eq!(hex_or_empty(None), "");
        let hash = Blake3Oracle.digest(b"a");
        assert_eq!(hex_or_empty(Some(&hash)), hash.to_hex());
    }
}
