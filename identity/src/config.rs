//! # Protocol Configuration & Constants
//!
//! Every magic number of the identity core lives here. Most of them are not
//! ours to choose: they come from SEC 2, BIP32, BIP39 and the PRISM DID
//! method, and changing any of them silently forks every identity ever
//! created with this library.
//!
//! The one thing that *is* configurable is which curve backend the engine
//! uses, via [`EngineConfig`]. There is exactly one production backend today.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Curve Parameters
// ---------------------------------------------------------------------------

/// The named curve used for every key in the system.
pub const CURVE_NAME: &str = "secp256k1";

/// Signature scheme, named the way the JVM wallet names it.
pub const SIGNATURE_ALGORITHM: &str = "SHA256withECDSA";

/// A private scalar, big-endian, fixed width.
pub const PRIVATE_KEY_BYTE_SIZE: usize = 32;

/// One affine coordinate of a public point, big-endian, fixed width.
pub const PUBLIC_KEY_COORDINATE_BYTE_SIZE: usize = 32;

/// SEC1 uncompressed point: `0x04 || x || y`.
pub const PUBLIC_KEY_BYTE_SIZE: usize = 1 + 2 * PUBLIC_KEY_COORDINATE_BYTE_SIZE;

/// SEC1 compressed point: `0x02|0x03 || x`.
pub const COMPRESSED_PUBLIC_KEY_BYTE_SIZE: usize = 1 + PUBLIC_KEY_COORDINATE_BYTE_SIZE;

/// Fixed-size ECDSA signature: `r || s`.
pub const SIGNATURE_BYTE_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// Hierarchical Deterministic Derivation (BIP32)
// ---------------------------------------------------------------------------

/// Top bit of a packed child index marks a hardened derivation step.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// Largest axis number representable below the hardened bit.
pub const MAX_AXIS_NUMBER: u32 = HARDENED_BIT - 1;

/// HMAC key used to turn a seed into the master extended key.
pub const BIP32_SEED_KEY: &[u8] = b"Bitcoin seed";

/// Chain code length in bytes.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// BIP32 accepts seeds between 128 and 512 bits.
pub const MIN_SEED_LENGTH: usize = 16;
pub const MAX_SEED_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Mnemonic Codes (BIP39)
// ---------------------------------------------------------------------------

/// Word counts a mnemonic may have. Anything else is rejected before we even
/// look at the words.
pub const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// What the wallet generates for new users.
pub const DEFAULT_WORD_COUNT: usize = 12;

/// Each word encodes 11 bits of entropy-plus-checksum.
pub const BITS_PER_WORD: usize = 11;

/// Number of words in the canonical wordlist (2^11).
pub const WORDLIST_SIZE: usize = 2048;

/// Length of the stretched binary seed.
pub const BINARY_SEED_LENGTH: usize = 64;

/// PBKDF2-HMAC-SHA512 iteration count mandated by BIP39.
pub const SEED_STRETCH_ROUNDS: u32 = 2048;

// ---------------------------------------------------------------------------
// PRISM DIDs
// ---------------------------------------------------------------------------

/// Every identifier we produce starts with this.
pub const DID_PRISM_PREFIX: &str = "did:prism:";

/// Legacy prefix still accepted by the parser for demo environments.
pub const DID_TEST_PREFIX: &str = "did:test:";

/// Key id of the master key inside a create-DID operation.
pub const MASTER_KEY_ID: &str = "master0";

/// Key id of the optional issuing key inside a create-DID operation.
pub const ISSUING_KEY_ID: &str = "issuing0";

/// Length of the hex-encoded SHA-256 state hash (the canonical suffix).
pub const STATE_HASH_HEX_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Engine Selection
// ---------------------------------------------------------------------------

/// Which implementation backs the elliptic-curve engine.
///
/// The wallet used to pick a provider by reflection at startup. Here the
/// choice is an explicit value handed to [`crate::crypto::engine_for`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveBackend {
    /// Pure-Rust secp256k1 from the RustCrypto `k256` crate.
    #[default]
    K256,
}

/// Returned when a backend name doesn't match any known backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown curve backend '{0}' (expected one of: k256)")]
pub struct UnknownBackend(pub String);

impl FromStr for CurveBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "k256" => Ok(CurveBackend::K256),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for CurveBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveBackend::K256 => write!(f, "k256"),
        }
    }
}

/// Construction-time configuration for the crypto engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Curve implementation to instantiate.
    #[serde(default)]
    pub backend: CurveBackend,
}

impl EngineConfig {
    /// Configuration for a specific backend.
    pub fn with_backend(backend: CurveBackend) -> Self {
        Self { backend }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_constants() {
        assert_eq!(PRIVATE_KEY_BYTE_SIZE, 32);
        assert_eq!(PUBLIC_KEY_BYTE_SIZE, 65);
        assert_eq!(COMPRESSED_PUBLIC_KEY_BYTE_SIZE, 33);
        assert_eq!(SIGNATURE_BYTE_SIZE, 64);
    }

    #[test]
    fn test_hardened_bit_is_top_bit() {
        assert_eq!(HARDENED_BIT, 1 << 31);
        assert_eq!(MAX_AXIS_NUMBER, i32::MAX as u32);
    }

    #[test]
    fn test_word_counts_encode_whole_bytes() {
        // 11 bits per word, one checksum bit per 32 entropy bits: every
        // supported length must leave a whole number of entropy bytes.
        for count in SUPPORTED_WORD_COUNTS {
            let total_bits = count * BITS_PER_WORD;
            let entropy_bits = total_bits * 32 / 33;
            assert_eq!(entropy_bits % 8, 0, "{count} words");
            assert_eq!(total_bits - entropy_bits, entropy_bits / 32);
        }
        assert!(SUPPORTED_WORD_COUNTS.contains(&DEFAULT_WORD_COUNT));
        assert_eq!(WORDLIST_SIZE, 1 << BITS_PER_WORD);
    }

    #[test]
    fn test_seed_bounds() {
        assert!(MIN_SEED_LENGTH < MAX_SEED_LENGTH);
        assert_eq!(MAX_SEED_LENGTH, BINARY_SEED_LENGTH);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("k256".parse::<CurveBackend>().unwrap(), CurveBackend::K256);
        assert_eq!("K256".parse::<CurveBackend>().unwrap(), CurveBackend::K256);
        assert!("openssl".parse::<CurveBackend>().is_err());
        assert_eq!(CurveBackend::K256.to_string(), "k256");
    }

    #[test]
    fn test_engine_config_serde() {
        let config: EngineConfig = serde_json::from_str(r#"{"backend":"k256"}"#).unwrap();
        assert_eq!(config, EngineConfig::default());

        let empty: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.backend, CurveBackend::K256);
    }
}
