//! # Hierarchical Deterministic Keys
//!
//! From twelve words to any number of keys:
//!
//! ```text
//! MnemonicCode ──binary_seed──▶ seed ──ExtendedKey::from_seed──▶ m
//!                                                               │ derive
//!                                                               ▼
//!                                                  m/didIndex'/keyType'/keyIndex'
//! ```
//!
//! The PRISM wallet fixes one layout on top of BIP32: every DID gets its own
//! hardened branch, every key type a hardened sub-branch, every key a hardened
//! leaf. [`key_derivation_path`] builds those paths and
//! [`derive_key_from_full_path`] walks them.

pub mod axis;
pub mod extended;
pub mod mnemonic;
pub mod path;

pub use axis::DerivationAxis;
pub use extended::ExtendedKey;
pub use mnemonic::{binary_seed, MnemonicCode, MnemonicError, WordCount};
pub use path::DerivationPath;

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::crypto::{CryptoError, EcKeyPair, EllipticCurveEngine};

/// Errors from paths, axes and extended-key derivation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DerivationError {
    /// Axis number doesn't fit below 2^31.
    #[error("derivation axis {0} is out of range (must be below 2^31)")]
    AxisOutOfRange(u64),

    /// Path text doesn't match `m(/[0-9]+'?)*`.
    #[error("invalid derivation path syntax: {0:?}")]
    InvalidPathSyntax(String),

    /// Hardened children need the parent's private key.
    #[error("hardened derivation requires a private key")]
    PrivateKeyRequiredForHardenedDerivation,

    /// Asked for a key pair from a public-only extended key.
    #[error("extended key has no private key")]
    MissingPrivateKey,

    /// BIP32 only defines seeds of 16 to 64 bytes.
    #[error("invalid seed length: {0} bytes (expected 16 to 64)")]
    InvalidSeedLength(usize),

    /// `IL >= n` or the child key is zero / infinity at this path.
    #[error("derived key at {0} is invalid")]
    InvalidDerivedKey(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Key roles in the PRISM derivation layout.
///
/// The discriminant is the hardened axis number used at the second level of
/// `m/didIndex'/keyType'/keyIndex'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Master = 0,
    Issuing = 1,
    Communication = 2,
    Authentication = 3,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [
        KeyType::Master,
        KeyType::Issuing,
        KeyType::Communication,
        KeyType::Authentication,
    ];

    pub fn derivation_index(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Master => "master",
            KeyType::Issuing => "issuing",
            KeyType::Communication => "communication",
            KeyType::Authentication => "authentication",
        };
        write!(f, "{name}")
    }
}

/// Master extended key for `seed`.
pub fn derivation_root(
    engine: Arc<dyn EllipticCurveEngine>,
    seed: &[u8],
) -> Result<ExtendedKey, DerivationError> {
    ExtendedKey::from_seed(engine, seed)
}

/// Extended key at `path`, starting from the master key for `seed`.
pub fn derive_key(
    engine: Arc<dyn EllipticCurveEngine>,
    seed: &[u8],
    path: &DerivationPath,
) -> Result<ExtendedKey, DerivationError> {
    derivation_root(engine, seed)?.derive_path(path)
}

/// `m/didIndex'/keyType'/keyIndex'`.
pub fn key_derivation_path(
    did_index: u32,
    key_type: KeyType,
    key_index: u32,
) -> Result<DerivationPath, DerivationError> {
    Ok(DerivationPath::from_axes(vec![
        DerivationAxis::hardened(did_index)?,
        DerivationAxis::hardened(key_type.derivation_index())?,
        DerivationAxis::hardened(key_index)?,
    ]))
}

/// Key pair at `m/didIndex'/keyType'/keyIndex'`.
pub fn derive_key_from_full_path(
    engine: Arc<dyn EllipticCurveEngine>,
    seed: &[u8],
    did_index: u32,
    key_type: KeyType,
    key_index: u32,
) -> Result<EcKeyPair, DerivationError> {
    let path = key_derivation_path(did_index, key_type, key_index)?;
    derive_key(engine, seed, &path)?.key_pair()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secp256k1Engine;

    #[test]
    fn test_key_derivation_path_layout() {
        let path = key_derivation_path(0, KeyType::Master, 0).unwrap();
        assert_eq!(path.to_string(), "m/0'/0'/0'");

        let path = key_derivation_path(3, KeyType::Authentication, 7).unwrap();
        assert_eq!(path.to_string(), "m/3'/3'/7'");

        assert_eq!(
            key_derivation_path(u32::MAX, KeyType::Issuing, 0),
            Err(DerivationError::AxisOutOfRange(u64::from(u32::MAX)))
        );
    }

    #[test]
    fn test_full_path_matches_manual_walk() {
        let engine: Arc<dyn EllipticCurveEngine> = Arc::new(Secp256k1Engine);
        let seed = [0x5a; 64];

        let pair =
            derive_key_from_full_path(engine.clone(), &seed, 1, KeyType::Issuing, 2).unwrap();
        let manual = derive_key(engine, &seed, &"m/1'/1'/2'".parse().unwrap()).unwrap();
        assert_eq!(pair.public_key(), manual.public_key());
    }

    #[test]
    fn test_key_types_have_distinct_indices() {
        let indices: Vec<u32> = KeyType::ALL.iter().map(|k| k.derivation_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(KeyType::Issuing.to_string(), "issuing");
    }

    #[test]
    fn test_error_messages_do_not_leak() {
        let err = DerivationError::InvalidDerivedKey("m/0'".into());
        assert_eq!(err.to_string(), "derived key at m/0' is invalid");
    }
}
