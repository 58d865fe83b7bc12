//! # Hashing Utilities
//!
//! - **SHA-256** hashes create-DID operations; the hex digest *is* the
//!   canonical DID suffix, so this function is load-bearing for every
//!   identifier the wallet has ever produced.
//! - **HMAC-SHA512** is the PRF behind BIP32 master and child key derivation.
//!
//! ECDSA hashes internally, so signing code never calls into this module.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use zeroize::Zeroizing;

type HmacSha512 = Hmac<Sha512>;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use prism_identity::crypto::sha256;
///
/// let hash = sha256(b"");
/// assert_eq!(
///     hex::encode(hash),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// HMAC-SHA512 of `data` under `key`.
///
/// The output is key material for BIP32 (left half becomes a private key,
/// right half a chain code), so it comes back wrapped in [`Zeroizing`].
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Zeroizing<[u8; 64]> {
    let mut mac =
        <HmacSha512 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    let result = mac.finalize().into_bytes();
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&result);
    output
}

/// A SHA-256 digest with a hex face.
///
/// Operation hashes travel as lowercase hex inside DID strings, so this type
/// keeps the raw bytes and knows how to print and parse them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Digest {
    value: [u8; 32],
}

impl Sha256Digest {
    /// Hash `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self {
            value: sha256(data),
        }
    }

    /// Wrap an existing 32-byte digest.
    pub fn from_bytes(value: [u8; 32]) -> Self {
        Self { value }
    }

    /// Parse a 64-character hex digest. Case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut value = [0u8; 32];
        hex::decode_to_slice(s, &mut value)?;
        Ok(Self { value })
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.value
    }

    /// Lowercase hex, 64 characters.
    pub fn hex_value(&self) -> String {
        hex::encode(self.value)
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex_value())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.hex_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hmac_sha512_rfc4231_case_2() {
        let mac = hmac_sha512(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac.as_slice()),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = Sha256Digest::compute(b"prism");
        let parsed = Sha256Digest::from_hex(&digest.hex_value()).unwrap();
        assert_eq!(digest, parsed);
        assert_eq!(digest.to_string().len(), 64);
    }

    #[test]
    fn test_digest_rejects_wrong_length() {
        assert!(Sha256Digest::from_hex("abcd").is_err());
        assert!(Sha256Digest::from_hex(&"zz".repeat(32)).is_err());
    }
}
