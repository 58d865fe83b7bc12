//! # Key Material
//!
//! Backend-neutral containers for secp256k1 keys and signatures.
//!
//! These types hold bytes, not curve objects. Validation happens once, in the
//! engine, at construction time: a [`PrivateKey`] always holds a scalar in
//! `[1, n-1]` and a [`PublicKey`] always holds a point on the curve. Nothing
//! outside this crate can build one without going through an engine.
//!
//! ## Security considerations
//!
//! - Private scalars are zeroized on drop and never appear in `Debug` output.
//! - There is no `Serialize` on private keys. Exporting one is an explicit
//!   call to [`PrivateKey::as_bytes`] or [`PrivateKey::to_hex`].

use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{
    COMPRESSED_PUBLIC_KEY_BYTE_SIZE, PRIVATE_KEY_BYTE_SIZE, PUBLIC_KEY_BYTE_SIZE,
    PUBLIC_KEY_COORDINATE_BYTE_SIZE, SIGNATURE_BYTE_SIZE,
};

/// Errors that can occur during key and signature operations.
///
/// Messages describe the shape of the problem, never the bytes involved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Scalar is zero, not below the curve order, or wider than 32 bytes.
    #[error("invalid private key: not a scalar in [1, n-1]")]
    InvalidPrivateKey,

    /// Bytes don't describe a point on the curve.
    #[error("invalid public key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Signature bytes are neither 64-byte `r || s` nor valid DER.
    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,

    /// A tweak fell outside the scalar field or produced the identity.
    #[error("derived key is invalid")]
    InvalidDerivedKey,

    /// Merkle proofs need at least one leaf.
    #[error("cannot build a Merkle tree without leaves")]
    EmptyMerkleTree,

    /// Encoded inclusion proof is not the expected JSON shape.
    #[error("invalid Merkle inclusion proof: {0}")]
    InvalidMerkleProof(String),
}

/// Left-pad a big-endian integer to exactly 32 bytes.
///
/// Leading zero bytes beyond the width are accepted (two's-complement
/// encoders add one whenever the top bit is set). Returns `None` if the
/// value genuinely needs more than 32 bytes.
pub(crate) fn to_fixed_width(bytes: &[u8]) -> Option<[u8; 32]> {
    let first_significant = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_significant..];
    if significant.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - significant.len()..].copy_from_slice(significant);
    Some(out)
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 private scalar, 32 bytes big-endian.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; PRIVATE_KEY_BYTE_SIZE],
}

impl PrivateKey {
    /// Wrap bytes the engine has already range-checked.
    pub(crate) fn from_validated(bytes: [u8; PRIVATE_KEY_BYTE_SIZE]) -> Self {
        Self { bytes }
    }

    /// The raw scalar. This is an export: don't log it, don't persist it
    /// unencrypted, don't send it anywhere.
    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_BYTE_SIZE] {
        &self.bytes
    }

    /// Hex export of the scalar. Same warnings as [`as_bytes`](Self::as_bytes).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        // Branch-free comparison; equality checks on secrets shouldn't leak
        // the position of the first differing byte.
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// An affine secp256k1 point.
///
/// Coordinates are fixed-width big-endian. The canonical byte form is SEC1
/// uncompressed (`0x04 || x || y`, 65 bytes), which is what
/// [`encoded`](Self::encoded) returns and what the engine's
/// `to_public_key` accepts back.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    x: [u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE],
    y: [u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE],
}

impl PublicKey {
    /// Split a 65-byte SEC1 uncompressed point the engine produced.
    ///
    /// Callers must pass a genuine uncompressed encoding; the engine only
    /// hands us points it obtained from a non-identity verifying key.
    pub(crate) fn from_uncompressed(encoded: &[u8]) -> Self {
        let mut x = [0u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE];
        let mut y = [0u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE];
        x.copy_from_slice(&encoded[1..1 + PUBLIC_KEY_COORDINATE_BYTE_SIZE]);
        y.copy_from_slice(&encoded[1 + PUBLIC_KEY_COORDINATE_BYTE_SIZE..PUBLIC_KEY_BYTE_SIZE]);
        Self { x, y }
    }

    /// The x coordinate, 32 bytes big-endian.
    pub fn x(&self) -> &[u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE] {
        &self.x
    }

    /// The y coordinate, 32 bytes big-endian.
    pub fn y(&self) -> &[u8; PUBLIC_KEY_COORDINATE_BYTE_SIZE] {
        &self.y
    }

    /// SEC1 uncompressed encoding, 65 bytes.
    pub fn encoded(&self) -> [u8; PUBLIC_KEY_BYTE_SIZE] {
        let mut out = [0u8; PUBLIC_KEY_BYTE_SIZE];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x);
        out[33..].copy_from_slice(&self.y);
        out
    }

    /// SEC1 compressed encoding, 33 bytes. This is `serP` in BIP32.
    pub fn compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_BYTE_SIZE] {
        let mut out = [0u8; COMPRESSED_PUBLIC_KEY_BYTE_SIZE];
        out[0] = 0x02 | (self.y[PUBLIC_KEY_COORDINATE_BYTE_SIZE - 1] & 1);
        out[1..].copy_from_slice(&self.x);
        out
    }

    /// Hex of the uncompressed encoding, 130 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.encoded())
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_hex()[..18])
    }
}

// ---------------------------------------------------------------------------
// EcKeyPair
// ---------------------------------------------------------------------------

/// A private scalar together with its public point.
///
/// `public == private × G` always holds: the engine is the only thing that
/// builds these, and it derives the point from the scalar every time.
#[derive(Clone, PartialEq, Eq)]
pub struct EcKeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl EcKeyPair {
    pub(crate) fn new(private_key: PrivateKey, public_key: PublicKey) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcKeyPair(pub={:?})", self.public_key)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An ECDSA signature as two fixed-width scalars, `r || s`.
///
/// Always exactly 64 bytes. The JVM wallet speaks DER; convert at the edge
/// with the engine's `to_signature` / `signature_to_der`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_BYTE_SIZE],
}

impl Signature {
    /// Wrap a raw `r || s` array.
    pub fn from_array(bytes: [u8; SIGNATURE_BYTE_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse a raw `r || s` slice. Only the length is checked here;
    /// scalar validity is the verifier's problem.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SIGNATURE_BYTE_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureEncoding)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTE_SIZE] {
        &self.bytes
    }

    /// The `r` scalar, 32 bytes big-endian.
    pub fn r(&self) -> &[u8] {
        &self.bytes[..32]
    }

    /// The `s` scalar, 32 bytes big-endian.
    pub fn s(&self) -> &[u8] {
        &self.bytes[32..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidSignatureEncoding)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
