//! # Cryptographic Primitives
//!
//! One curve, one signature scheme, two hash functions:
//!
//! - **secp256k1** for every key. Not our choice; the PRISM DID method and
//!   every wallet already in the field depend on it.
//! - **ECDSA over SHA-256** for signatures, with RFC 6979 deterministic nonces
//!   so a weak RNG at signing time can't leak the private key.
//! - **SHA-256** for operation hashes and Merkle batches, **HMAC-SHA512**
//!   for BIP32.
//!
//! Curve arithmetic sits behind the [`EllipticCurveEngine`] trait. The rest
//! of the crate never touches `k256` types directly; it talks to an engine
//! that the application builds once and passes around.

pub mod engine;
pub mod hash;
pub mod keys;
pub mod merkle;

pub use engine::{engine_for, EllipticCurveEngine, Secp256k1Engine};
pub use hash::{hmac_sha512, sha256, Sha256Digest};
pub use keys::{CryptoError, EcKeyPair, PrivateKey, PublicKey, Signature};
pub use merkle::{generate_proofs, verify_proof, MerkleInclusionProof, MerkleProofs, MerkleRoot};
