//! # PRISM Decentralized Identifiers
//!
//! A `did:prism:` identifier is self-certifying: its suffix is the SHA-256
//! of the operation that created it. Two forms exist:
//!
//! ```text
//! canonical   did:prism:<hex sha256(op)>
//! long form   did:prism:<hex sha256(op)>:<base64url(op)>
//! ```
//!
//! A freshly created DID is long-form: it carries its own initial state and
//! can be resolved without touching a ledger. Once the operation is anchored
//! the short canonical form is enough. Going long → canonical is a hash
//! projection; there's no way back without a resolver.
//!
//! ## Standards References
//!
//! - [DID Core v1.0](https://www.w3.org/TR/did-core/)
//! - [EcdsaSecp256k1VerificationKey2019](https://w3c-ccg.github.io/lds-ecdsa-secp256k1-2019/)

pub mod builder;
pub mod document;
pub mod operation;
pub mod prism;

pub use builder::{CreateDidContext, DidBuilder, SignedOperation};
pub use document::{DidDocument, PublicKeyJwk, VerificationMethod};
pub use operation::{AtalaOperation, CreateDidOperation, EcKeyData, KeyUsage, OperationPublicKey};
pub use prism::{Did, DidFormat, DidSuffix, LongForm, ValidatedLongForm};

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::derivation::{DerivationError, MnemonicError};

/// Errors that can occur while building, parsing or validating DIDs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DidError {
    /// The string isn't a `did:prism:` (or legacy `did:test:`) identifier.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// A public key couldn't be decoded or encoded for the operation.
    #[error("invalid public key encoding")]
    InvalidPublicKeyEncoding,

    /// The operation needs a long-form DID.
    #[error("DID is not in long form: {0}")]
    NotLongForm(String),

    /// The encoded state isn't valid base64url.
    #[error("encoded state is not valid base64url")]
    InvalidEncodedState,

    /// The state hash doesn't match the hash of the embedded operation.
    #[error("state hash mismatch: DID says {expected}, payload hashes to {actual}")]
    StateHashMismatch { expected: String, actual: String },

    /// The embedded operation isn't a well-formed create-DID operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Serialization error during document generation.
    #[error("serialization error: {0}")]
    Serialization(String),
}
