// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # PRISM Identity — Cryptographic Core
//!
//! Everything the wallet needs to turn twelve words into a self-certifying
//! decentralized identifier, and nothing it doesn't. Screens, storage and
//! transport live elsewhere; they hand this crate seeds and bytes and get
//! back keys, signatures and DID strings.
//!
//! The contract is interoperability: the same mnemonic must produce the same
//! keys and the same `did:prism:` identifier on every platform, today and in
//! ten years. Every encoding in here is pinned down to the byte.
//!
//! ## Architecture
//!
//! - **config** — Curve parameters, protocol constants, engine selection.
//! - **crypto** — secp256k1 engine: key generation, ECDSA, encodings;
//!   Merkle batch roots and inclusion proofs.
//! - **derivation** — BIP32 paths and extended keys, BIP39 mnemonics.
//! - **did** — Long-form and canonical `did:prism:` identifiers.
//!
//! ## Quick tour
//!
//! ```
//! use prism_identity::config::EngineConfig;
//! use prism_identity::crypto::engine_for;
//! use prism_identity::derivation::{binary_seed, derive_key, DerivationPath, MnemonicCode};
//! use prism_identity::did::DidBuilder;
//!
//! let engine = engine_for(&EngineConfig::default());
//! let mnemonic = MnemonicCode::random_mnemonic_code();
//! let seed = binary_seed(&mnemonic, "").unwrap();
//!
//! let path: DerivationPath = "m/0'/0'/0'".parse().unwrap();
//! let key = derive_key(engine.clone(), seed.as_slice(), &path).unwrap();
//!
//! let did = DidBuilder::new(engine).create_unpublished_did(key.public_key());
//! assert!(did.is_long_form());
//! assert!(did.value().starts_with("did:prism:"));
//! ```

pub mod config;
pub mod crypto;
pub mod derivation;
pub mod did;
