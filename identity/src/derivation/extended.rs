//! # Extended Keys (BIP32)
//!
//! An [`ExtendedKey`] is a key plus the 32-byte chain code that lets it
//! spawn children. Derivation is pure: every call returns a new key and
//! leaves its parent alone.
//!
//! ```text
//! hardened  i >= 2^31   I = HMAC-SHA512(c, 0x00 || ser256(k) || ser32(i))
//! normal    i <  2^31   I = HMAC-SHA512(c, serP(K)  || ser32(i))
//!
//! child k  = (IL + k) mod n
//! child K  = IL·G + K
//! child c  = IR
//! ```
//!
//! When `IL >= n` or the child key is zero/infinity BIP32 says "skip to the
//! next index". We don't skip: silently changing which index a key lives at
//! would break cross-wallet recovery, so it surfaces as
//! [`DerivationError::InvalidDerivedKey`] instead. The odds are below 2^-127.

use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

use super::axis::DerivationAxis;
use super::path::DerivationPath;
use super::DerivationError;
use crate::config::{BIP32_SEED_KEY, CHAIN_CODE_LENGTH, MAX_SEED_LENGTH, MIN_SEED_LENGTH};
use crate::crypto::{
    hmac_sha512, CryptoError, EcKeyPair, EllipticCurveEngine, PrivateKey, PublicKey,
};

/// A node in the BIP32 tree.
#[derive(Clone)]
pub struct ExtendedKey {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
    chain_code: Zeroizing<[u8; CHAIN_CODE_LENGTH]>,
    path: DerivationPath,
    engine: Arc<dyn EllipticCurveEngine>,
}

/// Split an HMAC output into `(IL, IR)`.
fn split_output(output: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; CHAIN_CODE_LENGTH]>) {
    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; CHAIN_CODE_LENGTH]);
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);
    (left, right)
}

impl ExtendedKey {
    /// The master key for `seed`.
    ///
    /// BIP32 only defines seeds of 128 to 512 bits; anything else is
    /// [`DerivationError::InvalidSeedLength`].
    pub fn from_seed(
        engine: Arc<dyn EllipticCurveEngine>,
        seed: &[u8],
    ) -> Result<Self, DerivationError> {
        if !(MIN_SEED_LENGTH..=MAX_SEED_LENGTH).contains(&seed.len()) {
            return Err(DerivationError::InvalidSeedLength(seed.len()));
        }

        let output = hmac_sha512(BIP32_SEED_KEY, seed);
        let (left, chain_code) = split_output(&output);
        let path = DerivationPath::root();

        let private_key = engine
            .to_private_key(left.as_slice())
            .map_err(|_| DerivationError::InvalidDerivedKey(path.to_string()))?;
        let public_key = engine.to_public_key_from_private(&private_key)?;

        debug!(seed_len = seed.len(), "derived master extended key");
        Ok(Self {
            private_key: Some(private_key),
            public_key,
            chain_code,
            path,
            engine,
        })
    }

    /// One step down the tree.
    pub fn derive(&self, axis: DerivationAxis) -> Result<Self, DerivationError> {
        let child_path = self.path.derive(axis);
        let index = axis.to_index().to_be_bytes();

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if axis.is_hardened() {
            let private_key = self
                .private_key
                .as_ref()
                .ok_or(DerivationError::PrivateKeyRequiredForHardenedDerivation)?;
            data.push(0x00);
            data.extend_from_slice(private_key.as_bytes());
        } else {
            data.extend_from_slice(&self.public_key.compressed());
        }
        data.extend_from_slice(&index);

        let output = hmac_sha512(self.chain_code.as_slice(), &data);
        let (tweak, chain_code) = split_output(&output);

        let invalid = |err: CryptoError| match err {
            CryptoError::InvalidDerivedKey => {
                DerivationError::InvalidDerivedKey(child_path.to_string())
            }
            other => DerivationError::Crypto(other),
        };

        let (private_key, public_key) = match &self.private_key {
            Some(parent) => {
                let child = self.engine.tweak_add_private(parent, &tweak).map_err(invalid)?;
                let public_key = self.engine.to_public_key_from_private(&child)?;
                (Some(child), public_key)
            }
            None => {
                let public_key = self
                    .engine
                    .tweak_add_public(&self.public_key, &tweak)
                    .map_err(invalid)?;
                (None, public_key)
            }
        };

        debug!(path = %child_path, private = private_key.is_some(), "derived child key");
        Ok(Self {
            private_key,
            public_key,
            chain_code,
            path: child_path,
            engine: self.engine.clone(),
        })
    }

    /// Walk every axis of `path`, starting from this key.
    ///
    /// `path` is relative: deriving `m/1` from a key at `m/0'` lands at
    /// `m/0'/1`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        path.axes()
            .iter()
            .try_fold(self.clone(), |key, axis| key.derive(*axis))
    }

    /// The key pair at this node. Fails on public-only keys.
    pub fn key_pair(&self) -> Result<EcKeyPair, DerivationError> {
        let private_key = self
            .private_key
            .as_ref()
            .ok_or(DerivationError::MissingPrivateKey)?;
        Ok(self.engine.key_pair_from_private(private_key)?)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// Absolute path from the master key.
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.chain_code
    }

    pub fn is_private(&self) -> bool {
        self.private_key.is_some()
    }

    /// A public-only copy. It can still derive normal children, and they
    /// match the public halves of the private derivation.
    pub fn neuter(&self) -> Self {
        Self {
            private_key: None,
            public_key: self.public_key.clone(),
            chain_code: self.chain_code.clone(),
            path: self.path.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("path", &self.path.to_string())
            .field("public_key", &self.public_key)
            .field("private", &self.is_private())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secp256k1Engine;

    fn engine() -> Arc<dyn EllipticCurveEngine> {
        Arc::new(Secp256k1Engine)
    }

    fn vector1_master() -> ExtendedKey {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        ExtendedKey::from_seed(engine(), &seed).unwrap()
    }

    fn private_hex(key: &ExtendedKey) -> String {
        key.private_key().unwrap().to_hex()
    }

    #[test]
    fn test_master_from_seed() {
        let master = vector1_master();
        assert_eq!(
            private_hex(&master),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.public_key().compressed()),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert!(master.path().is_empty());
    }

    #[test]
    fn test_hardened_child() {
        let child = vector1_master()
            .derive(DerivationAxis::hardened(0).unwrap())
            .unwrap();
        assert_eq!(
            private_hex(&child),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(child.path().to_string(), "m/0'");
    }

    #[test]
    fn test_normal_child_after_hardened() {
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let child = vector1_master().derive_path(&path).unwrap();
        assert_eq!(
            private_hex(&child),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let parent = vector1_master()
            .derive(DerivationAxis::hardened(0).unwrap())
            .unwrap();
        let axis = DerivationAxis::normal(1).unwrap();

        let private_child = parent.derive(axis).unwrap();
        let public_child = parent.neuter().derive(axis).unwrap();

        assert!(!public_child.is_private());
        assert_eq!(public_child.public_key(), private_child.public_key());
        assert_eq!(public_child.chain_code(), private_child.chain_code());
        assert_eq!(public_child.path(), private_child.path());
    }

    #[test]
    fn test_hardened_from_public_fails() {
        let public = vector1_master().neuter();
        assert_eq!(
            public.derive(DerivationAxis::hardened(0).unwrap()).unwrap_err(),
            DerivationError::PrivateKeyRequiredForHardenedDerivation
        );
        assert_eq!(public.key_pair().unwrap_err(), DerivationError::MissingPrivateKey);
    }

    #[test]
    fn test_seed_length_bounds() {
        assert_eq!(
            ExtendedKey::from_seed(engine(), &[0u8; 15]).unwrap_err(),
            DerivationError::InvalidSeedLength(15)
        );
        assert_eq!(
            ExtendedKey::from_seed(engine(), &[0u8; 65]).unwrap_err(),
            DerivationError::InvalidSeedLength(65)
        );
        assert!(ExtendedKey::from_seed(engine(), &[1u8; 16]).is_ok());
        assert!(ExtendedKey::from_seed(engine(), &[1u8; 64]).is_ok());
    }

    #[test]
    fn test_derivation_is_deterministic_and_pure() {
        let master = vector1_master();
        let axis = DerivationAxis::hardened(3).unwrap();
        let a = master.derive(axis).unwrap();
        let b = master.derive(axis).unwrap();
        assert_eq!(a.private_key(), b.private_key());
        assert!(master.path().is_empty());
    }

    #[test]
    fn test_key_pair_matches_public_key() {
        let key = vector1_master()
            .derive(DerivationAxis::hardened(1).unwrap())
            .unwrap();
        let pair = key.key_pair().unwrap();
        assert_eq!(pair.public_key(), key.public_key());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let master = vector1_master();
        let debug = format!("{:?}", master);
        assert!(!debug.contains("e8f32e72"));
        assert!(debug.contains("private: true"));
    }
}
