//! # Elliptic-Curve Engine
//!
//! The single seam between the identity core and a secp256k1 implementation.
//!
//! Everything above this module (derivation, DIDs, the wallet binary) holds an
//! `Arc<dyn EllipticCurveEngine>` and nothing else. That keeps backend choice
//! a construction-time decision ([`engine_for`]) rather than a global, and
//! lets tests run against whatever engine they like.
//!
//! ## Signatures
//!
//! ECDSA over SHA-256 of the message with RFC 6979 nonces. Signatures are
//! produced low-S. Verification accepts high-S signatures too, because older
//! wallets never normalized and their signatures are still out there.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature as K256Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use std::sync::Arc;

use super::keys::{to_fixed_width, CryptoError, EcKeyPair, PrivateKey, PublicKey, Signature};
use crate::config::{CurveBackend, EngineConfig, CURVE_NAME, SIGNATURE_BYTE_SIZE};

/// Curve operations the identity core needs.
///
/// Implementations must be stateless (or internally synchronized): a single
/// engine is shared across threads for the lifetime of the process.
pub trait EllipticCurveEngine: Send + Sync {
    /// Named curve, e.g. `"secp256k1"`.
    fn curve_name(&self) -> &'static str;

    /// Fresh key pair from the OS CSPRNG.
    fn generate_key_pair(&self) -> EcKeyPair;

    /// Parse a big-endian scalar. Shorter inputs are left-padded; longer
    /// inputs are accepted only when the extra leading bytes are zero.
    /// The value must lie in `[1, n-1]`.
    fn to_private_key(&self, bytes: &[u8]) -> Result<PrivateKey, CryptoError>;

    /// `private × G`.
    fn to_public_key_from_private(&self, private_key: &PrivateKey)
        -> Result<PublicKey, CryptoError>;

    /// Public key from affine coordinates, with the same padding rules as
    /// [`to_private_key`](Self::to_private_key). The point must be on the curve.
    fn to_public_key_from_coordinates(&self, x: &[u8], y: &[u8])
        -> Result<PublicKey, CryptoError>;

    /// Public key from SEC1 bytes, compressed (33) or uncompressed (65).
    fn to_public_key(&self, encoded: &[u8]) -> Result<PublicKey, CryptoError>;

    /// Pair a private key with its public point.
    fn key_pair_from_private(&self, private_key: &PrivateKey) -> Result<EcKeyPair, CryptoError> {
        let public_key = self.to_public_key_from_private(private_key)?;
        Ok(EcKeyPair::new(private_key.clone(), public_key))
    }

    /// ECDSA-SHA256 over `message`.
    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Result<Signature, CryptoError>;

    /// Sign the UTF-8 bytes of `text`.
    fn sign_text(&self, text: &str, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        self.sign(text.as_bytes(), private_key)
    }

    /// `true` iff `signature` is a valid signature of `message` under
    /// `public_key`. Never errors: anything malformed is just `false`.
    fn verify(&self, message: &[u8], public_key: &PublicKey, signature: &Signature) -> bool;

    fn verify_text(&self, text: &str, public_key: &PublicKey, signature: &Signature) -> bool {
        self.verify(text.as_bytes(), public_key, signature)
    }

    /// Parse an ASN.1 DER signature into fixed-width `r || s`.
    fn to_signature(&self, der: &[u8]) -> Result<Signature, CryptoError>;

    /// Encode a fixed-width signature as ASN.1 DER.
    fn signature_to_der(&self, signature: &Signature) -> Result<Vec<u8>, CryptoError>;

    /// `(k + tweak) mod n`. Fails if `tweak >= n` or the result is zero.
    fn tweak_add_private(
        &self,
        private_key: &PrivateKey,
        tweak: &[u8; 32],
    ) -> Result<PrivateKey, CryptoError>;

    /// `P + tweak·G`. Fails if `tweak >= n` or the result is the point at
    /// infinity.
    fn tweak_add_public(
        &self,
        public_key: &PublicKey,
        tweak: &[u8; 32],
    ) -> Result<PublicKey, CryptoError>;
}

/// Build the engine selected by `config`.
pub fn engine_for(config: &EngineConfig) -> Arc<dyn EllipticCurveEngine> {
    match config.backend {
        CurveBackend::K256 => Arc::new(Secp256k1Engine),
    }
}

// ---------------------------------------------------------------------------
// k256 backend
// ---------------------------------------------------------------------------

/// secp256k1 on RustCrypto's `k256`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Engine;

impl Secp256k1Engine {
    fn signing_key(private_key: &PrivateKey) -> Result<SigningKey, CryptoError> {
        SigningKey::from_slice(private_key.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)
    }

    fn verifying_key(public_key: &PublicKey) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_sec1_bytes(&public_key.encoded())
            .map_err(|_| CryptoError::InvalidKeyEncoding("point is not on the curve".into()))
    }

    fn public_from_verifying(verifying_key: &VerifyingKey) -> PublicKey {
        let point = verifying_key.to_encoded_point(false);
        PublicKey::from_uncompressed(point.as_bytes())
    }

    fn tweak_scalar(tweak: &[u8; 32]) -> Result<Scalar, CryptoError> {
        Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(tweak)))
            .ok_or(CryptoError::InvalidDerivedKey)
    }
}

impl EllipticCurveEngine for Secp256k1Engine {
    fn curve_name(&self) -> &'static str {
        CURVE_NAME
    }

    fn generate_key_pair(&self) -> EcKeyPair {
        let signing_key = SigningKey::random(&mut OsRng);
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&signing_key.to_bytes());
        let public_key = Self::public_from_verifying(signing_key.verifying_key());
        EcKeyPair::new(PrivateKey::from_validated(scalar), public_key)
    }

    fn to_private_key(&self, bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
        let scalar = to_fixed_width(bytes).ok_or(CryptoError::InvalidPrivateKey)?;
        // Range check: from_slice rejects zero and anything >= n.
        SigningKey::from_slice(&scalar).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(PrivateKey::from_validated(scalar))
    }

    fn to_public_key_from_private(
        &self,
        private_key: &PrivateKey,
    ) -> Result<PublicKey, CryptoError> {
        let signing_key = Self::signing_key(private_key)?;
        Ok(Self::public_from_verifying(signing_key.verifying_key()))
    }

    fn to_public_key_from_coordinates(
        &self,
        x: &[u8],
        y: &[u8],
    ) -> Result<PublicKey, CryptoError> {
        let x = to_fixed_width(x)
            .ok_or_else(|| CryptoError::InvalidKeyEncoding("x coordinate too wide".into()))?;
        let y = to_fixed_width(y)
            .ok_or_else(|| CryptoError::InvalidKeyEncoding("y coordinate too wide".into()))?;
        let point = EncodedPoint::from_affine_coordinates(
            &FieldBytes::clone_from_slice(&x),
            &FieldBytes::clone_from_slice(&y),
            false,
        );
        let verifying_key = VerifyingKey::from_encoded_point(&point)
            .map_err(|_| CryptoError::InvalidKeyEncoding("point is not on the curve".into()))?;
        Ok(Self::public_from_verifying(&verifying_key))
    }

    fn to_public_key(&self, encoded: &[u8]) -> Result<PublicKey, CryptoError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(encoded).map_err(|_| {
            CryptoError::InvalidKeyEncoding(format!(
                "{} bytes is not a SEC1 point on {}",
                encoded.len(),
                CURVE_NAME
            ))
        })?;
        Ok(Self::public_from_verifying(&verifying_key))
    }

    fn sign(&self, message: &[u8], private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        let signing_key = Self::signing_key(private_key)?;
        let signature: K256Signature = signing_key
            .try_sign(message)
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let mut bytes = [0u8; SIGNATURE_BYTE_SIZE];
        bytes.copy_from_slice(&signature.to_bytes());
        Ok(Signature::from_array(bytes))
    }

    fn verify(&self, message: &[u8], public_key: &PublicKey, signature: &Signature) -> bool {
        let Ok(verifying_key) = Self::verifying_key(public_key) else {
            return false;
        };
        let Ok(signature) = K256Signature::from_slice(signature.as_bytes()) else {
            return false;
        };
        // k256 refuses high-S outright; fold it to low-S first.
        let signature = signature.normalize_s().unwrap_or(signature);
        verifying_key.verify(message, &signature).is_ok()
    }

    fn to_signature(&self, der: &[u8]) -> Result<Signature, CryptoError> {
        let signature =
            K256Signature::from_der(der).map_err(|_| CryptoError::InvalidSignatureEncoding)?;
        let mut bytes = [0u8; SIGNATURE_BYTE_SIZE];
        bytes.copy_from_slice(&signature.to_bytes());
        Ok(Signature::from_array(bytes))
    }

    fn signature_to_der(&self, signature: &Signature) -> Result<Vec<u8>, CryptoError> {
        let signature = K256Signature::from_slice(signature.as_bytes())
            .map_err(|_| CryptoError::InvalidSignatureEncoding)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn tweak_add_private(
        &self,
        private_key: &PrivateKey,
        tweak: &[u8; 32],
    ) -> Result<PrivateKey, CryptoError> {
        let tweak = Self::tweak_scalar(tweak)?;
        let key = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(
            private_key.as_bytes(),
        )))
        .ok_or(CryptoError::InvalidPrivateKey)?;

        let child = key + tweak;
        if child == Scalar::ZERO {
            return Err(CryptoError::InvalidDerivedKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&child.to_repr());
        Ok(PrivateKey::from_validated(bytes))
    }

    fn tweak_add_public(
        &self,
        public_key: &PublicKey,
        tweak: &[u8; 32],
    ) -> Result<PublicKey, CryptoError> {
        let tweak = Self::tweak_scalar(tweak)?;
        let parent = Self::verifying_key(public_key)?;
        let child = ProjectivePoint::GENERATOR * tweak + ProjectivePoint::from(*parent.as_affine());
        // from_affine rejects the identity.
        let child = VerifyingKey::from_affine(child.to_affine())
            .map_err(|_| CryptoError::InvalidDerivedKey)?;
        Ok(Self::public_from_verifying(&child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_HEX: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn engine() -> Secp256k1Engine {
        Secp256k1Engine
    }

    fn order_bytes() -> [u8; 32] {
        let mut out = [0u8; 32];
        hex::decode_to_slice(ORDER_HEX, &mut out).unwrap();
        out
    }

    #[test]
    fn test_generated_pair_is_consistent() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let public = engine.to_public_key_from_private(pair.private_key()).unwrap();
        assert_eq!(&public, pair.public_key());
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let engine = engine();
        let a = engine.generate_key_pair();
        let b = engine.generate_key_pair();
        assert_ne!(a.private_key(), b.private_key());
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let engine = engine();
        let hex_key = "933c25b9e0b10b0618517edeb389b1b5ba5e781f377af6f573a1af354d008034";
        let key = engine.to_private_key(&hex::decode(hex_key).unwrap()).unwrap();
        assert_eq!(key.to_hex(), hex_key);
    }

    #[test]
    fn test_private_key_padding_rules() {
        let engine = engine();
        let short = engine.to_private_key(&[0x01]).unwrap();
        let mut one = [0u8; 32];
        one[31] = 1;
        assert_eq!(short.as_bytes(), &one);

        let mut signed = vec![0x00];
        signed.extend_from_slice(&[0x7f; 32]);
        assert_eq!(engine.to_private_key(&signed).unwrap().as_bytes(), &[0x7f; 32]);

        let mut wide = vec![0x01];
        wide.extend_from_slice(&[0x00; 32]);
        assert_eq!(engine.to_private_key(&wide), Err(CryptoError::InvalidPrivateKey));
    }

    #[test]
    fn test_private_key_range_checked() {
        let engine = engine();
        assert_eq!(engine.to_private_key(&[0u8; 32]), Err(CryptoError::InvalidPrivateKey));
        assert_eq!(
            engine.to_private_key(&order_bytes()),
            Err(CryptoError::InvalidPrivateKey)
        );

        let mut below_order = order_bytes();
        below_order[31] -= 1;
        assert!(engine.to_private_key(&below_order).is_ok());
    }

    #[test]
    fn test_public_key_encoding_roundtrip() {
        let engine = engine();
        let encoded = hex::decode(
            "0477d650217424671208f06ed816dab6c09e6b08c4da0f2f46ead049dd5fbd1c82\
             cd23343346003d4c7faf24ed6314bf340e7882941fd69929526cc889a0f93a1c",
        )
        .unwrap();
        let key = engine.to_public_key(&encoded).unwrap();
        assert_eq!(key.encoded().to_vec(), encoded);

        let from_coords = engine
            .to_public_key_from_coordinates(key.x(), key.y())
            .unwrap();
        assert_eq!(from_coords, key);

        let from_compressed = engine.to_public_key(&key.compressed()).unwrap();
        assert_eq!(from_compressed, key);
    }

    #[test]
    fn test_public_key_off_curve_rejected() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let mut y = *pair.public_key().y();
        y[31] ^= 0x01;
        let result = engine.to_public_key_from_coordinates(pair.public_key().x(), &y);
        assert!(matches!(result, Err(CryptoError::InvalidKeyEncoding(_))));

        assert!(engine.to_public_key(&[0x04; 10]).is_err());
    }

    #[test]
    fn test_sign_and_verify() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let signature = engine.sign_text("StringData", pair.private_key()).unwrap();

        assert!(engine.verify_text("StringData", pair.public_key(), &signature));
        assert!(!engine.verify_text("OtherStringData", pair.public_key(), &signature));

        let other = engine.generate_key_pair();
        assert!(!engine.verify_text("StringData", other.public_key(), &signature));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let a = engine.sign(b"payload", pair.private_key()).unwrap();
        let b = engine.sign(b"payload", pair.private_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cross_implementation_der_signature() {
        let engine = engine();
        let private = engine
            .to_private_key(
                &hex::decode("0123fbf1050c3fc060b709fdcf240e766a41190c40afc5ac7a702961df8313c0")
                    .unwrap(),
            )
            .unwrap();
        let public = engine.to_public_key_from_private(&private).unwrap();
        let message = hex::decode("956544761b4a1d32e0482f81cf03f8c9c1be2e7d").unwrap();
        let der = hex::decode(
            "30450221008a78c557dfc18275b5c800281ef8d26d2b40572b9c1442d708c610f50f797bd3\
             02207e44e340f787df7ab1299dabfc988e4c02fcaca0f68dbe813050f4b8641fa739",
        )
        .unwrap();

        let signature = engine.to_signature(&der).unwrap();
        assert!(engine.verify(&message, &public, &signature));
        assert_eq!(engine.signature_to_der(&signature).unwrap(), der);
    }

    #[test]
    fn test_high_s_signature_still_verifies() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let signature = engine.sign(b"legacy", pair.private_key()).unwrap();

        let s = Scalar::from_repr(FieldBytes::clone_from_slice(signature.s())).unwrap();
        let high_s = -s;
        let mut raw = [0u8; 64];
        raw[..32].copy_from_slice(signature.r());
        raw[32..].copy_from_slice(&high_s.to_repr());

        assert!(engine.verify(b"legacy", pair.public_key(), &Signature::from_array(raw)));
    }

    #[test]
    fn test_malformed_signature_is_false() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let zeros = Signature::from_array([0u8; 64]);
        assert!(!engine.verify(b"x", pair.public_key(), &zeros));
        assert!(engine.to_signature(&[0x30, 0x00]).is_err());
    }

    #[test]
    fn test_tweaks_commute_with_public_derivation() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let tweak = [0x07; 32];

        let child_private = engine.tweak_add_private(pair.private_key(), &tweak).unwrap();
        let child_public = engine.tweak_add_public(pair.public_key(), &tweak).unwrap();
        assert_eq!(
            engine.to_public_key_from_private(&child_private).unwrap(),
            child_public
        );
    }

    #[test]
    fn test_tweak_out_of_range_rejected() {
        let engine = engine();
        let pair = engine.generate_key_pair();
        let order = order_bytes();
        assert_eq!(
            engine.tweak_add_private(pair.private_key(), &order),
            Err(CryptoError::InvalidDerivedKey)
        );
        assert_eq!(
            engine.tweak_add_public(pair.public_key(), &order),
            Err(CryptoError::InvalidDerivedKey)
        );
    }

    #[test]
    fn test_tweak_to_zero_rejected() {
        let engine = engine();
        let key = engine.to_private_key(&[0x01]).unwrap();
        // n - 1 + 1 == 0 mod n
        let mut tweak = order_bytes();
        tweak[31] -= 1;
        assert_eq!(
            engine.tweak_add_private(&key, &tweak),
            Err(CryptoError::InvalidDerivedKey)
        );
        let public = engine.to_public_key_from_private(&key).unwrap();
        assert_eq!(
            engine.tweak_add_public(&public, &tweak),
            Err(CryptoError::InvalidDerivedKey)
        );
    }

    #[test]
    fn test_engine_for_default_backend() {
        let engine = engine_for(&EngineConfig::default());
        assert_eq!(engine.curve_name(), "secp256k1");
    }
}
