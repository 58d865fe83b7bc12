//! Building unpublished DIDs from public keys and mnemonics.

use std::sync::Arc;
use tracing::debug;

use super::operation::{
    AtalaOperation, CreateDidOperation, EcKeyData, KeyUsage, OperationPublicKey,
};
use super::prism::Did;
use super::DidError;
use crate::config::{ISSUING_KEY_ID, MASTER_KEY_ID};
use crate::crypto::{EllipticCurveEngine, PublicKey, Sha256Digest, Signature};
use crate::derivation::{binary_seed, derive_key_from_full_path, KeyType, MnemonicCode};

/// An operation together with the signature that authorizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOperation {
    /// Key id (inside the DID) that produced `signature`.
    pub signed_with: String,
    pub signature: Signature,
    pub operation: AtalaOperation,
}

impl SignedOperation {
    /// Check the signature over the encoded operation.
    pub fn verify(&self, engine: &dyn EllipticCurveEngine, public_key: &PublicKey) -> bool {
        engine.verify(&self.operation.encode(), public_key, &self.signature)
    }
}

/// Everything a wallet needs after creating a DID from its mnemonic: the
/// long-form DID to hand out now, and the signed operation to publish later.
#[derive(Debug, Clone)]
pub struct CreateDidContext {
    pub unpublished_did: Did,
    pub signed_operation: SignedOperation,
    pub operation_hash: Sha256Digest,
}

/// Builds `did:prism:` identifiers.
#[derive(Clone)]
pub struct DidBuilder {
    engine: Arc<dyn EllipticCurveEngine>,
}

impl DidBuilder {
    pub fn new(engine: Arc<dyn EllipticCurveEngine>) -> Self {
        Self { engine }
    }

    /// The create-DID operation for a master key and optional issuing key.
    pub fn create_operation(
        &self,
        master: &PublicKey,
        issuing: Option<&PublicKey>,
    ) -> AtalaOperation {
        let mut public_keys = vec![OperationPublicKey {
            id: MASTER_KEY_ID.to_string(),
            usage: KeyUsage::Master,
            key_data: EcKeyData::from_public_key(master),
        }];
        if let Some(issuing) = issuing {
            public_keys.push(OperationPublicKey {
                id: ISSUING_KEY_ID.to_string(),
                usage: KeyUsage::Issuing,
                key_data: EcKeyData::from_public_key(issuing),
            });
        }
        AtalaOperation::CreateDid(CreateDidOperation { public_keys })
    }

    /// Long-form DID with `master` as its only key.
    pub fn create_unpublished_did(&self, master: &PublicKey) -> Did {
        self.unpublished(master, None)
    }

    /// Long-form DID with a master key and an issuing key.
    pub fn create_unpublished_did_with_issuing_key(
        &self,
        master: &PublicKey,
        issuing: &PublicKey,
    ) -> Did {
        self.unpublished(master, Some(issuing))
    }

    /// Long-form DID from a SEC1-encoded master key.
    pub fn create_unpublished_did_from_encoded(&self, encoded: &[u8]) -> Result<Did, DidError> {
        let master = self
            .engine
            .to_public_key(encoded)
            .map_err(|_| DidError::InvalidPublicKeyEncoding)?;
        Ok(self.create_unpublished_did(&master))
    }

    fn unpublished(&self, master: &PublicKey, issuing: Option<&PublicKey>) -> Did {
        let operation = self.create_operation(master, issuing);
        let keys = operation.as_create_did().map_or(0, |c| c.public_keys.len());
        let did = Did::build_long_form(&operation);
        debug!(state_hash = %operation.hash(), keys, "built unpublished DID");
        did
    }

    /// Derive the master key at `m/didIndex'/0'/0'`, build the DID and sign
    /// its create operation with that key.
    pub fn create_did_from_mnemonic(
        &self,
        mnemonic: &MnemonicCode,
        did_index: u32,
        passphrase: &str,
    ) -> Result<CreateDidContext, DidError> {
        let seed = binary_seed(mnemonic, passphrase)?;
        let master = derive_key_from_full_path(
            self.engine.clone(),
            seed.as_slice(),
            did_index,
            KeyType::Master,
            0,
        )?;

        let operation = self.create_operation(master.public_key(), None);
        let bytes = operation.encode();
        let operation_hash = Sha256Digest::compute(&bytes);
        let signature = self.engine.sign(&bytes, master.private_key())?;
        let unpublished_did = Did::build_long_form(&operation);

        debug!(did_index, operation_hash = %operation_hash, "created DID from mnemonic");
        Ok(CreateDidContext {
            unpublished_did,
            signed_operation: SignedOperation {
                signed_with: MASTER_KEY_ID.to_string(),
                signature,
                operation,
            },
            operation_hash,
        })
    }

    pub fn engine(&self) -> &Arc<dyn EllipticCurveEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secp256k1Engine;

    fn builder() -> DidBuilder {
        DidBuilder::new(Arc::new(Secp256k1Engine))
    }

    #[test]
    fn test_unpublished_did_is_long_form_and_stable() {
        let builder = builder();
        let pair = builder.engine().generate_key_pair();
        let a = builder.create_unpublished_did(pair.public_key());
        let b = builder.create_unpublished_did(pair.public_key());

        assert!(a.is_long_form());
        assert!(a.value().starts_with("did:prism:"));
        assert_eq!(a.canonical_suffix(), b.canonical_suffix());
        assert_eq!(a, b);
    }

    #[test]
    fn test_long_form_validates_back_to_key() {
        let builder = builder();
        let pair = builder.engine().generate_key_pair();
        let did = builder.create_unpublished_did(pair.public_key());

        let validated = did.validate_long_form().unwrap();
        assert_eq!(Some(validated.suffix()), did.canonical_suffix());
        assert_eq!(
            &validated
                .master_public_key(builder.engine().as_ref())
                .unwrap(),
            pair.public_key()
        );
        assert_eq!(validated.canonical_did(), did.to_canonical().unwrap());
    }

    #[test]
    fn test_issuing_key_changes_suffix() {
        let builder = builder();
        let master = builder.engine().generate_key_pair();
        let issuing = builder.engine().generate_key_pair();

        let single = builder.create_unpublished_did(master.public_key());
        let double = builder
            .create_unpublished_did_with_issuing_key(master.public_key(), issuing.public_key());
        assert_ne!(single.canonical_suffix(), double.canonical_suffix());

        let validated = double.validate_long_form().unwrap();
        let state = validated.initial_state();
        assert_eq!(state.public_keys.len(), 2);
        assert_eq!(state.public_keys[1].id, "issuing0");
        assert_eq!(state.public_keys[1].usage, KeyUsage::Issuing);
    }

    #[test]
    fn test_from_encoded_key() {
        let builder = builder();
        let pair = builder.engine().generate_key_pair();
        let did = builder
            .create_unpublished_did_from_encoded(&pair.public_key().encoded())
            .unwrap();
        assert_eq!(did, builder.create_unpublished_did(pair.public_key()));

        assert_eq!(
            builder.create_unpublished_did_from_encoded(&[0x04; 65]),
            Err(DidError::InvalidPublicKeyEncoding)
        );
    }

    #[test]
    fn test_create_from_mnemonic_signs_operation() {
        let builder = builder();
        let mnemonic = MnemonicCode::random_mnemonic_code();
        let context = builder.create_did_from_mnemonic(&mnemonic, 0, "").unwrap();

        assert_eq!(context.signed_operation.signed_with, "master0");
        assert_eq!(
            context.operation_hash,
            context.signed_operation.operation.hash()
        );
        assert_eq!(
            context.unpublished_did.canonical_suffix().unwrap().value(),
            context.operation_hash.hex_value()
        );

        let master = context
            .unpublished_did
            .validate_long_form()
            .unwrap()
            .master_public_key(builder.engine().as_ref())
            .unwrap();
        assert!(context.signed_operation.verify(builder.engine().as_ref(), &master));
    }

    #[test]
    fn test_create_from_invalid_mnemonic_fails() {
        let builder = builder();
        let bad = MnemonicCode::new(vec!["abandon".to_string(); 12]);
        assert!(matches!(
            builder.create_did_from_mnemonic(&bad, 0, ""),
            Err(DidError::Mnemonic(_))
        ));
    }
}
