//! # DID Documents
//!
//! Resolution of a long-form DID needs no ledger: the initial state is in
//! the identifier. [`DidDocument::from_validated`] turns that state into a
//! W3C DID Document, one `EcdsaSecp256k1VerificationKey2019` method per key
//! with the point carried as a JWK.
//!
//! Master and authentication keys are listed under `authentication`,
//! issuing keys under `assertionMethod`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::operation::KeyUsage;
use super::prism::{Did, ValidatedLongForm};
use super::DidError;
use crate::config::{CURVE_NAME, DID_PRISM_PREFIX};

/// Context URI for the W3C DID Core specification.
const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context URI for the secp256k1 verification key suite.
const SECP256K1_CONTEXT: &str = "https://w3id.org/security/suites/secp256k1-2019/v1";

/// Verification method type for secp256k1 public keys.
const VERIFICATION_KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";

/// A W3C DID Document describing a PRISM DID's initial state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    /// JSON-LD context URIs.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID this document describes (the long form it was resolved from).
    pub id: String,

    /// Canonical form of `id`.
    #[serde(rename = "canonicalId")]
    pub canonical_id: String,

    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    /// References to verification methods usable for authentication.
    pub authentication: Vec<String>,

    /// References to verification methods usable for issuing assertions.
    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,
}

/// A single key in a DID Document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// `<did>#<key id>`.
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub controller: String,

    #[serde(rename = "publicKeyJwk")]
    pub public_key_jwk: PublicKeyJwk,
}

/// RFC 7517 JSON Web Key for an EC point, coordinates base64url without
/// padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl DidDocument {
    /// Build the document for `did` from its decoded initial state.
    pub fn from_validated(did: &Did, validated: &ValidatedLongForm) -> Self {
        let id = did.value().to_string();
        let mut verification_method = Vec::new();
        let mut authentication = Vec::new();
        let mut assertion_method = Vec::new();

        for key in &validated.initial_state().public_keys {
            let key_ref = format!("{id}#{}", key.id);
            match key.usage {
                KeyUsage::Master | KeyUsage::Authentication => authentication.push(key_ref.clone()),
                KeyUsage::Issuing => assertion_method.push(key_ref.clone()),
                _ => {}
            }
            verification_method.push(VerificationMethod {
                id: key_ref,
                type_: VERIFICATION_KEY_TYPE.to_string(),
                controller: id.clone(),
                public_key_jwk: PublicKeyJwk {
                    kty: "EC".to_string(),
                    crv: key.key_data.curve.clone(),
                    x: URL_SAFE_NO_PAD.encode(&key.key_data.x),
                    y: URL_SAFE_NO_PAD.encode(&key.key_data.y),
                },
            });
        }

        Self {
            context: vec![DID_CONTEXT.to_string(), SECP256K1_CONTEXT.to_string()],
            id,
            canonical_id: validated.canonical_did().value().to_string(),
            verification_method,
            authentication,
            assertion_method,
        }
    }

    /// Parse and validate a long-form DID, then build its document.
    pub fn resolve_long_form(did: &Did) -> Result<Self, DidError> {
        let validated = did.validate_long_form()?;
        Ok(Self::from_validated(did, &validated))
    }

    /// Serialize this document to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, DidError> {
        serde_json::to_string_pretty(self).map_err(|e| DidError::Serialization(e.to_string()))
    }

    /// Parse a DID Document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DidError> {
        serde_json::from_str(json).map_err(|e| DidError::Serialization(e.to_string()))
    }

    /// Structural checks: PRISM id, at least one key, at least one
    /// authentication reference, DID Core context, secp256k1 JWKs.
    pub fn validate(&self) -> Result<(), DidError> {
        if !self.id.starts_with(DID_PRISM_PREFIX) {
            return Err(DidError::InvalidDid(format!(
                "document ID must start with '{DID_PRISM_PREFIX}'"
            )));
        }

        if self.verification_method.is_empty() {
            return Err(DidError::InvalidOperation(
                "document must have at least one verification method".into(),
            ));
        }

        if self.authentication.is_empty() {
            return Err(DidError::InvalidOperation(
                "document must have at least one authentication method".into(),
            ));
        }

        if !self.context.iter().any(|c| c == DID_CONTEXT) {
            return Err(DidError::InvalidOperation(
                "document must include DID Core context".into(),
            ));
        }

        if let Some(method) = self
            .verification_method
            .iter()
            .find(|m| m.public_key_jwk.crv != CURVE_NAME)
        {
            return Err(DidError::InvalidOperation(format!(
                "verification method {} is not on {CURVE_NAME}",
                method.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Secp256k1Engine;
    use crate::did::DidBuilder;
    use std::sync::Arc;

    fn long_form_with_issuing() -> Did {
        let builder = DidBuilder::new(Arc::new(Secp256k1Engine));
        let master = builder.engine().generate_key_pair();
        let issuing = builder.engine().generate_key_pair();
        builder.create_unpublished_did_with_issuing_key(master.public_key(), issuing.public_key())
    }

    #[test]
    fn test_document_structure() {
        let did = long_form_with_issuing();
        let doc = DidDocument::resolve_long_form(&did).unwrap();

        assert_eq!(doc.id, did.value());
        assert_eq!(doc.canonical_id, did.to_canonical().unwrap().value());
        assert_eq!(doc.verification_method.len(), 2);
        assert_eq!(doc.authentication, vec![format!("{}#master0", did)]);
        assert_eq!(doc.assertion_method, vec![format!("{}#issuing0", did)]);

        let jwk = &doc.verification_method[0].public_key_jwk;
        assert_eq!(jwk.kty, "EC");
        assert_eq!(jwk.crv, "secp256k1");
        // 32 bytes → 43 base64url characters without padding.
        assert_eq!(jwk.x.len(), 43);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_json_field_names() {
        let doc = DidDocument::resolve_long_form(&long_form_with_issuing()).unwrap();
        let json = doc.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(parsed.get("@context").is_some());
        assert!(parsed.get("verificationMethod").is_some());
        assert!(parsed.get("assertionMethod").is_some());
        assert_eq!(
            parsed["verificationMethod"][0]["type"],
            "EcdsaSecp256k1VerificationKey2019"
        );
        assert!(parsed["verificationMethod"][0]["publicKeyJwk"]["x"].is_string());

        assert_eq!(DidDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_canonical_did_cannot_resolve() {
        let did = long_form_with_issuing().to_canonical().unwrap();
        assert!(matches!(
            DidDocument::resolve_long_form(&did),
            Err(DidError::NotLongForm(_))
        ));
    }

    #[test]
    fn test_validate_rejects_broken_documents() {
        let doc = DidDocument::resolve_long_form(&long_form_with_issuing()).unwrap();

        let mut no_auth = doc.clone();
        no_auth.authentication.clear();
        assert!(no_auth.validate().is_err());

        let mut wrong_method = doc.clone();
        wrong_method.id = "did:web:example.com".into();
        assert!(wrong_method.validate().is_err());

        let mut no_context = doc.clone();
        no_context.context.clear();
        assert!(no_context.validate().is_err());

        let mut wrong_curve = doc;
        wrong_curve.verification_method[0].public_key_jwk.crv = "P-256".into();
        assert!(wrong_curve.validate().is_err());
    }
}
