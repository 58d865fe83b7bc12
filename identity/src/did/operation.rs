//! # Create-DID Operation
//!
//! The payload a long-form DID carries, and whose SHA-256 becomes the DID's
//! canonical suffix. The bytes are Protocol Buffers wire format; every
//! existing PRISM DID was hashed over exactly this encoding, so field
//! numbers are frozen:
//!
//! ```text
//! AtalaOperation      { 1: CreateDIDOperation }
//! CreateDIDOperation  { 1: DIDData }
//! DIDData             { 2: repeated PublicKey }
//! PublicKey           { 1: id, 2: usage (varint), 8: ECKeyData }
//! ECKeyData           { 1: curve, 2: x, 3: y }
//! ```
//!
//! Only the subset of the schema a create operation touches is modelled.
//! `prost` does the wire work (fields in tag order, proto3 defaults
//! omitted, unknown fields skipped); the domain types below convert to and
//! from the `wire` structs.

use prost::Message;

use crate::config::CURVE_NAME;
use crate::crypto::{EllipticCurveEngine, PublicKey, Sha256Digest};
use crate::derivation::KeyType;

use super::DidError;

/// Generated-style message structs with the frozen tags.
mod wire {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct AtalaOperation {
        #[prost(message, optional, tag = "1")]
        pub create_did: Option<CreateDidOperation>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct CreateDidOperation {
        #[prost(message, optional, tag = "1")]
        pub did_data: Option<DidData>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct DidData {
        #[prost(message, repeated, tag = "2")]
        pub public_keys: Vec<PublicKey>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct PublicKey {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(int32, tag = "2")]
        pub usage: i32,
        #[prost(message, optional, tag = "8")]
        pub ec_key_data: Option<EcKeyData>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct EcKeyData {
        #[prost(string, tag = "1")]
        pub curve: String,
        #[prost(bytes = "vec", tag = "2")]
        pub x: Vec<u8>,
        #[prost(bytes = "vec", tag = "3")]
        pub y: Vec<u8>,
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// What a key inside a DID document is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    Unknown = 0,
    Master = 1,
    Issuing = 2,
    Communication = 3,
    Authentication = 4,
    Revocation = 5,
}

impl KeyUsage {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(KeyUsage::Unknown),
            1 => Some(KeyUsage::Master),
            2 => Some(KeyUsage::Issuing),
            3 => Some(KeyUsage::Communication),
            4 => Some(KeyUsage::Authentication),
            5 => Some(KeyUsage::Revocation),
            _ => None,
        }
    }
}

impl From<KeyType> for KeyUsage {
    fn from(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Master => KeyUsage::Master,
            KeyType::Issuing => KeyUsage::Issuing,
            KeyType::Communication => KeyUsage::Communication,
            KeyType::Authentication => KeyUsage::Authentication,
        }
    }
}

/// An EC public key as it appears on the wire: curve name plus raw
/// big-endian coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcKeyData {
    pub curve: String,
    pub x: Vec<u8>,
    pub y: Vec<u8>,
}

impl EcKeyData {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self {
            curve: CURVE_NAME.to_string(),
            x: public_key.x().to_vec(),
            y: public_key.y().to_vec(),
        }
    }

    /// Decode back into a curve point. The curve must be ours and the point
    /// must be on it.
    pub fn to_public_key(&self, engine: &dyn EllipticCurveEngine) -> Result<PublicKey, DidError> {
        if self.curve != engine.curve_name() {
            return Err(DidError::InvalidOperation(format!(
                "unsupported curve '{}'",
                self.curve
            )));
        }
        engine
            .to_public_key_from_coordinates(&self.x, &self.y)
            .map_err(|_| DidError::InvalidPublicKeyEncoding)
    }
}

/// A key entry in the DID's initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPublicKey {
    pub id: String,
    pub usage: KeyUsage,
    pub key_data: EcKeyData,
}

/// The initial state of a DID: its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDidOperation {
    pub public_keys: Vec<OperationPublicKey>,
}

impl CreateDidOperation {
    /// The key with id `id`, if present.
    pub fn key(&self, id: &str) -> Option<&OperationPublicKey> {
        self.public_keys.iter().find(|key| key.id == id)
    }

    /// All keys with the given usage, in document order.
    pub fn keys_with_usage(&self, usage: KeyUsage) -> impl Iterator<Item = &OperationPublicKey> {
        self.public_keys.iter().filter(move |key| key.usage == usage)
    }
}

/// Top-level operation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtalaOperation {
    CreateDid(CreateDidOperation),
}

impl AtalaOperation {
    /// Protobuf encoding. Deterministic: the same operation always yields
    /// the same bytes.
    pub fn encode(&self) -> Vec<u8> {
        operation_to_wire(self).encode_to_vec()
    }

    /// Parse protobuf bytes. Only create-DID operations are understood.
    pub fn decode(bytes: &[u8]) -> Result<Self, DidError> {
        let message = wire::AtalaOperation::decode(bytes)
            .map_err(|e| DidError::InvalidOperation(format!("malformed operation: {e}")))?;
        let create = message
            .create_did
            .ok_or_else(|| DidError::InvalidOperation("not a create-DID operation".into()))?;
        let public_keys = create
            .did_data
            .map(|data| data.public_keys)
            .unwrap_or_default()
            .into_iter()
            .map(key_from_wire)
            .collect::<Result<_, _>>()?;
        Ok(AtalaOperation::CreateDid(CreateDidOperation { public_keys }))
    }

    /// SHA-256 of [`encode`](Self::encode).
    pub fn hash(&self) -> Sha256Digest {
        Sha256Digest::compute(&self.encode())
    }

    pub fn as_create_did(&self) -> Option<&CreateDidOperation> {
        match self {
            AtalaOperation::CreateDid(create) => Some(create),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire conversions
// ---------------------------------------------------------------------------

fn operation_to_wire(operation: &AtalaOperation) -> wire::AtalaOperation {
    match operation {
        AtalaOperation::CreateDid(create) => wire::AtalaOperation {
            create_did: Some(wire::CreateDidOperation {
                did_data: Some(wire::DidData {
                    public_keys: create.public_keys.iter().map(key_to_wire).collect(),
                }),
            }),
        },
    }
}

fn key_to_wire(key: &OperationPublicKey) -> wire::PublicKey {
    wire::PublicKey {
        id: key.id.clone(),
        usage: key.usage.code(),
        ec_key_data: Some(wire::EcKeyData {
            curve: key.key_data.curve.clone(),
            x: key.key_data.x.clone(),
            y: key.key_data.y.clone(),
        }),
    }
}

fn key_from_wire(key: wire::PublicKey) -> Result<OperationPublicKey, DidError> {
    let usage = KeyUsage::from_code(key.usage)
        .ok_or_else(|| DidError::InvalidOperation(format!("unknown key usage {}", key.usage)))?;
    let ec = key
        .ec_key_data
        .ok_or_else(|| DidError::InvalidOperation(format!("key '{}' has no EC key data", key.id)))?;
    Ok(OperationPublicKey {
        id: key.id,
        usage,
        key_data: EcKeyData {
            curve: ec.curve,
            x: ec.x,
            y: ec.y,
        },
    })
}
