//! The `Did` string type and its two forms.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::operation::{AtalaOperation, CreateDidOperation};
use super::DidError;
use crate::config::{DID_PRISM_PREFIX, DID_TEST_PREFIX, MASTER_KEY_ID, STATE_HASH_HEX_LENGTH};
use crate::crypto::{EllipticCurveEngine, PublicKey, Sha256Digest};

/// `[A-Za-z0-9_-]+`
fn is_id_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// 64 lowercase hex characters.
fn is_state_hash(text: &str) -> bool {
    text.len() == STATE_HASH_HEX_LENGTH
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Everything after `did:prism:`, e.g. `<hash>` or `<hash>:<state>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidSuffix(String);

impl DidSuffix {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<Sha256Digest> for DidSuffix {
    fn from(digest: Sha256Digest) -> Self {
        Self(digest.hex_value())
    }
}

impl fmt::Display for DidSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two halves of a long-form suffix, not yet checked against each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongForm {
    state_hash: String,
    encoded_state: String,
}

impl LongForm {
    pub fn state_hash(&self) -> &str {
        &self.state_hash
    }

    pub fn encoded_state(&self) -> &str {
        &self.encoded_state
    }

    /// Decode the embedded operation and make sure it hashes to the state
    /// hash. This is what makes a long-form DID self-certifying.
    pub fn validate(&self) -> Result<ValidatedLongForm, DidError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.encoded_state)
            .map_err(|_| DidError::InvalidEncodedState)?;

        let actual = Sha256Digest::compute(&bytes);
        if actual.hex_value() != self.state_hash {
            return Err(DidError::StateHashMismatch {
                expected: self.state_hash.clone(),
                actual: actual.hex_value(),
            });
        }

        let operation = AtalaOperation::decode(&bytes)?;
        let initial_state = operation
            .as_create_did()
            .cloned()
            .ok_or_else(|| DidError::InvalidOperation("not a create-DID operation".into()))?;

        Ok(ValidatedLongForm {
            state_hash: actual,
            initial_state,
        })
    }
}

/// A long-form DID whose payload has been decoded and hash-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLongForm {
    state_hash: Sha256Digest,
    initial_state: CreateDidOperation,
}

impl ValidatedLongForm {
    pub fn state_hash(&self) -> &Sha256Digest {
        &self.state_hash
    }

    /// The canonical suffix: hex of the state hash.
    pub fn suffix(&self) -> DidSuffix {
        DidSuffix::from(self.state_hash)
    }

    pub fn initial_state(&self) -> &CreateDidOperation {
        &self.initial_state
    }

    /// The canonical DID this long form reduces to.
    pub fn canonical_did(&self) -> Did {
        Did::build_canonical(&self.state_hash)
    }

    /// Decode the `master0` key from the initial state.
    pub fn master_public_key(
        &self,
        engine: &dyn EllipticCurveEngine,
    ) -> Result<PublicKey, DidError> {
        let key = self.initial_state.key(MASTER_KEY_ID).ok_or_else(|| {
            DidError::InvalidOperation(format!("initial state has no '{MASTER_KEY_ID}' key"))
        })?;
        key.key_data.to_public_key(engine)
    }
}

/// Shape of a DID string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidFormat {
    LongForm(LongForm),
    Canonical { suffix: String },
    Unknown,
}

/// A syntactically valid DID string.
///
/// Only `did:prism:` and the legacy `did:test:` method are accepted by
/// [`parse`](Self::parse). Whether the suffix is a well-formed PRISM
/// long/canonical form is a separate question, answered by
/// [`format`](Self::format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Did {
    value: String,
}

impl Did {
    /// Validate against `^did:(prism|test)(:[A-Za-z0-9_-]+)+$`.
    pub fn parse(text: &str) -> Result<Self, DidError> {
        let rest = text
            .strip_prefix(DID_PRISM_PREFIX)
            .or_else(|| text.strip_prefix(DID_TEST_PREFIX))
            .ok_or_else(|| DidError::InvalidDid(text.to_string()))?;

        if !rest.split(':').all(is_id_segment) {
            return Err(DidError::InvalidDid(text.to_string()));
        }
        Ok(Self {
            value: text.to_string(),
        })
    }

    /// `did:prism:<state_hash>` or, with an encoded state,
    /// `did:prism:<state_hash>:<encoded_state>`. Inputs are trusted.
    pub fn build_prism_did(state_hash: &str, encoded_state: Option<&str>) -> Self {
        let value = match encoded_state {
            Some(state) => format!("{DID_PRISM_PREFIX}{state_hash}:{state}"),
            None => format!("{DID_PRISM_PREFIX}{state_hash}"),
        };
        Self { value }
    }

    pub fn from_suffix(suffix: &DidSuffix) -> Self {
        Self {
            value: format!("{DID_PRISM_PREFIX}{}", suffix.value()),
        }
    }

    pub fn build_canonical(state_hash: &Sha256Digest) -> Self {
        Self::build_prism_did(&state_hash.hex_value(), None)
    }

    /// Long form for an operation: hash and payload both come from `operation`.
    pub fn build_long_form(operation: &AtalaOperation) -> Self {
        let bytes = operation.encode();
        let state_hash = Sha256Digest::compute(&bytes);
        let encoded_state = URL_SAFE_NO_PAD.encode(&bytes);
        Self::build_prism_did(&state_hash.hex_value(), Some(&encoded_state))
    }

    /// The full DID string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The DID with `did:prism:` removed. Non-PRISM DIDs come back whole.
    pub fn strip_prism_prefix(&self) -> &str {
        self.value
            .strip_prefix(DID_PRISM_PREFIX)
            .unwrap_or(&self.value)
    }

    /// Everything after `did:prism:`.
    pub fn suffix(&self) -> DidSuffix {
        DidSuffix::new(self.strip_prism_prefix())
    }

    pub fn is_long_form(&self) -> bool {
        matches!(self.format(), DidFormat::LongForm(_))
    }

    pub fn is_canonical_form(&self) -> bool {
        matches!(self.format(), DidFormat::Canonical { .. })
    }

    pub fn format(&self) -> DidFormat {
        let Some(rest) = self.value.strip_prefix(DID_PRISM_PREFIX) else {
            return DidFormat::Unknown;
        };
        match rest.split_once(':') {
            None if is_state_hash(rest) => DidFormat::Canonical {
                suffix: rest.to_string(),
            },
            Some((hash, state)) if is_state_hash(hash) && is_id_segment(state) => {
                DidFormat::LongForm(LongForm {
                    state_hash: hash.to_string(),
                    encoded_state: state.to_string(),
                })
            }
            _ => DidFormat::Unknown,
        }
    }

    /// The hash part of the suffix, for either form.
    pub fn canonical_suffix(&self) -> Option<DidSuffix> {
        match self.format() {
            DidFormat::Canonical { suffix } => Some(DidSuffix::new(suffix)),
            DidFormat::LongForm(long) => Some(DidSuffix::new(long.state_hash)),
            DidFormat::Unknown => None,
        }
    }

    pub fn as_long_form(&self) -> Option<LongForm> {
        match self.format() {
            DidFormat::LongForm(long) => Some(long),
            _ => None,
        }
    }

    /// `did:prism:<hash>` for either form; `None` if the DID has neither.
    pub fn to_canonical(&self) -> Option<Did> {
        self.canonical_suffix().map(|suffix| Did::from_suffix(&suffix))
    }

    /// Shortcut for `as_long_form()?.validate()`.
    pub fn validate_long_form(&self) -> Result<ValidatedLongForm, DidError> {
        self.as_long_form()
            .ok_or_else(|| DidError::NotLongForm(self.value.clone()))?
            .validate()
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
