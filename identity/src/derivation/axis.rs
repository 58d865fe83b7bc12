//! A single step in a BIP32 derivation path.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DerivationError;
use crate::config::{HARDENED_BIT, MAX_AXIS_NUMBER};

/// One derivation step: a child number and whether it is hardened.
///
/// The number is always below 2^31. BIP32 packs both fields into one 32-bit
/// child index; that packing only happens at the edge, in
/// [`to_index`](Self::to_index) / [`from_index`](Self::from_index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawAxis")]
pub struct DerivationAxis {
    number: u32,
    hardened: bool,
}

/// Unchecked serde shape; goes through the range check on the way in.
#[derive(Deserialize)]
struct RawAxis {
    number: u32,
    hardened: bool,
}

impl TryFrom<RawAxis> for DerivationAxis {
    type Error = DerivationError;

    fn try_from(raw: RawAxis) -> Result<Self, Self::Error> {
        Self::checked(raw.number, raw.hardened)
    }
}

impl DerivationAxis {
    /// A normal (non-hardened) axis.
    pub fn normal(number: u32) -> Result<Self, DerivationError> {
        Self::checked(number, false)
    }

    /// A hardened axis.
    pub fn hardened(number: u32) -> Result<Self, DerivationError> {
        Self::checked(number, true)
    }

    fn checked(number: u32, hardened: bool) -> Result<Self, DerivationError> {
        if number > MAX_AXIS_NUMBER {
            return Err(DerivationError::AxisOutOfRange(u64::from(number)));
        }
        Ok(Self { number, hardened })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The BIP32 child index: top bit set for hardened axes.
    pub fn to_index(&self) -> u32 {
        if self.hardened {
            self.number | HARDENED_BIT
        } else {
            self.number
        }
    }

    /// Unpack a BIP32 child index. Every `u32` is a valid index.
    pub fn from_index(index: u32) -> Self {
        Self {
            number: index & MAX_AXIS_NUMBER,
            hardened: index & HARDENED_BIT != 0,
        }
    }
}

impl fmt::Display for DerivationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.number)
        } else {
            write!(f, "{}", self.number)
        }
    }
}
