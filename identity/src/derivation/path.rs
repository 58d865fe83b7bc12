//! Derivation paths in the `m/0'/1/2'` notation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::axis::DerivationAxis;
use super::DerivationError;

/// An ordered list of axes from the master key down to a leaf.
///
/// The empty path is the master key itself and prints as `m`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    axes: Vec<DerivationAxis>,
}

impl DerivationPath {
    /// The master path, `m`.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_axes(axes: Vec<DerivationAxis>) -> Self {
        Self { axes }
    }

    /// Parse the textual form. Grammar: `m(/[0-9]+'?)*`.
    ///
    /// Only `'` marks a hardened step; `h`/`H` are rejected. Numbers that
    /// don't fit below 2^31 fail with [`DerivationError::AxisOutOfRange`],
    /// everything else malformed with [`DerivationError::InvalidPathSyntax`].
    pub fn parse(text: &str) -> Result<Self, DerivationError> {
        let syntax_error = || DerivationError::InvalidPathSyntax(text.to_string());

        let mut segments = text.split('/');
        if segments.next() != Some("m") {
            return Err(syntax_error());
        }

        let mut axes = Vec::new();
        for segment in segments {
            let (digits, hardened) = match segment.strip_suffix('\'') {
                Some(digits) => (digits, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(syntax_error());
            }
            // All digits, so parse only fails on overflow.
            let number = digits.parse::<u64>().unwrap_or(u64::MAX);
            let number =
                u32::try_from(number).map_err(|_| DerivationError::AxisOutOfRange(number))?;
            let axis = if hardened {
                DerivationAxis::hardened(number)?
            } else {
                DerivationAxis::normal(number)?
            };
            axes.push(axis);
        }
        Ok(Self { axes })
    }

    /// A new path one step deeper. `self` is left untouched.
    pub fn derive(&self, axis: DerivationAxis) -> Self {
        let mut axes = Vec::with_capacity(self.axes.len() + 1);
        axes.extend_from_slice(&self.axes);
        axes.push(axis);
        Self { axes }
    }

    /// The path one step up, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.axes.split_last()?;
        Some(Self {
            axes: parent.to_vec(),
        })
    }

    pub fn axes(&self) -> &[DerivationAxis] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for axis in &self.axes {
            write!(f, "/{axis}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a DerivationAxis;
    type IntoIter = std::slice::Iter<'a, DerivationAxis>;

    fn into_iter(self) -> Self::IntoIter {
        self.axes.iter()
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
