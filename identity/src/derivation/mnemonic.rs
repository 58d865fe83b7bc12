//! # Mnemonic Codes (BIP39)
//!
//! A mnemonic is the human-facing backup of a wallet: 12 to 24 words from
//! the BIP39 English list, encoding random entropy plus a short SHA-256
//! checksum. [`binary_seed`] stretches it into the 64-byte seed that
//! [`ExtendedKey::from_seed`](super::ExtendedKey::from_seed) consumes.
//!
//! Word encoding, checksum and seed stretching all go through the `bip39`
//! crate; this module adds a word-list type that can hold an unchecked
//! phrase and typed errors on top.
//!
//! ## Security
//!
//! Words are zeroized on drop, `Debug` never prints them, errors carry a
//! word's position but never the word, and the stretched seed comes back in
//! a [`Zeroizing`] buffer.

use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{BINARY_SEED_LENGTH, SUPPORTED_WORD_COUNTS};

/// Reasons a mnemonic can be rejected.
///
/// Checked in this order: length, then each word, then the checksum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MnemonicError {
    /// Word count is not one of 12, 15, 18, 21, 24.
    #[error("invalid mnemonic length: {0} words (expected 12, 15, 18, 21 or 24)")]
    InvalidLength(usize),

    /// The word at this position is not in the English wordlist.
    #[error("word #{0} is not in the BIP39 English wordlist")]
    UnknownWord(usize),

    /// The embedded checksum doesn't match the entropy.
    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    /// Entropy must be 16 to 32 bytes in steps of 4.
    #[error("invalid entropy length: {0} bytes")]
    InvalidEntropyLength(usize),

    #[error("mnemonic encoding error: {0}")]
    Encoding(String),
}

impl From<bip39::Error> for MnemonicError {
    fn from(err: bip39::Error) -> Self {
        match err {
            bip39::Error::BadWordCount(count) => MnemonicError::InvalidLength(count),
            bip39::Error::UnknownWord(index) => MnemonicError::UnknownWord(index),
            bip39::Error::InvalidChecksum => MnemonicError::ChecksumMismatch,
            bip39::Error::BadEntropyBitCount(bits) => MnemonicError::InvalidEntropyLength(bits / 8),
            other => MnemonicError::Encoding(other.to_string()),
        }
    }
}

/// Supported mnemonic lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WordCount {
    /// 128 bits of entropy.
    #[default]
    Twelve = 12,
    /// 160 bits.
    Fifteen = 15,
    /// 192 bits.
    Eighteen = 18,
    /// 224 bits.
    TwentyOne = 21,
    /// 256 bits.
    TwentyFour = 24,
}

impl WordCount {
    /// Bytes of entropy behind this many words.
    pub const fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::Fifteen => 20,
            WordCount::Eighteen => 24,
            WordCount::TwentyOne => 28,
            WordCount::TwentyFour => 32,
        }
    }

    pub const fn words(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for WordCount {
    type Error = MnemonicError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            12 => Ok(WordCount::Twelve),
            15 => Ok(WordCount::Fifteen),
            18 => Ok(WordCount::Eighteen),
            21 => Ok(WordCount::TwentyOne),
            24 => Ok(WordCount::TwentyFour),
            other => Err(MnemonicError::InvalidLength(other)),
        }
    }
}

/// An ordered list of BIP39 words.
///
/// [`new`](Self::new) stores words as given; call
/// [`validate`](Self::validate) (or go through [`FromStr`]) before trusting
/// them. [`binary_seed`] validates on its own.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MnemonicCode {
    words: Vec<String>,
}

impl MnemonicCode {
    /// Wrap words without checking them.
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Fresh mnemonic of the given length from the OS CSPRNG.
    pub fn random(word_count: WordCount) -> Self {
        let mut entropy = Zeroizing::new([0u8; 32]);
        let len = word_count.entropy_bytes();
        OsRng.fill_bytes(&mut entropy[..len]);
        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..len])
            .expect("every WordCount has a valid entropy length");
        Self::from_bip39(&mnemonic)
    }

    /// Fresh 12-word mnemonic.
    pub fn random_mnemonic_code() -> Self {
        Self::random(WordCount::default())
    }

    /// Encode caller-supplied entropy (16 to 32 bytes, multiple of 4).
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, MnemonicError> {
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)?;
        Ok(Self::from_bip39(&mnemonic))
    }

    fn from_bip39(mnemonic: &Mnemonic) -> Self {
        Self {
            words: mnemonic.words().map(str::to_string).collect(),
        }
    }

    /// Check length, vocabulary and checksum, in that order.
    pub fn validate(&self) -> Result<(), MnemonicError> {
        if !SUPPORTED_WORD_COUNTS.contains(&self.words.len()) {
            return Err(MnemonicError::InvalidLength(self.words.len()));
        }
        self.to_bip39().map(drop)
    }

    fn to_bip39(&self) -> Result<Mnemonic, MnemonicError> {
        Ok(Mnemonic::parse_in_normalized(
            Language::English,
            &self.phrase(),
        )?)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words joined by single spaces.
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.words.join(" "))
    }

    /// Whether `word` is in the English wordlist.
    pub fn is_valid_word(word: &str) -> bool {
        Language::English.find_word(word).is_some()
    }

    /// The full English wordlist, in index order.
    pub fn valid_words() -> &'static [&'static str] {
        Language::English.word_list()
    }
}

impl FromStr for MnemonicCode {
    type Err = MnemonicError;

    /// Split on any whitespace and validate.
    fn from_str(phrase: &str) -> Result<Self, Self::Err> {
        let code = Self::new(phrase.split_whitespace().map(str::to_string).collect());
        code.validate()?;
        Ok(code)
    }
}

impl fmt::Debug for MnemonicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicCode")
            .field("word_count", &self.words.len())
            .field("words", &"[REDACTED]")
            .finish()
    }
}

/// Stretch a mnemonic into a 64-byte BIP32 seed.
///
/// PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" || passphrase`, both
/// NFKD-normalized. The mnemonic is validated first; a bad checksum is an
/// error here, not a silently different seed.
pub fn binary_seed(
    mnemonic: &MnemonicCode,
    passphrase: &str,
) -> Result<Zeroizing<[u8; BINARY_SEED_LENGTH]>, MnemonicError> {
    mnemonic.validate()?;
    let parsed = mnemonic.to_bip39()?;
    Ok(Zeroizing::new(parsed.to_seed(passphrase)))
}
