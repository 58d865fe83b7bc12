//! # CLI Interface
//!
//! Defines the command-line argument structure for `prism-wallet` using
//! `clap` derive. Secrets can come from flags or from `PRISM_MNEMONIC` and
//! `PRISM_PASSPHRASE`, so they don't have to end up in shell history.

use clap::{Args, Parser, Subcommand};

use prism_identity::config::CurveBackend;

use crate::logging::LogFormat;

/// PRISM identity wallet.
///
/// Generates mnemonics, derives keys, signs messages and builds
/// `did:prism:` identifiers, all offline.
#[derive(Parser, Debug)]
#[command(
    name = "prism-wallet",
    about = "PRISM identity wallet",
    version,
    propagate_version = true
)]
pub struct PrismWalletCli {
    /// Curve implementation backing the crypto engine.
    #[arg(long, global = true, env = "PRISM_CURVE_BACKEND", default_value = "k256")]
    pub backend: CurveBackend,

    /// Log output format: pretty or json.
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate or check BIP39 mnemonics.
    #[command(subcommand)]
    Mnemonic(MnemonicCommand),
    /// Derive the key at a BIP32 path.
    Derive(DeriveArgs),
    /// Create or inspect PRISM DIDs.
    #[command(subcommand)]
    Did(DidCommand),
    /// Sign a UTF-8 message with the key at a BIP32 path.
    Sign(SignArgs),
    /// Verify a signature against a public key.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum MnemonicCommand {
    /// Generate a fresh mnemonic from OS entropy.
    New {
        /// Number of words: 12, 15, 18, 21 or 24.
        #[arg(long, default_value_t = 12)]
        words: usize,
    },
    /// Check a phrase's length, words and checksum.
    Check {
        /// The phrase, quoted.
        phrase: String,
    },
}

/// Where the seed comes from.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Mnemonic phrase.
    #[arg(long, env = "PRISM_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,

    /// Optional BIP39 passphrase.
    #[arg(long, env = "PRISM_PASSPHRASE", hide_env_values = true, default_value = "")]
    pub passphrase: String,
}

#[derive(Args, Debug)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// BIP32 path, e.g. `m/0'/0'/0'`.
    #[arg(long)]
    pub path: String,

    /// Also print the private key.
    #[arg(long)]
    pub show_private: bool,
}

#[derive(Subcommand, Debug)]
pub enum DidCommand {
    /// Create the long-form DID for the master key of a DID index.
    Create {
        #[command(flatten)]
        seed: SeedArgs,

        /// DID index (first hardened axis of the key paths).
        #[arg(long, default_value_t = 0)]
        did_index: u32,
    },
    /// Show the format of a DID and, for long forms, its DID Document.
    Inspect {
        /// The DID to inspect.
        did: String,
    },
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// BIP32 path of the signing key.
    #[arg(long, default_value = "m/0'/0'/0'")]
    pub path: String,

    /// Message to sign.
    #[arg(long)]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// SEC1 public key, hex (uncompressed, 65 bytes).
    #[arg(long)]
    pub public_key: String,

    /// Message that was signed.
    #[arg(long)]
    pub message: String,

    /// Signature, hex: either 64-byte `r || s` or DER.
    #[arg(long)]
    pub signature: String,
}
