// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # PRISM Wallet
//!
//! Entry point for the `prism-wallet` binary. Parses CLI arguments,
//! initializes logging, builds the crypto engine and dispatches to one of
//! the subcommands:
//!
//! - `mnemonic` — generate or check a recovery phrase
//! - `derive`   — print the key at a BIP32 path
//! - `did`      — create or inspect `did:prism:` identifiers
//! - `sign`     — sign a message with a derived key
//! - `verify`   — check a signature
//! - `version`  — print build version information

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use prism_identity::config::{EngineConfig, CURVE_NAME, SIGNATURE_ALGORITHM};
use prism_identity::crypto::{engine_for, EllipticCurveEngine, Signature};
use prism_identity::derivation::{
    binary_seed, derive_key, DerivationPath, ExtendedKey, MnemonicCode, WordCount,
};
use prism_identity::did::{Did, DidBuilder, DidDocument, DidFormat};

use cli::{Commands, DidCommand, MnemonicCommand, PrismWalletCli, SeedArgs};

fn main() -> Result<()> {
    let cli = PrismWalletCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let engine = engine_for(&EngineConfig::with_backend(cli.backend));
    tracing::debug!(backend = %cli.backend, curve = engine.curve_name(), "engine ready");

    match cli.command {
        Commands::Mnemonic(MnemonicCommand::New { words }) => new_mnemonic(words),
        Commands::Mnemonic(MnemonicCommand::Check { phrase }) => check_mnemonic(&phrase),
        Commands::Derive(args) => derive(engine, args),
        Commands::Did(DidCommand::Create { seed, did_index }) => {
            create_did(engine, &seed, did_index)
        }
        Commands::Did(DidCommand::Inspect { did }) => inspect_did(engine.as_ref(), &did),
        Commands::Sign(args) => sign(engine, args),
        Commands::Verify(args) => verify(engine.as_ref(), args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn new_mnemonic(words: usize) -> Result<()> {
    let count = WordCount::try_from(words).context("unsupported word count")?;
    let mnemonic = MnemonicCode::random(count);
    println!("{}", mnemonic.phrase().as_str());
    Ok(())
}

fn check_mnemonic(phrase: &str) -> Result<()> {
    let mnemonic = MnemonicCode::new(phrase.split_whitespace().map(str::to_string).collect());
    match mnemonic.validate() {
        Ok(()) => {
            println!("valid ({} words)", mnemonic.len());
            Ok(())
        }
        Err(e) => bail!("invalid mnemonic: {e}"),
    }
}

/// Validated mnemonic plus passphrase, stretched and walked to `path`.
fn key_at(
    engine: Arc<dyn EllipticCurveEngine>,
    seed: &SeedArgs,
    path: &str,
) -> Result<ExtendedKey> {
    let mnemonic: MnemonicCode = seed.mnemonic.parse().context("invalid mnemonic")?;
    let path: DerivationPath = path
        .parse()
        .with_context(|| format!("invalid derivation path {path:?}"))?;
    let seed = binary_seed(&mnemonic, &seed.passphrase).context("failed to stretch seed")?;
    derive_key(engine, seed.as_slice(), &path)
        .with_context(|| format!("failed to derive key at {path}"))
}

fn derive(engine: Arc<dyn EllipticCurveEngine>, args: cli::DeriveArgs) -> Result<()> {
    let key = key_at(engine, &args.seed, &args.path)?;

    println!("path        : {}", key.path());
    println!("public key  : {}", key.public_key().to_hex());
    println!("compressed  : {}", hex::encode(key.public_key().compressed()));
    if args.show_private {
        if let Some(private) = key.private_key() {
            println!("private key : {}", private.to_hex());
        }
    }
    Ok(())
}

fn create_did(
    engine: Arc<dyn EllipticCurveEngine>,
    seed: &SeedArgs,
    did_index: u32,
) -> Result<()> {
    let mnemonic: MnemonicCode = seed.mnemonic.parse().context("invalid mnemonic")?;
    let context = DidBuilder::new(engine)
        .create_did_from_mnemonic(&mnemonic, did_index, &seed.passphrase)
        .context("failed to create DID")?;
    let canonical = context
        .unpublished_did
        .to_canonical()
        .context("built DID has no canonical form")?;

    tracing::info!(did_index, canonical = %canonical, "DID created");
    println!("long form      : {}", context.unpublished_did);
    println!("canonical      : {canonical}");
    println!("operation hash : {}", context.operation_hash);
    println!("signed with    : {}", context.signed_operation.signed_with);
    println!("signature      : {}", context.signed_operation.signature.to_hex());
    Ok(())
}

fn inspect_did(engine: &dyn EllipticCurveEngine, text: &str) -> Result<()> {
    let did = Did::parse(text).context("not a DID")?;

    match did.format() {
        DidFormat::Canonical { suffix } => {
            println!("format : canonical");
            println!("suffix : {suffix}");
        }
        DidFormat::LongForm(_) => {
            let validated = did.validate_long_form().context("invalid long-form DID")?;
            let master = validated
                .master_public_key(engine)
                .context("long-form DID has no usable master key")?;
            let document = DidDocument::from_validated(&did, &validated);
            document.validate().context("resolved document is malformed")?;

            println!("format     : long");
            println!("suffix     : {}", validated.suffix());
            println!("master key : {}", master.to_hex());
            println!("{}", document.to_json()?);
        }
        DidFormat::Unknown => {
            println!("format : unknown");
        }
    }
    Ok(())
}

fn sign(engine: Arc<dyn EllipticCurveEngine>, args: cli::SignArgs) -> Result<()> {
    let key = key_at(engine.clone(), &args.seed, &args.path)?;
    let pair = key.key_pair()?;
    let signature = engine.sign_text(&args.message, pair.private_key())?;
    let der = engine.signature_to_der(&signature)?;

    println!("public key : {}", pair.public_key().to_hex());
    println!("signature  : {}", signature.to_hex());
    println!("der        : {}", hex::encode(der));
    Ok(())
}

fn verify(engine: &dyn EllipticCurveEngine, args: cli::VerifyArgs) -> Result<()> {
    let public_key_bytes = hex::decode(&args.public_key).context("public key is not hex")?;
    let public_key = engine
        .to_public_key(&public_key_bytes)
        .context("invalid public key")?;

    let signature_bytes = hex::decode(&args.signature).context("signature is not hex")?;
    let signature = match Signature::from_slice(&signature_bytes) {
        Ok(signature) => signature,
        Err(_) => engine
            .to_signature(&signature_bytes)
            .context("signature is neither r||s nor DER")?,
    };

    if engine.verify_text(&args.message, &public_key, &signature) {
        println!("valid");
        Ok(())
    } else {
        bail!("signature does not verify")
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("prism-wallet {}", env!("CARGO_PKG_VERSION"));
    println!("curve        {CURVE_NAME}");
    println!("signature    {SIGNATURE_ALGORITHM}");
}
