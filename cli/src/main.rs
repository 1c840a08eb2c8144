// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Moose CLI
//!
//! Entry point for the `moose-cli` binary. Parses CLI arguments, initializes
//! logging, loads the network configuration and runs one command.
//!
//! - `keys`                 — derive keys and address from a secret
//! - `transfer`, `second-signature`, `delegate`, `vote`, `multisignature`,
//!   `song`, `song-transfer` — build, sign and print a submission request
//! - `cosign`               — sign an existing record as a cosigner
//! - `verify`               — check a record's signatures and id
//! - `version`              — print build version information

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use moose_protocol::config::NetworkConfig;
use moose_protocol::crypto::MoosePublicKey;
use moose_protocol::transaction::{
    DelegateOptions, MultisignatureOptions, SigningEngine, SongOptions, SongTransferOptions,
    SubmissionRequest, Transaction, TransactionBuilder, TransactionOptions, TransferOptions,
    VoteOptions,
};

use cli::{Commands, MooseCli, SecretArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = MooseCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let engine = SigningEngine::with_config(load_config(cli.config.as_deref())?);

    match cli.command {
        Commands::Keys(args) => {
            let keys = engine.derive_keypair(&args.secret);
            print_json(&json!({
                "publicKey": keys.public_key().to_hex(),
                "privateKey": keys.private_key_hex(),
                "address": engine.derive_address(&keys.public_key()).to_string(),
            }))
        }
        Commands::Transfer(args) => {
            let requester = args
                .requester_public_key
                .as_deref()
                .map(MoosePublicKey::from_hex)
                .transpose()
                .context("invalid --requester-public-key")?;
            let options = TransactionOptions::Transfer(TransferOptions {
                recipient_id: Some(args.recipient),
                amount: Some(args.amount),
            });
            build_and_print(&engine, &args.secrets, requester, &options)
        }
        Commands::SecondSignature(args) => {
            let secrets = SecretArgs {
                secret: args.secret,
                second_secret: Some(args.second_secret),
                timestamp: args.timestamp,
            };
            build_and_print(&engine, &secrets, None, &TransactionOptions::SecondSignature)
        }
        Commands::Delegate(args) => {
            let options = TransactionOptions::Delegate(DelegateOptions {
                username: Some(args.username),
            });
            build_and_print(&engine, &args.secrets, None, &options)
        }
        Commands::Vote(args) => {
            let options = TransactionOptions::Vote(VoteOptions {
                votes: Some(args.votes),
            });
            build_and_print(&engine, &args.secrets, None, &options)
        }
        Commands::Multisignature(args) => {
            let options = TransactionOptions::Multisignature(MultisignatureOptions {
                keysgroup: Some(args.keysgroup),
                min: Some(args.min),
                lifetime: Some(args.lifetime),
            });
            build_and_print(&engine, &args.secrets, None, &options)
        }
        Commands::Song(args) => {
            let options = TransactionOptions::Song(SongOptions {
                title: Some(args.title),
                artist: args.artist,
                fingerprint: args.fingerprint,
                owners: args.owners,
                song_type: Some(args.song_type),
                genre: Some(args.genre),
            });
            build_and_print(&engine, &args.secrets, None, &options)
        }
        Commands::SongTransfer(args) => {
            let options = TransactionOptions::SongTransfer(SongTransferOptions {
                song_id: Some(args.song_id),
            });
            build_and_print(&engine, &args.secrets, None, &options)
        }
        Commands::Cosign(args) => {
            let tx = read_transaction(&args.transaction)?;
            let keys = engine.derive_keypair(&args.secret);
            let signature = if args.multisignature {
                engine.multi_sign(&tx, &keys)
            } else {
                engine.cosign(&tx, &keys)
            };
            tracing::info!(id = %tx.id, multisignature = args.multisignature, "transaction cosigned");
            let request = SubmissionRequest::signature(tx.id, &keys.public_key(), &signature);
            print_json(&serde_json::to_value(&request)?)
        }
        Commands::Verify(args) => {
            let tx = read_transaction(&args.transaction)?;
            verify(&engine, &tx, args.second_public_key.as_deref())
        }
        Commands::Version => Ok(()),
    }
}

/// Loads the network configuration, or mainnet defaults without a path.
fn load_config(path: Option<&Path>) -> Result<NetworkConfig> {
    match path {
        Some(path) => NetworkConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(NetworkConfig::default()),
    }
}

fn build_and_print(
    engine: &SigningEngine,
    secrets: &SecretArgs,
    requester: Option<MoosePublicKey>,
    options: &TransactionOptions,
) -> Result<()> {
    let mut builder = TransactionBuilder::new(engine);
    if let Some(ts) = secrets.timestamp {
        builder = builder.timestamp(ts);
    }
    if let Some(pk) = requester {
        builder = builder.requester_public_key(pk);
    }

    let tx = builder
        .build(&secrets.secret, secrets.second_secret.as_deref(), options)
        .with_context(|| format!("failed to build {} transaction", options.kind()))?;

    let request = SubmissionRequest::transaction(&tx)?;
    print_json(&serde_json::to_value(&request)?)
}

fn verify(engine: &SigningEngine, tx: &Transaction, second_key: Option<&str>) -> Result<()> {
    let signature_ok = engine.verify(tx);
    let id_ok = engine.id(tx) == tx.id;
    let second_ok = match second_key {
        Some(hex) => {
            let pk = MoosePublicKey::from_hex(hex).context("invalid --second-public-key")?;
            Some(engine.verify_second_signature(tx, &pk))
        }
        None => None,
    };

    print_json(&json!({
        "id": tx.id.to_string(),
        "type": tx.tx_type().id(),
        "signature": signature_ok,
        "secondSignature": second_ok,
        "idMatches": id_ok,
    }))?;

    if !(signature_ok && id_ok && second_ok.unwrap_or(true)) {
        bail!("transaction {} failed verification", tx.id);
    }
    tracing::info!(id = %tx.id, "transaction verified");
    Ok(())
}

/// Reads a transaction record from a file, or stdin for `-`.
fn read_transaction(path: &Path) -> Result<Transaction> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read transaction from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transaction from {}", path.display()))?
    };

    let value: serde_json::Value = serde_json::from_str(&raw).context("transaction is not JSON")?;
    serde_json::from_value(unwrap_record(value)).context("invalid transaction record")
}

/// Accepts a bare record, a `{"transaction": ...}` body, or the whole
/// submission request the build commands print.
fn unwrap_record(value: serde_json::Value) -> serde_json::Value {
    let value = match value.get("body") {
        Some(body) if body.is_object() => body.clone(),
        _ => value,
    };
    match value.get("transaction") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("moose-cli {}", env!("CARGO_PKG_VERSION"));
    println!("epoch     {}", moose_protocol::config::default_epoch().to_rfc3339());
}
