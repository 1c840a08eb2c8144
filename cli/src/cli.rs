//! # CLI Interface
//!
//! Defines the command-line argument structure for `moose-cli` using
//! `clap` derive. Construction commands print a submission request as JSON
//! on stdout; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use moose_protocol::transaction::parse_amount;

/// Moose offline transaction tool.
///
/// Derives keys, builds and signs every Moose transaction kind, cosigns
/// multisignature transactions and verifies finished records. Never touches
/// the network.
#[derive(Parser, Debug)]
#[command(
    name = "moose-cli",
    about = "Build, sign and verify Moose transactions offline",
    version,
    propagate_version = true
)]
pub struct MooseCli {
    /// Network configuration file (JSON). Mainnet defaults when omitted.
    #[arg(long, short = 'c', global = true, env = "MOOSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format on stderr: `pretty` or `json`.
    #[arg(long, global = true, env = "MOOSE_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the public key, private key and address for a secret.
    Keys(KeysArgs),
    /// Transfer MOOSE to another account.
    Transfer(TransferArgs),
    /// Register a second signature key.
    SecondSignature(SecondSignatureArgs),
    /// Register as a delegate.
    Delegate(DelegateArgs),
    /// Vote for or against delegates.
    Vote(VoteArgs),
    /// Turn the account into a multisignature account.
    Multisignature(MultisignatureArgs),
    /// Register a song.
    Song(SongArgs),
    /// Transfer a registered song.
    SongTransfer(SongTransferArgs),
    /// Cosign an existing transaction record.
    Cosign(CosignArgs),
    /// Verify the signatures of a transaction record.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

/// Secrets shared by every construction command.
#[derive(Args, Debug)]
pub struct SecretArgs {
    /// Account secret. Prefer the environment variable over the flag.
    #[arg(long, env = "MOOSE_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Second secret, when the account has a second signature registered.
    #[arg(long, env = "MOOSE_SECOND_SECRET", hide_env_values = true)]
    pub second_secret: Option<String>,

    /// Fixed timestamp in seconds since the network epoch. Defaults to now.
    #[arg(long, allow_negative_numbers = true)]
    pub timestamp: Option<i64>,
}

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[arg(long, env = "MOOSE_SECRET", hide_env_values = true)]
    pub secret: String,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    /// Recipient address, e.g. `58191285901858109M`.
    #[arg(long)]
    pub recipient: String,

    /// Amount in MOOSE, up to eight decimals, e.g. `12.5`.
    #[arg(long, value_parser = parse_moose_amount)]
    pub amount: u64,

    /// Hex public key of an account acting on the sender's behalf.
    #[arg(long)]
    pub requester_public_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct SecondSignatureArgs {
    #[arg(long, env = "MOOSE_SECRET", hide_env_values = true)]
    pub secret: String,

    /// The new second secret. Its public key is what gets registered.
    #[arg(long, env = "MOOSE_SECOND_SECRET", hide_env_values = true)]
    pub second_secret: String,

    #[arg(long, allow_negative_numbers = true)]
    pub timestamp: Option<i64>,
}

#[derive(Args, Debug)]
pub struct DelegateArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    #[arg(long)]
    pub username: String,
}

#[derive(Args, Debug)]
pub struct VoteArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    /// `+<hex>` to vote for a delegate, `-<hex>` to withdraw. Repeatable.
    #[arg(long = "vote", required = true, allow_hyphen_values = true)]
    pub votes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct MultisignatureArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    /// Cosigner public key (hex, optionally `+` prefixed). Repeatable.
    #[arg(long = "key", required = true)]
    pub keysgroup: Vec<String>,

    /// Cosignatures required per transaction.
    #[arg(long)]
    pub min: u8,

    /// Hours a pending transaction waits for cosignatures.
    #[arg(long)]
    pub lifetime: u8,
}

#[derive(Args, Debug)]
pub struct SongArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub artist: Option<String>,

    #[arg(long)]
    pub fingerprint: Option<String>,

    /// Opaque ownership descriptor, stored as given.
    #[arg(long)]
    pub owners: Option<String>,

    #[arg(long = "type", allow_negative_numbers = true)]
    pub song_type: i32,

    #[arg(long, allow_negative_numbers = true)]
    pub genre: i32,
}

#[derive(Args, Debug)]
pub struct SongTransferArgs {
    #[command(flatten)]
    pub secrets: SecretArgs,

    #[arg(long)]
    pub song_id: String,
}

#[derive(Args, Debug)]
pub struct CosignArgs {
    /// Transaction record (JSON). `-` reads stdin.
    #[arg(long, short = 't')]
    pub transaction: PathBuf,

    /// Cosigner secret.
    #[arg(long, env = "MOOSE_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Sign only header and asset, as multisignature accounts require.
    /// Without this flag the signature covers the full current bytes.
    #[arg(long)]
    pub multisignature: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Transaction record (JSON). `-` reads stdin.
    #[arg(long, short = 't')]
    pub transaction: PathBuf,

    /// Registered second public key, to also check `signSignature`.
    #[arg(long)]
    pub second_public_key: Option<String>,
}

fn parse_moose_amount(s: &str) -> Result<u64, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        MooseCli::command().debug_assert();
    }

    #[test]
    fn parses_transfer() {
        let cli = MooseCli::try_parse_from([
            "moose-cli",
            "transfer",
            "--secret",
            "secret",
            "--recipient",
            "58191285901858109M",
            "--amount",
            "12.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Transfer(args) => {
                assert_eq!(args.amount, 1_250_000_000);
                assert_eq!(args.recipient, "58191285901858109M");
                assert!(args.secrets.timestamp.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_amount() {
        let result = MooseCli::try_parse_from([
            "moose-cli",
            "transfer",
            "--secret",
            "s",
            "--recipient",
            "1M",
            "--amount",
            "0.000000001",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_repeated_votes() {
        let cli = MooseCli::try_parse_from([
            "moose-cli",
            "vote",
            "--secret",
            "s",
            "--vote",
            "+aa",
            "--vote",
            "-bb",
        ])
        .unwrap();
        match cli.command {
            Commands::Vote(args) => assert_eq!(args.votes, vec!["+aa", "-bb"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
