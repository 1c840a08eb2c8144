//! # Protocol Configuration & Constants
//!
//! Every magic number in Moose lives here. Field widths, the fee table, the
//! network epoch and the address suffix are all part of the wire contract
//! with the validators: change one of them and every signature this crate
//! produces stops verifying on the other side.
//!
//! [`NetworkConfig`] bundles the values that legitimately differ between
//! deployments (the epoch and the fee table) so they can be injected into
//! the [`SigningEngine`](crate::transaction::SigningEngine) and the
//! [`TransactionBuilder`](crate::transaction::TransactionBuilder) instead
//! of being read from globals.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::transaction::error::TransactionError;
use crate::transaction::types::TransactionType;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Base units per whole MOOSE. Amounts and fees are always integers in base
/// units; `1.5 MOOSE == 150_000_000`.
pub const FIXED_POINT: u64 = 100_000_000;

/// Number of fractional digits represented by [`FIXED_POINT`].
pub const FIXED_POINT_DECIMALS: usize = 8;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Suffix appended to the decimal account number.
pub const ADDRESS_SUFFIX: char = 'M';

// ---------------------------------------------------------------------------
// Wire layout
// ---------------------------------------------------------------------------

/// Transaction type discriminant, 1 byte.
pub const TYPE_LENGTH: usize = 1;

/// Timestamp, big-endian signed 32-bit seconds since the network epoch.
pub const TIMESTAMP_LENGTH: usize = 4;

/// Ed25519 public key length. Also the width of the sender and requester fields.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 private key length in the NaCl convention (seed ‖ public key).
pub const PRIVATE_KEY_LENGTH: usize = 64;

/// Numeric part of the recipient address, big-endian u64.
pub const RECIPIENT_LENGTH: usize = 8;

/// Amount, little-endian 64-bit. Unlike the other integer fields.
pub const AMOUNT_LENGTH: usize = 8;

/// Ed25519 signature length. Both signature slots are this wide.
pub const SIGNATURE_LENGTH: usize = 64;

/// Size of the fixed header when no requester key is present.
pub const HEADER_LENGTH: usize =
    TYPE_LENGTH + TIMESTAMP_LENGTH + PUBLIC_KEY_LENGTH + RECIPIENT_LENGTH + AMOUNT_LENGTH;

/// Largest amount the validators accept. The amount field is read back as a
/// signed 64-bit integer, so the top bit is off limits.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Unix timestamp (seconds) of the network epoch: 2017-07-09T20:00:00Z.
pub const EPOCH_UNIX_SECONDS: i64 = 1_499_630_400;

/// Length of a forging slot in seconds.
pub const SLOT_INTERVAL_SECONDS: i64 = 10;

/// Delegates forging in one round.
pub const DELEGATES_PER_ROUND: i64 = 11;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Default fee for a plain transfer: 0.1 MOOSE.
pub const FEE_SEND: u64 = 10_000_000;

/// Default fee for registering a second signature: 5 MOOSE.
pub const FEE_SECOND_SIGNATURE: u64 = 500_000_000;

/// Default fee for a delegate registration: 25 MOOSE.
pub const FEE_DELEGATE: u64 = 2_500_000_000;

/// Default fee for a vote: 1 MOOSE.
pub const FEE_VOTE: u64 = 100_000_000;

/// Default fee for a multisignature registration: 5 MOOSE.
pub const FEE_MULTISIGNATURE: u64 = 500_000_000;

/// Default fee for a song registration: 25 MOOSE.
pub const FEE_SONG: u64 = 2_500_000_000;

/// Default fee for a song transfer. Priced like a plain transfer.
pub const FEE_SONG_TRANSFER: u64 = FEE_SEND;

/// Fixed fee per transaction kind.
///
/// There is no fee market: every kind costs exactly what the table says,
/// and the fee is not part of the signed bytes. Validators recompute it
/// from the type and reject mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeSchedule {
    pub send: u64,
    pub second_signature: u64,
    pub delegate: u64,
    pub vote: u64,
    pub multisignature: u64,
    pub song: u64,
    pub song_transfer: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            send: FEE_SEND,
            second_signature: FEE_SECOND_SIGNATURE,
            delegate: FEE_DELEGATE,
            vote: FEE_VOTE,
            multisignature: FEE_MULTISIGNATURE,
            song: FEE_SONG,
            song_transfer: FEE_SONG_TRANSFER,
        }
    }
}

impl FeeSchedule {
    /// Fee for a known transaction kind.
    pub fn fee(&self, tx_type: TransactionType) -> u64 {
        match tx_type {
            TransactionType::Transfer => self.send,
            TransactionType::SecondSignature => self.second_signature,
            TransactionType::Delegate => self.delegate,
            TransactionType::Vote => self.vote,
            TransactionType::Multisignature => self.multisignature,
            TransactionType::Song => self.song,
            TransactionType::SongTransfer => self.song_transfer,
        }
    }

    /// Fee for a raw type id, as found on the wire or in a decoded record.
    ///
    /// Unknown ids are an error, never a default fee.
    pub fn fee_for_type_id(&self, type_id: u8) -> Result<u64, TransactionError> {
        TransactionType::try_from(type_id).map(|tx_type| self.fee(tx_type))
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Deployment-specific parameters.
///
/// Loaded from JSON by the CLI; library users usually take the default.
///
/// ```json
/// { "name": "testnet", "epoch": "2017-07-09T20:00:00Z", "fees": { "send": 10000000 } }
/// ```
///
/// Missing fields fall back to the mainnet defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Human-readable network name, used only for logging.
    pub name: String,
    /// Instant from which transaction timestamps are counted.
    pub epoch: DateTime<Utc>,
    /// Fee table.
    pub fees: FeeSchedule,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "mainnet".to_string(),
            epoch: default_epoch(),
            fees: FeeSchedule::default(),
        }
    }
}

impl NetworkConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, TransactionError> {
        serde_json::from_str(json).map_err(|e| TransactionError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TransactionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TransactionError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(network = %config.name, path = %path.display(), "network config loaded");
        Ok(config)
    }
}

/// The mainnet epoch as a `DateTime`.
pub fn default_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_UNIX_SECONDS, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
