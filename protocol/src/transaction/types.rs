//! Core type definitions for Moose transactions.
//!
//! The transaction kind is a closed set of seven. Its numeric id is the
//! first byte of every serialized transaction and the `type` field of every
//! JSON record.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use crate::config::{FIXED_POINT, FIXED_POINT_DECIMALS, MAX_AMOUNT};

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The seven transaction kinds understood by the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum TransactionType {
    /// Balance transfer to another account.
    Transfer = 0,
    /// Registers a second public key that must co-sign every later transaction.
    SecondSignature = 1,
    /// Registers the sender as a forging delegate under a username.
    Delegate = 2,
    /// Adds or removes votes for delegates.
    Vote = 3,
    /// Turns the sender into a multisignature account.
    Multisignature = 4,
    /// Registers a song.
    Song = 5,
    /// Transfers a registered song.
    SongTransfer = 6,
}

impl TransactionType {
    /// Every kind, in id order.
    pub const ALL: [TransactionType; 7] = [
        Self::Transfer,
        Self::SecondSignature,
        Self::Delegate,
        Self::Vote,
        Self::Multisignature,
        Self::Song,
        Self::SongTransfer,
    ];

    /// The wire id.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl From<TransactionType> for u8 {
    fn from(tx_type: TransactionType) -> Self {
        tx_type.id()
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = TransactionError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(TransactionError::UnsupportedTransactionType(id))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transfer => "transfer",
            Self::SecondSignature => "second-signature",
            Self::Delegate => "delegate",
            Self::Vote => "vote",
            Self::Multisignature => "multisignature",
            Self::Song => "song",
            Self::SongTransfer => "song-transfer",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Fixed-point amounts
// ---------------------------------------------------------------------------

/// Parse a decimal MOOSE amount into base units.
///
/// `"12.5"` becomes `1_250_000_000`. At most eight fractional digits are
/// accepted; anything finer than a base unit is an error, not a rounding.
///
/// ```
/// use moose_protocol::transaction::types::parse_amount;
///
/// assert_eq!(parse_amount("0.00000001").unwrap(), 1);
/// assert_eq!(parse_amount("25").unwrap(), 2_500_000_000);
/// ```
pub fn parse_amount(s: &str) -> Result<u64, TransactionError> {
    let invalid = |reason: &str| TransactionError::InvalidField {
        field: "amount",
        reason: format!("{:?}: {}", s, reason),
    };

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("empty"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    if frac.len() > FIXED_POINT_DECIMALS {
        return Err(invalid("more than 8 fractional digits"));
    }

    let overflow = || TransactionError::SerializationOverflow {
        field: "amount",
        value: i128::MAX,
        max: MAX_AMOUNT as i128,
    };

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = FIXED_POINT_DECIMALS);
        padded.parse().map_err(|_| invalid("bad fraction"))?
    };

    let total = whole_units
        .checked_mul(FIXED_POINT as u128)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(overflow)?;
    if total > MAX_AMOUNT as u128 {
        return Err(TransactionError::SerializationOverflow {
            field: "amount",
            value: total as i128,
            max: MAX_AMOUNT as i128,
        });
    }
    Ok(total as u64)
}

/// Render base units as a decimal MOOSE amount with eight fractional digits.
pub fn format_amount(base_units: u64) -> String {
    format!(
        "{}.{:0>width$}",
        base_units / FIXED_POINT,
        base_units % FIXED_POINT,
        width = FIXED_POINT_DECIMALS
    )
}
