//! Error types for transaction construction and decoding.
//!
//! Every structural problem is caught before a single byte is signed. A
//! transaction that fails here never reaches the signing stage. Signature
//! checks are not errors at all: they return `bool`.

use thiserror::Error;

use super::types::TransactionType;
use crate::crypto::keys::KeyError;
use crate::identity::address::AddressError;

/// Errors raised while building, encoding or decoding a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A type id outside `0..=6`.
    #[error("unsupported transaction type: {0}")]
    UnsupportedTransactionType(u8),

    /// A kind-specific option the encoder needs was not supplied.
    #[error("{kind} transaction is missing required field `{field}`")]
    MissingRequiredField {
        kind: TransactionType,
        field: &'static str,
    },

    /// A key, signature or vote entry could not be decoded.
    #[error("malformed hex input: {0}")]
    MalformedHexInput(#[from] KeyError),

    /// A recipient or account address could not be decoded.
    #[error("malformed address: {0}")]
    MalformedAddress(#[from] AddressError),

    /// A value does not fit the width of its wire field.
    #[error("{field} value {value} exceeds the wire field maximum {max}")]
    SerializationOverflow {
        field: &'static str,
        value: i128,
        max: i128,
    },

    /// A decoded record whose `type` disagrees with its asset.
    #[error("record type {declared} does not match its {actual} asset")]
    KindMismatch {
        declared: TransactionType,
        actual: TransactionType,
    },

    /// A kind-specific option was present but unusable.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Network configuration could not be loaded.
    #[error("invalid network config: {0}")]
    InvalidConfig(String),
}
