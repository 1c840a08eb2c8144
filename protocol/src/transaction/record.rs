//! Transaction values at each stage of the signing pipeline.
//!
//! ```text
//! UnsignedTransaction --sign--> SignedTransaction --second_sign--> SecondSignedTransaction
//!                                      |                                   |
//!                                      +------------- identify ------------+
//!                                                        |
//!                                                        v
//!                                                   Transaction
//! ```
//!
//! Each stage owns a [`TransactionBody`] plus whatever signatures have been
//! attached so far. Stages only move forward, so a transaction cannot be
//! signed twice, second-signed before its first signature, or given an id
//! before it is signed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::asset::Asset;
use super::error::TransactionError;
use super::types::TransactionType;
use crate::config::MAX_AMOUNT;
use crate::crypto::keys::{MoosePublicKey, MooseSignature};
use crate::identity::address::Address;

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// Every field of a transaction that is fixed before signing.
///
/// The kind is not stored separately: it is `asset.kind()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBody {
    /// Seconds since the network epoch.
    pub timestamp: i32,
    pub sender_public_key: MoosePublicKey,
    /// Account acting on behalf of the sender, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_public_key: Option<MoosePublicKey>,
    /// `null` in JSON for kinds without a recipient.
    #[serde(default)]
    pub recipient_id: Option<Address>,
    /// Base units. Must not exceed `i64::MAX`.
    pub amount: u64,
    /// Base units. Not part of the signed bytes.
    pub fee: u64,
    pub asset: Asset,
}

impl TransactionBody {
    pub fn tx_type(&self) -> TransactionType {
        self.asset.kind()
    }

    /// Reject values that cannot be put on the wire.
    pub fn check_bounds(&self) -> Result<(), TransactionError> {
        if self.amount > MAX_AMOUNT {
            return Err(TransactionError::SerializationOverflow {
                field: "amount",
                value: self.amount as i128,
                max: MAX_AMOUNT as i128,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Signable
// ---------------------------------------------------------------------------

/// Anything the codec can turn into bytes.
pub trait Signable {
    fn body(&self) -> &TransactionBody;

    fn signature(&self) -> Option<&MooseSignature> {
        None
    }

    fn sign_signature(&self) -> Option<&MooseSignature> {
        None
    }
}

/// A stage that carries at least the primary signature and can be given an id.
pub trait Identifiable: Signable {
    fn into_parts(self) -> (TransactionBody, MooseSignature, Option<MooseSignature>);
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    body: TransactionBody,
}

impl UnsignedTransaction {
    pub fn new(body: TransactionBody) -> Self {
        Self { body }
    }

    pub fn into_body(self) -> TransactionBody {
        self.body
    }

    pub(crate) fn with_signature(self, signature: MooseSignature) -> SignedTransaction {
        SignedTransaction {
            body: self.body,
            signature,
        }
    }
}

impl Signable for UnsignedTransaction {
    fn body(&self) -> &TransactionBody {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    body: TransactionBody,
    signature: MooseSignature,
}

impl SignedTransaction {
    pub(crate) fn with_sign_signature(
        self,
        sign_signature: MooseSignature,
    ) -> SecondSignedTransaction {
        SecondSignedTransaction {
            body: self.body,
            signature: self.signature,
            sign_signature,
        }
    }
}

impl Signable for SignedTransaction {
    fn body(&self) -> &TransactionBody {
        &self.body
    }

    fn signature(&self) -> Option<&MooseSignature> {
        Some(&self.signature)
    }
}

impl Identifiable for SignedTransaction {
    fn into_parts(self) -> (TransactionBody, MooseSignature, Option<MooseSignature>) {
        (self.body, self.signature, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondSignedTransaction {
    body: TransactionBody,
    signature: MooseSignature,
    sign_signature: MooseSignature,
}

impl Signable for SecondSignedTransaction {
    fn body(&self) -> &TransactionBody {
        &self.body
    }

    fn signature(&self) -> Option<&MooseSignature> {
        Some(&self.signature)
    }

    fn sign_signature(&self) -> Option<&MooseSignature> {
        Some(&self.sign_signature)
    }
}

impl Identifiable for SecondSignedTransaction {
    fn into_parts(self) -> (TransactionBody, MooseSignature, Option<MooseSignature>) {
        (self.body, self.signature, Some(self.sign_signature))
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// The first 8 bytes of `SHA256(full bytes)`, reversed, as a u64. Rendered
/// and serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TransactionError::InvalidField {
                field: "id",
                reason: format!("{:?} is not a decimal id", s),
            });
        }
        s.parse().map(Self).map_err(|_| TransactionError::InvalidField {
            field: "id",
            reason: format!("{:?} does not fit in 64 bits", s),
        })
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A finished, identified transaction: what gets submitted to a node.
///
/// JSON shape:
///
/// ```json
/// {
///   "id": "...", "type": 0, "timestamp": 0,
///   "senderPublicKey": "...", "recipientId": "58191285901858109M",
///   "amount": 1000, "fee": 10000000, "asset": {},
///   "signature": "...", "signSignature": "..."
/// }
/// ```
///
/// Decoding checks that `type` agrees with the asset and that the amount
/// fits the wire field. It does not check the id or the signatures; that is
/// what [`SigningEngine::verify`](super::SigningEngine::verify) is for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct Transaction {
    pub id: TransactionId,
    pub body: TransactionBody,
    pub signature: MooseSignature,
    pub sign_signature: Option<MooseSignature>,
}

impl Transaction {
    pub fn tx_type(&self) -> TransactionType {
        self.body.tx_type()
    }

    pub fn sender_public_key(&self) -> &MoosePublicKey {
        &self.body.sender_public_key
    }

    pub fn has_second_signature(&self) -> bool {
        self.sign_signature.is_some()
    }
}

impl Signable for Transaction {
    fn body(&self) -> &TransactionBody {
        &self.body
    }

    fn signature(&self) -> Option<&MooseSignature> {
        Some(&self.signature)
    }

    fn sign_signature(&self) -> Option<&MooseSignature> {
        self.sign_signature.as_ref()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecordRef<'a> {
    id: TransactionId,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    #[serde(flatten)]
    body: &'a TransactionBody,
    signature: &'a MooseSignature,
    #[serde(skip_serializing_if = "Option::is_none")]
    sign_signature: Option<&'a MooseSignature>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    id: TransactionId,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    #[serde(flatten)]
    body: TransactionBody,
    signature: MooseSignature,
    #[serde(default)]
    sign_signature: Option<MooseSignature>,
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TransactionRecordRef {
            id: self.id,
            tx_type: self.tx_type(),
            body: &self.body,
            signature: &self.signature,
            sign_signature: self.sign_signature.as_ref(),
        }
        .serialize(serializer)
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = TransactionError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let actual = record.body.tx_type();
        if record.tx_type != actual {
            return Err(TransactionError::KindMismatch {
                declared: record.tx_type,
                actual,
            });
        }
        record.body.check_bounds()?;
        Ok(Self {
            id: record.id,
            body: record.body,
            signature: record.signature,
            sign_signature: record.sign_signature,
        })
    }
}
