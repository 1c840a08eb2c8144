//! Canonical byte serialization.
//!
//! These bytes are what gets hashed, signed and identified. Validators
//! rebuild them from the JSON record, so every field has a fixed width and
//! order:
//!
//! ```text
//! type            1    u8
//! timestamp       4    i32 big-endian
//! sender key     32
//! requester key  32    only when present
//! recipient       8    u64 big-endian, zeros when absent
//! amount          8    u64 little-endian
//! asset           *    see asset.rs
//! signature      64    when set (Full mode only)
//! signSignature  64    when set (Full mode only)
//! ```
//!
//! The fee is not part of the bytes.

use tracing::trace;

use super::record::Signable;
use crate::config::{HEADER_LENGTH, PUBLIC_KEY_LENGTH, RECIPIENT_LENGTH, SIGNATURE_LENGTH};

/// Which trailing signatures to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializeMode {
    /// Header, asset and every signature currently set.
    #[default]
    Full,
    /// Header and asset only. This is what multisignature cosigners sign.
    Multisignature,
}

/// Serialize `tx` into its canonical bytes.
pub fn serialize<T: Signable + ?Sized>(tx: &T, mode: SerializeMode) -> Vec<u8> {
    let body = tx.body();
    let mut buf = Vec::with_capacity(HEADER_LENGTH + PUBLIC_KEY_LENGTH + 2 * SIGNATURE_LENGTH);

    buf.push(body.tx_type().id());
    buf.extend_from_slice(&body.timestamp.to_be_bytes());
    buf.extend_from_slice(body.sender_public_key.as_bytes());

    if let Some(requester) = &body.requester_public_key {
        buf.extend_from_slice(requester.as_bytes());
    }

    match &body.recipient_id {
        Some(recipient) => buf.extend_from_slice(&recipient.to_wire_bytes()),
        None => buf.extend_from_slice(&[0u8; RECIPIENT_LENGTH]),
    }

    buf.extend_from_slice(&body.amount.to_le_bytes());
    body.asset.encode_into(&mut buf);

    if mode == SerializeMode::Full {
        if let Some(signature) = tx.signature() {
            buf.extend_from_slice(signature.as_bytes());
        }
        if let Some(sign_signature) = tx.sign_signature() {
            buf.extend_from_slice(sign_signature.as_bytes());
        }
    }

    trace!(tx_type = %body.tx_type(), ?mode, len = buf.len(), "serialized transaction");
    buf
}
