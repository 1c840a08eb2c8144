//! Request descriptions for handing finished output to a node.
//!
//! Nothing here opens a socket. A [`SubmissionRequest`] is the method, the
//! API path relative to `/api/` and the JSON body; whoever owns the
//! transport picks the peer and sends it.

use serde::Serialize;
use serde_json::{json, Value};

use super::record::{Transaction, TransactionId};
use crate::crypto::keys::{MoosePublicKey, MooseSignature};

/// Both endpoints this crate produces requests for are POSTs. Reads are
/// the transport's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Value,
}

impl SubmissionRequest {
    /// `POST transactions` with `{"transaction": <record>}`.
    pub fn transaction(tx: &Transaction) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method: HttpMethod::Post,
            path: "transactions".to_string(),
            body: json!({ "transaction": serde_json::to_value(tx)? }),
        })
    }

    /// `POST signatures` carrying one multisignature cosignature.
    pub fn signature(
        transaction_id: TransactionId,
        public_key: &MoosePublicKey,
        signature: &MooseSignature,
    ) -> Self {
        Self {
            method: HttpMethod::Post,
            path: "signatures".to_string(),
            body: json!({
                "signature": {
                    "transaction": transaction_id.to_string(),
                    "publicKey": public_key.to_hex(),
                    "signature": signature.to_hex(),
                }
            }),
        }
    }
}
