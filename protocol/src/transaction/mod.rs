//! # Transaction Module
//!
//! Construction, byte encoding, signing and verification of Moose
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       TransactionType, fixed-point amount helpers
//! asset.rs       Kind-specific payloads and their bytes
//! record.rs      TransactionBody, pipeline stages, the finished Transaction
//! codec.rs       Canonical byte serialization
//! signing.rs     SigningEngine: hash, sign, second-sign, verify, id
//! builder.rs     TransactionBuilder: per-kind options to finished records
//! submission.rs  Request descriptions for handing records to a node
//! error.rs       TransactionError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] validates options and fills a body.
//! 2. **Sign**: [`SigningEngine::sign`], then optionally
//!    [`SigningEngine::second_sign`].
//! 3. **Identify**: [`SigningEngine::identify`] derives the id from the fully
//!    signed bytes.
//! 4. **Submit**: [`SubmissionRequest::transaction`].
//! 5. **Verify**: validators run [`SigningEngine::verify`].

pub mod asset;
pub mod builder;
pub mod codec;
pub mod error;
pub mod record;
pub mod signing;
pub mod submission;
pub mod types;

pub use asset::{Asset, KeyChange, KeyChangeOp};
pub use builder::{
    DelegateOptions, MultisignatureOptions, SongOptions, SongTransferOptions,
    TransactionBuilder, TransactionOptions, TransferOptions, VoteOptions,
};
pub use codec::{serialize, SerializeMode};
pub use error::TransactionError;
pub use record::{
    Identifiable, SecondSignedTransaction, Signable, SignedTransaction, Transaction,
    TransactionBody, TransactionId, UnsignedTransaction,
};
pub use signing::SigningEngine;
pub use submission::{HttpMethod, SubmissionRequest};
pub use types::{format_amount, parse_amount, TransactionType};
