//! Per-kind transaction construction.
//!
//! [`TransactionBuilder`] turns a secret, an optional second secret and a
//! kind-specific options struct into a finished, signed and identified
//! [`Transaction`]. Options are plain structs with optional fields so they
//! can be filled from JSON or CLI flags; anything a kind requires but that
//! is missing is reported as [`TransactionError::MissingRequiredField`]
//! before any signing happens.
//!
//! ```
//! use moose_protocol::transaction::{SigningEngine, TransactionBuilder, TransferOptions};
//!
//! let engine = SigningEngine::new();
//! let tx = TransactionBuilder::new(&engine)
//!     .timestamp(0)
//!     .transfer("secret", None, &TransferOptions {
//!         recipient_id: Some("58191285901858109M".to_string()),
//!         amount: Some(1000),
//!     })
//!     .unwrap();
//!
//! assert!(engine.verify(&tx));
//! assert_eq!(tx.body.fee, 10_000_000);
//! ```

use serde::Deserialize;
use tracing::info;

use super::asset::{
    Asset, DelegateAsset, KeyChange, KeyChangeOp, MultisignatureAsset, SecondSignatureAsset,
    SongAsset, SongTransferAsset,
};
use super::error::TransactionError;
use super::record::{Transaction, TransactionBody, UnsignedTransaction};
use super::signing::SigningEngine;
use super::types::TransactionType;
use crate::crypto::keys::{MooseKeypair, MoosePublicKey};
use crate::crypto::provider::{CryptoProvider, Ed25519Provider};
use crate::identity::address::Address;
use crate::slots::narrow_timestamp;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    pub recipient_id: Option<String>,
    /// Base units.
    pub amount: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateOptions {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOptions {
    /// `+<hex>` to vote for a delegate, `-<hex>` to withdraw.
    pub votes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisignatureOptions {
    /// Cosigner keys, either bare hex or `+<hex>`.
    pub keysgroup: Option<Vec<String>>,
    pub min: Option<u8>,
    pub lifetime: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongOptions {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub fingerprint: Option<String>,
    pub owners: Option<String>,
    #[serde(rename = "type")]
    pub song_type: Option<i32>,
    pub genre: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongTransferOptions {
    pub song_id: Option<String>,
}

/// Options for any kind, for callers that pick the kind at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOptions {
    Transfer(TransferOptions),
    SecondSignature,
    Delegate(DelegateOptions),
    Vote(VoteOptions),
    Multisignature(MultisignatureOptions),
    Song(SongOptions),
    SongTransfer(SongTransferOptions),
}

impl TransactionOptions {
    pub fn kind(&self) -> TransactionType {
        match self {
            Self::Transfer(_) => TransactionType::Transfer,
            Self::SecondSignature => TransactionType::SecondSignature,
            Self::Delegate(_) => TransactionType::Delegate,
            Self::Vote(_) => TransactionType::Vote,
            Self::Multisignature(_) => TransactionType::Multisignature,
            Self::Song(_) => TransactionType::Song,
            Self::SongTransfer(_) => TransactionType::SongTransfer,
        }
    }
}

fn required<T>(
    value: Option<T>,
    kind: TransactionType,
    field: &'static str,
) -> Result<T, TransactionError> {
    value.ok_or(TransactionError::MissingRequiredField { kind, field })
}

fn required_str(
    value: &Option<String>,
    kind: TransactionType,
    field: &'static str,
) -> Result<String, TransactionError> {
    match value.as_deref() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(TransactionError::MissingRequiredField { kind, field }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Builds signed transactions of every kind through a [`SigningEngine`].
///
/// Without an explicit [`timestamp`](Self::timestamp) the current epoch time
/// of the engine's network is used. An empty second secret counts as none.
#[derive(Debug, Clone)]
pub struct TransactionBuilder<'e, P: CryptoProvider = Ed25519Provider> {
    engine: &'e SigningEngine<P>,
    timestamp: Option<i64>,
    requester_public_key: Option<MoosePublicKey>,
}

impl<'e, P: CryptoProvider> TransactionBuilder<'e, P> {
    pub fn new(engine: &'e SigningEngine<P>) -> Self {
        Self {
            engine,
            timestamp: None,
            requester_public_key: None,
        }
    }

    /// Use a fixed timestamp (seconds since the network epoch).
    pub fn timestamp(mut self, epoch_seconds: i64) -> Self {
        self.timestamp = Some(epoch_seconds);
        self
    }

    /// Act on behalf of the sender. Only transfers carry a requester key.
    pub fn requester_public_key(mut self, public_key: MoosePublicKey) -> Self {
        self.requester_public_key = Some(public_key);
        self
    }

    /// Build any kind from runtime-selected options.
    pub fn build(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &TransactionOptions,
    ) -> Result<Transaction, TransactionError> {
        match options {
            TransactionOptions::Transfer(o) => self.transfer(secret, second_secret, o),
            TransactionOptions::SecondSignature => {
                let second = second_secret.filter(|s| !s.is_empty()).ok_or(
                    TransactionError::MissingRequiredField {
                        kind: TransactionType::SecondSignature,
                        field: "secondSecret",
                    },
                )?;
                self.second_signature(secret, second)
            }
            TransactionOptions::Delegate(o) => self.delegate(secret, second_secret, o),
            TransactionOptions::Vote(o) => self.vote(secret, second_secret, o),
            TransactionOptions::Multisignature(o) => self.multisignature(secret, second_secret, o),
            TransactionOptions::Song(o) => self.song(secret, second_secret, o),
            TransactionOptions::SongTransfer(o) => self.song_transfer(secret, second_secret, o),
        }
    }

    /// Move `amount` base units to `recipient_id`.
    pub fn transfer(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &TransferOptions,
    ) -> Result<Transaction, TransactionError> {
        let kind = TransactionType::Transfer;
        let recipient: Address = required_str(&options.recipient_id, kind, "recipientId")?.parse()?;
        let amount = required(options.amount, kind, "amount")?;

        let keys = self.engine.derive_keypair(secret);
        let mut body = self.body(&keys, Asset::Transfer)?;
        body.recipient_id = Some(recipient);
        body.amount = amount;
        body.requester_public_key = self.requester_public_key;
        self.finish(&keys, second_secret, body)
    }

    /// Register the key derived from `second_secret` as the sender's second
    /// signature. The registration itself is signed with `secret` only.
    pub fn second_signature(
        &self,
        secret: &str,
        second_secret: &str,
    ) -> Result<Transaction, TransactionError> {
        let second_key = self.engine.derive_keypair(second_secret).public_key();
        let keys = self.engine.derive_keypair(secret);
        let body = self.body(
            &keys,
            Asset::SecondSignature(SecondSignatureAsset {
                public_key: second_key,
            }),
        )?;
        self.finish(&keys, None, body)
    }

    pub fn delegate(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &DelegateOptions,
    ) -> Result<Transaction, TransactionError> {
        let username = required_str(&options.username, TransactionType::Delegate, "username")?;
        let keys = self.engine.derive_keypair(secret);
        let body = self.body(&keys, Asset::Delegate(DelegateAsset { username }))?;
        self.finish(&keys, second_secret, body)
    }

    /// Votes are addressed to the sender's own account.
    pub fn vote(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &VoteOptions,
    ) -> Result<Transaction, TransactionError> {
        let votes = options
            .votes
            .as_ref()
            .filter(|v| !v.is_empty())
            .ok_or(TransactionError::MissingRequiredField {
                kind: TransactionType::Vote,
                field: "votes",
            })?
            .iter()
            .map(|v| v.parse::<KeyChange>())
            .collect::<Result<Vec<_>, _>>()?;

        let keys = self.engine.derive_keypair(secret);
        let mut body = self.body(&keys, Asset::Vote(votes))?;
        body.recipient_id = Some(self.engine.derive_address(&keys.public_key()));
        self.finish(&keys, second_secret, body)
    }

    pub fn multisignature(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &MultisignatureOptions,
    ) -> Result<Transaction, TransactionError> {
        let kind = TransactionType::Multisignature;
        let min = required(options.min, kind, "min")?;
        let lifetime = required(options.lifetime, kind, "lifetime")?;
        let keysgroup = options
            .keysgroup
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(TransactionError::MissingRequiredField {
                kind,
                field: "keysgroup",
            })?
            .iter()
            .map(|k| parse_cosigner(k))
            .collect::<Result<Vec<_>, _>>()?;

        let keys = self.engine.derive_keypair(secret);
        let body = self.body(
            &keys,
            Asset::Multisignature(MultisignatureAsset {
                min,
                lifetime,
                keysgroup,
            }),
        )?;
        self.finish(&keys, second_secret, body)
    }

    pub fn song(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &SongOptions,
    ) -> Result<Transaction, TransactionError> {
        let kind = TransactionType::Song;
        let asset = SongAsset {
            title: required_str(&options.title, kind, "title")?,
            song_type: required(options.song_type, kind, "type")?,
            genre: required(options.genre, kind, "genre")?,
            artist: non_empty(&options.artist),
            fingerprint: non_empty(&options.fingerprint),
            owners: non_empty(&options.owners),
        };
        let keys = self.engine.derive_keypair(secret);
        let body = self.body(&keys, Asset::Song(asset))?;
        self.finish(&keys, second_secret, body)
    }

    pub fn song_transfer(
        &self,
        secret: &str,
        second_secret: Option<&str>,
        options: &SongTransferOptions,
    ) -> Result<Transaction, TransactionError> {
        let song_id = required_str(&options.song_id, TransactionType::SongTransfer, "songId")?;
        let keys = self.engine.derive_keypair(secret);
        let body = self.body(&keys, Asset::SongTransfer(SongTransferAsset { song_id }))?;
        self.finish(&keys, second_secret, body)
    }

    fn body(&self, keys: &MooseKeypair, asset: Asset) -> Result<TransactionBody, TransactionError> {
        let timestamp = match self.timestamp {
            Some(ts) => narrow_timestamp(ts)?,
            None => self.engine.clock().timestamp_now()?,
        };
        Ok(TransactionBody {
            timestamp,
            sender_public_key: keys.public_key(),
            requester_public_key: None,
            recipient_id: None,
            amount: 0,
            fee: self.engine.fee(asset.kind()),
            asset,
        })
    }

    fn finish(
        &self,
        keys: &MooseKeypair,
        second_secret: Option<&str>,
        body: TransactionBody,
    ) -> Result<Transaction, TransactionError> {
        body.check_bounds()?;
        let signed = self.engine.sign(UnsignedTransaction::new(body), keys);
        let tx = match second_secret.filter(|s| !s.is_empty()) {
            Some(second) => {
                let second_keys = self.engine.derive_keypair(second);
                self.engine.identify(self.engine.second_sign(signed, &second_keys))
            }
            None => self.engine.identify(signed),
        };
        info!(id = %tx.id, tx_type = %tx.tx_type(), "transaction built");
        Ok(tx)
    }
}

/// Keysgroup entries may omit the `+`; removals are not allowed.
fn parse_cosigner(entry: &str) -> Result<KeyChange, TransactionError> {
    let change = if entry.starts_with(['+', '-']) {
        entry.parse::<KeyChange>()?
    } else {
        KeyChange::add(MoosePublicKey::from_hex(entry)?)
    };
    if change.op != KeyChangeOp::Add {
        return Err(TransactionError::InvalidField {
            field: "keysgroup",
            reason: format!("{:?}: cosigners can only be added", entry),
        });
    }
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HEADER_LENGTH;
    use crate::transaction::codec::SerializeMode;

    fn engine() -> SigningEngine {
        SigningEngine::new()
    }

    fn transfer_options() -> TransferOptions {
        TransferOptions {
            recipient_id: Some("58191285901858109M".to_string()),
            amount: Some(1000),
        }
    }

    fn song_options() -> SongOptions {
        SongOptions {
            title: Some("Moose the song".to_string()),
            artist: Some("the MooseCoin trio".to_string()),
            fingerprint: Some("abcdef".to_string()),
            owners: None,
            song_type: Some(0),
            genre: Some(2),
        }
    }

    #[test]
    fn transfer_fields() {
        let e = engine();
        let tx = TransactionBuilder::new(&e)
            .timestamp(500)
            .transfer("secret", None, &transfer_options())
            .unwrap();
        assert_eq!(tx.tx_type(), TransactionType::Transfer);
        assert_eq!(tx.body.timestamp, 500);
        assert_eq!(tx.body.amount, 1000);
        assert_eq!(tx.body.fee, 10_000_000);
        assert_eq!(tx.body.recipient_id.unwrap().to_string(), "58191285901858109M");
        assert!(tx.sign_signature.is_none());
        assert!(e.verify(&tx));
    }

    #[test]
    fn transfer_requires_recipient_and_amount() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        let mut o = transfer_options();
        o.recipient_id = None;
        assert_eq!(
            b.transfer("secret", None, &o).unwrap_err(),
            TransactionError::MissingRequiredField {
                kind: TransactionType::Transfer,
                field: "recipientId"
            }
        );
        let mut o = transfer_options();
        o.amount = None;
        assert!(matches!(
            b.transfer("secret", None, &o),
            Err(TransactionError::MissingRequiredField { field: "amount", .. })
        ));
    }

    #[test]
    fn transfer_rejects_bad_recipient_and_huge_amount() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        let mut o = transfer_options();
        o.recipient_id = Some("58191285901858109L".to_string());
        assert!(matches!(
            b.transfer("secret", None, &o),
            Err(TransactionError::MalformedAddress(_))
        ));
        let mut o = transfer_options();
        o.amount = Some(u64::MAX);
        assert!(matches!(
            b.transfer("secret", None, &o),
            Err(TransactionError::SerializationOverflow { field: "amount", .. })
        ));
    }

    #[test]
    fn transfer_with_requester() {
        let e = engine();
        let requester = e.derive_keypair("requester").public_key();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .requester_public_key(requester)
            .transfer("secret", None, &transfer_options())
            .unwrap();
        assert_eq!(tx.body.requester_public_key, Some(requester));
        assert_eq!(
            e.bytes(&tx, SerializeMode::Multisignature).len(),
            HEADER_LENGTH + 32
        );
        assert!(e.verify(&tx));
    }

    #[test]
    fn timestamp_overflow_is_rejected() {
        let e = engine();
        let result = TransactionBuilder::new(&e)
            .timestamp(i64::from(i32::MAX) + 1)
            .transfer("secret", None, &transfer_options());
        assert!(matches!(
            result,
            Err(TransactionError::SerializationOverflow { field: "timestamp", .. })
        ));
    }

    #[test]
    fn default_timestamp_is_current_epoch_time() {
        let e = engine();
        let before = e.clock().now();
        let tx = TransactionBuilder::new(&e)
            .transfer("secret", None, &transfer_options())
            .unwrap();
        let after = e.clock().now();
        let ts = i64::from(tx.body.timestamp);
        assert!(before <= ts && ts <= after);
    }

    #[test]
    fn empty_second_secret_is_ignored() {
        let e = engine();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .transfer("secret", Some(""), &transfer_options())
            .unwrap();
        assert!(tx.sign_signature.is_none());
    }

    #[test]
    fn second_signature_registration() {
        let e = engine();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .second_signature("secret", "secret 2")
            .unwrap();
        let expected = e.derive_keypair("secret 2").public_key();
        assert_eq!(
            tx.body.asset,
            Asset::SecondSignature(SecondSignatureAsset {
                public_key: expected
            })
        );
        assert!(tx.sign_signature.is_none());
        assert!(tx.body.recipient_id.is_none());
        assert_eq!(tx.body.fee, 500_000_000);
        assert!(e.verify(&tx));
    }

    #[test]
    fn build_second_signature_needs_second_secret() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        assert!(matches!(
            b.build("secret", None, &TransactionOptions::SecondSignature),
            Err(TransactionError::MissingRequiredField { field: "secondSecret", .. })
        ));
        assert!(b
            .build("secret", Some("s2"), &TransactionOptions::SecondSignature)
            .is_ok());
    }

    #[test]
    fn delegate_requires_username() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        assert!(b
            .delegate("secret", None, &DelegateOptions { username: Some(String::new()) })
            .is_err());
        let tx = b
            .delegate("secret", None, &DelegateOptions { username: Some("moose".into()) })
            .unwrap();
        assert_eq!(tx.body.fee, 2_500_000_000);
        assert!(tx.body.recipient_id.is_none());
    }

    #[test]
    fn vote_targets_own_address() {
        let e = engine();
        let delegate = e.derive_keypair("delegate").public_key();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .vote(
                "secret",
                None,
                &VoteOptions {
                    votes: Some(vec![format!("+{}", delegate)]),
                },
            )
            .unwrap();
        let own = e.derive_address(&e.derive_keypair("secret").public_key());
        assert_eq!(tx.body.recipient_id, Some(own));
        assert_eq!(tx.body.asset, Asset::Vote(vec![KeyChange::add(delegate)]));
    }

    #[test]
    fn vote_validation() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        assert!(matches!(
            b.vote("secret", None, &VoteOptions { votes: Some(vec![]) }),
            Err(TransactionError::MissingRequiredField { field: "votes", .. })
        ));
        assert!(matches!(
            b.vote("secret", None, &VoteOptions { votes: Some(vec!["+zz".into()]) }),
            Err(TransactionError::MalformedHexInput(_))
        ));
    }

    #[test]
    fn multisignature_accepts_bare_keys() {
        let e = engine();
        let cosigner = e.derive_keypair("cosigner").public_key();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .multisignature(
                "secret",
                None,
                &MultisignatureOptions {
                    keysgroup: Some(vec![cosigner.to_hex()]),
                    min: Some(1),
                    lifetime: Some(24),
                },
            )
            .unwrap();
        match &tx.body.asset {
            Asset::Multisignature(a) => {
                assert_eq!(a.keysgroup, vec![KeyChange::add(cosigner)]);
                assert_eq!((a.min, a.lifetime), (1, 24));
            }
            other => panic!("unexpected asset {:?}", other),
        }
    }

    #[test]
    fn multisignature_validation() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        let key = e.derive_keypair("cosigner").public_key();
        let base = MultisignatureOptions {
            keysgroup: Some(vec![format!("-{}", key)]),
            min: Some(1),
            lifetime: Some(1),
        };
        assert!(matches!(
            b.multisignature("secret", None, &base),
            Err(TransactionError::InvalidField { field: "keysgroup", .. })
        ));
        let mut o = base.clone();
        o.min = None;
        assert!(matches!(
            b.multisignature("secret", None, &o),
            Err(TransactionError::MissingRequiredField { field: "min", .. })
        ));
        let mut o = base;
        o.keysgroup = None;
        assert!(matches!(
            b.multisignature("secret", None, &o),
            Err(TransactionError::MissingRequiredField { field: "keysgroup", .. })
        ));
    }

    #[test]
    fn song_fields() {
        let e = engine();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .song("secret", None, &song_options())
            .unwrap();
        assert_eq!(tx.tx_type(), TransactionType::Song);
        assert_eq!(tx.body.fee, 2_500_000_000);
        assert_eq!(tx.body.amount, 0);
        assert!(tx.body.recipient_id.is_none());
        assert!(e.verify(&tx));
    }

    #[test]
    fn song_requires_title_type_and_genre() {
        let e = engine();
        let b = TransactionBuilder::new(&e).timestamp(0);
        for field in ["title", "type", "genre"] {
            let mut o = song_options();
            match field {
                "title" => o.title = None,
                "type" => o.song_type = None,
                _ => o.genre = None,
            }
            assert_eq!(
                b.song("secret", None, &o).unwrap_err(),
                TransactionError::MissingRequiredField {
                    kind: TransactionType::Song,
                    field
                }
            );
        }
    }

    #[test]
    fn song_transfer_fields() {
        let e = engine();
        let tx = TransactionBuilder::new(&e)
            .timestamp(0)
            .song_transfer(
                "secret",
                Some("secret 2"),
                &SongTransferOptions {
                    song_id: Some("1234213".into()),
                },
            )
            .unwrap();
        assert_eq!(tx.tx_type(), TransactionType::SongTransfer);
        assert_eq!(tx.body.fee, 10_000_000);
        let second = e.derive_keypair("secret 2").public_key();
        assert!(e.verify(&tx));
        assert!(e.verify_second_signature(&tx, &second));
    }

    #[test]
    fn options_deserialize_from_json() {
        let o: SongOptions =
            serde_json::from_str(r#"{"title":"t","type":1,"genre":3}"#).unwrap();
        assert_eq!(o.song_type, Some(1));
        let o: SongTransferOptions = serde_json::from_str(r#"{"songId":"9"}"#).unwrap();
        assert_eq!(o.song_id.as_deref(), Some("9"));
        let o: TransferOptions =
            serde_json::from_str(r#"{"recipientId":"1M","amount":5}"#).unwrap();
        assert_eq!(o.amount, Some(5));
    }

    #[test]
    fn options_kind() {
        assert_eq!(
            TransactionOptions::Song(SongOptions::default()).kind(),
            TransactionType::Song
        );
        assert_eq!(
            TransactionOptions::SecondSignature.kind(),
            TransactionType::SecondSignature
        );
    }
}
