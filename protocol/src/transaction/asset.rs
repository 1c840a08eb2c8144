//! Kind-specific transaction payloads and their canonical bytes.
//!
//! The asset is the only part of a transaction whose layout depends on the
//! kind. Each variant encodes to a flat byte string with no length prefix,
//! no separator and no padding:
//!
//! ```text
//! 0 transfer          (nothing)
//! 1 second signature  public key, 32 raw bytes
//! 2 delegate          utf8(username)
//! 3 vote              utf8(vote_1) ‖ utf8(vote_2) ‖ ...      each "+<hex>" or "-<hex>"
//! 4 multisignature    min (1 byte) ‖ lifetime (1 byte) ‖ utf8(key_1) ‖ utf8(key_2) ‖ ...
//! 5 song              utf8(title) ‖ [artist] ‖ [fingerprint] ‖ [owners] ‖ type (i32 BE) ‖ genre (i32 BE)
//! 6 song transfer     utf8(song_id)
//! ```
//!
//! Absent optional song fields contribute zero bytes. Validators rebuild
//! these bytes from the JSON record, so the layout cannot drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::TransactionError;
use super::types::TransactionType;
use crate::crypto::keys::MoosePublicKey;

// ---------------------------------------------------------------------------
// KeyChange
// ---------------------------------------------------------------------------

/// Whether a [`KeyChange`] adds or removes a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyChangeOp {
    Add,
    Remove,
}

impl KeyChangeOp {
    fn sign(self) -> char {
        match self {
            Self::Add => '+',
            Self::Remove => '-',
        }
    }
}

/// A `+`/`-` prefixed public key, as used in vote lists and multisignature
/// keysgroups. Serializes and encodes as its string form, e.g. `+a446...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChange {
    pub op: KeyChangeOp,
    pub public_key: MoosePublicKey,
}

impl KeyChange {
    pub fn add(public_key: MoosePublicKey) -> Self {
        Self {
            op: KeyChangeOp::Add,
            public_key,
        }
    }

    pub fn remove(public_key: MoosePublicKey) -> Self {
        Self {
            op: KeyChangeOp::Remove,
            public_key,
        }
    }
}

impl fmt::Display for KeyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.sign(), self.public_key)
    }
}

impl FromStr for KeyChange {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.chars().next() {
            Some('+') => KeyChangeOp::Add,
            Some('-') => KeyChangeOp::Remove,
            _ => {
                return Err(TransactionError::InvalidField {
                    field: "public key change",
                    reason: format!("{:?} must start with '+' or '-'", s),
                })
            }
        };
        let public_key = MoosePublicKey::from_hex(&s[1..])?;
        Ok(Self { op, public_key })
    }
}

impl Serialize for KeyChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Per-kind payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondSignatureAsset {
    pub public_key: MoosePublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateAsset {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisignatureAsset {
    /// Cosignatures required to approve a transaction.
    pub min: u8,
    /// Hours a pending transaction waits for cosignatures.
    pub lifetime: u8,
    pub keysgroup: Vec<KeyChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongAsset {
    #[serde(rename = "type")]
    pub song_type: i32,
    pub genre: i32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Opaque ownership descriptor, encoded as its UTF-8 bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owners: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongTransferAsset {
    #[serde(rename = "songid")]
    pub song_id: String,
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// The kind-specific payload. The variant *is* the transaction kind.
///
/// In JSON the asset keeps the shape validators expect: `{}` for a transfer,
/// `{"votes": [...]}` for a vote, `{"song": {...}}` for a song, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AssetRepr", from = "AssetRepr")]
pub enum Asset {
    Transfer,
    SecondSignature(SecondSignatureAsset),
    Delegate(DelegateAsset),
    Vote(Vec<KeyChange>),
    Multisignature(MultisignatureAsset),
    Song(SongAsset),
    SongTransfer(SongTransferAsset),
}

impl Asset {
    /// The transaction kind this payload belongs to.
    pub fn kind(&self) -> TransactionType {
        match self {
            Self::Transfer => TransactionType::Transfer,
            Self::SecondSignature(_) => TransactionType::SecondSignature,
            Self::Delegate(_) => TransactionType::Delegate,
            Self::Vote(_) => TransactionType::Vote,
            Self::Multisignature(_) => TransactionType::Multisignature,
            Self::Song(_) => TransactionType::Song,
            Self::SongTransfer(_) => TransactionType::SongTransfer,
        }
    }

    /// Append the canonical payload bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Transfer => {}
            Self::SecondSignature(a) => out.extend_from_slice(a.public_key.as_bytes()),
            Self::Delegate(a) => out.extend_from_slice(a.username.as_bytes()),
            Self::Vote(votes) => {
                for vote in votes {
                    out.extend_from_slice(vote.to_string().as_bytes());
                }
            }
            Self::Multisignature(a) => {
                out.push(a.min);
                out.push(a.lifetime);
                for key in &a.keysgroup {
                    out.extend_from_slice(key.to_string().as_bytes());
                }
            }
            Self::Song(a) => {
                out.extend_from_slice(a.title.as_bytes());
                for optional in [&a.artist, &a.fingerprint, &a.owners] {
                    if let Some(field) = optional {
                        out.extend_from_slice(field.as_bytes());
                    }
                }
                out.extend_from_slice(&a.song_type.to_be_bytes());
                out.extend_from_slice(&a.genre.to_be_bytes());
            }
            Self::SongTransfer(a) => out.extend_from_slice(a.song_id.as_bytes()),
        }
    }

    /// The canonical payload bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

/// JSON shape of [`Asset`]: a single-key object, or `{}` for transfers.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AssetRepr {
    Tagged(TaggedAsset),
    Empty(EmptyAsset),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TaggedAsset {
    Signature(SecondSignatureAsset),
    Delegate(DelegateAsset),
    Votes(Vec<KeyChange>),
    Multisignature(MultisignatureAsset),
    Song(SongAsset),
    Songtransfer(SongTransferAsset),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EmptyAsset {}

impl From<Asset> for AssetRepr {
    fn from(asset: Asset) -> Self {
        let tagged = match asset {
            Asset::Transfer => return AssetRepr::Empty(EmptyAsset {}),
            Asset::SecondSignature(a) => TaggedAsset::Signature(a),
            Asset::Delegate(a) => TaggedAsset::Delegate(a),
            Asset::Vote(v) => TaggedAsset::Votes(v),
            Asset::Multisignature(a) => TaggedAsset::Multisignature(a),
            Asset::Song(a) => TaggedAsset::Song(a),
            Asset::SongTransfer(a) => TaggedAsset::Songtransfer(a),
        };
        AssetRepr::Tagged(tagged)
    }
}

impl From<AssetRepr> for Asset {
    fn from(repr: AssetRepr) -> Self {
        match repr {
            AssetRepr::Empty(_) => Asset::Transfer,
            AssetRepr::Tagged(TaggedAsset::Signature(a)) => Asset::SecondSignature(a),
            AssetRepr::Tagged(TaggedAsset::Delegate(a)) => Asset::Delegate(a),
            AssetRepr::Tagged(TaggedAsset::Votes(v)) => Asset::Vote(v),
            AssetRepr::Tagged(TaggedAsset::Multisignature(a)) => Asset::Multisignature(a),
            AssetRepr::Tagged(TaggedAsset::Song(a)) => Asset::Song(a),
            AssetRepr::Tagged(TaggedAsset::Songtransfer(a)) => Asset::SongTransfer(a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::MooseKeypair;

    fn pk(secret: &str) -> MoosePublicKey {
        MooseKeypair::from_secret(secret).public_key()
    }

    fn song(artist: Option<&str>, fingerprint: Option<&str>, owners: Option<&str>) -> SongAsset {
        SongAsset {
            song_type: 0,
            genre: 2,
            title: "Moose the song".to_string(),
            artist: artist.map(str::to_string),
            fingerprint: fingerprint.map(str::to_string),
            owners: owners.map(str::to_string),
        }
    }

    #[test]
    fn transfer_has_no_payload() {
        assert!(Asset::Transfer.to_bytes().is_empty());
        assert_eq!(Asset::Transfer.kind(), TransactionType::Transfer);
    }

    #[test]
    fn second_signature_is_raw_key_bytes() {
        let key = pk("secret 2");
        let asset = Asset::SecondSignature(SecondSignatureAsset { public_key: key });
        assert_eq!(asset.to_bytes(), key.as_bytes().to_vec());
    }

    #[test]
    fn delegate_is_username_utf8() {
        let asset = Asset::Delegate(DelegateAsset {
            username: "élan".to_string(),
        });
        assert_eq!(asset.to_bytes(), "élan".as_bytes());
    }

    #[test]
    fn votes_are_concatenated_without_separator() {
        let a = KeyChange::add(pk("a"));
        let b = KeyChange::remove(pk("b"));
        let bytes = Asset::Vote(vec![a, b]).to_bytes();
        assert_eq!(bytes.len(), 2 * 65);
        assert_eq!(bytes, format!("{}{}", a, b).into_bytes());
        assert_eq!(bytes[0], b'+');
        assert_eq!(bytes[65], b'-');
    }

    #[test]
    fn multisignature_prefixes_min_and_lifetime() {
        let key = KeyChange::add(pk("cosigner"));
        let bytes = Asset::Multisignature(MultisignatureAsset {
            min: 2,
            lifetime: 24,
            keysgroup: vec![key],
        })
        .to_bytes();
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], 24);
        assert_eq!(&bytes[2..], key.to_string().as_bytes());
    }

    #[test]
    fn song_layout_with_all_fields() {
        let bytes = Asset::Song(song(Some("the MooseCoin trio"), Some("abc"), Some("x"))).to_bytes();
        let mut expected = b"Moose the songthe MooseCoin trioabcx".to_vec();
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn song_skips_absent_optionals() {
        let bytes = Asset::Song(song(None, Some("abc"), None)).to_bytes();
        let mut expected = b"Moose the songabc".to_vec();
        expected.extend_from_slice(&0i32.to_be_bytes());
        expected.extend_from_slice(&2i32.to_be_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn song_negative_type_is_twos_complement() {
        let mut asset = song(None, None, None);
        asset.song_type = -1;
        let bytes = Asset::Song(asset).to_bytes();
        let tail = &bytes[bytes.len() - 8..];
        assert_eq!(tail, &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 2]);
    }

    #[test]
    fn song_transfer_is_song_id_utf8() {
        let asset = Asset::SongTransfer(SongTransferAsset {
            song_id: "1234213".to_string(),
        });
        assert_eq!(asset.to_bytes(), b"1234213");
    }

    #[test]
    fn key_change_parsing() {
        let key = pk("a");
        let parsed: KeyChange = format!("-{}", key).parse().unwrap();
        assert_eq!(parsed, KeyChange::remove(key));
        assert!(matches!(
            key.to_hex().parse::<KeyChange>(),
            Err(TransactionError::InvalidField { .. })
        ));
        assert!(matches!(
            "+abcd".parse::<KeyChange>(),
            Err(TransactionError::MalformedHexInput(_))
        ));
        assert!("".parse::<KeyChange>().is_err());
    }

    #[test]
    fn json_shapes() {
        assert_eq!(serde_json::to_string(&Asset::Transfer).unwrap(), "{}");

        let transfer = Asset::SongTransfer(SongTransferAsset {
            song_id: "42".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&transfer).unwrap(),
            r#"{"songtransfer":{"songid":"42"}}"#
        );

        let key = pk("a");
        let votes = Asset::Vote(vec![KeyChange::add(key)]);
        assert_eq!(
            serde_json::to_value(&votes).unwrap(),
            serde_json::json!({ "votes": [format!("+{}", key)] })
        );

        let second = Asset::SecondSignature(SecondSignatureAsset { public_key: key });
        assert_eq!(
            serde_json::to_value(&second).unwrap(),
            serde_json::json!({ "signature": { "publicKey": key.to_hex() } })
        );
    }

    #[test]
    fn json_roundtrip_every_kind() {
        let key = pk("a");
        let assets = vec![
            Asset::Transfer,
            Asset::SecondSignature(SecondSignatureAsset { public_key: key }),
            Asset::Delegate(DelegateAsset {
                username: "moose".to_string(),
            }),
            Asset::Vote(vec![KeyChange::add(key)]),
            Asset::Multisignature(MultisignatureAsset {
                min: 1,
                lifetime: 1,
                keysgroup: vec![KeyChange::add(key)],
            }),
            Asset::Song(song(Some("artist"), None, None)),
            Asset::SongTransfer(SongTransferAsset {
                song_id: "1".to_string(),
            }),
        ];
        for asset in assets {
            let json = serde_json::to_string(&asset).unwrap();
            let back: Asset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, asset, "roundtrip failed for {}", json);
        }
    }

    #[test]
    fn unknown_asset_key_is_rejected() {
        assert!(serde_json::from_str::<Asset>(r#"{"dapp":{}}"#).is_err());
    }
}
