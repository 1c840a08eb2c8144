//! # Key Management
//!
//! Ed25519 keypairs for Moose accounts.
//!
//! Moose keys are brain-wallet keys: the 32-byte Ed25519 seed is the SHA-256
//! of the account passphrase. There is no salt and no randomness, so the same
//! passphrase yields the same keypair on every machine, forever. The entropy
//! of the passphrase is the only thing protecting the account.
//!
//! The private key is exposed in the NaCl convention, 64 bytes of
//! `seed ‖ public_key`, because that is what the rest of the Moose tooling
//! stores and exchanges.
//!
//! Key bytes are never logged and never appear in `Debug` output.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::hash::sha256;
use crate::config::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors while decoding key or signature material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("malformed hex for {what}: {reason}")]
    MalformedHex { what: &'static str, reason: String },

    #[error("wrong length for {what}: expected {expected} bytes, got {got}")]
    WrongLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("private key does not match its embedded public key")]
    KeypairMismatch,
}

fn decode_fixed<const N: usize>(what: &'static str, s: &str) -> Result<[u8; N], KeyError> {
    let bytes = hex::decode(s).map_err(|e| KeyError::MalformedHex {
        what,
        reason: e.to_string(),
    })?;
    bytes.as_slice().try_into().map_err(|_| KeyError::WrongLength {
        what,
        expected: N,
        got: bytes.len(),
    })
}

// ---------------------------------------------------------------------------
// MooseKeypair
// ---------------------------------------------------------------------------

/// An account keypair.
///
/// Deliberately not `Serialize`. If you need the private key on disk, call
/// [`private_key_hex`](Self::private_key_hex) and own that decision.
///
/// # Examples
///
/// ```
/// use moose_protocol::crypto::MooseKeypair;
///
/// let kp = MooseKeypair::from_secret("123");
/// assert_eq!(
///     kp.public_key().to_hex(),
///     "a4465fd76c16fcc458448076372abf1912cc5b150663a64dffefe550f96feadd"
/// );
/// ```
pub struct MooseKeypair {
    signing_key: SigningKey,
}

impl MooseKeypair {
    /// Derive the keypair for a passphrase: `seed = SHA256(utf8(secret))`.
    pub fn from_secret(secret: &str) -> Self {
        Self::from_seed(&sha256(secret.as_bytes()))
    }

    /// Expand a 32-byte seed into a keypair.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Rebuild a keypair from a 64-byte NaCl private key.
    ///
    /// The trailing 32 bytes must be the public key of the leading seed.
    pub fn from_private_key_bytes(bytes: &[u8; PRIVATE_KEY_LENGTH]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_keypair_bytes(bytes).map_err(|_| KeyError::KeypairMismatch)?;
        Ok(Self { signing_key })
    }

    /// Rebuild a keypair from a hex-encoded 64-byte private key.
    pub fn from_private_key_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = decode_fixed::<PRIVATE_KEY_LENGTH>("private key", s)?;
        Self::from_private_key_bytes(&bytes)
    }

    pub fn public_key(&self) -> MoosePublicKey {
        MoosePublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The 64-byte private key, `seed ‖ public_key`.
    ///
    /// **Handle with care.** Anyone holding these bytes controls the account.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    /// Hex form of [`private_key_bytes`](Self::private_key_bytes). 128 characters.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.private_key_bytes())
    }

    /// Produce a detached Ed25519 signature over `message`.
    ///
    /// Deterministic: the same key and message always give the same bytes.
    pub fn sign(&self, message: &[u8]) -> MooseSignature {
        MooseSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// Convenience for `self.public_key().verify(..)`.
    pub fn verify(&self, message: &[u8], signature: &MooseSignature) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl Clone for MooseKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for MooseKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even a prefix.
        write!(f, "MooseKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for MooseKeypair {
    /// Compares public keys only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for MooseKeypair {}

// ---------------------------------------------------------------------------
// MoosePublicKey
// ---------------------------------------------------------------------------

/// The public half of an account. Serializes as 64 hex characters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MoosePublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl MoosePublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Parse a hex-encoded public key.
    ///
    /// Only the encoding and length are checked. Whether the bytes are a
    /// valid curve point is left to verification, which simply fails.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        decode_fixed::<PUBLIC_KEY_LENGTH>("public key", s).map(Self::from_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Verify a detached signature. Returns `false` for invalid keys as well
    /// as for bad signatures; callers branch, they don't diagnose.
    pub fn verify(&self, message: &[u8], signature: &MooseSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }
}

impl Hash for MoosePublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for MoosePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MoosePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoosePublicKey({})", &self.to_hex()[..16])
    }
}

impl FromStr for MoosePublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for MoosePublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MoosePublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// MooseSignature
// ---------------------------------------------------------------------------

/// A detached Ed25519 signature. Serializes as 128 hex characters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MooseSignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl MooseSignature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        decode_fixed::<SIGNATURE_LENGTH>("signature", s).map(Self::from_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for MooseSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MooseSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "MooseSignature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl FromStr for MooseSignature {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for MooseSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MooseSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
