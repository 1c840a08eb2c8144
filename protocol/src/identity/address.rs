//! # Account Addresses
//!
//! A Moose address is a 64-bit account number rendered in decimal with a
//! trailing `M`:
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA256(public_key)                 -> 32 bytes
//!     -> first 8 bytes, reversed, as u64    -> 12475940823804898745
//!     -> decimal + 'M'                      -> 12475940823804898745M
//! ```
//!
//! Only the numeric part goes on the wire (8 bytes, big-endian, in the
//! recipient slot). Two public keys can collide in the 64-bit space; nothing
//! here tries to detect that.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::ADDRESS_SUFFIX;
use crate::crypto::hash::{digest_to_u64, sha256};
use crate::crypto::keys::MoosePublicKey;

/// Errors from parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address {0:?} does not end with 'M'")]
    MissingSuffix(String),

    #[error("address {0:?} is not a decimal account number")]
    NotDecimal(String),

    #[error("address {0:?} does not fit in 64 bits")]
    Overflow(String),
}

/// A Moose account address.
///
/// # Examples
///
/// ```
/// use moose_protocol::crypto::MooseKeypair;
/// use moose_protocol::identity::Address;
///
/// let kp = MooseKeypair::from_secret("123");
/// let address = Address::from_public_key(&kp.public_key());
/// assert_eq!(address.to_string(), "12475940823804898745M");
///
/// let parsed: Address = "12475940823804898745M".parse().unwrap();
/// assert_eq!(parsed, address);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u64);

impl Address {
    /// Wrap a raw account number.
    pub const fn new(account_number: u64) -> Self {
        Self(account_number)
    }

    /// Derive the address owned by `public_key`.
    pub fn from_public_key(public_key: &MoosePublicKey) -> Self {
        Self::from_digest(&sha256(public_key.as_bytes()))
    }

    /// Address from an already computed `SHA256(public_key)`.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(digest_to_u64(digest))
    }

    /// The numeric account number.
    pub fn account_number(&self) -> u64 {
        self.0
    }

    /// The 8-byte wire encoding of the account number, big-endian.
    pub fn to_wire_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, ADDRESS_SUFFIX)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse `<decimal>M`. Values beyond `u64::MAX` are rejected here, at
    /// decode time, so they never reach the encoder.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_suffix(ADDRESS_SUFFIX)
            .ok_or_else(|| AddressError::MissingSuffix(s.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::NotDecimal(s.to_string()));
        }

        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| AddressError::Overflow(s.to_string()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
