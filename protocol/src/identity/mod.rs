//! # Identity Module
//!
//! Moose identities are deliberately simple: a passphrase yields an Ed25519
//! keypair (see [`crate::crypto::keys`]), and the public key yields a numeric
//! account [`Address`]. Nothing is stored; both derivations can be repeated
//! anywhere, any time, with the same result.

pub mod address;

pub use address::{Address, AddressError};
