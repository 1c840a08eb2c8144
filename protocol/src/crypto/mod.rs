//! # Cryptographic Primitives for Moose
//!
//! Every key, signature, address and transaction id in the protocol flows
//! through here. The choices are fixed by the network, not by taste:
//!
//! - **Ed25519** for account keys and signatures.
//! - **SHA-256** for key seeds, signed digests, addresses and ids.
//!
//! Everything here is a thin, type-safe wrapper around `ed25519-dalek` and
//! `sha2`. The [`provider`] module is the seam through which the signing
//! engine reaches these primitives.

pub mod hash;
pub mod keys;
pub mod provider;

pub use hash::{digest_to_u64, sha256};
pub use keys::{KeyError, MooseKeypair, MoosePublicKey, MooseSignature};
pub use provider::{CryptoProvider, Ed25519Provider};
