//! The cryptographic backend seam.
//!
//! Everything the signing pipeline needs from a crypto library fits in four
//! calls: SHA-256, seed-to-keypair expansion, detached signing and detached
//! verification. [`CryptoProvider`] names those four calls and
//! [`Ed25519Provider`] implements them with `sha2` and `ed25519-dalek`.
//!
//! A provider is constructed explicitly and handed to the
//! [`SigningEngine`](crate::transaction::SigningEngine). There is no global
//! instance and nothing to initialize. Implementations must be pure
//! functions of their inputs so one provider can be shared across threads.

use super::hash::{sha256, DIGEST_LENGTH};
use super::keys::{MooseKeypair, MoosePublicKey, MooseSignature};

/// Primitive operations required by the signing engine.
pub trait CryptoProvider: Send + Sync {
    /// SHA-256 of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LENGTH];

    /// Expand a 32-byte seed into an Ed25519 keypair.
    fn keypair_from_seed(&self, seed: &[u8; 32]) -> MooseKeypair;

    /// Detached signature over `message`.
    fn sign_detached(&self, message: &[u8], keypair: &MooseKeypair) -> MooseSignature;

    /// Check a detached signature. Never panics, never errors.
    fn verify_detached(
        &self,
        signature: &MooseSignature,
        message: &[u8],
        public_key: &MoosePublicKey,
    ) -> bool;
}

/// Default backend: `sha2` for hashing, `ed25519-dalek` for signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl CryptoProvider for Ed25519Provider {
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LENGTH] {
        sha256(data)
    }

    fn keypair_from_seed(&self, seed: &[u8; 32]) -> MooseKeypair {
        MooseKeypair::from_seed(seed)
    }

    fn sign_detached(&self, message: &[u8], keypair: &MooseKeypair) -> MooseSignature {
        keypair.sign(message)
    }

    fn verify_detached(
        &self,
        signature: &MooseSignature,
        message: &[u8],
        public_key: &MoosePublicKey,
    ) -> bool {
        public_key.verify(message, signature)
    }
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for &P {
    fn sha256(&self, data: &[u8]) -> [u8; DIGEST_LENGTH] {
        (**self).sha256(data)
    }

    fn keypair_from_seed(&self, seed: &[u8; 32]) -> MooseKeypair {
        (**self).keypair_from_seed(seed)
    }

    fn sign_detached(&self, message: &[u8], keypair: &MooseKeypair) -> MooseSignature {
        (**self).sign_detached(message, keypair)
    }

    fn verify_detached(
        &self,
        signature: &MooseSignature,
        message: &[u8],
        public_key: &MoosePublicKey,
    ) -> bool {
        (**self).verify_detached(signature, message, public_key)
    }
}
