//! The signing engine: hashing, signing, verification and ids.
//!
//! Everything here is a pure function of its inputs and the injected
//! [`CryptoProvider`]. The engine holds no mutable state, so one instance
//! can be shared freely across threads.
//!
//! What each signature covers:
//!
//! ```text
//! signature       SHA256(header ‖ asset)
//! signSignature   SHA256(header ‖ asset ‖ signature)
//! cosignature     SHA256(header ‖ asset)                  (multisignature)
//! id              SHA256(header ‖ asset ‖ signature [‖ signSignature])[0..8], reversed
//! ```
//!
//! Signatures are always made over the 32-byte digest, never the raw bytes.

use tracing::{debug, warn};

use super::codec::{serialize, SerializeMode};
use super::error::TransactionError;
use super::record::{
    Identifiable, SecondSignedTransaction, Signable, SignedTransaction, Transaction,
    TransactionId, UnsignedTransaction,
};
use super::types::TransactionType;
use crate::config::{NetworkConfig, SIGNATURE_LENGTH};
use crate::crypto::hash::digest_to_u64;
use crate::crypto::keys::{MooseKeypair, MoosePublicKey, MooseSignature};
use crate::crypto::provider::{CryptoProvider, Ed25519Provider};
use crate::identity::address::Address;
use crate::slots::EpochClock;

/// Signs, verifies and identifies transactions.
///
/// # Example
///
/// ```
/// use moose_protocol::transaction::SigningEngine;
///
/// let engine = SigningEngine::new();
/// let keys = engine.derive_keypair("123");
/// assert_eq!(engine.derive_address(&keys.public_key()).to_string(), "12475940823804898745M");
/// ```
#[derive(Debug, Clone)]
pub struct SigningEngine<P: CryptoProvider = Ed25519Provider> {
    provider: P,
    config: NetworkConfig,
}

impl SigningEngine<Ed25519Provider> {
    /// Engine with the default provider and mainnet parameters.
    pub fn new() -> Self {
        Self::with_provider(Ed25519Provider, NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        Self::with_provider(Ed25519Provider, config)
    }
}

impl Default for SigningEngine<Ed25519Provider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CryptoProvider> SigningEngine<P> {
    pub fn with_provider(provider: P, config: NetworkConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn clock(&self) -> EpochClock {
        EpochClock::from_config(&self.config)
    }

    // -- keys ---------------------------------------------------------------

    /// Keypair whose seed is `SHA256(utf8(secret))`.
    pub fn derive_keypair(&self, secret: &str) -> MooseKeypair {
        let seed = self.provider.sha256(secret.as_bytes());
        self.provider.keypair_from_seed(&seed)
    }

    pub fn derive_address(&self, public_key: &MoosePublicKey) -> Address {
        Address::from_digest(&self.provider.sha256(public_key.as_bytes()))
    }

    // -- bytes and hashes ---------------------------------------------------

    pub fn bytes<T: Signable + ?Sized>(&self, tx: &T, mode: SerializeMode) -> Vec<u8> {
        serialize(tx, mode)
    }

    /// SHA256 of the full bytes, including whatever signatures are set.
    pub fn hash<T: Signable + ?Sized>(&self, tx: &T) -> [u8; 32] {
        self.provider.sha256(&serialize(tx, SerializeMode::Full))
    }

    pub fn id<T: Signable + ?Sized>(&self, tx: &T) -> TransactionId {
        TransactionId::new(digest_to_u64(&self.hash(tx)))
    }

    fn sign_digest(&self, bytes: &[u8], keypair: &MooseKeypair) -> MooseSignature {
        let digest = self.provider.sha256(bytes);
        self.provider.sign_detached(&digest, keypair)
    }

    fn verify_digest(
        &self,
        bytes: &[u8],
        signature: &MooseSignature,
        public_key: &MoosePublicKey,
    ) -> bool {
        let digest = self.provider.sha256(bytes);
        self.provider.verify_detached(signature, &digest, public_key)
    }

    // -- signing ------------------------------------------------------------

    /// Attach the primary signature.
    pub fn sign(&self, tx: UnsignedTransaction, keypair: &MooseKeypair) -> SignedTransaction {
        let signature = self.sign_digest(&serialize(&tx, SerializeMode::Full), keypair);
        tx.with_signature(signature)
    }

    /// Attach the second signature. It covers the primary signature too.
    pub fn second_sign(
        &self,
        tx: SignedTransaction,
        keypair: &MooseKeypair,
    ) -> SecondSignedTransaction {
        let sign_signature = self.sign_digest(&serialize(&tx, SerializeMode::Full), keypair);
        tx.with_sign_signature(sign_signature)
    }

    /// Compute the id and produce the finished record.
    pub fn identify<T: Identifiable>(&self, tx: T) -> Transaction {
        let id = self.id(&tx);
        let (body, signature, sign_signature) = tx.into_parts();
        debug!(
            %id,
            tx_type = %body.tx_type(),
            has_second_signature = sign_signature.is_some(),
            "transaction identified"
        );
        Transaction {
            id,
            body,
            signature,
            sign_signature,
        }
    }

    /// A signature over the full current bytes of an already signed
    /// transaction. Leaves the transaction untouched.
    pub fn cosign(&self, tx: &Transaction, keypair: &MooseKeypair) -> MooseSignature {
        self.sign_digest(&serialize(tx, SerializeMode::Full), keypair)
    }

    /// A multisignature cosignature: covers header and asset only, so every
    /// cosigner signs the same digest regardless of attached signatures.
    pub fn multi_sign<T: Signable + ?Sized>(
        &self,
        tx: &T,
        keypair: &MooseKeypair,
    ) -> MooseSignature {
        self.sign_digest(&serialize(tx, SerializeMode::Multisignature), keypair)
    }

    // -- verification -------------------------------------------------------

    /// Check the primary signature against the sender's key.
    ///
    /// The signed bytes are recovered by stripping the trailing signatures
    /// from the full serialization: 64 bytes, or 128 when a second signature
    /// is present.
    pub fn verify(&self, tx: &Transaction) -> bool {
        let bytes = serialize(tx, SerializeMode::Full);
        let strip = if tx.sign_signature.is_some() {
            2 * SIGNATURE_LENGTH
        } else {
            SIGNATURE_LENGTH
        };
        let Some(signed_len) = bytes.len().checked_sub(strip) else {
            warn!(id = %tx.id, len = bytes.len(), "transaction too short to carry its signatures");
            return false;
        };
        let ok = self.verify_digest(&bytes[..signed_len], &tx.signature, tx.sender_public_key());
        if !ok {
            debug!(id = %tx.id, "primary signature rejected");
        }
        ok
    }

    /// Check the second signature against `public_key`, the key registered
    /// by the sender's second-signature transaction.
    pub fn verify_second_signature(&self, tx: &Transaction, public_key: &MoosePublicKey) -> bool {
        let Some(sign_signature) = &tx.sign_signature else {
            debug!(id = %tx.id, "no second signature to verify");
            return false;
        };
        let bytes = serialize(tx, SerializeMode::Full);
        let Some(signed_len) = bytes.len().checked_sub(SIGNATURE_LENGTH) else {
            return false;
        };
        self.verify_digest(&bytes[..signed_len], sign_signature, public_key)
    }

    /// Check one cosignature produced by [`multi_sign`](Self::multi_sign).
    pub fn verify_multisignature<T: Signable + ?Sized>(
        &self,
        tx: &T,
        public_key: &MoosePublicKey,
        signature: &MooseSignature,
    ) -> bool {
        self.verify_digest(
            &serialize(tx, SerializeMode::Multisignature),
            signature,
            public_key,
        )
    }

    // -- fees ---------------------------------------------------------------

    pub fn fee(&self, tx_type: TransactionType) -> u64 {
        self.config.fees.fee(tx_type)
    }

    pub fn fee_for_type_id(&self, type_id: u8) -> Result<u64, TransactionError> {
        self.config.fees.fee_for_type_id(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;
    use crate::transaction::asset::Asset;
    use crate::transaction::record::TransactionBody;

    fn engine() -> SigningEngine {
        SigningEngine::new()
    }

    fn unsigned(engine: &SigningEngine, sender: &MooseKeypair) -> UnsignedTransaction {
        UnsignedTransaction::new(TransactionBody {
            timestamp: 12_345,
            sender_public_key: sender.public_key(),
            requester_public_key: None,
            recipient_id: Some("58191285901858109M".parse().unwrap()),
            amount: 1000,
            fee: engine.fee(TransactionType::Transfer),
            asset: Asset::Transfer,
        })
    }

    #[test]
    fn derive_known_vector() {
        let e = engine();
        let kp = e.derive_keypair("123");
        assert_eq!(
            kp.public_key().to_hex(),
            "a4465fd76c16fcc458448076372abf1912cc5b150663a64dffefe550f96feadd"
        );
        assert_eq!(
            e.derive_address(&kp.public_key()).to_string(),
            "12475940823804898745M"
        );
    }

    #[test]
    fn sign_covers_header_and_asset() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let tx = unsigned(&e, &kp);
        let digest = sha256(&e.bytes(&tx, SerializeMode::Full));
        let signed = e.sign(tx, &kp);
        assert!(kp
            .public_key()
            .verify(&digest, signed.signature().unwrap()));
    }

    #[test]
    fn signed_transaction_verifies() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        assert!(e.verify(&tx));
        assert!(!tx.has_second_signature());
        assert!(!e.verify_second_signature(&tx, &kp.public_key()));
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let mut tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        tx.body.amount += 1;
        assert!(!e.verify(&tx));
    }

    #[test]
    fn fee_change_does_not_affect_signature() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let mut tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        tx.body.fee = 0;
        assert!(e.verify(&tx));
    }

    #[test]
    fn wrong_sender_fails_verification() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let other = e.derive_keypair("other");
        let mut tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        tx.body.sender_public_key = other.public_key();
        assert!(!e.verify(&tx));
    }

    #[test]
    fn second_signature_roundtrip() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let second = e.derive_keypair("secret 2");
        let tx = e.identify(e.second_sign(e.sign(unsigned(&e, &kp), &kp), &second));
        assert!(e.verify(&tx));
        assert!(e.verify_second_signature(&tx, &second.public_key()));
        assert!(!e.verify_second_signature(&tx, &kp.public_key()));
    }

    #[test]
    fn second_signature_covers_first() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let second = e.derive_keypair("secret 2");
        let mut tx = e.identify(e.second_sign(e.sign(unsigned(&e, &kp), &kp), &second));
        tx.signature = MooseSignature::from_bytes([0; 64]);
        assert!(!e.verify_second_signature(&tx, &second.public_key()));
    }

    #[test]
    fn replaced_second_signature_leaves_primary_intact() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let second = e.derive_keypair("secret 2");
        let mut tx = e.identify(e.second_sign(e.sign(unsigned(&e, &kp), &kp), &second));

        tx.sign_signature = Some(MooseSignature::from_bytes([0x11; 64]));
        assert!(e.verify(&tx));
        assert!(!e.verify_second_signature(&tx, &second.public_key()));
    }

    #[test]
    fn id_depends_on_signatures() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let signed = e.sign(unsigned(&e, &kp), &kp);
        let one = e.identify(signed.clone());
        let two = e.identify(e.second_sign(signed, &e.derive_keypair("secret 2")));
        assert_ne!(one.id, two.id);
        assert_eq!(one.id, e.id(&one));
        assert_eq!(one.id.value(), digest_to_u64(&e.hash(&one)));
    }

    #[test]
    fn signing_is_deterministic() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let a = e.identify(e.sign(unsigned(&e, &kp), &kp));
        let b = e.identify(e.sign(unsigned(&e, &kp), &kp));
        assert_eq!(a, b);
    }

    #[test]
    fn cosign_does_not_mutate() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        let before = tx.clone();
        let cosigner = e.derive_keypair("cosigner");
        let sig = e.cosign(&tx, &cosigner);
        assert_eq!(tx, before);
        let digest = e.hash(&tx);
        assert!(cosigner.public_key().verify(&digest, &sig));
    }

    #[test]
    fn multisignature_roundtrip() {
        let e = engine();
        let kp = e.derive_keypair("secret");
        let tx = e.identify(e.sign(unsigned(&e, &kp), &kp));
        let cosigner = e.derive_keypair("cosigner");
        let sig = e.multi_sign(&tx, &cosigner);
        assert!(e.verify_multisignature(&tx, &cosigner.public_key(), &sig));
        assert!(!e.verify_multisignature(&tx, &kp.public_key(), &sig));

        // Attached signatures do not change what cosigners sign.
        let unsigned = UnsignedTransaction::new(tx.body.clone());
        assert_eq!(e.multi_sign(&unsigned, &cosigner), sig);
    }

    #[test]
    fn fees_come_from_config() {
        let e = engine();
        assert_eq!(e.fee(TransactionType::Song), 2_500_000_000);
        assert_eq!(e.fee_for_type_id(3).unwrap(), 100_000_000);
        assert!(e.fee_for_type_id(7).is_err());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SigningEngine>();
    }
}
