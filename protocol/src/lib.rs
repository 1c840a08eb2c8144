// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Moose Protocol — Core Library
//!
//! Offline construction and signing of Moose ledger transactions. Nothing
//! in this crate talks to the network: it produces byte-exact, signed,
//! identified records that any node will accept, and verifies records
//! produced elsewhere.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants, the fee table, network parameters.
//! - **crypto** — SHA-256, Ed25519 keys and signatures, and the provider seam.
//! - **identity** — Account addresses (`<u64>M`).
//! - **slots** — Epoch time and forging slots.
//! - **transaction** — Assets, byte codec, signing engine, builder.
//!
//! ## Quick start
//!
//! ```
//! use moose_protocol::transaction::{SigningEngine, TransactionBuilder, TransferOptions};
//!
//! let engine = SigningEngine::new();
//! let tx = TransactionBuilder::new(&engine)
//!     .transfer("secret", None, &TransferOptions {
//!         recipient_id: Some("58191285901858109M".to_string()),
//!         amount: Some(1000),
//!     })
//!     .unwrap();
//!
//! assert!(engine.verify(&tx));
//! ```
//!
//! ## Ground rules
//!
//! 1. Bytes are the contract. The layout never changes to suit Rust.
//! 2. Keys come only from secrets. No randomness anywhere.
//! 3. Structural problems are errors; bad signatures are just `false`.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod slots;
pub mod transaction;
