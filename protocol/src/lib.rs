// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ergo Transaction Protocol: Core Library
//!
//! Builds balanced UTXO transactions from a box selection and signs them
//! against a snapshot of chain state.
//!
//! ## Architecture
//!
//! - **config**: protocol constants and default chain parameters.
//! - **crypto**: BLAKE3 digests and Ed25519 keys.
//! - **chain**: box values, tokens, registers, boxes, addresses, headers
//!   and the state context.
//! - **script**: guard scripts, their reduction to sigma propositions and
//!   the evaluator seam.
//! - **prover**: proof trees and the proving backend seam.
//! - **transaction**: box selection, the builder, signing, verification.
//! - **wallet**: secrets plus default components, ready to sign.
//! - **logging**: `tracing` subscriber setup for hosts and tests.
//!
//! ## Flow
//!
//! ```text
//! BoxSelection ──► TxBuilder::build ──► UnsignedTransaction
//!                                              │
//!      ErgoStateContext, boxes, secrets ──► sign_transaction ──► Transaction
//! ```
//!
//! Every operation is synchronous and allocation-bounded by the size of the
//! transaction. Failures are reported as typed errors; neither the builder
//! nor the signer ever returns a partial result.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod logging;
pub mod prover;
pub mod script;
pub mod transaction;
pub mod wallet;

pub use chain::{
    Address, BoxId, BoxValue, Contract, ErgoBox, ErgoBoxCandidate, ErgoBoxCandidateBuilder,
    ErgoStateContext, NetworkPrefix, Token, TokenAmount, TokenId,
};
pub use crypto::{PublicKey, SecretKey};
pub use transaction::{
    sign_transaction, verify_transaction, BoxSelection, Transaction, TxBuilder, TxBuilderError,
    UnsignedTransaction,
};
pub use wallet::Wallet;
