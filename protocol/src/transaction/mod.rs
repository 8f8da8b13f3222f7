//! # Transaction Module
//!
//! Construction, signing and verification of UTXO transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs         TxId, inputs, data inputs, prover results
//! box_selection.rs BoxSelection and the BoxSelector strategy seam
//! unsigned.rs      UnsignedTransaction: balanced, id fixed, no proofs
//! signed.rs        Transaction: one proof per input
//! builder.rs       TxBuilder: fee, change and output ordering
//! signing.rs       All-or-nothing signing against a state context
//! verification.rs  Conservation and proof checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Select**: a [`BoxSelector`] picks the boxes to spend.
//! 2. **Build**: [`TxBuilder::build`] balances value and tokens and emits an
//!    [`UnsignedTransaction`].
//! 3. **Sign**: [`sign_transaction`] attaches a proof to every input.
//! 4. **Verify**: [`verify_transaction`] re-checks conservation and proofs.
//!
//! ## Design Decisions
//!
//! - Transaction ids are BLAKE3 over the bytes to sign, which exclude
//!   proofs. An id is known before signing and never changes.
//! - Output order is user outputs, change, fee. Box ids depend on the
//!   output index, so the order is part of the transaction's identity.
//! - All amounts are integers in nanoERG.

pub mod box_selection;
pub mod builder;
pub mod signed;
pub mod signing;
pub mod types;
pub mod unsigned;
pub mod verification;

pub use box_selection::{BoxSelection, BoxSelector, BoxSelectorError, SelectAll};
pub use builder::{TxBuilder, TxBuilderError};
pub use signed::Transaction;
pub use signing::{sign_transaction, SigningError};
pub use types::{DataInput, Input, ProverResult, TxId, UnsignedInput};
pub use unsigned::UnsignedTransaction;
pub use verification::{verify_transaction, TransactionError};
