//! Transaction signing.
//!
//! Signing is a separate step from building because the secrets may not be
//! available at construction time. The message every input proves over is
//! [`UnsignedTransaction::bytes_to_sign`], which excludes proofs, so the
//! transaction id is the same before and after signing.
//!
//! Signing is all-or-nothing: the first input that cannot be resolved,
//! reduced or proven aborts the whole operation and no partially signed
//! transaction escapes.

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::signed::Transaction;
use super::types::ProverResult;
use super::unsigned::UnsignedTransaction;
use super::verification::TransactionError;
use crate::chain::{BoxId, ErgoBox, ErgoStateContext};
use crate::prover::{ProofBackend, Prover, ProverError};
use crate::script::{EvalContext, EvalError, ScriptEvaluator};

/// Why signing failed. No variant carries a partial transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("input box {0} not supplied")]
    MissingInputBox(BoxId),

    #[error("data box {0} not supplied")]
    MissingDataBox(BoxId),

    #[error("script evaluation failed for input {index}: {source}")]
    ScriptEvaluation {
        index: usize,
        #[source]
        source: EvalError,
    },

    #[error("cannot prove input {index}: {source}")]
    ProofGenerationFailed {
        index: usize,
        #[source]
        source: ProverError,
    },

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Produces a signed transaction with one proof per input, in input order.
///
/// `boxes_to_spend` and `data_boxes` may be supplied in any order and may
/// contain extra boxes; they are looked up by id.
pub fn sign_transaction<E, B>(
    prover: &Prover<B>,
    evaluator: &E,
    state_context: &ErgoStateContext,
    unsigned: &UnsignedTransaction,
    boxes_to_spend: &[ErgoBox],
    data_boxes: &[ErgoBox],
) -> Result<Transaction, SigningError>
where
    E: ScriptEvaluator + ?Sized,
    B: ProofBackend,
{
    let inputs = resolve(
        unsigned.inputs().iter().map(|i| i.box_id),
        boxes_to_spend,
        SigningError::MissingInputBox,
    )?;
    let data = resolve(
        unsigned.data_inputs().iter().map(|d| d.box_id),
        data_boxes,
        SigningError::MissingDataBox,
    )?;

    let message = unsigned.bytes_to_sign();
    let mut proofs = Vec::with_capacity(inputs.len());
    for (index, input_box) in inputs.iter().enumerate() {
        let ctx = EvalContext {
            state_context,
            self_box: input_box,
            inputs: &inputs,
            data_boxes: &data,
        };
        let sigma = evaluator
            .reduce(input_box.ergo_tree(), &ctx)
            .map_err(|source| SigningError::ScriptEvaluation { index, source })?;
        let proof = prover.prove(&sigma, &message).map_err(|source| {
            warn!(index, box_id = %input_box.box_id(), error = %source, "input not provable");
            SigningError::ProofGenerationFailed { index, source }
        })?;
        proofs.push(ProverResult::from(proof));
    }

    let tx = Transaction::from_unsigned_tx(unsigned.clone(), proofs)?;
    debug!(tx_id = %tx.id(), inputs = tx.inputs().len(), "transaction signed");
    Ok(tx)
}

/// Looks up every id in `boxes`, preserving the order of `ids`.
fn resolve<I>(
    ids: I,
    boxes: &[ErgoBox],
    missing: fn(BoxId) -> SigningError,
) -> Result<Vec<ErgoBox>, SigningError>
where
    I: Iterator<Item = BoxId>,
{
    let by_id: HashMap<BoxId, &ErgoBox> = boxes.iter().map(|b| (b.box_id(), b)).collect();
    ids.map(|id| by_id.get(&id).map(|b| (*b).clone()).ok_or(missing(id)))
        .collect()
}
