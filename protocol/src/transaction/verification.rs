//! Transaction verification: structural rules, conservation and proofs.
//!
//! [`verify_transaction`] runs its checks from cheapest to most expensive:
//! box resolution, value conservation, token conservation, then one script
//! reduction and proof check per input.

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use super::signed::Transaction;
use crate::chain::token::{accumulate_tokens, TokenTotals};
use crate::chain::{BoxId, ErgoBox, ErgoStateContext, TokenError, TokenId};
use crate::prover::{verify_proof, ProofBackend};
use crate::script::{EvalContext, EvalError, ScriptEvaluator};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Structural and semantic transaction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("too many inputs: {0}")]
    TooManyInputs(usize),

    #[error("too many data inputs: {0}")]
    TooManyDataInputs(usize),

    #[error("too many outputs: {0}")]
    TooManyOutputs(usize),

    #[error("box {0} is spent twice")]
    DuplicateInput(BoxId),

    #[error("{proofs} proofs supplied for {inputs} inputs")]
    ProofCountMismatch { inputs: usize, proofs: usize },

    #[error("input box {0} not found")]
    InputBoxMissing(BoxId),

    #[error("data box {0} not found")]
    DataBoxMissing(BoxId),

    /// Inputs and outputs (fee box included) must carry the same value.
    #[error("value not conserved: inputs {inputs}, outputs {outputs}")]
    ValueImbalance { inputs: u128, outputs: u128 },

    /// Outputs hold more of a token than the inputs provide.
    #[error("token {token_id} created out of thin air: inputs {inputs}, outputs {outputs}")]
    TokenOverspent {
        token_id: TokenId,
        inputs: u128,
        outputs: u128,
    },

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("script evaluation failed for input {index}: {source}")]
    ScriptEvaluation {
        index: usize,
        #[source]
        source: EvalError,
    },

    #[error("invalid spending proof for input {index}")]
    InvalidProof { index: usize },
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies `tx` against the boxes it spends and reads.
///
/// Checks, in order:
///
/// 1. Every input and data input resolves to a supplied box.
/// 2. Input value equals output value, fee box included.
/// 3. No output holds more of a token than the inputs, except the token
///    minted under the first input's id. Burning is allowed.
/// 4. Each input's proof verifies against its reduced guard.
pub fn verify_transaction<E, B>(
    tx: &Transaction,
    state_context: &ErgoStateContext,
    boxes_to_spend: &[ErgoBox],
    data_boxes: &[ErgoBox],
    evaluator: &E,
    backend: &B,
) -> Result<(), TransactionError>
where
    E: ScriptEvaluator + ?Sized,
    B: ProofBackend,
{
    let spendable: HashMap<BoxId, &ErgoBox> =
        boxes_to_spend.iter().map(|b| (b.box_id(), b)).collect();
    let inputs = tx
        .inputs()
        .iter()
        .map(|i| {
            spendable
                .get(&i.box_id)
                .map(|b| (*b).clone())
                .ok_or(TransactionError::InputBoxMissing(i.box_id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let readable: HashMap<BoxId, &ErgoBox> = data_boxes.iter().map(|b| (b.box_id(), b)).collect();
    let data = tx
        .data_inputs()
        .iter()
        .map(|d| {
            readable
                .get(&d.box_id)
                .map(|b| (*b).clone())
                .ok_or(TransactionError::DataBoxMissing(d.box_id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 2. ERG conservation.
    let value_in: u128 = inputs.iter().map(|b| b.value().as_u64() as u128).sum();
    let value_out: u128 = tx
        .output_candidates()
        .iter()
        .map(|c| c.value.as_u64() as u128)
        .sum();
    if value_in != value_out {
        return Err(TransactionError::ValueImbalance {
            inputs: value_in,
            outputs: value_out,
        });
    }

    // 3. Token conservation.
    let mut tokens_in = TokenTotals::new();
    for b in &inputs {
        accumulate_tokens(&mut tokens_in, b.tokens())?;
    }
    let mut tokens_out = TokenTotals::new();
    for c in tx.output_candidates() {
        accumulate_tokens(&mut tokens_out, &c.tokens)?;
    }
    let minted = tx
        .inputs()
        .first()
        .map(|i| TokenId::from_box_id(i.box_id))
        .ok_or(TransactionError::NoInputs)?;
    for (token_id, out_amount) in &tokens_out {
        if *token_id == minted {
            continue;
        }
        let in_amount = tokens_in.get(token_id).copied().unwrap_or(0);
        if *out_amount > in_amount {
            return Err(TransactionError::TokenOverspent {
                token_id: *token_id,
                inputs: in_amount,
                outputs: *out_amount,
            });
        }
    }

    // 4. Proofs.
    let message = tx.bytes_to_sign();
    for (index, (input, input_box)) in tx.inputs().iter().zip(&inputs).enumerate() {
        let ctx = EvalContext {
            state_context,
            self_box: input_box,
            inputs: &inputs,
            data_boxes: &data,
        };
        let sigma = evaluator
            .reduce(input_box.ergo_tree(), &ctx)
            .map_err(|source| TransactionError::ScriptEvaluation { index, source })?;
        if !verify_proof(backend, &sigma, &input.spending_proof.proof, &message) {
            return Err(TransactionError::InvalidProof { index });
        }
    }

    debug!(
        tx_id = %tx.id(),
        inputs = inputs.len(),
        outputs = tx.output_candidates().len(),
        "transaction verified"
    );
    Ok(())
}
