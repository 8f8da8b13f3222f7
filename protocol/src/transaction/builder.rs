//! Transaction construction.
//!
//! [`TxBuilder`] turns a [`BoxSelection`] and the caller's output
//! candidates into a balanced [`UnsignedTransaction`]: it sums values and
//! tokens, synthesizes the change box and the fee box, and fixes output
//! order as user outputs, change, fee.
//!
//! The builder does not sign; that happens in [`super::signing`]. `build`
//! takes `&self`, so a failed build leaves the builder untouched and ready
//! for another attempt with adjusted parameters.

use thiserror::Error;
use tracing::{debug, trace};

use super::box_selection::BoxSelection;
use super::types::{DataInput, UnsignedInput};
use super::unsigned::UnsignedTransaction;
use super::verification::TransactionError;
use crate::chain::token::{accumulate_tokens, TokenTotals};
use crate::chain::{
    Address, BoxValue, BoxValueError, ErgoBoxCandidate, NonMandatoryRegisters, Token,
    TokenAmount, TokenError, TokenId, Tokens,
};
use crate::script::ErgoTree;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Ways `build()` can fail. None of them leave partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxBuilderError {
    /// A value fell outside the box value range.
    #[error("invalid value: {0}")]
    InvalidValue(BoxValueError),

    /// Summing values or token amounts exceeded the representable range.
    #[error("overflow: {0}")]
    Overflow(String),

    /// Inputs cannot cover outputs plus fee (plus change, when tokens
    /// must be returned).
    #[error("not enough funds: need {needed}, have {available}")]
    NotEnoughFunds { needed: u64, available: u64 },

    /// Outputs spend more of a token than the inputs hold.
    #[error("not enough of token {token_id}: need {needed}, have {available}")]
    NotEnoughTokens {
        token_id: TokenId,
        needed: u128,
        available: u128,
    },

    #[error("box selection has no inputs")]
    EmptyInputs,

    #[error("token error: {0}")]
    Token(TokenError),

    #[error("invalid transaction: {0}")]
    Transaction(#[from] TransactionError),
}

impl From<BoxValueError> for TxBuilderError {
    fn from(err: BoxValueError) -> Self {
        match err {
            BoxValueError::Overflow { .. } => TxBuilderError::Overflow(err.to_string()),
            BoxValueError::InvalidValue { .. } => TxBuilderError::InvalidValue(err),
        }
    }
}

impl From<TokenError> for TxBuilderError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Overflow(_) => TxBuilderError::Overflow(err.to_string()),
            other => TxBuilderError::Token(other),
        }
    }
}

// ---------------------------------------------------------------------------
// TxBuilder
// ---------------------------------------------------------------------------

/// Assembles an unsigned transaction from a box selection.
#[derive(Clone, Debug)]
pub struct TxBuilder {
    box_selection: BoxSelection,
    data_inputs: Vec<DataInput>,
    output_candidates: Vec<ErgoBoxCandidate>,
    current_height: u32,
    fee_amount: BoxValue,
    change_address: Address,
    min_change_value: BoxValue,
}

impl TxBuilder {
    /// Creates a builder.
    ///
    /// `output_candidates` may be empty: a fee-only transaction is legal.
    /// `current_height` stamps the synthesized change and fee boxes.
    pub fn new(
        box_selection: BoxSelection,
        output_candidates: Vec<ErgoBoxCandidate>,
        current_height: u32,
        fee_amount: BoxValue,
        change_address: Address,
        min_change_value: BoxValue,
    ) -> Self {
        Self {
            box_selection,
            data_inputs: Vec::new(),
            output_candidates,
            current_height,
            fee_amount,
            change_address,
            min_change_value,
        }
    }

    /// Protocol-recommended default fee.
    pub fn suggested_tx_fee() -> BoxValue {
        BoxValue::suggested_tx_fee()
    }

    /// Replaces the data inputs wholesale.
    pub fn set_data_inputs(&mut self, data_inputs: Vec<DataInput>) {
        self.data_inputs = data_inputs;
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }

    pub fn box_selection(&self) -> &BoxSelection {
        &self.box_selection
    }

    pub fn output_candidates(&self) -> &[ErgoBoxCandidate] {
        &self.output_candidates
    }

    pub fn current_height(&self) -> u32 {
        self.current_height
    }

    pub fn fee_amount(&self) -> BoxValue {
        self.fee_amount
    }

    pub fn change_address(&self) -> &Address {
        &self.change_address
    }

    pub fn min_change_value(&self) -> BoxValue {
        self.min_change_value
    }

    /// Balances the transaction and emits it.
    ///
    /// Change at or above `min_change_value` goes to a change box; smaller
    /// change is added to the fee box. Leftover tokens always go to change,
    /// so they require change value of at least `min_change_value`.
    pub fn build(&self) -> Result<UnsignedTransaction, TxBuilderError> {
        let inputs = self.box_selection.boxes();
        let first_input = inputs.first().ok_or(TxBuilderError::EmptyInputs)?;

        // Selector change returns to the change address at the current height.
        let selector_change: Vec<ErgoBoxCandidate> = self
            .box_selection
            .change_boxes()
            .iter()
            .map(|c| ErgoBoxCandidate {
                value: c.value,
                ergo_tree: self.change_address.script(),
                tokens: c.tokens.clone(),
                additional_registers: c.additional_registers.clone(),
                creation_height: self.current_height,
            })
            .collect();

        // Values.
        let total_input = BoxValue::sum_of(inputs.iter().map(|b| b.value()))?;
        let total_output = BoxValue::sum_of(
            self.output_candidates
                .iter()
                .chain(&selector_change)
                .map(|c| c.value)
                .chain(std::iter::once(self.fee_amount)),
        )?;
        if total_input < total_output {
            return Err(TxBuilderError::NotEnoughFunds {
                needed: total_output,
                available: total_input,
            });
        }
        let change_value = total_input - total_output;

        // Tokens.
        let minted = TokenId::from_box_id(first_input.box_id());
        let mut token_order: Vec<TokenId> = Vec::new();
        let mut tokens_in = TokenTotals::new();
        for b in inputs {
            for t in b.tokens() {
                if !tokens_in.contains_key(&t.token_id) {
                    token_order.push(t.token_id);
                }
            }
            accumulate_tokens(&mut tokens_in, b.tokens())?;
        }

        let mut tokens_spent = TokenTotals::new();
        for c in self.output_candidates.iter().chain(&selector_change) {
            accumulate_tokens(
                &mut tokens_spent,
                c.tokens.iter().filter(|t| t.token_id != minted),
            )?;
        }
        for (token_id, needed) in &tokens_spent {
            let available = tokens_in.get(token_id).copied().unwrap_or(0);
            if *needed > available {
                return Err(TxBuilderError::NotEnoughTokens {
                    token_id: *token_id,
                    needed: *needed,
                    available,
                });
            }
        }

        let mut leftover = Vec::new();
        for token_id in token_order {
            let have = tokens_in.get(&token_id).copied().unwrap_or(0);
            let spent = tokens_spent.get(&token_id).copied().unwrap_or(0);
            let left = have - spent;
            if left > 0 {
                let amount = u64::try_from(left)
                    .ok()
                    .and_then(|a| TokenAmount::new(a).ok())
                    .ok_or_else(|| TxBuilderError::Overflow(format!("token {token_id} total {left}")))?;
                leftover.push(Token::new(token_id, amount));
            }
        }

        // Change and dust.
        let min_change = self.min_change_value.as_u64();
        let (change_box, dust) = if change_value >= min_change {
            let candidate = ErgoBoxCandidate {
                value: BoxValue::new(change_value)?,
                ergo_tree: self.change_address.script(),
                tokens: Tokens::from_vec(leftover)?,
                additional_registers: NonMandatoryRegisters::empty(),
                creation_height: self.current_height,
            };
            (Some(candidate), 0)
        } else if !leftover.is_empty() {
            return Err(TxBuilderError::NotEnoughFunds {
                needed: total_output.saturating_add(min_change),
                available: total_input,
            });
        } else {
            (None, change_value)
        };
        if dust > 0 {
            trace!(dust, "change below minimum, adding to fee");
        }

        let fee_value = match dust {
            0 => self.fee_amount,
            dust => self.fee_amount.checked_add(BoxValue::new(dust)?)?,
        };
        let fee_box = ErgoBoxCandidate {
            value: fee_value,
            ergo_tree: ErgoTree::miner_fee(),
            tokens: Tokens::new(),
            additional_registers: NonMandatoryRegisters::empty(),
            creation_height: self.current_height,
        };

        let mut outputs = self.output_candidates.clone();
        outputs.extend(selector_change);
        outputs.extend(change_box);
        outputs.push(fee_box);

        let unsigned_inputs = inputs
            .iter()
            .map(|b| UnsignedInput::from(b.box_id()))
            .collect();
        let tx = UnsignedTransaction::new(unsigned_inputs, self.data_inputs.clone(), outputs)?;

        debug!(
            tx_id = %tx.id(),
            inputs = tx.inputs().len(),
            outputs = tx.output_candidates().len(),
            total_input,
            change = change_value - dust,
            dust,
            "built unsigned transaction"
        );
        Ok(tx)
    }
}
