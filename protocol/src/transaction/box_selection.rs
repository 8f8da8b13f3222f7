//! Box selection: the hand-off between a selection strategy and the builder.
//!
//! The builder only depends on the shape of [`BoxSelection`]. Strategies
//! implement [`BoxSelector`]; [`SelectAll`] is the trivial one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::token::{accumulate_tokens, TokenTotals};
use crate::chain::{BoxValue, BoxValueError, ErgoBox, ErgoBoxCandidate, Token, TokenError, TokenId};

/// Errors raised by selection strategies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoxSelectorError {
    #[error("not enough coins: need {needed}, have {available}")]
    NotEnoughCoins { needed: u64, available: u64 },

    #[error("not enough of token {token_id}: need {needed}, have {available}")]
    NotEnoughTokens {
        token_id: TokenId,
        needed: u128,
        available: u128,
    },

    #[error(transparent)]
    Value(#[from] BoxValueError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Boxes chosen for spending plus any change the strategy already
/// decided to return.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSelection {
    boxes: Vec<ErgoBox>,
    change_boxes: Vec<ErgoBoxCandidate>,
}

impl BoxSelection {
    pub fn new(boxes: Vec<ErgoBox>, change_boxes: Vec<ErgoBoxCandidate>) -> Self {
        Self {
            boxes,
            change_boxes,
        }
    }

    /// Boxes to spend, in input order.
    pub fn boxes(&self) -> &[ErgoBox] {
        &self.boxes
    }

    /// Change suggested by the selector.
    pub fn change_boxes(&self) -> &[ErgoBoxCandidate] {
        &self.change_boxes
    }
}

/// A strategy picking inputs that cover a target.
pub trait BoxSelector {
    fn select(
        &self,
        inputs: Vec<ErgoBox>,
        target_balance: BoxValue,
        target_tokens: &[Token],
    ) -> Result<BoxSelection, BoxSelectorError>;
}

/// Spends every offered box, after checking they cover the target.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectAll;

impl BoxSelector for SelectAll {
    fn select(
        &self,
        inputs: Vec<ErgoBox>,
        target_balance: BoxValue,
        target_tokens: &[Token],
    ) -> Result<BoxSelection, BoxSelectorError> {
        let available = BoxValue::sum_of(inputs.iter().map(ErgoBox::value))?;
        if available < target_balance.as_u64() {
            return Err(BoxSelectorError::NotEnoughCoins {
                needed: target_balance.as_u64(),
                available,
            });
        }

        let mut have = TokenTotals::new();
        for b in &inputs {
            accumulate_tokens(&mut have, b.tokens())?;
        }
        let mut want = TokenTotals::new();
        accumulate_tokens(&mut want, target_tokens)?;
        for (token_id, needed) in want {
            let available = have.get(&token_id).copied().unwrap_or(0);
            if available < needed {
                return Err(BoxSelectorError::NotEnoughTokens {
                    token_id,
                    needed,
                    available,
                });
            }
        }

        Ok(BoxSelection::new(inputs, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ErgoBoxCandidateBuilder, TokenAmount};
    use crate::script::ErgoTree;
    use crate::transaction::TxId;

    fn input(value: u64, tokens: &[Token]) -> ErgoBox {
        let mut builder = ErgoBoxCandidateBuilder::new(BoxValue::new(value).unwrap(), ErgoTree::TrueProp, 1);
        for t in tokens {
            builder.add_token(*t);
        }
        ErgoBox::from_box_candidate(builder.build().unwrap(), TxId::zero(), 0)
    }

    fn token(seed: u8, amount: u64) -> Token {
        Token::new(TokenId::from_bytes([seed; 32]), TokenAmount::new(amount).unwrap())
    }

    #[test]
    fn select_all_returns_every_box() {
        let boxes = vec![input(3_000_000, &[]), input(2_000_000, &[])];
        let selection = SelectAll
            .select(boxes.clone(), BoxValue::new(4_000_000).unwrap(), &[])
            .unwrap();
        assert_eq!(selection.boxes(), boxes.as_slice());
        assert!(selection.change_boxes().is_empty());
    }

    #[test]
    fn select_all_checks_coins() {
        let err = SelectAll
            .select(vec![input(1_000_000, &[])], BoxValue::new(2_000_000).unwrap(), &[])
            .unwrap_err();
        assert_eq!(
            err,
            BoxSelectorError::NotEnoughCoins {
                needed: 2_000_000,
                available: 1_000_000
            }
        );
    }

    #[test]
    fn select_all_checks_tokens() {
        let boxes = vec![input(5_000_000, &[token(1, 10)])];
        assert!(SelectAll
            .select(boxes.clone(), BoxValue::SAFE_USER_MIN, &[token(1, 10)])
            .is_ok());
        assert!(matches!(
            SelectAll.select(boxes, BoxValue::SAFE_USER_MIN, &[token(1, 11)]),
            Err(BoxSelectorError::NotEnoughTokens { needed: 11, available: 10, .. })
        ));
    }
}
