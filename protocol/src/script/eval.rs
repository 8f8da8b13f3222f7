//! Guard evaluation.
//!
//! [`ScriptEvaluator`] is the seam between the signer and whatever decides
//! what a guard means. It reduces an [`ErgoTree`] in a spending context to
//! a [`SigmaBoolean`]; the prover takes it from there.

use thiserror::Error;

use super::ergo_tree::ErgoTree;
use super::sigma::SigmaBoolean;
use crate::chain::{ErgoBox, ErgoStateContext};
use crate::config::MAX_SCRIPT_DEPTH;

/// Errors that stop reduction altogether (as opposed to a guard that
/// simply reduces to false).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("script nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("threshold node has {children} children, more than 255")]
    TooManyChildren { children: usize },
}

/// Everything a guard may observe while its box is being spent.
#[derive(Clone, Copy, Debug)]
pub struct EvalContext<'a> {
    pub state_context: &'a ErgoStateContext,
    /// The box whose guard is being reduced.
    pub self_box: &'a ErgoBox,
    /// All boxes spent by the transaction, in input order.
    pub inputs: &'a [ErgoBox],
    /// Read-only data boxes, in data input order.
    pub data_boxes: &'a [ErgoBox],
}

impl<'a> EvalContext<'a> {
    pub fn height(&self) -> u32 {
        self.state_context.height()
    }
}

/// Reduces a guard script to a proposition.
pub trait ScriptEvaluator {
    fn reduce(&self, tree: &ErgoTree, ctx: &EvalContext<'_>) -> Result<SigmaBoolean, EvalError>;
}

/// Default evaluator for the [`ErgoTree`] node set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    fn reduce_at(
        &self,
        tree: &ErgoTree,
        ctx: &EvalContext<'_>,
        depth: usize,
    ) -> Result<SigmaBoolean, EvalError> {
        if depth > MAX_SCRIPT_DEPTH {
            return Err(EvalError::TooDeep(MAX_SCRIPT_DEPTH));
        }
        let reduce_all = |children: &[ErgoTree]| -> Result<Vec<SigmaBoolean>, EvalError> {
            children
                .iter()
                .map(|c| self.reduce_at(c, ctx, depth + 1))
                .collect()
        };

        let reduced = match tree {
            ErgoTree::TrueProp => SigmaBoolean::Trivial(true),
            ErgoTree::FalseProp => SigmaBoolean::Trivial(false),
            ErgoTree::ProveDlog(pk) => SigmaBoolean::ProveDlog(*pk),
            ErgoTree::HeightGreaterThan(h) => SigmaBoolean::Trivial(ctx.height() > *h),
            ErgoTree::LastBlockTimeAfter(t) => SigmaBoolean::Trivial(
                ctx.state_context
                    .last_block_timestamp()
                    .is_some_and(|ts| ts > *t),
            ),
            ErgoTree::DataInputPresent(id) => {
                SigmaBoolean::Trivial(ctx.data_boxes.iter().any(|b| b.box_id() == *id))
            }
            ErgoTree::And(children) => SigmaBoolean::and(reduce_all(children)?),
            ErgoTree::Or(children) => SigmaBoolean::or(reduce_all(children)?),
            ErgoTree::AtLeast { bound, children } => {
                if children.len() > u8::MAX as usize {
                    return Err(EvalError::TooManyChildren {
                        children: children.len(),
                    });
                }
                SigmaBoolean::threshold(*bound as usize, reduce_all(children)?)
            }
            ErgoTree::MinerFee => SigmaBoolean::ProveDlog(ctx.state_context.pre_header().miner_pk),
        };
        Ok(reduced)
    }
}

impl ScriptEvaluator for Interpreter {
    fn reduce(&self, tree: &ErgoTree, ctx: &EvalContext<'_>) -> Result<SigmaBoolean, EvalError> {
        self.reduce_at(tree, ctx, 0)
    }
}

/// Evaluator that accepts every guard without a proof.
///
/// For builder-focused tests and dry runs only.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysProvable;

impl ScriptEvaluator for AlwaysProvable {
    fn reduce(&self, _tree: &ErgoTree, _ctx: &EvalContext<'_>) -> Result<SigmaBoolean, EvalError> {
        Ok(SigmaBoolean::Trivial(true))
    }
}
