//! # Scripts
//!
//! Guard scripts ([`ErgoTree`]), their reduced form ([`SigmaBoolean`]) and
//! the evaluator seam between them.

pub mod ergo_tree;
pub mod eval;
pub mod sigma;

pub use ergo_tree::ErgoTree;
pub use eval::{AlwaysProvable, EvalContext, EvalError, Interpreter, ScriptEvaluator};
pub use sigma::SigmaBoolean;
