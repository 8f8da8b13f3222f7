//! # Chain data model
//!
//! Values, tokens, registers, boxes, addresses and the state snapshot
//! scripts are evaluated against. Everything here is an owned value type;
//! nothing holds a handle into shared state.

pub mod address;
pub mod box_value;
pub mod context;
pub mod ergo_box;
pub mod header;
pub mod register;
pub mod token;

pub use address::{Address, AddressError, Contract, NetworkPrefix};
pub use box_value::{BoxValue, BoxValueError};
pub use context::{ContextError, ErgoStateContext, Parameters};
pub use ergo_box::{BoxCandidateError, BoxId, ErgoBox, ErgoBoxCandidate, ErgoBoxCandidateBuilder};
pub use header::{BlockHeader, BlockId, PreHeader};
pub use register::{NonMandatoryRegisterId, NonMandatoryRegisters, RegisterError, RegisterValue};
pub use token::{Token, TokenAmount, TokenError, TokenId, Tokens};
