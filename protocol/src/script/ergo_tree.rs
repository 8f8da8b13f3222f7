//! Guard scripts.
//!
//! An [`ErgoTree`] is the spending condition attached to a box. It is a
//! tagged-variant AST: evaluation is a `match`, never dynamic dispatch on
//! node types, which keeps the evaluator swappable and the tree trivially
//! comparable and hashable.
//!
//! The node set covers what wallets build day to day: key locks, height
//! and time locks, data-input checks, boolean combinators, threshold
//! signatures and the miner fee contract. A full ErgoScript interpreter is
//! out of scope; richer scripts plug in through
//! [`crate::script::eval::ScriptEvaluator`].

use serde::{Deserialize, Serialize};

use crate::chain::ergo_box::BoxId;
use crate::crypto::PublicKey;

// Canonical opcodes. These bytes feed box ids, so they must never change.
const OP_TRUE: u8 = 0x01;
const OP_FALSE: u8 = 0x02;
const OP_PROVE_DLOG: u8 = 0x10;
const OP_HEIGHT_GT: u8 = 0x20;
const OP_LAST_BLOCK_TIME_AFTER: u8 = 0x21;
const OP_DATA_INPUT_PRESENT: u8 = 0x22;
const OP_AND: u8 = 0x30;
const OP_OR: u8 = 0x31;
const OP_AT_LEAST: u8 = 0x32;
const OP_MINER_FEE: u8 = 0x40;

/// Spending condition of a box.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErgoTree {
    /// Anyone can spend.
    TrueProp,
    /// Nobody can spend.
    FalseProp,
    /// Spendable by whoever proves knowledge of the secret behind the key.
    ProveDlog(PublicKey),
    /// `HEIGHT > h`, where `HEIGHT` is the height of the block being built.
    HeightGreaterThan(u32),
    /// Timestamp of the last block header is strictly after `t` (ms).
    LastBlockTimeAfter(u64),
    /// The transaction references the given box as a data input.
    DataInputPresent(BoxId),
    /// All children must hold.
    And(Vec<ErgoTree>),
    /// At least one child must hold.
    Or(Vec<ErgoTree>),
    /// At least `bound` of the children must hold.
    AtLeast { bound: u8, children: Vec<ErgoTree> },
    /// Miner fee contract: claimable by the miner of the including block.
    MinerFee,
}

impl ErgoTree {
    /// Pay-to-public-key guard.
    pub fn p2pk(pk: PublicKey) -> Self {
        ErgoTree::ProveDlog(pk)
    }

    /// The protocol-fixed guard of fee boxes.
    pub fn miner_fee() -> Self {
        ErgoTree::MinerFee
    }

    /// Canonical byte encoding, used as hashing input for box ids.
    ///
    /// This is not a wire codec; it only needs to be injective.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(40);
        self.write_bytes(&mut buf);
        buf
    }

    fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            ErgoTree::TrueProp => buf.push(OP_TRUE),
            ErgoTree::FalseProp => buf.push(OP_FALSE),
            ErgoTree::ProveDlog(pk) => {
                buf.push(OP_PROVE_DLOG);
                buf.extend_from_slice(pk.as_bytes());
            }
            ErgoTree::HeightGreaterThan(h) => {
                buf.push(OP_HEIGHT_GT);
                buf.extend_from_slice(&h.to_le_bytes());
            }
            ErgoTree::LastBlockTimeAfter(t) => {
                buf.push(OP_LAST_BLOCK_TIME_AFTER);
                buf.extend_from_slice(&t.to_le_bytes());
            }
            ErgoTree::DataInputPresent(id) => {
                buf.push(OP_DATA_INPUT_PRESENT);
                buf.extend_from_slice(id.as_bytes());
            }
            ErgoTree::And(children) => {
                buf.push(OP_AND);
                Self::write_children(children, buf);
            }
            ErgoTree::Or(children) => {
                buf.push(OP_OR);
                Self::write_children(children, buf);
            }
            ErgoTree::AtLeast { bound, children } => {
                buf.push(OP_AT_LEAST);
                buf.push(*bound);
                Self::write_children(children, buf);
            }
            ErgoTree::MinerFee => buf.push(OP_MINER_FEE),
        }
    }

    fn write_children(children: &[ErgoTree], buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(children.len() as u32).to_le_bytes());
        for child in children {
            child.write_bytes(buf);
        }
    }
}
