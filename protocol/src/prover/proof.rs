//! Proof trees.
//!
//! A [`Proof`] mirrors the shape of the [`SigmaBoolean`](crate::script::SigmaBoolean)
//! it proves. OR and threshold nodes record which branches were proven so
//! a verifier does not have to search.

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proof {
    /// Proof of a trivially true proposition.
    Empty,
    Dlog {
        public_key: PublicKey,
        signature: Signature,
    },
    /// One proof per child, in order.
    And(Vec<Proof>),
    /// Proof of the child at `index`.
    Or { index: u32, proof: Box<Proof> },
    /// `(child index, proof)` pairs in ascending index order.
    Threshold(Vec<(u32, Proof)>),
}

impl Proof {
    pub fn is_empty(&self) -> bool {
        matches!(self, Proof::Empty)
    }

    /// Number of signatures in the tree.
    pub fn signature_count(&self) -> usize {
        match self {
            Proof::Empty => 0,
            Proof::Dlog { .. } => 1,
            Proof::And(children) => children.iter().map(Proof::signature_count).sum(),
            Proof::Or { proof, .. } => proof.signature_count(),
            Proof::Threshold(entries) => entries.iter().map(|(_, p)| p.signature_count()).sum(),
        }
    }
}
