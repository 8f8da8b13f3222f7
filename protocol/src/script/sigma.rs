//! Reduced propositions.
//!
//! Evaluating a guard against a spending context leaves only what needs a
//! cryptographic proof: a tree of discrete-log statements joined by AND,
//! OR and k-of-n. Everything decidable from the context alone has already
//! been folded into `Trivial(true)` or `Trivial(false)`.

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

/// A proposition that still needs proving.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigmaBoolean {
    Trivial(bool),
    ProveDlog(PublicKey),
    Cand(Vec<SigmaBoolean>),
    Cor(Vec<SigmaBoolean>),
    Cthreshold { k: u8, children: Vec<SigmaBoolean> },
}

impl SigmaBoolean {
    /// Conjunction with constant folding.
    pub fn and(children: Vec<SigmaBoolean>) -> Self {
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            match child {
                SigmaBoolean::Trivial(true) => {}
                SigmaBoolean::Trivial(false) => return SigmaBoolean::Trivial(false),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => SigmaBoolean::Trivial(true),
            1 => kept.remove(0),
            _ => SigmaBoolean::Cand(kept),
        }
    }

    /// Disjunction with constant folding.
    pub fn or(children: Vec<SigmaBoolean>) -> Self {
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            match child {
                SigmaBoolean::Trivial(false) => {}
                SigmaBoolean::Trivial(true) => return SigmaBoolean::Trivial(true),
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => SigmaBoolean::Trivial(false),
            1 => kept.remove(0),
            _ => SigmaBoolean::Cor(kept),
        }
    }

    /// `k`-of-n with constant folding. Trivially true children count
    /// towards `k`; trivially false ones are dropped.
    pub fn threshold(k: usize, children: Vec<SigmaBoolean>) -> Self {
        let mut satisfied = 0usize;
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            match child {
                SigmaBoolean::Trivial(true) => satisfied += 1,
                SigmaBoolean::Trivial(false) => {}
                other => kept.push(other),
            }
        }
        if satisfied >= k {
            return SigmaBoolean::Trivial(true);
        }
        let needed = k - satisfied;
        if needed > kept.len() {
            SigmaBoolean::Trivial(false)
        } else if needed == kept.len() {
            SigmaBoolean::and(kept)
        } else if needed == 1 {
            SigmaBoolean::or(kept)
        } else {
            // needed < kept.len() <= u8::MAX children reach here from the AST.
            SigmaBoolean::Cthreshold {
                k: needed as u8,
                children: kept,
            }
        }
    }

    pub fn is_trivially_true(&self) -> bool {
        matches!(self, SigmaBoolean::Trivial(true))
    }

    pub fn is_trivially_false(&self) -> bool {
        matches!(self, SigmaBoolean::Trivial(false))
    }

    /// Every key mentioned in the proposition, in tree order.
    pub fn public_keys(&self) -> Vec<PublicKey> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys(&self, out: &mut Vec<PublicKey>) {
        match self {
            SigmaBoolean::Trivial(_) => {}
            SigmaBoolean::ProveDlog(pk) => out.push(*pk),
            SigmaBoolean::Cand(children)
            | SigmaBoolean::Cor(children)
            | SigmaBoolean::Cthreshold { children, .. } => {
                for child in children {
                    child.collect_keys(out);
                }
            }
        }
    }
}
