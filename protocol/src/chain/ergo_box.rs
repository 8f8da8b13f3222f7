//! # Boxes
//!
//! Two shapes of the same thing:
//!
//! - [`ErgoBoxCandidate`]: an output-to-be. It has no identity yet because
//!   its id depends on the enclosing transaction.
//! - [`ErgoBox`]: a box that exists on chain (or will, once its transaction
//!   is accepted). Its [`BoxId`] is a content hash of the candidate bytes,
//!   the creating transaction id and the output index, computed once at
//!   construction. Fields are private so the id can never drift from the
//!   content.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::box_value::BoxValue;
use super::register::{NonMandatoryRegisterId, NonMandatoryRegisters, RegisterError, RegisterValue};
use super::token::{Token, TokenError, Tokens};
use crate::crypto::hash::{domain_separated_hash_multi, BOX_ID_DOMAIN};
use crate::crypto::Digest32;
use crate::script::ErgoTree;
use crate::transaction::TxId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised when assembling a box candidate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoxCandidateError {
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("register error: {0}")]
    Register(#[from] RegisterError),
}

// ---------------------------------------------------------------------------
// BoxId
// ---------------------------------------------------------------------------

/// Content-addressed box identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(Digest32);

impl BoxId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Digest32::from_bytes(bytes))
    }

    /// Underlying digest.
    pub fn digest(&self) -> Digest32 {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxId({:?})", self.0)
    }
}

impl FromStr for BoxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest32::from_hex(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// ErgoBoxCandidate
// ---------------------------------------------------------------------------

/// An output that does not belong to a transaction yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgoBoxCandidate {
    pub value: BoxValue,
    pub ergo_tree: ErgoTree,
    #[serde(rename = "assets", default)]
    pub tokens: Tokens,
    #[serde(default)]
    pub additional_registers: NonMandatoryRegisters,
    pub creation_height: u32,
}

impl ErgoBoxCandidate {
    /// Canonical bytes of the candidate: the box id preimage prefix and the
    /// per-output part of a transaction's bytes to sign.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tree = self.ergo_tree.to_bytes();
        let mut buf = Vec::with_capacity(64 + tree.len() + self.tokens.len() * 40);
        buf.extend_from_slice(&self.value.as_u64().to_le_bytes());
        buf.extend_from_slice(&(tree.len() as u32).to_le_bytes());
        buf.extend_from_slice(&tree);
        buf.extend_from_slice(&self.creation_height.to_le_bytes());

        // Token count fits a byte: the collection is capped at 255.
        buf.push(self.tokens.len() as u8);
        for token in &self.tokens {
            buf.extend_from_slice(token.token_id.as_bytes());
            buf.extend_from_slice(&token.amount.as_u64().to_le_bytes());
        }

        buf.push(self.additional_registers.len() as u8);
        for (id, value) in self.additional_registers.iter() {
            buf.push(id.index());
            buf.extend_from_slice(&(value.as_bytes().len() as u32).to_le_bytes());
            buf.extend_from_slice(value.as_bytes());
        }
        buf
    }
}

// ---------------------------------------------------------------------------
// ErgoBoxCandidateBuilder
// ---------------------------------------------------------------------------

/// Incremental builder for [`ErgoBoxCandidate`].
///
/// Setters never fail; token limits and register packing are checked once,
/// in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct ErgoBoxCandidateBuilder {
    value: BoxValue,
    ergo_tree: ErgoTree,
    creation_height: u32,
    tokens: Vec<Token>,
    registers: BTreeMap<NonMandatoryRegisterId, RegisterValue>,
}

impl ErgoBoxCandidateBuilder {
    pub fn new(value: BoxValue, ergo_tree: ErgoTree, creation_height: u32) -> Self {
        Self {
            value,
            ergo_tree,
            creation_height,
            tokens: Vec::new(),
            registers: BTreeMap::new(),
        }
    }

    pub fn value(&self) -> BoxValue {
        self.value
    }

    pub fn set_value(&mut self, value: BoxValue) -> &mut Self {
        self.value = value;
        self
    }

    pub fn add_token(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Adds a freshly minted token and records its metadata in R4..=R6
    /// (name, description, number of decimals as a decimal string).
    ///
    /// The token id must be the id of the first input of the transaction
    /// that will contain this box.
    pub fn mint_token(
        &mut self,
        token: Token,
        name: &str,
        description: &str,
        decimals: usize,
    ) -> &mut Self {
        self.tokens.push(token);
        self.registers.insert(
            NonMandatoryRegisterId::R4,
            RegisterValue::new(name.as_bytes().to_vec()),
        );
        self.registers.insert(
            NonMandatoryRegisterId::R5,
            RegisterValue::new(description.as_bytes().to_vec()),
        );
        self.registers.insert(
            NonMandatoryRegisterId::R6,
            RegisterValue::new(decimals.to_string().into_bytes()),
        );
        self
    }

    pub fn set_register_value(
        &mut self,
        id: NonMandatoryRegisterId,
        value: RegisterValue,
    ) -> &mut Self {
        self.registers.insert(id, value);
        self
    }

    pub fn register_value(&self, id: NonMandatoryRegisterId) -> Option<&RegisterValue> {
        self.registers.get(&id)
    }

    pub fn build(&self) -> Result<ErgoBoxCandidate, BoxCandidateError> {
        let tokens = Tokens::from_vec(self.tokens.clone())?;
        let additional_registers = NonMandatoryRegisters::new(self.registers.clone())?;
        Ok(ErgoBoxCandidate {
            value: self.value,
            ergo_tree: self.ergo_tree.clone(),
            tokens,
            additional_registers,
            creation_height: self.creation_height,
        })
    }
}

// ---------------------------------------------------------------------------
// ErgoBox
// ---------------------------------------------------------------------------

/// A box with identity: the output `index` of transaction `transaction_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErgoBox {
    box_id: BoxId,
    value: BoxValue,
    ergo_tree: ErgoTree,
    tokens: Tokens,
    additional_registers: NonMandatoryRegisters,
    creation_height: u32,
    transaction_id: TxId,
    index: u16,
}

impl ErgoBox {
    pub fn new(
        value: BoxValue,
        ergo_tree: ErgoTree,
        tokens: Tokens,
        additional_registers: NonMandatoryRegisters,
        creation_height: u32,
        transaction_id: TxId,
        index: u16,
    ) -> Self {
        let candidate = ErgoBoxCandidate {
            value,
            ergo_tree,
            tokens,
            additional_registers,
            creation_height,
        };
        Self::from_box_candidate(candidate, transaction_id, index)
    }

    /// Gives `candidate` its identity as output `index` of `transaction_id`.
    pub fn from_box_candidate(candidate: ErgoBoxCandidate, transaction_id: TxId, index: u16) -> Self {
        let box_id = compute_box_id(&candidate, &transaction_id, index);
        let ErgoBoxCandidate {
            value,
            ergo_tree,
            tokens,
            additional_registers,
            creation_height,
        } = candidate;
        Self {
            box_id,
            value,
            ergo_tree,
            tokens,
            additional_registers,
            creation_height,
            transaction_id,
            index,
        }
    }

    pub fn box_id(&self) -> BoxId {
        self.box_id
    }

    pub fn value(&self) -> BoxValue {
        self.value
    }

    pub fn ergo_tree(&self) -> &ErgoTree {
        &self.ergo_tree
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    pub fn additional_registers(&self) -> &NonMandatoryRegisters {
        &self.additional_registers
    }

    pub fn creation_height(&self) -> u32 {
        self.creation_height
    }

    pub fn transaction_id(&self) -> TxId {
        self.transaction_id
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    /// The box without its identity.
    pub fn to_candidate(&self) -> ErgoBoxCandidate {
        ErgoBoxCandidate {
            value: self.value,
            ergo_tree: self.ergo_tree.clone(),
            tokens: self.tokens.clone(),
            additional_registers: self.additional_registers.clone(),
            creation_height: self.creation_height,
        }
    }
}

fn compute_box_id(candidate: &ErgoBoxCandidate, transaction_id: &TxId, index: u16) -> BoxId {
    let bytes = candidate.to_bytes();
    BoxId::from_bytes(domain_separated_hash_multi(
        BOX_ID_DOMAIN,
        &[&bytes, transaction_id.as_bytes(), &index.to_le_bytes()],
    ))
}

/// Wire shape of a box. The id is carried for consumers but recomputed on
/// the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErgoBoxJson {
    box_id: BoxId,
    value: BoxValue,
    ergo_tree: ErgoTree,
    #[serde(default)]
    assets: Tokens,
    creation_height: u32,
    #[serde(default)]
    additional_registers: NonMandatoryRegisters,
    transaction_id: TxId,
    index: u16,
}

impl Serialize for ErgoBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErgoBoxJson {
            box_id: self.box_id,
            value: self.value,
            ergo_tree: self.ergo_tree.clone(),
            assets: self.tokens.clone(),
            creation_height: self.creation_height,
            additional_registers: self.additional_registers.clone(),
            transaction_id: self.transaction_id,
            index: self.index,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ErgoBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = ErgoBoxJson::deserialize(deserializer)?;
        let b = ErgoBox::new(
            raw.value,
            raw.ergo_tree,
            raw.assets,
            raw.additional_registers,
            raw.creation_height,
            raw.transaction_id,
            raw.index,
        );
        if b.box_id != raw.box_id {
            return Err(serde::de::Error::custom(format!(
                "box id mismatch: declared {}, computed {}",
                raw.box_id, b.box_id
            )));
        }
        Ok(b)
    }
}
