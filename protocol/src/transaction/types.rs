//! Identifier and input types shared by unsigned and signed transactions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chain::BoxId;
use crate::crypto::Digest32;
use crate::prover::Proof;

// ---------------------------------------------------------------------------
// TxId
// ---------------------------------------------------------------------------

/// Transaction identifier: BLAKE3 of the transaction's bytes to sign.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(Digest32);

impl TxId {
    /// All-zero id. Used for boxes fabricated outside any transaction,
    /// e.g. in tests.
    pub fn zero() -> Self {
        Self(Digest32::ZERO)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Digest32::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({:?})", self.0)
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest32::from_hex(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Reference to a box being spent, before signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedInput {
    pub box_id: BoxId,
}

impl From<BoxId> for UnsignedInput {
    fn from(box_id: BoxId) -> Self {
        Self { box_id }
    }
}

/// Reference to a box read, but not spent, by the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInput {
    pub box_id: BoxId,
}

impl From<BoxId> for DataInput {
    fn from(box_id: BoxId) -> Self {
        Self { box_id }
    }
}

/// Spending proof attached to a signed input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverResult {
    pub proof: Proof,
}

impl From<Proof> for ProverResult {
    fn from(proof: Proof) -> Self {
        Self { proof }
    }
}

/// Signed input: the spent box id and the proof for its guard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub box_id: BoxId,
    pub spending_proof: ProverResult,
}

impl Input {
    pub fn new(box_id: BoxId, spending_proof: ProverResult) -> Self {
        Self {
            box_id,
            spending_proof,
        }
    }

    /// Drops the proof.
    pub fn to_unsigned(&self) -> UnsignedInput {
        UnsignedInput {
            box_id: self.box_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_id_hex_roundtrip() {
        let id = TxId::from_bytes([0xAB; 32]);
        let parsed: TxId = id.to_hex().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(TxId::zero().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn input_json_uses_camel_case() {
        let input = Input::new(BoxId::from_bytes([1u8; 32]), Proof::Empty.into());
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["boxId"], "01".repeat(32));
        assert!(json.get("spendingProof").is_some());
        assert_eq!(input.to_unsigned().box_id, input.box_id);
    }
}
