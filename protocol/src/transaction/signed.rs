//! Signed transactions: the terminal artifact of signing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::{DataInput, Input, ProverResult, TxId};
use super::unsigned::{
    bytes_to_sign, compute_tx_id, materialize_outputs, validate_shape, UnsignedTransaction,
};
use super::verification::TransactionError;
use crate::chain::{BoxId, ErgoBox, ErgoBoxCandidate};

/// A transaction whose every input carries a spending proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    id: TxId,
    inputs: Vec<Input>,
    data_inputs: Vec<DataInput>,
    output_candidates: Vec<ErgoBoxCandidate>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<Input>,
        data_inputs: Vec<DataInput>,
        output_candidates: Vec<ErgoBoxCandidate>,
    ) -> Result<Self, TransactionError> {
        let input_ids: Vec<BoxId> = inputs.iter().map(|i| i.box_id).collect();
        validate_shape(&input_ids, &data_inputs, &output_candidates)?;
        let id = compute_tx_id(&input_ids, &data_inputs, &output_candidates);
        Ok(Self {
            id,
            inputs,
            data_inputs,
            output_candidates,
        })
    }

    /// Attaches one proof per input, in input order.
    pub fn from_unsigned_tx(
        unsigned: UnsignedTransaction,
        proofs: Vec<ProverResult>,
    ) -> Result<Self, TransactionError> {
        if proofs.len() != unsigned.inputs().len() {
            return Err(TransactionError::ProofCountMismatch {
                inputs: unsigned.inputs().len(),
                proofs: proofs.len(),
            });
        }
        let inputs = unsigned
            .inputs()
            .iter()
            .zip(proofs)
            .map(|(input, proof)| Input::new(input.box_id, proof))
            .collect();
        Ok(Self {
            id: unsigned.id(),
            inputs,
            data_inputs: unsigned.data_inputs().to_vec(),
            output_candidates: unsigned.output_candidates().to_vec(),
        })
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }

    pub fn output_candidates(&self) -> &[ErgoBoxCandidate] {
        &self.output_candidates
    }

    pub fn outputs(&self) -> Vec<ErgoBox> {
        materialize_outputs(self.id, &self.output_candidates)
    }

    /// The message the input proofs sign.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        let input_ids: Vec<BoxId> = self.inputs.iter().map(|i| i.box_id).collect();
        bytes_to_sign(&input_ids, &self.data_inputs, &self.output_candidates)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionJson {
    id: TxId,
    inputs: Vec<Input>,
    data_inputs: Vec<DataInput>,
    outputs: Vec<ErgoBox>,
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TransactionJson {
            id: self.id,
            inputs: self.inputs.clone(),
            data_inputs: self.data_inputs.clone(),
            outputs: self.outputs(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = TransactionJson::deserialize(deserializer)?;
        let candidates = raw.outputs.iter().map(ErgoBox::to_candidate).collect();
        let tx = Transaction::new(raw.inputs, raw.data_inputs, candidates)
            .map_err(serde::de::Error::custom)?;
        if tx.id != raw.id {
            return Err(serde::de::Error::custom(format!(
                "transaction id mismatch: declared {}, computed {}",
                raw.id, tx.id
            )));
        }
        Ok(tx)
    }
}
