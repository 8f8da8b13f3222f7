//! Unsigned transactions.
//!
//! The output of the builder and the input of the signer. Its id is fixed
//! at construction: proofs are not part of the bytes to sign, so signing
//! never changes it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

use super::types::{DataInput, TxId, UnsignedInput};
use super::verification::TransactionError;
use crate::chain::{BoxId, ErgoBox, ErgoBoxCandidate};
use crate::config::{MAX_TX_DATA_INPUTS, MAX_TX_INPUTS, MAX_TX_OUTPUTS};
use crate::crypto::hash::{domain_separated_hash, TX_ID_DOMAIN};

/// A balanced transaction awaiting proofs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    id: TxId,
    inputs: Vec<UnsignedInput>,
    data_inputs: Vec<DataInput>,
    output_candidates: Vec<ErgoBoxCandidate>,
}

impl UnsignedTransaction {
    pub fn new(
        inputs: Vec<UnsignedInput>,
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

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn inputs(&self) -> &[UnsignedInput] {
        &self.inputs
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }

    pub fn output_candidates(&self) -> &[ErgoBoxCandidate] {
        &self.output_candidates
    }

    /// Output candidates with their final identities.
    pub fn outputs(&self) -> Vec<ErgoBox> {
        materialize_outputs(self.id, &self.output_candidates)
    }

    /// The message every input proof signs.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        let input_ids: Vec<BoxId> = self.inputs.iter().map(|i| i.box_id).collect();
        bytes_to_sign(&input_ids, &self.data_inputs, &self.output_candidates)
    }
}

/// Checks input/output counts and duplicate inputs.
pub(crate) fn validate_shape(
    input_ids: &[BoxId],
    data_inputs: &[DataInput],
    outputs: &[ErgoBoxCandidate],
) -> Result<(), TransactionError> {
    if input_ids.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if input_ids.len() > MAX_TX_INPUTS {
        return Err(TransactionError::TooManyInputs(input_ids.len()));
    }
    if data_inputs.len() > MAX_TX_DATA_INPUTS {
        return Err(TransactionError::TooManyDataInputs(data_inputs.len()));
    }
    if outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }
    if outputs.len() > MAX_TX_OUTPUTS {
        return Err(TransactionError::TooManyOutputs(outputs.len()));
    }
    let mut seen = HashSet::with_capacity(input_ids.len());
    for id in input_ids {
        if !seen.insert(*id) {
            return Err(TransactionError::DuplicateInput(*id));
        }
    }
    Ok(())
}

/// Canonical message: input ids, data input ids, then output candidates,
/// each section prefixed with its count.
pub(crate) fn bytes_to_sign(
    input_ids: &[BoxId],
    data_inputs: &[DataInput],
    outputs: &[ErgoBoxCandidate],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + 32 * (input_ids.len() + data_inputs.len()));

    buf.extend_from_slice(&(input_ids.len() as u32).to_le_bytes());
    for id in input_ids {
        buf.extend_from_slice(id.as_bytes());
    }

    buf.extend_from_slice(&(data_inputs.len() as u32).to_le_bytes());
    for d in data_inputs {
        buf.extend_from_slice(d.box_id.as_bytes());
    }

    buf.extend_from_slice(&(outputs.len() as u32).to_le_bytes());
    for out in outputs {
        let bytes = out.to_bytes();
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(&bytes);
    }
    buf
}

pub(crate) fn compute_tx_id(
    input_ids: &[BoxId],
    data_inputs: &[DataInput],
    outputs: &[ErgoBoxCandidate],
) -> TxId {
    TxId::from_bytes(domain_separated_hash(
        TX_ID_DOMAIN,
        &bytes_to_sign(input_ids, data_inputs, outputs),
    ))
}

pub(crate) fn materialize_outputs(tx_id: TxId, candidates: &[ErgoBoxCandidate]) -> Vec<ErgoBox> {
    // Output count is capped at u16::MAX, so every index fits.
    candidates
        .iter()
        .enumerate()
        .map(|(index, c)| ErgoBox::from_box_candidate(c.clone(), tx_id, index as u16))
        .collect()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnsignedTransactionJson {
    id: TxId,
    inputs: Vec<UnsignedInput>,
    data_inputs: Vec<DataInput>,
    outputs: Vec<ErgoBoxCandidate>,
}

impl Serialize for UnsignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        UnsignedTransactionJson {
            id: self.id,
            inputs: self.inputs.clone(),
            data_inputs: self.data_inputs.clone(),
            outputs: self.output_candidates.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UnsignedTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = UnsignedTransactionJson::deserialize(deserializer)?;
        let tx = UnsignedTransaction::new(raw.inputs, raw.data_inputs, raw.outputs)
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
