//! Block headers as seen by script evaluation.
//!
//! Only the fields guard scripts can observe are modelled. Headers are
//! supplied fully materialised by the caller; nothing here validates proof
//! of work or links headers to a real chain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{Digest32, PublicKey};

/// Header identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Digest32);

impl BlockId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Digest32::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({:?})", self.0)
    }
}

/// A past block header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub id: BlockId,
    pub parent_id: BlockId,
    pub height: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub n_bits: u64,
    pub miner_pk: PublicKey,
}

/// The header of the block being assembled, minus what is only known once
/// it is mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreHeader {
    pub parent_id: BlockId,
    pub height: u32,
    pub timestamp: u64,
    pub n_bits: u64,
    pub miner_pk: PublicKey,
}

impl PreHeader {
    /// Pre-header of the block that would follow `parent`.
    pub fn following(parent: &BlockHeader, timestamp: u64, miner_pk: PublicKey) -> Self {
        Self {
            parent_id: parent.id,
            height: parent.height.saturating_add(1),
            timestamp,
            n_bits: parent.n_bits,
            miner_pk,
        }
    }
}

impl From<&BlockHeader> for PreHeader {
    fn from(header: &BlockHeader) -> Self {
        Self {
            parent_id: header.parent_id,
            height: header.height,
            timestamp: header.timestamp,
            n_bits: header.n_bits,
            miner_pk: header.miner_pk,
        }
    }
}
