//! Chain state snapshot used during signing and verification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::header::{BlockHeader, BlockId, PreHeader};
use crate::config::{
    DEFAULT_BLOCK_VERSION, DEFAULT_MAX_BLOCK_COST, DEFAULT_MAX_BLOCK_SIZE,
    DEFAULT_MIN_VALUE_PER_BYTE, DEFAULT_STORAGE_FEE_FACTOR, MAX_HEADERS_IN_CONTEXT,
};
use crate::crypto::{blake3_hash, SecretKey};

/// Errors raised when assembling a state context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("too many headers: {0} (max 10)")]
    TooManyHeaders(usize),

    #[error("headers must be ordered newest first: height {next} follows {prev}")]
    HeadersNotOrdered { prev: u32, next: u32 },

    #[error("pre-header height {pre_header} must be above newest header height {newest}")]
    PreHeaderNotAfterHeaders { pre_header: u32, newest: u32 },
}

/// Consensus parameters visible to scripts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub storage_fee_factor: u32,
    pub min_value_per_byte: u32,
    pub max_block_size: u32,
    pub max_block_cost: u32,
    pub block_version: u8,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            storage_fee_factor: DEFAULT_STORAGE_FEE_FACTOR,
            min_value_per_byte: DEFAULT_MIN_VALUE_PER_BYTE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            max_block_cost: DEFAULT_MAX_BLOCK_COST,
            block_version: DEFAULT_BLOCK_VERSION,
        }
    }
}

/// Read-only snapshot of the chain tip.
///
/// `headers` holds up to the last ten block headers, newest first. The
/// pre-header describes the block the transaction is expected to land in;
/// its height is what scripts see as `HEIGHT`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgoStateContext {
    pre_header: PreHeader,
    headers: Vec<BlockHeader>,
    parameters: Parameters,
}

impl ErgoStateContext {
    pub fn new(
        pre_header: PreHeader,
        headers: Vec<BlockHeader>,
        parameters: Parameters,
    ) -> Result<Self, ContextError> {
        if headers.len() > MAX_HEADERS_IN_CONTEXT {
            return Err(ContextError::TooManyHeaders(headers.len()));
        }
        for pair in headers.windows(2) {
            if pair[1].height >= pair[0].height {
                return Err(ContextError::HeadersNotOrdered {
                    prev: pair[0].height,
                    next: pair[1].height,
                });
            }
        }
        if let Some(newest) = headers.first() {
            if newest.height >= pre_header.height {
                return Err(ContextError::PreHeaderNotAfterHeaders {
                    pre_header: pre_header.height,
                    newest: newest.height,
                });
            }
        }
        Ok(Self {
            pre_header,
            headers,
            parameters,
        })
    }

    /// A self-consistent context for tests and examples: ten linked headers
    /// below a pre-header at height 1000.
    pub fn dummy() -> Self {
        const TIP: u32 = 1000;
        const BLOCK_INTERVAL_MS: u64 = 120_000;
        const GENESIS_MS: u64 = 1_600_000_000_000;

        let miner_pk = SecretKey::from_bytes(&[0x4D; 32]).public_key();
        let id_at = |height: u32| BlockId::from_bytes(blake3_hash(&height.to_le_bytes()));
        let time_at = |height: u32| GENESIS_MS + height as u64 * BLOCK_INTERVAL_MS;

        let headers = (1..=MAX_HEADERS_IN_CONTEXT as u32)
            .map(|back| {
                let height = TIP - back;
                BlockHeader {
                    id: id_at(height),
                    parent_id: id_at(height - 1),
                    height,
                    timestamp: time_at(height),
                    n_bits: 117_811_961,
                    miner_pk,
                }
            })
            .collect();

        Self {
            pre_header: PreHeader {
                parent_id: id_at(TIP - 1),
                height: TIP,
                timestamp: time_at(TIP),
                n_bits: 117_811_961,
                miner_pk,
            },
            headers,
            parameters: Parameters::default(),
        }
    }

    /// Height of the block being assembled.
    pub fn height(&self) -> u32 {
        self.pre_header.height
    }

    pub fn pre_header(&self) -> &PreHeader {
        &self.pre_header
    }

    /// Last headers, newest first.
    pub fn headers(&self) -> &[BlockHeader] {
        &self.headers
    }

    /// Timestamp of the newest header, if the window is not empty.
    pub fn last_block_timestamp(&self) -> Option<u64> {
        self.headers.first().map(|h| h.timestamp)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(height: u32) -> BlockHeader {
        BlockHeader {
            id: BlockId::from_bytes([height as u8; 32]),
            parent_id: BlockId::default(),
            height,
            timestamp: height as u64 * 1000,
            n_bits: 0,
            miner_pk: SecretKey::from_bytes(&[1u8; 32]).public_key(),
        }
    }

    fn pre_header(height: u32) -> PreHeader {
        PreHeader::from(&header(height))
    }

    #[test]
    fn dummy_is_valid() {
        let ctx = ErgoStateContext::dummy();
        let rebuilt = ErgoStateContext::new(
            ctx.pre_header().clone(),
            ctx.headers().to_vec(),
            ctx.parameters().clone(),
        );
        assert_eq!(rebuilt, Ok(ctx.clone()));
        assert_eq!(ctx.height(), 1000);
        assert_eq!(ctx.headers().len(), 10);
        assert_eq!(ctx.headers()[0].height, 999);
        assert_eq!(ctx.headers()[0].parent_id, ctx.headers()[1].id);
    }

    #[test]
    fn rejects_more_than_ten_headers() {
        let headers: Vec<_> = (0..11).rev().map(header).collect();
        assert_eq!(
            ErgoStateContext::new(pre_header(20), headers, Parameters::default()),
            Err(ContextError::TooManyHeaders(11))
        );
    }

    #[test]
    fn rejects_unordered_headers() {
        let headers = vec![header(5), header(6)];
        assert_eq!(
            ErgoStateContext::new(pre_header(20), headers, Parameters::default()),
            Err(ContextError::HeadersNotOrdered { prev: 5, next: 6 })
        );
    }

    #[test]
    fn rejects_stale_pre_header() {
        let headers = vec![header(7), header(6)];
        assert_eq!(
            ErgoStateContext::new(pre_header(7), headers, Parameters::default()),
            Err(ContextError::PreHeaderNotAfterHeaders {
                pre_header: 7,
                newest: 7
            })
        );
    }

    #[test]
    fn empty_header_window_is_allowed() {
        let ctx = ErgoStateContext::new(pre_header(1), Vec::new(), Parameters::default()).unwrap();
        assert_eq!(ctx.last_block_timestamp(), None);
    }
}
