//! # Hashing Utilities
//!
//! Every identifier in the protocol is a 32-byte BLAKE3 digest: box ids,
//! transaction ids, address checksums. Domain separation keeps the
//! different preimage kinds from ever colliding with each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Domain tag for box id preimages.
pub const BOX_ID_DOMAIN: &str = "ergo-tx-protocol 2026 box-id";

/// Domain tag for transaction id preimages.
pub const TX_ID_DOMAIN: &str = "ergo-tx-protocol 2026 tx-id";

/// Domain tag for address checksums.
pub const ADDRESS_CHECKSUM_DOMAIN: &str = "ergo-tx-protocol 2026 address-checksum";

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use ergo_tx_protocol::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"box");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash with a domain separation context.
///
/// Uses BLAKE3's `derive_key` mode, so digests computed under different
/// contexts never collide even for identical `data`.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Hash multiple byte slices together under a domain context, without
/// concatenating them first.
pub fn domain_separated_hash_multi(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

// ---------------------------------------------------------------------------
// Digest32
// ---------------------------------------------------------------------------

/// A 32-byte digest. The common representation behind every id type.
///
/// Serialises as a lowercase hex string so JSON stays readable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest32([u8; 32]);

impl Digest32 {
    /// The all-zero digest.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded representation. 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded digest.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for Digest32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..", &self.to_hex()[..12])
    }
}

impl FromStr for Digest32 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
