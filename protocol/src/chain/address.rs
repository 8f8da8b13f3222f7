//! Addresses.
//!
//! An address is a human-friendly encoding of a guard script. Two kinds are
//! supported:
//!
//! - **P2PK**: pay to a public key; the script is `ProveDlog(pk)`.
//! - **P2S**: pay to an arbitrary script.
//!
//! The string form is base58 over `head byte || content || checksum`, where
//! the head byte is `network prefix + address type` and the checksum is the
//! first four bytes of a BLAKE3 hash over head and content.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{
    network_name, ADDRESS_CHECKSUM_LENGTH, ADDRESS_TYPE_P2PK, ADDRESS_TYPE_P2S,
    NETWORK_PREFIX_MAINNET, NETWORK_PREFIX_TESTNET,
};
use crate::crypto::hash::{domain_separated_hash, ADDRESS_CHECKSUM_DOMAIN};
use crate::crypto::{KeyError, PublicKey};
use crate::script::ErgoTree;

/// Errors when decoding an address string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("address too short: {0} bytes")]
    TooShort(usize),

    #[error("address checksum mismatch")]
    InvalidChecksum,

    #[error("unknown network prefix 0x{0:02x}")]
    UnknownNetwork(u8),

    #[error("unsupported address type 0x{0:02x}")]
    UnsupportedAddressType(u8),

    #[error("address was encoded for {found}, expected {expected}")]
    NetworkMismatch {
        expected: NetworkPrefix,
        found: NetworkPrefix,
    },

    #[error("invalid public key in address: {0}")]
    InvalidKey(#[from] KeyError),
}

/// Network an address is encoded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkPrefix {
    Mainnet,
    Testnet,
}

impl NetworkPrefix {
    pub fn byte(&self) -> u8 {
        match self {
            Self::Mainnet => NETWORK_PREFIX_MAINNET,
            Self::Testnet => NETWORK_PREFIX_TESTNET,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, AddressError> {
        match byte {
            NETWORK_PREFIX_MAINNET => Ok(Self::Mainnet),
            NETWORK_PREFIX_TESTNET => Ok(Self::Testnet),
            other => Err(AddressError::UnknownNetwork(other)),
        }
    }
}

impl fmt::Display for NetworkPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&network_name(self.byte()))
    }
}

/// A spendable destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Address {
    P2PK(PublicKey),
    P2S(ErgoTree),
}

impl Address {
    /// Guard script protecting boxes sent to this address.
    pub fn script(&self) -> ErgoTree {
        match self {
            Address::P2PK(pk) => ErgoTree::p2pk(*pk),
            Address::P2S(tree) => tree.clone(),
        }
    }

    /// Inverse of [`script`](Self::script): key guards become P2PK.
    pub fn recreate_from_ergo_tree(tree: &ErgoTree) -> Self {
        match tree {
            ErgoTree::ProveDlog(pk) => Address::P2PK(*pk),
            other => Address::P2S(other.clone()),
        }
    }

    fn type_byte(&self) -> u8 {
        match self {
            Address::P2PK(_) => ADDRESS_TYPE_P2PK,
            Address::P2S(_) => ADDRESS_TYPE_P2S,
        }
    }

    fn content_bytes(&self) -> Vec<u8> {
        match self {
            Address::P2PK(pk) => pk.as_bytes().to_vec(),
            Address::P2S(tree) => tree.to_bytes(),
        }
    }

    /// Base58 string for `network`.
    pub fn to_base58(&self, network: NetworkPrefix) -> String {
        let mut bytes = vec![network.byte() + self.type_byte()];
        bytes.extend_from_slice(&self.content_bytes());
        let checksum = domain_separated_hash(ADDRESS_CHECKSUM_DOMAIN, &bytes);
        bytes.extend_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);
        bs58::encode(bytes).into_string()
    }

    /// Decodes a base58 address, returning it with the network it targets.
    pub fn from_base58(s: &str) -> Result<(NetworkPrefix, Self), AddressError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::Base58(e.to_string()))?;
        if bytes.len() < 1 + ADDRESS_CHECKSUM_LENGTH {
            return Err(AddressError::TooShort(bytes.len()));
        }
        let (body, checksum) = bytes.split_at(bytes.len() - ADDRESS_CHECKSUM_LENGTH);
        let expected = domain_separated_hash(ADDRESS_CHECKSUM_DOMAIN, body);
        if checksum != &expected[..ADDRESS_CHECKSUM_LENGTH] {
            return Err(AddressError::InvalidChecksum);
        }

        let head = body[0];
        let network = NetworkPrefix::from_byte(head & 0xF0)?;
        match head & 0x0F {
            ADDRESS_TYPE_P2PK => {
                let pk = PublicKey::try_from_slice(&body[1..])?;
                Ok((network, Address::P2PK(pk)))
            }
            // P2S content is a serialized script; decoding it needs a tree codec.
            other => Err(AddressError::UnsupportedAddressType(other)),
        }
    }

    /// Decodes and checks the address targets `network`.
    pub fn parse_for_network(s: &str, network: NetworkPrefix) -> Result<Self, AddressError> {
        let (found, address) = Self::from_base58(s)?;
        if found != network {
            return Err(AddressError::NetworkMismatch {
                expected: network,
                found,
            });
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58(NetworkPrefix::Mainnet))
    }
}

/// A guard script to pay into, derived from an address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    ergo_tree: ErgoTree,
}

impl Contract {
    pub fn pay_to_address(address: &Address) -> Self {
        Self {
            ergo_tree: address.script(),
        }
    }

    pub fn new(ergo_tree: ErgoTree) -> Self {
        Self { ergo_tree }
    }

    pub fn ergo_tree(&self) -> ErgoTree {
        self.ergo_tree.clone()
    }
}
