//! # Protocol Configuration & Constants
//!
//! Every magic number the builder and signer rely on lives here. Values
//! that are consensus-relevant (value ceiling, token limits, header window)
//! must match the network; values that are policy (safe user minimum,
//! suggested fee) are the defaults wallets have converged on.

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Address prefix byte for mainnet.
pub const NETWORK_PREFIX_MAINNET: u8 = 0x00;

/// Address prefix byte for testnet.
pub const NETWORK_PREFIX_TESTNET: u8 = 0x10;

/// Address type byte for pay-to-public-key addresses.
pub const ADDRESS_TYPE_P2PK: u8 = 0x01;

/// Address type byte for pay-to-script addresses.
pub const ADDRESS_TYPE_P2S: u8 = 0x03;

/// Number of checksum bytes appended to an encoded address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Box Value Limits
// ---------------------------------------------------------------------------

/// Smallest value a box may hold, in nanoERG.
pub const MIN_BOX_VALUE: u64 = 1;

/// Largest value a box may hold. Values are signed 64-bit on the wire, so
/// anything above `i64::MAX` cannot be represented by other nodes.
pub const MAX_BOX_VALUE: u64 = i64::MAX as u64;

/// Minimal value wallets put into a box so that it survives storage rent
/// for a reasonable period (0.001 ERG).
pub const SAFE_USER_MIN: u64 = 1_000_000;

/// Suggested transaction fee (semi-default value used across wallets and
/// dApps as of Oct 2020), 0.0011 ERG.
pub const SUGGESTED_TX_FEE: u64 = 1_100_000;

// ---------------------------------------------------------------------------
// Token & Register Limits
// ---------------------------------------------------------------------------

/// Maximum number of distinct tokens a single box may carry.
pub const MAX_TOKENS_PER_BOX: usize = 255;

/// Smallest token amount a box may carry.
pub const MIN_TOKEN_AMOUNT: u64 = 1;

/// Largest token amount (signed 64-bit on the wire).
pub const MAX_TOKEN_AMOUNT: u64 = i64::MAX as u64;

/// Number of non-mandatory registers (R4..=R9).
pub const NUM_NON_MANDATORY_REGISTERS: usize = 6;

/// Index of the first non-mandatory register (R4).
pub const FIRST_NON_MANDATORY_REGISTER: u8 = 4;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of inputs per transaction (u16 counter on the wire).
pub const MAX_TX_INPUTS: usize = u16::MAX as usize;

/// Maximum number of data inputs per transaction.
pub const MAX_TX_DATA_INPUTS: usize = u16::MAX as usize;

/// Maximum number of outputs per transaction.
pub const MAX_TX_OUTPUTS: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

/// Maximum nesting depth of a guard script the interpreter will reduce.
pub const MAX_SCRIPT_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// State Context
// ---------------------------------------------------------------------------

/// Number of most recent block headers available to scripts.
pub const MAX_HEADERS_IN_CONTEXT: usize = 10;

/// Default storage fee factor (nanoERG per byte per storage period).
pub const DEFAULT_STORAGE_FEE_FACTOR: u32 = 1_250_000;

/// Default minimum value per byte of a box.
pub const DEFAULT_MIN_VALUE_PER_BYTE: u32 = 360;

/// Default maximum block size in bytes.
pub const DEFAULT_MAX_BLOCK_SIZE: u32 = 524_288;

/// Default maximum cumulative computational cost of a block.
pub const DEFAULT_MAX_BLOCK_COST: u32 = 1_000_000;

/// Default block version.
pub const DEFAULT_BLOCK_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns a friendly name for a network prefix, mainly for logging.
pub fn network_name(prefix: u8) -> String {
    match prefix {
        NETWORK_PREFIX_MAINNET => "mainnet".to_string(),
        NETWORK_PREFIX_TESTNET => "testnet".to_string(),
        other => format!("unknown(0x{:02X})", other),
    }
}
