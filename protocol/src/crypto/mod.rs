//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **BLAKE3** for every content-addressed identifier.
//! - **Ed25519** (via `ed25519-dalek`) as the discrete-log signature scheme
//!   behind `ProveDlog` guards.
//!
//! Proof *generation* goes through [`crate::prover::ProofBackend`] so that
//! signing logic can be exercised with deterministic stubs; this module
//! only owns the key and digest types.

pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, domain_separated_hash, domain_separated_hash_multi, Digest32};
pub use keys::{KeyError, PublicKey, SecretKey, Signature};
