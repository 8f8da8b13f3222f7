//! Signature primitive behind `ProveDlog` leaves.
//!
//! The prover never calls `ed25519-dalek` directly; it goes through
//! [`ProofBackend`] so tests can substitute a deterministic stub.

use crate::crypto::{PublicKey, SecretKey, Signature};

/// Produces and checks the proof for a single discrete-log statement.
pub trait ProofBackend {
    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Signature;

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

/// Ed25519 (RFC 8032) backend. Signing is deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Backend;

impl ProofBackend for Ed25519Backend {
    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Signature {
        secret.sign(message)
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        public_key.verify(message, signature)
    }
}

impl<B: ProofBackend + ?Sized> ProofBackend for &B {
    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Signature {
        (**self).sign(secret, message)
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        (**self).verify(public_key, message, signature)
    }
}
