//! # Prover
//!
//! Turns a reduced proposition into a [`Proof`] using the secrets it holds,
//! and checks proofs against propositions.
//!
//! Proving is two-phase: first decide whether the whole tree is provable
//! with the held secrets, then generate signatures. Nothing is signed for
//! a proposition that cannot be completed.

pub mod backend;
pub mod proof;

use std::collections::HashMap;
use thiserror::Error;

pub use backend::{Ed25519Backend, ProofBackend};
pub use proof::Proof;

use crate::crypto::{PublicKey, SecretKey};
use crate::script::SigmaBoolean;

/// Why a proposition could not be proven.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProverError {
    #[error("no secret held for public key {0}")]
    MissingSecret(PublicKey),

    #[error("proposition is unprovable: {0}")]
    Unprovable(String),
}

/// Holds secrets and produces proofs through a [`ProofBackend`].
pub struct Prover<B = Ed25519Backend> {
    secrets: HashMap<PublicKey, SecretKey>,
    backend: B,
}

impl Prover<Ed25519Backend> {
    pub fn new(secrets: Vec<SecretKey>) -> Self {
        Self::with_backend(secrets, Ed25519Backend)
    }
}

impl<B: ProofBackend> Prover<B> {
    pub fn with_backend(secrets: Vec<SecretKey>, backend: B) -> Self {
        let secrets = secrets
            .into_iter()
            .map(|sk| (sk.public_key(), sk))
            .collect();
        Self { secrets, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn public_keys(&self) -> Vec<PublicKey> {
        let mut keys: Vec<_> = self.secrets.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Whether the held secrets suffice for `sigma`.
    pub fn can_prove(&self, sigma: &SigmaBoolean) -> bool {
        match sigma {
            SigmaBoolean::Trivial(b) => *b,
            SigmaBoolean::ProveDlog(pk) => self.secrets.contains_key(pk),
            SigmaBoolean::Cand(children) => children.iter().all(|c| self.can_prove(c)),
            SigmaBoolean::Cor(children) => children.iter().any(|c| self.can_prove(c)),
            SigmaBoolean::Cthreshold { k, children } => {
                children.iter().filter(|c| self.can_prove(c)).count() >= *k as usize
            }
        }
    }

    /// Proves `sigma` over `message`.
    pub fn prove(&self, sigma: &SigmaBoolean, message: &[u8]) -> Result<Proof, ProverError> {
        if !self.can_prove(sigma) {
            return Err(self.explain(sigma));
        }
        Ok(self.prove_checked(sigma, message))
    }

    // Precondition: `can_prove(sigma)`.
    fn prove_checked(&self, sigma: &SigmaBoolean, message: &[u8]) -> Proof {
        match sigma {
            SigmaBoolean::Trivial(_) => Proof::Empty,
            SigmaBoolean::ProveDlog(pk) => match self.secrets.get(pk) {
                Some(secret) => Proof::Dlog {
                    public_key: *pk,
                    signature: self.backend.sign(secret, message),
                },
                None => Proof::Empty,
            },
            SigmaBoolean::Cand(children) => Proof::And(
                children
                    .iter()
                    .map(|c| self.prove_checked(c, message))
                    .collect(),
            ),
            SigmaBoolean::Cor(children) => {
                match children.iter().enumerate().find(|(_, c)| self.can_prove(c)) {
                    Some((index, child)) => Proof::Or {
                        index: index as u32,
                        proof: Box::new(self.prove_checked(child, message)),
                    },
                    None => Proof::Empty,
                }
            }
            SigmaBoolean::Cthreshold { k, children } => Proof::Threshold(
                children
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| self.can_prove(c))
                    .take(*k as usize)
                    .map(|(i, c)| (i as u32, self.prove_checked(c, message)))
                    .collect(),
            ),
        }
    }

    fn explain(&self, sigma: &SigmaBoolean) -> ProverError {
        match sigma {
            SigmaBoolean::ProveDlog(pk) => ProverError::MissingSecret(*pk),
            SigmaBoolean::Trivial(_) => ProverError::Unprovable("guard reduced to false".into()),
            SigmaBoolean::Cand(children) => children
                .iter()
                .find(|c| !self.can_prove(c))
                .map(|c| self.explain(c))
                .unwrap_or_else(|| ProverError::Unprovable("conjunction".into())),
            SigmaBoolean::Cor(children) => {
                ProverError::Unprovable(format!("none of {} alternatives provable", children.len()))
            }
            SigmaBoolean::Cthreshold { k, children } => ProverError::Unprovable(format!(
                "{} of {} children provable, {} required",
                children.iter().filter(|c| self.can_prove(c)).count(),
                children.len(),
                k
            )),
        }
    }

    /// Checks `proof` against `sigma` over `message`.
    pub fn verify(&self, sigma: &SigmaBoolean, proof: &Proof, message: &[u8]) -> bool {
        verify_proof(&self.backend, sigma, proof, message)
    }
}

/// Checks a proof tree without holding any secrets.
pub fn verify_proof<B: ProofBackend>(
    backend: &B,
    sigma: &SigmaBoolean,
    proof: &Proof,
    message: &[u8],
) -> bool {
    match (sigma, proof) {
        (SigmaBoolean::Trivial(b), Proof::Empty) => *b,
        (
            SigmaBoolean::ProveDlog(pk),
            Proof::Dlog {
                public_key,
                signature,
            },
        ) => pk == public_key && backend.verify(pk, message, signature),
        (SigmaBoolean::Cand(children), Proof::And(proofs)) => {
            children.len() == proofs.len()
                && children
                    .iter()
                    .zip(proofs)
                    .all(|(c, p)| verify_proof(backend, c, p, message))
        }
        (SigmaBoolean::Cor(children), Proof::Or { index, proof }) => children
            .get(*index as usize)
            .is_some_and(|c| verify_proof(backend, c, proof, message)),
        (SigmaBoolean::Cthreshold { k, children }, Proof::Threshold(entries)) => {
            let ascending = entries.windows(2).all(|w| w[0].0 < w[1].0);
            ascending
                && entries.len() == *k as usize
                && entries.iter().all(|(i, p)| {
                    children
                        .get(*i as usize)
                        .is_some_and(|c| verify_proof(backend, c, p, message))
                })
        }
        _ => false,
    }
}
