//! In-memory wallet: a set of secrets plus the components needed to sign.
//!
//! Key storage is the host's concern. A `Wallet` only lives as long as the
//! caller keeps it and never serializes its secrets.

use crate::chain::{Address, ErgoBox, ErgoStateContext};
use crate::crypto::{PublicKey, SecretKey};
use crate::prover::{Ed25519Backend, ProofBackend, Prover};
use crate::script::{Interpreter, ScriptEvaluator};
use crate::transaction::{sign_transaction, SigningError, Transaction, UnsignedTransaction};

/// Signs transactions with the secrets it holds.
pub struct Wallet<E = Interpreter, B = Ed25519Backend> {
    prover: Prover<B>,
    evaluator: E,
}

impl Wallet {
    /// Wallet using the default interpreter and Ed25519.
    pub fn from_secrets(secrets: Vec<SecretKey>) -> Self {
        Self::with_components(secrets, Interpreter, Ed25519Backend)
    }
}

impl<E: ScriptEvaluator, B: ProofBackend> Wallet<E, B> {
    pub fn with_components(secrets: Vec<SecretKey>, evaluator: E, backend: B) -> Self {
        Self {
            prover: Prover::with_backend(secrets, backend),
            evaluator,
        }
    }

    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.prover.public_keys()
    }

    /// P2PK addresses of the held keys.
    pub fn addresses(&self) -> Vec<Address> {
        self.public_keys().into_iter().map(Address::P2PK).collect()
    }

    pub fn sign_transaction(
        &self,
        state_context: &ErgoStateContext,
        unsigned: &UnsignedTransaction,
        boxes_to_spend: &[ErgoBox],
        data_boxes: &[ErgoBox],
    ) -> Result<Transaction, SigningError> {
        sign_transaction(
            &self.prover,
            &self.evaluator,
            state_context,
            unsigned,
            boxes_to_spend,
            data_boxes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_follow_secrets() {
        let a = SecretKey::from_bytes(&[1u8; 32]);
        let b = SecretKey::from_bytes(&[2u8; 32]);
        let wallet = Wallet::from_secrets(vec![a.clone(), b.clone()]);
        let addresses = wallet.addresses();
        assert_eq!(addresses.len(), 2);
        assert!(addresses.contains(&Address::P2PK(a.public_key())));
        assert!(addresses.contains(&Address::P2PK(b.public_key())));
    }

    #[test]
    fn duplicate_secrets_collapse() {
        let a = SecretKey::from_bytes(&[1u8; 32]);
        let wallet = Wallet::from_secrets(vec![a.clone(), a]);
        assert_eq!(wallet.public_keys().len(), 1);
    }
}
