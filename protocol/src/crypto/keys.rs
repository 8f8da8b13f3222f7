//! # Key Management
//!
//! Secret keys, public keys and signatures for `ProveDlog` guard conditions.
//!
//! A [`SecretKey`] is the spender's secret scalar; its [`PublicKey`] is the
//! public guard condition a box is locked to. The curve arithmetic is
//! delegated to `ed25519-dalek`; nothing in this crate touches field
//! elements directly.
//!
//! ## Security considerations
//!
//! - Secret keys are owned by the caller's wallet layer. They are never
//!   serialised and never logged.
//! - Signing key bytes are zeroized on drop by ed25519-dalek.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Deliberately vague about *why* parsing failed so no key material leaks
/// into error messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid curve point")]
    InvalidPublicKey,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignature,
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// A secret scalar able to prove `ProveDlog(public_key)` conditions.
///
/// `SecretKey` does not implement `Serialize`. Exporting a
/// secret should be a deliberate act; use [`SecretKey::to_bytes`].
pub struct SecretKey {
    signing_key: SigningKey,
}

impl SecretKey {
    /// Generates a fresh random secret using the OS RNG.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a secret deterministically from 32 seed bytes.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Parses a hex-encoded 32-byte secret.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_bytes(&arr))
    }

    /// Exports the raw secret bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }

    /// The public guard condition this secret can satisfy.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Signs `message`, producing a 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature {
            bytes: sig.to_bytes(),
        }
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output.
        write!(f, "SecretKey(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for SecretKey {
    /// Compared by public key so secret bytes are never compared in
    /// non-constant time.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for SecretKey {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// The public half of a [`SecretKey`]; the payload of a `ProveDlog` guard.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Validates and wraps a 32-byte slice.
    ///
    /// Some 32-byte strings are not valid curve points; those are rejected.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parses a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    /// Raw point bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Hex-encoded representation. 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Verifies `signature` over `message`.
    ///
    /// Returns a plain boolean; callers only need yes/no.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte signature proving knowledge of a [`SecretKey`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Signature {
    /// Wraps raw signature bytes. No validation happens here; an invalid
    /// signature simply fails verification.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    /// Parses a signature from a slice, checking the length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 64] = slice.try_into().map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    /// Hex-encoded representation. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let sk = SecretKey::random();
        let sig = sk.sign(b"spend box");
        assert!(sk.public_key().verify(b"spend box", &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let sk = SecretKey::random();
        let sig = sk.sign(b"correct message");
        assert!(!sk.public_key().verify(b"wrong message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let sk1 = SecretKey::random();
        let sk2 = SecretKey::random();
        let sig = sk1.sign(b"message");
        assert!(!sk2.public_key().verify(b"message", &sig));
    }

    #[test]
    fn deterministic_from_bytes() {
        let a = SecretKey::from_bytes(&[42u8; 32]);
        let b = SecretKey::from_bytes(&[42u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a, b.clone());
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let sk = SecretKey::random();
        let restored = SecretKey::from_hex(&hex::encode(sk.to_bytes())).unwrap();
        assert_eq!(sk.public_key(), restored.public_key());
        assert_eq!(SecretKey::from_hex("deadbeef"), Err(KeyError::InvalidSecretKey));
    }

    #[test]
    fn public_key_hex_and_json_roundtrip() {
        let pk = SecretKey::random().public_key();
        assert_eq!(PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        let json = serde_json::to_string(&pk).unwrap();
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert_eq!(
            PublicKey::try_from_slice(&[0u8; 16]),
            Err(KeyError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_signature_rejects_wrong_length() {
        assert_eq!(
            Signature::try_from_slice(&[0u8; 63]),
            Err(KeyError::InvalidSignature)
        );
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let sk = SecretKey::from_bytes(&[7u8; 32]);
        let debug_str = format!("{:?}", sk);
        assert!(debug_str.starts_with("SecretKey(pub="));
        assert!(!debug_str.contains(&hex::encode([7u8; 32])));
    }
}
