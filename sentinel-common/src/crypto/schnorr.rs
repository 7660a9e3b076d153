//! Schnorr-style (Ed25519) signatures over vote digests.
//!
//! Votes are signed hash-then-sign: the message handed to the curve is always
//! the SHA-256 digest of the canonical encoding, never the raw bytes.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::{decode_fixed, digest, H256};

pub const SIGNATURE_LENGTH: usize = 64;
pub const SIGNATURE_HALF_LENGTH: usize = 32;
pub const PUBLIC_KEY_LENGTH: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// One half of a signature is wider than its fixed slot.
    #[error("Signature half too long: {0} bytes (max {SIGNATURE_HALF_LENGTH})")]
    HalfTooLong(usize),

    #[error("Invalid signature length: {0}")]
    InvalidLength(usize),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Fixed-width signature, laid out as `R || s`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchnorrSignature(#[serde(with = "hex::serde")] pub [u8; SIGNATURE_LENGTH]);

impl SchnorrSignature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let array: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Rebuilds a signature from independently produced halves.
    ///
    /// Each half is left-padded with zeros to its fixed width, so a half that
    /// lost a leading zero byte in transit still lands in the right position.
    pub fn from_halves(r: &[u8], s: &[u8]) -> Result<Self, SignatureError> {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..SIGNATURE_HALF_LENGTH].copy_from_slice(&pad_half(r)?);
        bytes[SIGNATURE_HALF_LENGTH..].copy_from_slice(&pad_half(s)?);
        Ok(Self(bytes))
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..SIGNATURE_HALF_LENGTH]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[SIGNATURE_HALF_LENGTH..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn pad_half(half: &[u8]) -> Result<[u8; SIGNATURE_HALF_LENGTH], SignatureError> {
    if half.len() > SIGNATURE_HALF_LENGTH {
        return Err(SignatureError::HalfTooLong(half.len()));
    }
    let mut padded = [0u8; SIGNATURE_HALF_LENGTH];
    padded[SIGNATURE_HALF_LENGTH - half.len()..].copy_from_slice(half);
    Ok(padded)
}

impl fmt::Debug for SchnorrSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchnorrSignature({})", hex::encode(self.0))
    }
}

impl Encodable for SchnorrSignature {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for SchnorrSignature {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        decode_fixed::<SIGNATURE_LENGTH>(rlp).map(Self)
    }
}

/// Raw Ed25519 public key of a validator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorPublicKey(#[serde(with = "hex::serde")] pub [u8; PUBLIC_KEY_LENGTH]);

impl ValidatorPublicKey {
    pub fn from_signing_key(key: &SigningKey) -> Self {
        Self(key.verifying_key().to_bytes())
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, SignatureError> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ValidatorPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorPublicKey({})", hex::encode(self.0))
    }
}

impl std::str::FromStr for ValidatorPublicKey {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;
        let array: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }
}

impl Encodable for ValidatorPublicKey {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for ValidatorPublicKey {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        decode_fixed::<PUBLIC_KEY_LENGTH>(rlp).map(Self)
    }
}

/// Digest that is actually signed for an encoded payload.
pub fn signing_message(encoded: &[u8]) -> H256 {
    digest(encoded)
}

/// Signs the digest of `encoded`.
pub fn sign(encoded: &[u8], key: &SigningKey) -> SchnorrSignature {
    let message = signing_message(encoded);
    SchnorrSignature(key.sign(message.as_bytes()).to_bytes())
}

/// Checks `signature` over the digest of `encoded` against `public_key`.
///
/// Pure: a malformed key or signature simply fails verification.
pub fn verify(encoded: &[u8], signature: &SchnorrSignature, public_key: &ValidatorPublicKey) -> bool {
    let Ok(verifying_key) = public_key.verifying_key() else {
        return false;
    };
    let message = signing_message(encoded);
    let signature = Signature::from_bytes(&signature.0);
    verifying_key.verify_strict(message.as_bytes(), &signature).is_ok()
}
