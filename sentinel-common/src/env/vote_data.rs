use ed25519_dalek::SigningKey;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::{
    crypto::{
        hash::decode_exact,
        schnorr::{self, SchnorrSignature, ValidatorPublicKey},
    },
    env::consensus::types::{VoteStep, VoteTarget},
};

/// A vote as it travels inside evidence: `[target, signature, signerIndex]`.
///
/// `signer_index` points into the possible-authors list effective at
/// `target.height()`, not at a public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedVote {
    pub target: VoteTarget,
    pub signature: SchnorrSignature,
    pub signer_index: u64,
}

impl SignedVote {
    pub fn new(target: VoteTarget, signature: SchnorrSignature, signer_index: u64) -> Self {
        Self { target, signature, signer_index }
    }

    /// Signs `target` with `key`, claiming position `signer_index`.
    pub fn sign(target: VoteTarget, signer_index: u64, key: &SigningKey) -> Self {
        let signature = schnorr::sign(&vote_signing_bytes(&target), key);
        Self { target, signature, signer_index }
    }

    pub fn height(&self) -> u64 {
        self.target.height()
    }

    pub fn vote_step(&self) -> &VoteStep {
        &self.target.step
    }

    /// Verifies the signature over the canonical target encoding.
    pub fn verify(&self, public_key: &ValidatorPublicKey) -> bool {
        schnorr::verify(&vote_signing_bytes(&self.target), &self.signature, public_key)
    }

    pub fn rlp_bytes(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn from_rlp(bytes: &[u8]) -> Result<Self, DecoderError> {
        decode_exact(bytes)
    }
}

/// Bytes a validator signs for a vote. Always the canonical RLP of the target.
pub fn vote_signing_bytes(target: &VoteTarget) -> Vec<u8> {
    target.rlp_bytes()
}

impl Encodable for SignedVote {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3)
            .append(&self.target)
            .append(&self.signature)
            .append(&self.signer_index);
    }
}

impl Decodable for SignedVote {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            target: rlp.val_at(0)?,
            signature: rlp.val_at(1)?,
            signer_index: rlp.val_at(2)?,
        })
    }
}
