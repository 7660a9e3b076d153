use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use sentinel_common::address::Address;
use sentinel_common::crypto::hash::decode_exact;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;

/// Custom-action handler id of the stake module.
pub const STAKE_HANDLER_ID: u64 = 2;

const ACTION_TAG_DELEGATE: u8 = 2;
const ACTION_TAG_REVOKE: u8 = 3;
const ACTION_TAG_SELF_NOMINATE: u8 = 4;
const ACTION_TAG_REPORT_DOUBLE_VOTE: u8 = 5;

/// Payload of a stake custom transaction. Encoded as an RLP list led by the
/// action tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeAction {
    Delegate { delegatee: Address, amount: u64 },
    Revoke { delegatee: Address, amount: u64 },
    SelfNominate { public_key: ValidatorPublicKey, deposit: u64 },
    /// Both messages are RLP-encoded signed votes, kept opaque until the
    /// report is processed.
    ReportDoubleVote { message1: Vec<u8>, message2: Vec<u8> },
}

impl StakeAction {
    pub fn tag(&self) -> u8 {
        match self {
            StakeAction::Delegate { .. } => ACTION_TAG_DELEGATE,
            StakeAction::Revoke { .. } => ACTION_TAG_REVOKE,
            StakeAction::SelfNominate { .. } => ACTION_TAG_SELF_NOMINATE,
            StakeAction::ReportDoubleVote { .. } => ACTION_TAG_REPORT_DOUBLE_VOTE,
        }
    }

    pub fn rlp_bytes(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn from_rlp(bytes: &[u8]) -> Result<Self, DecoderError> {
        decode_exact(bytes)
    }
}

impl Encodable for StakeAction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3).append(&self.tag());
        match self {
            StakeAction::Delegate { delegatee, amount } | StakeAction::Revoke { delegatee, amount } => {
                s.append(delegatee).append(amount);
            }
            StakeAction::SelfNominate { public_key, deposit } => {
                s.append(public_key).append(deposit);
            }
            StakeAction::ReportDoubleVote { message1, message2 } => {
                s.append(message1).append(message2);
            }
        }
    }
}

impl Decodable for StakeAction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let tag: u8 = rlp.val_at(0)?;
        match tag {
            ACTION_TAG_DELEGATE => Ok(StakeAction::Delegate {
                delegatee: rlp.val_at(1)?,
                amount: rlp.val_at(2)?,
            }),
            ACTION_TAG_REVOKE => Ok(StakeAction::Revoke {
                delegatee: rlp.val_at(1)?,
                amount: rlp.val_at(2)?,
            }),
            ACTION_TAG_SELF_NOMINATE => Ok(StakeAction::SelfNominate {
                public_key: rlp.val_at(1)?,
                deposit: rlp.val_at(2)?,
            }),
            ACTION_TAG_REPORT_DOUBLE_VOTE => Ok(StakeAction::ReportDoubleVote {
                message1: rlp.val_at(1)?,
                message2: rlp.val_at(2)?,
            }),
            _ => Err(DecoderError::Custom("Unknown stake action tag")),
        }
    }
}
