use std::fmt;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::crypto::hash::{decode_exact, H256};

/// Steps of a BFT round.
///
/// The integer tags are part of the wire format and are fixed explicitly,
/// independent of declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Propose,
    Prevote,
    Precommit,
    Commit,
}

impl Step {
    pub fn tag(self) -> u8 {
        match self {
            Step::Propose => 0,
            Step::Prevote => 1,
            Step::Precommit => 2,
            Step::Commit => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Step::Propose),
            1 => Some(Step::Prevote),
            2 => Some(Step::Precommit),
            3 => Some(Step::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Propose => "propose",
            Step::Prevote => "prevote",
            Step::Precommit => "precommit",
            Step::Commit => "commit",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "propose" => Ok(Step::Propose),
            "prevote" => Ok(Step::Prevote),
            "precommit" => Ok(Step::Precommit),
            "commit" => Ok(Step::Commit),
            other => Err(format!("unknown step '{}'", other)),
        }
    }
}

/// A voting coordinate: (height, view, step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteStep {
    pub height: u64,
    pub view: u64,
    pub step: Step,
}

impl VoteStep {
    pub fn new(height: u64, view: u64, step: Step) -> Self {
        Self { height, view, step }
    }
}

impl fmt::Display for VoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.height, self.view, self.step)
    }
}

impl Encodable for VoteStep {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3)
            .append(&self.height)
            .append(&self.view)
            .append(&self.step.tag());
    }
}

impl Decodable for VoteStep {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let tag: u8 = rlp.val_at(2)?;
        let step = Step::from_tag(tag).ok_or(DecoderError::Custom("Unknown vote step tag"))?;
        Ok(Self {
            height: rlp.val_at(0)?,
            view: rlp.val_at(1)?,
            step,
        })
    }
}

/// What a vote is cast for: a coordinate and an optional block hash.
///
/// `block_hash == None` is a nil vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteTarget {
    pub step: VoteStep,
    pub block_hash: Option<H256>,
}

impl VoteTarget {
    pub fn new(step: VoteStep, block_hash: Option<H256>) -> Self {
        Self { step, block_hash }
    }

    pub fn height(&self) -> u64 {
        self.step.height
    }

    /// Same coordinate, different block (nil counts as a block choice).
    pub fn conflicts_with(&self, other: &VoteTarget) -> bool {
        self.step == other.step && self.block_hash != other.block_hash
    }

    /// Canonical bytes: `[[height, view, stepTag], [blockHash?]]`.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn from_rlp(bytes: &[u8]) -> Result<Self, DecoderError> {
        decode_exact(bytes)
    }
}

impl Encodable for VoteTarget {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.step);
        match &self.block_hash {
            Some(hash) => {
                s.begin_list(1).append(hash);
            }
            None => {
                s.begin_list(0);
            }
        }
    }
}

impl Decodable for VoteTarget {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let step = rlp.val_at(0)?;
        let hashes = rlp.at(1)?;
        let block_hash = match hashes.item_count()? {
            0 => None,
            1 => Some(hashes.val_at(0)?),
            _ => return Err(DecoderError::RlpIncorrectListLen),
        };
        Ok(Self { step, block_hash })
    }
}
