use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

use crate::env::vote_data::SignedVote;

/// Two signed votes offered as proof that one validator voted twice
/// for the same (height, view, step).
///
/// The pair is unordered: `(a, b)` and `(b, a)` describe the same evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleVoteEvidence {
    pub vote_a: SignedVote,
    pub vote_b: SignedVote,
}

impl DoubleVoteEvidence {
    pub fn new(vote_a: SignedVote, vote_b: SignedVote) -> Self {
        Self { vote_a, vote_b }
    }

    /// Height the offence is claimed at (taken from the first vote).
    pub fn height(&self) -> u64 {
        self.vote_a.height()
    }

    /// Highest height referenced by either vote.
    pub fn max_height(&self) -> u64 {
        self.vote_a.height().max(self.vote_b.height())
    }

    pub fn swapped(&self) -> Self {
        Self {
            vote_a: self.vote_b.clone(),
            vote_b: self.vote_a.clone(),
        }
    }
}

impl PartialEq for DoubleVoteEvidence {
    fn eq(&self, other: &Self) -> bool {
        (self.vote_a == other.vote_a && self.vote_b == other.vote_b)
            || (self.vote_a == other.vote_b && self.vote_b == other.vote_a)
    }
}

impl Eq for DoubleVoteEvidence {}

impl Encodable for DoubleVoteEvidence {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2).append(&self.vote_a).append(&self.vote_b);
    }
}

impl Decodable for DoubleVoteEvidence {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Self {
            vote_a: rlp.val_at(0)?,
            vote_b: rlp.val_at(1)?,
        })
    }
}
