//! Shared types for the sentinel workspace: vote codec, Schnorr signatures,
//! addresses, custom transactions, genesis and the common error type.

pub mod address;
pub mod crypto;
pub mod env;
pub mod error;
pub mod genesis;
pub mod transaction;

pub use address::Address;
pub use crypto::{H256, SchnorrSignature, ValidatorPublicKey};
pub use env::consensus::{DoubleVoteEvidence, Step, VoteStep, VoteTarget};
pub use env::SignedVote;
pub use error::{Result, SentinelError};
