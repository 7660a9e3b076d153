use sentinel_common::address::Address;
use thiserror::Error;

/// Rule violations raised by the stake mutations on a staged validator set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("{0} is not a validator candidate")]
    NotCandidate(Address),

    #[error("{0} is banned")]
    Banned(Address),

    #[error("Insufficient delegation: has {has}, tried to revoke {requested}")]
    InsufficientDelegation { has: u64, requested: u64 },

    #[error("Sender {sender} does not match key address {derived}")]
    AddressMismatch { sender: Address, derived: Address },

    #[error("Stake arithmetic overflow")]
    Overflow,

    #[error("Unknown validator {0}")]
    UnknownValidator(Address),
}

impl From<StakeError> for sentinel_common::error::SentinelError {
    fn from(err: StakeError) -> Self {
        sentinel_common::error::SentinelError::Stake(err.to_string())
    }
}
