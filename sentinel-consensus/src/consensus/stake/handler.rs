use serde::{Deserialize, Serialize};
use sentinel_common::address::Address;
use sentinel_common::transaction::CustomTransaction;
use sentinel_ledger::{AuthorResolver, StagedValidatorSet, StakeError};
use thiserror::Error;
use tracing::debug;

use super::actions::{StakeAction, STAKE_HANDLER_ID};
use crate::consensus::banning::{apply_double_vote_report, EvidenceError, ReportOutcome};

/// Effect of a successfully executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "identity", rename_all = "snake_case")]
pub enum ActionEffect {
    Applied,
    Banned(Address),
    AlreadyBanned(Address),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("No handler registered for id {0}")]
    UnknownHandler(u64),

    #[error("Invalid transaction: {0}")]
    Invalid(String),

    #[error("Cannot decode action: {0}")]
    Decode(String),

    #[error(transparent)]
    Stake(#[from] StakeError),

    #[error(transparent)]
    Evidence(#[from] EvidenceError),
}

/// Executes custom transactions addressed to one handler id.
pub trait ActionHandler: Send + Sync {
    fn handler_id(&self) -> u64;

    fn execute(
        &self,
        tx: &CustomTransaction,
        staged: &mut StagedValidatorSet,
        resolver: &dyn AuthorResolver,
    ) -> Result<ActionEffect, HandlerError>;
}

/// Delegation, nomination and double-vote reporting.
#[derive(Debug, Default, Clone, Copy)]
pub struct StakeHandler;

impl ActionHandler for StakeHandler {
    fn handler_id(&self) -> u64 {
        STAKE_HANDLER_ID
    }

    fn execute(
        &self,
        tx: &CustomTransaction,
        staged: &mut StagedValidatorSet,
        resolver: &dyn AuthorResolver,
    ) -> Result<ActionEffect, HandlerError> {
        let action = StakeAction::from_rlp(&tx.payload).map_err(|e| HandlerError::Decode(e.to_string()))?;
        debug!("stake action {} from {}", action.tag(), tx.sender);

        match action {
            StakeAction::Delegate { delegatee, amount } => {
                staged.delegate(&tx.sender, &delegatee, amount)?;
                Ok(ActionEffect::Applied)
            }
            StakeAction::Revoke { delegatee, amount } => {
                staged.revoke(&tx.sender, &delegatee, amount)?;
                Ok(ActionEffect::Applied)
            }
            StakeAction::SelfNominate { public_key, deposit } => {
                staged.self_nominate(&tx.sender, public_key, deposit)?;
                Ok(ActionEffect::Applied)
            }
            StakeAction::ReportDoubleVote { message1, message2 } => {
                match apply_double_vote_report(&message1, &message2, staged, resolver) {
                    ReportOutcome::Banned(id) => Ok(ActionEffect::Banned(id)),
                    ReportOutcome::AlreadyBanned(id) => Ok(ActionEffect::AlreadyBanned(id)),
                    ReportOutcome::Rejected(err) => Err(err.into()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use sentinel_common::crypto::schnorr::ValidatorPublicKey;
    use sentinel_ledger::ValidatorSetState;

    use super::*;

    struct NoAuthors;

    impl AuthorResolver for NoAuthors {
        fn resolve(&self, _index: u64, _height: u64) -> sentinel_common::error::Result<Option<sentinel_ledger::AuthorKey>> {
            Ok(None)
        }
    }

    fn staged() -> StagedValidatorSet {
        StagedValidatorSet::new(1, ValidatorSetState::default())
    }

    #[test]
    fn test_self_nominate_then_delegate() {
        let pk = ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[3u8; 32]));
        let validator = Address::from_public_key(&pk);
        let mut staged = staged();

        let nominate = StakeAction::SelfNominate { public_key: pk, deposit: 100 };
        let tx = CustomTransaction::new(validator, STAKE_HANDLER_ID, nominate.rlp_bytes());
        assert_eq!(StakeHandler.execute(&tx, &mut staged, &NoAuthors), Ok(ActionEffect::Applied));

        let delegate = StakeAction::Delegate { delegatee: validator, amount: 40 };
        let tx = CustomTransaction::new(Address([5u8; 20]), STAKE_HANDLER_ID, delegate.rlp_bytes());
        assert_eq!(StakeHandler.execute(&tx, &mut staged, &NoAuthors), Ok(ActionEffect::Applied));
        assert_eq!(staged.state().validators[&validator].delegated_stake, 40);
    }

    #[test]
    fn test_nominating_someone_else_fails() {
        let pk = ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[3u8; 32]));
        let action = StakeAction::SelfNominate { public_key: pk, deposit: 100 };
        let tx = CustomTransaction::new(Address([5u8; 20]), STAKE_HANDLER_ID, action.rlp_bytes());

        let err = StakeHandler.execute(&tx, &mut staged(), &NoAuthors).unwrap_err();
        assert!(matches!(err, HandlerError::Stake(StakeError::AddressMismatch { .. })));
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let tx = CustomTransaction::new(Address([5u8; 20]), STAKE_HANDLER_ID, vec![0x01, 0x02]);
        assert!(matches!(
            StakeHandler.execute(&tx, &mut staged(), &NoAuthors),
            Err(HandlerError::Decode(_))
        ));
    }

    #[test]
    fn test_effect_json_shape() {
        let json = serde_json::to_value(ActionEffect::Banned(Address([1u8; 20]))).unwrap();
        assert_eq!(json["kind"], "banned");
        assert!(json["identity"].as_str().unwrap().starts_with("stn1"));
    }
}
