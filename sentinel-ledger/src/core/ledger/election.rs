use serde::{Deserialize, Serialize};
use sentinel_common::address::Address;
use sentinel_common::error::{Result, SentinelError};

use crate::core::ledger::state::{ValidatorRecord, ValidatorSetState};

/// Knobs for authority election at term boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionParams {
    pub term_length: u64,
    pub max_num_of_validators: usize,
    pub min_num_of_validators: usize,
    pub delegation_threshold: u64,
    pub min_deposit: u64,
}

impl Default for ElectionParams {
    fn default() -> Self {
        Self {
            term_length: 10,
            max_num_of_validators: 30,
            min_num_of_validators: 1,
            delegation_threshold: 1_000,
            min_deposit: 1_000_000,
        }
    }
}

impl ElectionParams {
    pub fn validate(&self) -> Result<()> {
        if self.term_length == 0 {
            return Err(SentinelError::Config("term_length must be at least 1".to_string()));
        }
        if self.max_num_of_validators == 0 {
            return Err(SentinelError::Config("max_num_of_validators must be at least 1".to_string()));
        }
        if self.min_num_of_validators > self.max_num_of_validators {
            return Err(SentinelError::Config(format!(
                "min_num_of_validators ({}) exceeds max_num_of_validators ({})",
                self.min_num_of_validators, self.max_num_of_validators
            )));
        }
        Ok(())
    }

    fn is_eligible(&self, record: &ValidatorRecord) -> bool {
        !record.banned
            && record.deposit >= self.min_deposit
            && record.delegated_stake >= self.delegation_threshold
    }
}

/// Ranks every eligible candidate by delegated stake (descending), breaking
/// ties by ascending address bytes, and keeps the top `max_num_of_validators`.
pub fn rank_candidates(state: &ValidatorSetState, params: &ElectionParams) -> Vec<Address> {
    let mut eligible: Vec<&ValidatorRecord> = state
        .validators
        .values()
        .filter(|r| !state.banned.contains(&r.address) && params.is_eligible(r))
        .collect();

    eligible.sort_by(|a, b| {
        b.delegated_stake
            .cmp(&a.delegated_stake)
            .then_with(|| a.address.cmp(&b.address))
    });

    eligible
        .into_iter()
        .take(params.max_num_of_validators)
        .map(|r| r.address)
        .collect()
}

/// Authorities for the next term. When fewer than `min_num_of_validators`
/// qualify the current list, minus banned identities, is kept.
pub fn elect(state: &ValidatorSetState, params: &ElectionParams) -> Vec<Address> {
    let ranked = rank_candidates(state, params);
    if ranked.len() < params.min_num_of_validators {
        return state.possible_authors();
    }
    ranked
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use sentinel_common::crypto::schnorr::ValidatorPublicKey;

    use super::*;

    fn record(seed: u8, delegated: u64, deposit: u64) -> ValidatorRecord {
        let key = ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[seed; 32]));
        let mut record = ValidatorRecord::new(key, deposit, 0);
        record.delegated_stake = delegated;
        record
    }

    fn state_with(records: Vec<ValidatorRecord>) -> ValidatorSetState {
        let mut state = ValidatorSetState::default();
        for r in records {
            state.validators.insert(r.address, r);
        }
        state
    }

    fn params() -> ElectionParams {
        ElectionParams {
            term_length: 10,
            max_num_of_validators: 3,
            min_num_of_validators: 2,
            delegation_threshold: 100,
            min_deposit: 1_000,
        }
    }

    #[test]
    fn test_ranking_by_stake_then_address() {
        let a = record(1, 500, 1_000);
        let b = record(2, 500, 1_000);
        let c = record(3, 900, 1_000);
        let d = record(4, 100, 1_000);
        let state = state_with(vec![a.clone(), b.clone(), c.clone(), d]);

        let (low, high) = if a.address < b.address { (a.address, b.address) } else { (b.address, a.address) };
        assert_eq!(rank_candidates(&state, &params()), vec![c.address, low, high]);
    }

    #[test]
    fn test_ineligible_candidates_are_skipped() {
        let under_deposit = record(1, 500, 999);
        let under_stake = record(2, 99, 1_000);
        let mut banned = record(3, 5_000, 1_000);
        banned.banned = true;
        let ok = record(4, 100, 1_000);
        let state = state_with(vec![under_deposit, under_stake, banned, ok.clone()]);

        assert_eq!(rank_candidates(&state, &params()), vec![ok.address]);
    }

    #[test]
    fn test_too_few_keeps_previous_minus_banned() {
        let ok = record(4, 100, 1_000);
        let mut state = state_with(vec![ok.clone()]);
        let gone = Address([9u8; 20]);
        let prev = Address([8u8; 20]);
        state.authorities = vec![prev, gone];
        state.banned.insert(gone);

        assert_eq!(elect(&state, &params()), vec![prev]);
    }

    #[test]
    fn test_validate_params() {
        assert!(params().validate().is_ok());
        let mut bad = params();
        bad.min_num_of_validators = 5;
        assert!(bad.validate().is_err());
        bad = params();
        bad.term_length = 0;
        assert!(bad.validate().is_err());
    }
}
