use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sentinel_common::address::Address;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;
use sentinel_common::error::{Result, SentinelError};
use sentinel_common::genesis::GenesisState;
use tracing::{debug, info};

use crate::core::ledger::election::{rank_candidates, ElectionParams};
use crate::core::ledger::staged::{BanStatus, StagedValidatorSet};
use crate::core::ledger::state::{Delegation, DelegationStore, ValidatorRecord, ValidatorSetState};
use crate::core::ledger::term::{Term, TermScheduler};
use crate::core::storage::{StateBackend, StateKey};

/// Identity and key behind a signer index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorKey {
    pub address: Address,
    pub public_key: ValidatorPublicKey,
}

/// Maps a vote's signer index to the author it names at a given height.
pub trait AuthorResolver {
    /// `Ok(None)` when `index` is outside the possible-authors list at `height`.
    fn resolve(&self, index: u64, height: u64) -> Result<Option<AuthorKey>>;
}

/// Height-versioned view of the validator set over a [`StateBackend`].
#[derive(Debug)]
pub struct ValidatorSetStore<B: StateBackend> {
    backend: B,
}

impl<B: StateBackend> ValidatorSetStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialised(&self) -> Result<bool> {
        Ok(self.backend.get(StateKey::LastBlock, u64::MAX)?.is_some())
    }

    /// Writes the genesis state at height 0. Fails if the store already holds
    /// a chain.
    pub fn init_genesis(&mut self, genesis: &GenesisState, params: &ElectionParams) -> Result<()> {
        if self.is_initialised()? {
            return Err(SentinelError::Config("Store is already initialised".to_string()));
        }
        genesis.validate()?;
        params.validate()?;

        let mut staged = StagedValidatorSet::new(0, ValidatorSetState::default());
        for validator in &genesis.validators {
            staged.self_nominate(&validator.address(), validator.public_key, validator.deposit)?;
        }
        for delegation in &genesis.delegations {
            staged.delegate(&delegation.delegator, &delegation.delegatee, delegation.amount)?;
        }

        let (_, mut state, _) = staged.into_parts();
        state.authorities = rank_candidates(&state, params);
        state.term = Term::genesis();
        if state.authorities.is_empty() {
            return Err(SentinelError::Config("No eligible authorities at genesis".to_string()));
        }

        let mut batch = Vec::with_capacity(StateKey::ALL.len());
        for key in StateKey::ALL {
            batch.push((key, encode_entity(&state, key, 0)?));
        }
        self.backend.write_batch(0, &batch)?;

        info!(
            "🌱 Genesis written: {} candidates, {} authorities",
            state.validators.len(),
            state.authorities.len()
        );
        Ok(())
    }

    /// Last executed block. Genesis counts as block 0.
    pub fn best_block(&self) -> Result<u64> {
        self.load(StateKey::LastBlock, u64::MAX)
    }

    fn check_height(&self, height: u64) -> Result<()> {
        let best = self.best_block()?;
        if height > best.saturating_add(1) {
            return Err(SentinelError::UnknownHeight { requested: height, best });
        }
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, key: StateKey, height: u64) -> Result<T> {
        let bytes = self
            .backend
            .get(key, height)?
            .ok_or_else(|| SentinelError::Uninitialised(format!("no {} at height {}", key.name(), height)))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn possible_authors(&self, height: u64) -> Result<Vec<Address>> {
        self.check_height(height)?;
        let authorities: Vec<Address> = self.load(StateKey::Authorities, height)?;
        let banned: BTreeSet<Address> = self.load(StateKey::Banned, height)?;
        Ok(authorities.into_iter().filter(|a| !banned.contains(a)).collect())
    }

    pub fn is_banned(&self, identity: &Address, height: u64) -> Result<bool> {
        Ok(self.banned(height)?.binary_search(identity).is_ok())
    }

    /// Banned identities, sorted.
    pub fn banned(&self, height: u64) -> Result<Vec<Address>> {
        self.check_height(height)?;
        let banned: BTreeSet<Address> = self.load(StateKey::Banned, height)?;
        Ok(banned.into_iter().collect())
    }

    pub fn delegations_of(&self, delegator: &Address, height: u64) -> Result<Vec<Delegation>> {
        self.check_height(height)?;
        let store: DelegationStore = self.load(StateKey::Delegations, height)?;
        Ok(store.delegations_of(delegator))
    }

    pub fn validator(&self, address: &Address, height: u64) -> Result<Option<ValidatorRecord>> {
        Ok(self.load_validators(height)?.remove(address))
    }

    pub fn candidates(&self, height: u64) -> Result<Vec<ValidatorRecord>> {
        Ok(self.load_validators(height)?.into_values().collect())
    }

    fn load_validators(&self, height: u64) -> Result<BTreeMap<Address, ValidatorRecord>> {
        self.check_height(height)?;
        self.load(StateKey::Validators, height)
    }

    pub fn term_metadata(&self, height: u64) -> Result<Term> {
        self.check_height(height)?;
        self.load(StateKey::Term, height)
    }

    pub fn load_state(&self, height: u64) -> Result<ValidatorSetState> {
        self.check_height(height)?;
        Ok(ValidatorSetState {
            validators: self.load(StateKey::Validators, height)?,
            delegations: self.load(StateKey::Delegations, height)?,
            banned: self.load(StateKey::Banned, height)?,
            authorities: self.load(StateKey::Authorities, height)?,
            term: self.load(StateKey::Term, height)?,
        })
    }

    /// Opens a working copy for block `height`, which must be the next block.
    pub fn begin(&self, height: u64) -> Result<StagedValidatorSet> {
        let expected = self.best_block()? + 1;
        if height != expected {
            return Err(SentinelError::HeightMismatch { expected, got: height });
        }
        Ok(StagedValidatorSet::new(height, self.load_state(height)?))
    }

    /// Commits a staged block in one batch effective at `height + 1`.
    pub fn commit(&mut self, staged: StagedValidatorSet) -> Result<()> {
        let (height, state, dirty) = staged.into_parts();
        let expected = self.best_block()? + 1;
        if height != expected {
            return Err(SentinelError::HeightMismatch { expected, got: height });
        }

        let mut batch = Vec::with_capacity(dirty.len() + 1);
        for key in dirty {
            if key != StateKey::LastBlock {
                batch.push((key, encode_entity(&state, key, height)?));
            }
        }
        batch.push((StateKey::LastBlock, encode_entity(&state, StateKey::LastBlock, height)?));

        self.backend.write_batch(height + 1, &batch)?;
        debug!("Committed block {} ({} entities)", height, batch.len());
        Ok(())
    }

    /// Bans `identity` as a block of its own: staged, closed and committed in
    /// one step. The block still runs the term check, so a ban on a boundary
    /// block does not delay the next term.
    pub fn ban(&mut self, identity: &Address, scheduler: &TermScheduler, params: &ElectionParams) -> Result<BanStatus> {
        let mut staged = self.begin(self.best_block()? + 1)?;
        let status = staged.ban(identity)?;
        staged.close_block(scheduler, params);
        self.commit(staged)?;
        Ok(status)
    }
}

impl<B: StateBackend> AuthorResolver for ValidatorSetStore<B> {
    fn resolve(&self, index: u64, height: u64) -> Result<Option<AuthorKey>> {
        let authors = self.possible_authors(height)?;
        let Some(address) = usize::try_from(index).ok().and_then(|i| authors.get(i)) else {
            return Ok(None);
        };
        Ok(self.validator(address, height)?.map(|record| AuthorKey {
            address: record.address,
            public_key: record.public_key,
        }))
    }
}

fn encode_entity(state: &ValidatorSetState, key: StateKey, last_block: u64) -> Result<Vec<u8>> {
    let bytes = match key {
        StateKey::Validators => bincode::serialize(&state.validators)?,
        StateKey::Delegations => bincode::serialize(&state.delegations)?,
        StateKey::Banned => bincode::serialize(&state.banned)?,
        StateKey::Authorities => bincode::serialize(&state.authorities)?,
        StateKey::Term => bincode::serialize(&state.term)?,
        StateKey::LastBlock => bincode::serialize(&last_block)?,
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use sentinel_common::genesis::{GenesisDelegation, GenesisValidator};

    use super::*;
    use crate::core::storage::MemoryBackend;

    fn genesis(seeds: &[u8]) -> GenesisState {
        let validators: Vec<GenesisValidator> = seeds
            .iter()
            .map(|s| GenesisValidator {
                public_key: ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[*s; 32])),
                deposit: 10_000_000,
            })
            .collect();
        let delegations = validators
            .iter()
            .map(|v| GenesisDelegation {
                delegator: Address([0xAA; 20]),
                delegatee: v.address(),
                amount: 5_000,
            })
            .collect();
        GenesisState { validators, delegations }
    }

    fn store(seeds: &[u8]) -> ValidatorSetStore<MemoryBackend> {
        let mut store = ValidatorSetStore::new(MemoryBackend::new());
        store.init_genesis(&genesis(seeds), &ElectionParams::default()).unwrap();
        store
    }

    #[test]
    fn test_genesis_queries() {
        let store = store(&[1, 2, 3]);
        assert_eq!(store.best_block().unwrap(), 0);
        assert_eq!(store.possible_authors(0).unwrap().len(), 3);
        assert_eq!(store.possible_authors(1).unwrap().len(), 3);
        assert_eq!(store.term_metadata(1).unwrap(), Term::genesis());
        assert!(store.banned(1).unwrap().is_empty());
        assert_eq!(store.delegations_of(&Address([0xAA; 20]), 1).unwrap().len(), 3);
    }

    #[test]
    fn test_queries_past_next_block_fail() {
        let store = store(&[1]);
        assert!(matches!(
            store.possible_authors(2),
            Err(SentinelError::UnknownHeight { requested: 2, best: 0 })
        ));
    }

    #[test]
    fn test_genesis_twice_is_rejected() {
        let mut store = store(&[1]);
        assert!(store.init_genesis(&genesis(&[1]), &ElectionParams::default()).is_err());
    }

    #[test]
    fn test_store_ban_effective_next_block() {
        let mut store = store(&[1, 2, 3]);
        let target = store.possible_authors(1).unwrap()[0];

        let scheduler = TermScheduler::new(10);
        let params = ElectionParams::default();
        assert_eq!(store.ban(&target, &scheduler, &params).unwrap(), BanStatus::Applied);
        assert_eq!(store.best_block().unwrap(), 1);
        assert!(!store.is_banned(&target, 1).unwrap());
        assert!(store.is_banned(&target, 2).unwrap());
        assert_eq!(store.possible_authors(2).unwrap().len(), 2);

        let authors_after_first = store.possible_authors(2).unwrap();
        assert_eq!(store.ban(&target, &scheduler, &params).unwrap(), BanStatus::AlreadyBanned);
        assert_eq!(store.possible_authors(3).unwrap(), authors_after_first);
        assert_eq!(store.validator(&target, 3).unwrap().unwrap().delegated_stake, 0);
    }

    #[test]
    fn test_commit_rejects_wrong_height() {
        let mut store = store(&[1]);
        assert!(matches!(store.begin(2), Err(SentinelError::HeightMismatch { expected: 1, got: 2 })));
        let staged = store.begin(1).unwrap();
        store.commit(staged.clone()).unwrap();
        assert!(store.commit(staged).is_err());
    }

    #[test]
    fn test_resolver_out_of_range() {
        let store = store(&[1, 2]);
        assert!(store.resolve(0, 1).unwrap().is_some());
        assert!(store.resolve(2, 1).unwrap().is_none());
        assert!(store.resolve(u64::MAX, 1).unwrap().is_none());
    }
}
