use std::collections::BTreeSet;

use sentinel_common::address::Address;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;
use tracing::info;

use crate::core::ledger::election::{elect, ElectionParams};
use crate::core::ledger::errors::StakeError;
use crate::core::ledger::state::{ValidatorRecord, ValidatorSetState};
use crate::core::ledger::term::{Term, TermScheduler};
use crate::core::storage::StateKey;

/// Result of a ban request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanStatus {
    Applied,
    AlreadyBanned,
}

/// Snapshot taken before a transaction so it can be undone on failure.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    state: ValidatorSetState,
    dirty: BTreeSet<StateKey>,
}

/// Working copy of the validator set for the block being executed.
///
/// Mutations stay local until the owning store commits the whole set as one
/// batch effective at `height + 1`.
#[derive(Debug, Clone)]
pub struct StagedValidatorSet {
    height: u64,
    state: ValidatorSetState,
    dirty: BTreeSet<StateKey>,
}

impl StagedValidatorSet {
    pub fn new(height: u64, state: ValidatorSetState) -> Self {
        Self {
            height,
            state,
            dirty: BTreeSet::new(),
        }
    }

    /// Height of the block this set is staged for.
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn state(&self) -> &ValidatorSetState {
        &self.state
    }

    pub fn dirty(&self) -> &BTreeSet<StateKey> {
        &self.dirty
    }

    pub fn is_banned(&self, identity: &Address) -> bool {
        self.state.is_banned(identity)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            dirty: self.dirty.clone(),
        }
    }

    pub fn revert(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.dirty = checkpoint.dirty;
    }

    fn touch(&mut self, keys: &[StateKey]) {
        self.dirty.extend(keys.iter().copied());
    }

    /// Registers `sender` as a candidate, or tops up its deposit.
    pub fn self_nominate(
        &mut self,
        sender: &Address,
        public_key: ValidatorPublicKey,
        deposit: u64,
    ) -> Result<(), StakeError> {
        let derived = Address::from_public_key(&public_key);
        if derived != *sender {
            return Err(StakeError::AddressMismatch { sender: *sender, derived });
        }
        if self.state.banned.contains(sender) {
            return Err(StakeError::Banned(*sender));
        }
        if deposit == 0 {
            return Err(StakeError::ZeroAmount);
        }

        match self.state.validators.get_mut(sender) {
            Some(record) => {
                record.deposit = record.deposit.checked_add(deposit).ok_or(StakeError::Overflow)?;
            }
            None => {
                let record = ValidatorRecord::new(public_key, deposit, self.height);
                self.state.validators.insert(*sender, record);
                info!("New validator candidate {} at height {}", sender, self.height);
            }
        }
        self.touch(&[StateKey::Validators]);
        Ok(())
    }

    pub fn delegate(&mut self, delegator: &Address, delegatee: &Address, amount: u64) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        if self.state.banned.contains(delegatee) {
            return Err(StakeError::Banned(*delegatee));
        }
        let record = self
            .state
            .validators
            .get_mut(delegatee)
            .ok_or(StakeError::NotCandidate(*delegatee))?;

        let stake = record.delegated_stake.checked_add(amount).ok_or(StakeError::Overflow)?;
        self.state.delegations.delegate(*delegator, *delegatee, amount)?;
        record.delegated_stake = stake;

        self.touch(&[StateKey::Validators, StateKey::Delegations]);
        Ok(())
    }

    pub fn revoke(&mut self, delegator: &Address, delegatee: &Address, amount: u64) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        self.state.delegations.undelegate(delegator, delegatee, amount)?;
        if let Some(record) = self.state.validators.get_mut(delegatee) {
            record.delegated_stake = record.delegated_stake.saturating_sub(amount);
        }

        self.touch(&[StateKey::Validators, StateKey::Delegations]);
        Ok(())
    }

    /// Bans `identity` for good.
    ///
    /// Marks the record banned with zero delegated stake, drops every
    /// delegation to it, removes it from the authority list and adds it to
    /// the banned set. Banning twice is a no-op.
    pub fn ban(&mut self, identity: &Address) -> Result<BanStatus, StakeError> {
        if self.state.banned.contains(identity) {
            return Ok(BanStatus::AlreadyBanned);
        }
        let record = self
            .state
            .validators
            .get_mut(identity)
            .ok_or(StakeError::UnknownValidator(*identity))?;

        record.banned = true;
        record.delegated_stake = 0;
        let removed = self.state.delegations.remove_delegatee(identity);
        self.state.authorities.retain(|a| a != identity);
        self.state.banned.insert(*identity);

        self.touch(&[
            StateKey::Validators,
            StateKey::Delegations,
            StateKey::Banned,
            StateKey::Authorities,
        ]);

        info!(
            "🚫 Banned {} at height {} ({} delegations removed)",
            identity,
            self.height,
            removed.len()
        );
        Ok(BanStatus::Applied)
    }

    /// Runs the end-of-block term check. Returns the new term when the block
    /// closed the current one.
    pub fn close_block(&mut self, scheduler: &TermScheduler, params: &ElectionParams) -> Option<Term> {
        let current = self.state.term;
        if !scheduler.is_term_boundary(self.height, &current) {
            return None;
        }

        let next = current.next(self.height);
        let authorities = elect(&self.state, params);
        info!(
            "Term {} starts at height {} with {} authorities",
            next.id,
            next.first_block,
            authorities.len()
        );

        self.state.authorities = authorities;
        self.state.term = next;
        self.touch(&[StateKey::Authorities, StateKey::Term]);
        Some(next)
    }

    pub fn into_parts(self) -> (u64, ValidatorSetState, BTreeSet<StateKey>) {
        (self.height, self.state, self.dirty)
    }
}
