use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sentinel_common::address::Address;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;

use crate::core::ledger::errors::StakeError;
use crate::core::ledger::term::Term;

/// A single stake assignment from a delegator to a validator candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: Address,
    pub delegatee: Address,
    pub amount: u64,
}

/// Stores delegation information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationStore {
    // Delegator -> Delegatee -> Amount
    delegations: BTreeMap<Address, BTreeMap<Address, u64>>,
}

impl DelegationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delegate(&mut self, delegator: Address, delegatee: Address, amount: u64) -> Result<(), StakeError> {
        let current = self
            .delegations
            .entry(delegator)
            .or_default()
            .entry(delegatee)
            .or_default();
        *current = current.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(())
    }

    pub fn undelegate(&mut self, delegator: &Address, delegatee: &Address, amount: u64) -> Result<(), StakeError> {
        let has = self.amount(delegator, delegatee);
        if has < amount {
            return Err(StakeError::InsufficientDelegation { has, requested: amount });
        }

        if let Some(user_delegations) = self.delegations.get_mut(delegator) {
            if has == amount {
                user_delegations.remove(delegatee);
            } else if let Some(current) = user_delegations.get_mut(delegatee) {
                *current -= amount;
            }
            if user_delegations.is_empty() {
                self.delegations.remove(delegator);
            }
        }
        Ok(())
    }

    pub fn amount(&self, delegator: &Address, delegatee: &Address) -> u64 {
        self.delegations
            .get(delegator)
            .and_then(|d| d.get(delegatee))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of every delegation pointing at `delegatee`.
    pub fn delegated_power(&self, delegatee: &Address) -> u64 {
        self.delegations
            .values()
            .filter_map(|d| d.get(delegatee))
            .fold(0u64, |acc, amount| acc.saturating_add(*amount))
    }

    /// Delegations made by `delegator`, ordered by delegatee.
    pub fn delegations_of(&self, delegator: &Address) -> Vec<Delegation> {
        self.delegations
            .get(delegator)
            .map(|d| {
                d.iter()
                    .map(|(delegatee, amount)| Delegation {
                        delegator: *delegator,
                        delegatee: *delegatee,
                        amount: *amount,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every delegation whose delegatee is `delegatee`. The stake is not
    /// redirected. Returns what was removed.
    pub fn remove_delegatee(&mut self, delegatee: &Address) -> Vec<Delegation> {
        let mut removed = Vec::new();
        let mut emptied = Vec::new();

        // O(N) over delegators.
        for (delegator, investments) in self.delegations.iter_mut() {
            if let Some(amount) = investments.remove(delegatee) {
                removed.push(Delegation {
                    delegator: *delegator,
                    delegatee: *delegatee,
                    amount,
                });
                if investments.is_empty() {
                    emptied.push(*delegator);
                }
            }
        }

        for delegator in emptied {
            self.delegations.remove(&delegator);
        }
        removed
    }

    pub fn all(&self) -> Vec<Delegation> {
        self.delegations
            .keys()
            .flat_map(|delegator| self.delegations_of(delegator))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }
}

/// A validator candidate. Created on self-nomination, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub address: Address,
    pub public_key: ValidatorPublicKey,
    pub delegated_stake: u64,
    pub deposit: u64,
    pub banned: bool,
    pub nominated_at: u64,
}

impl ValidatorRecord {
    pub fn new(public_key: ValidatorPublicKey, deposit: u64, nominated_at: u64) -> Self {
        Self {
            address: Address::from_public_key(&public_key),
            public_key,
            delegated_stake: 0,
            deposit,
            banned: false,
            nominated_at,
        }
    }
}

/// Full validator-set state effective at one height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetState {
    pub validators: BTreeMap<Address, ValidatorRecord>,
    pub delegations: DelegationStore,
    pub banned: BTreeSet<Address>,
    /// Elected authorities in rank order.
    pub authorities: Vec<Address>,
    pub term: Term,
}

impl ValidatorSetState {
    /// Authorities minus banned identities, rank order preserved.
    pub fn possible_authors(&self) -> Vec<Address> {
        self.authorities
            .iter()
            .filter(|a| !self.banned.contains(*a))
            .copied()
            .collect()
    }

    pub fn is_banned(&self, identity: &Address) -> bool {
        self.banned.contains(identity)
    }
}
