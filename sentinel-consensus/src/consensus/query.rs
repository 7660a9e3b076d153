use sentinel_common::address::Address;
use sentinel_common::error::Result;
use sentinel_ledger::{Delegation, StateBackend, Term, ValidatorRecord, ValidatorSetStore};

/// Read-only queries over the validator set. Every `block` argument names the
/// height whose effective state is read.
pub struct QueryService<'a, B: StateBackend> {
    store: &'a ValidatorSetStore<B>,
}

impl<'a, B: StateBackend> QueryService<'a, B> {
    pub fn new(store: &'a ValidatorSetStore<B>) -> Self {
        Self { store }
    }

    pub fn best_block(&self) -> Result<u64> {
        self.store.best_block()
    }

    pub fn possible_authors(&self, block: u64) -> Result<Vec<Address>> {
        self.store.possible_authors(block)
    }

    pub fn get_banned(&self, block: u64) -> Result<Vec<Address>> {
        self.store.banned(block)
    }

    pub fn get_delegations(&self, delegator: &Address, block: u64) -> Result<Vec<Delegation>> {
        self.store.delegations_of(delegator, block)
    }

    pub fn get_term_metadata(&self, block: u64) -> Result<Term> {
        self.store.term_metadata(block)
    }

    pub fn get_validator(&self, address: &Address, block: u64) -> Result<Option<ValidatorRecord>> {
        self.store.validator(address, block)
    }

    pub fn get_candidates(&self, block: u64) -> Result<Vec<ValidatorRecord>> {
        self.store.candidates(block)
    }
}
