use serde::Serialize;
use sentinel_common::address::Address;
use sentinel_common::error::{Result, SentinelError};
use sentinel_common::genesis::GenesisState;
use sentinel_common::transaction::CustomTransaction;
use sentinel_consensus::{BlockExecutor, BlockReceipt};
use sentinel_ledger::{MemoryBackend, RedbBackend, StateBackend, ValidatorSetStore};
use tracing::info;

use crate::config::{BackendKind, NodeConfig};

/// What a `query` call reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    BestBlock,
    Authors,
    Banned,
    Delegations,
    Term,
    Validator,
    Candidates,
}

/// A validator-set node backed by the configured store.
pub struct Node {
    executor: BlockExecutor<Box<dyn StateBackend>>,
}

impl Node {
    pub fn open(config: &NodeConfig) -> Result<Self> {
        let backend: Box<dyn StateBackend> = match config.backend {
            BackendKind::Memory => Box::new(MemoryBackend::new()),
            BackendKind::Redb => Box::new(RedbBackend::open(&config.data_dir)?),
        };
        let store = ValidatorSetStore::new(backend);
        Ok(Self {
            executor: BlockExecutor::new(store, config.election.clone()),
        })
    }

    pub fn init(&mut self, genesis: &GenesisState) -> Result<()> {
        let params = self.executor.params().clone();
        self.executor.store_mut().init_genesis(genesis, &params)
    }

    /// Executes the next block, or `height` if given (must be the next one).
    pub fn execute(&mut self, height: Option<u64>, transactions: &[CustomTransaction]) -> Result<BlockReceipt> {
        let height = match height {
            Some(height) => height,
            None => self.executor.store().best_block()? + 1,
        };
        info!("Executing block {} with {} transactions", height, transactions.len());
        self.executor.execute_block(height, transactions)
    }

    /// Runs a query as JSON. `block` defaults to the next block, whose state
    /// is the one currently in effect.
    pub fn query(&self, kind: QueryKind, address: Option<Address>, block: Option<u64>) -> Result<serde_json::Value> {
        let query = self.executor.query();
        let block = match block {
            Some(block) => block,
            None => query.best_block()? + 1,
        };
        let address = || address.ok_or_else(|| SentinelError::Config("--address is required for this query".to_string()));

        match kind {
            QueryKind::BestBlock => to_json(&query.best_block()?),
            QueryKind::Authors => to_json(&query.possible_authors(block)?),
            QueryKind::Banned => to_json(&query.get_banned(block)?),
            QueryKind::Delegations => to_json(&query.get_delegations(&address()?, block)?),
            QueryKind::Term => to_json(&query.get_term_metadata(block)?),
            QueryKind::Validator => to_json(&query.get_validator(&address()?, block)?),
            QueryKind::Candidates => to_json(&query.get_candidates(block)?),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
