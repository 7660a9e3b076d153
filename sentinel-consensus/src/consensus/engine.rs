use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sentinel_common::crypto::hash::H256;
use sentinel_common::error::Result;
use sentinel_common::transaction::CustomTransaction;
use sentinel_ledger::{ElectionParams, StagedValidatorSet, StateBackend, Term, TermScheduler, ValidatorSetStore};
use tracing::{info, warn};

use super::query::QueryService;
use super::stake::handler::{ActionEffect, ActionHandler, HandlerError, StakeHandler};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxOutcome {
    Success { effect: ActionEffect },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: H256,
    #[serde(flatten)]
    pub outcome: TxOutcome,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TxOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReceipt {
    pub height: u64,
    pub transactions: Vec<TxReceipt>,
    /// Set when this block closed a term.
    pub new_term: Option<Term>,
}

/// Runs blocks of custom transactions against the validator set.
///
/// Every transaction executes behind a checkpoint and is reverted alone on
/// failure. The block commits as one batch effective at `height + 1`.
pub struct BlockExecutor<B: StateBackend> {
    store: ValidatorSetStore<B>,
    scheduler: TermScheduler,
    params: ElectionParams,
    handlers: BTreeMap<u64, Box<dyn ActionHandler>>,
}

impl<B: StateBackend> BlockExecutor<B> {
    /// Executor with the stake handler registered and a length-only scheduler.
    pub fn new(store: ValidatorSetStore<B>, params: ElectionParams) -> Self {
        let mut executor = Self {
            store,
            scheduler: TermScheduler::new(params.term_length),
            params,
            handlers: BTreeMap::new(),
        };
        executor.register_handler(Box::new(StakeHandler));
        executor
    }

    pub fn with_scheduler(mut self, scheduler: TermScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn register_handler(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(handler.handler_id(), handler);
    }

    pub fn store(&self) -> &ValidatorSetStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ValidatorSetStore<B> {
        &mut self.store
    }

    pub fn params(&self) -> &ElectionParams {
        &self.params
    }

    pub fn query(&self) -> QueryService<'_, B> {
        QueryService::new(&self.store)
    }

    pub fn execute_block(&mut self, height: u64, transactions: &[CustomTransaction]) -> Result<BlockReceipt> {
        let mut staged = self.store.begin(height)?;

        let mut receipts = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let checkpoint = staged.checkpoint();
            let outcome = match self.execute_transaction(tx, &mut staged) {
                Ok(effect) => TxOutcome::Success { effect },
                Err(err) => {
                    staged.revert(checkpoint);
                    warn!("Transaction {} in block {} reverted: {}", tx.hash(), height, err);
                    TxOutcome::Failed { reason: err.to_string() }
                }
            };
            receipts.push(TxReceipt {
                tx_hash: tx.hash(),
                outcome,
            });
        }

        let new_term = staged.close_block(&self.scheduler, &self.params);
        self.store.commit(staged)?;

        let succeeded = receipts.iter().filter(|r| r.is_success()).count();
        info!(
            "📦 Block {} executed: {}/{} transactions applied",
            height,
            succeeded,
            receipts.len()
        );

        Ok(BlockReceipt {
            height,
            transactions: receipts,
            new_term,
        })
    }

    fn execute_transaction(
        &self,
        tx: &CustomTransaction,
        staged: &mut StagedValidatorSet,
    ) -> std::result::Result<ActionEffect, HandlerError> {
        tx.validate_stateless().map_err(HandlerError::Invalid)?;
        let handler = self
            .handlers
            .get(&tx.handler_id)
            .ok_or(HandlerError::UnknownHandler(tx.handler_id))?;
        handler.execute(tx, staged, &self.store)
    }
}
