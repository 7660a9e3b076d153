pub mod core;

pub use crate::core::ledger::election::{elect, rank_candidates, ElectionParams};
pub use crate::core::ledger::errors::StakeError;
pub use crate::core::ledger::staged::{BanStatus, Checkpoint, StagedValidatorSet};
pub use crate::core::ledger::state::{Delegation, DelegationStore, ValidatorRecord, ValidatorSetState};
pub use crate::core::ledger::term::{BoundarySignal, Term, TermScheduler};
pub use crate::core::ledger::validator_set::{AuthorKey, AuthorResolver, ValidatorSetStore};
pub use crate::core::storage::{MemoryBackend, RedbBackend, StateBackend, StateKey};
