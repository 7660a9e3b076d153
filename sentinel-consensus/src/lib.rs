pub mod consensus;

pub use consensus::banning::{apply_double_vote_report, EvidenceError, ReportOutcome, ReportStage};
pub use consensus::detector::{detect, Detection};
pub use consensus::engine::{BlockExecutor, BlockReceipt, TxOutcome, TxReceipt};
pub use consensus::query::QueryService;
pub use consensus::stake::{ActionEffect, ActionHandler, HandlerError, StakeAction, StakeHandler, STAKE_HANDLER_ID};
