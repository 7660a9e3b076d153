use std::fmt;

use sentinel_common::address::Address;
use sentinel_common::env::consensus::DoubleVoteEvidence;
use sentinel_common::env::vote_data::SignedVote;
use sentinel_ledger::{AuthorResolver, BanStatus, StagedValidatorSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::detector::{detect, Detection};

/// Progress of a double-vote report through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    Received,
    Decoding,
    DecodeFailed,
    Decoded,
    Verifying,
    VerifyFailed,
    Conflicting,
    Resolving,
    IdentityMismatch,
    Resolved,
    Applying,
    AlreadyBanned,
    Banned,
}

impl fmt::Display for ReportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    #[error("Malformed evidence: {0}")]
    Malformed(String),

    #[error("Vote signature does not verify")]
    SignatureInvalid,

    #[error("Votes do not conflict")]
    NotConflicting,

    #[error("Votes name different signers")]
    IdentityMismatch,

    #[error("Evidence at height {evidence_height} is ahead of block {current_height}")]
    FutureEvidence { evidence_height: u64, current_height: u64 },

    #[error("Store error: {0}")]
    Store(String),
}

impl EvidenceError {
    /// Stage at which the report stopped.
    pub fn stage(&self) -> ReportStage {
        match self {
            EvidenceError::Malformed(_) => ReportStage::DecodeFailed,
            EvidenceError::FutureEvidence { .. } => ReportStage::Decoded,
            EvidenceError::NotConflicting => ReportStage::Conflicting,
            EvidenceError::IdentityMismatch => ReportStage::IdentityMismatch,
            EvidenceError::Store(_) => ReportStage::Resolving,
            EvidenceError::SignatureInvalid => ReportStage::VerifyFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Banned(Address),
    AlreadyBanned(Address),
    Rejected(EvidenceError),
}

impl ReportOutcome {
    pub fn stage(&self) -> ReportStage {
        match self {
            ReportOutcome::Banned(_) => ReportStage::Banned,
            ReportOutcome::AlreadyBanned(_) => ReportStage::AlreadyBanned,
            ReportOutcome::Rejected(err) => err.stage(),
        }
    }
}

fn enter(stage: ReportStage) {
    debug!("double-vote report: {}", stage);
}

/// Validates a double-vote report and bans the offender on `staged`.
///
/// `message1` and `message2` are RLP-encoded [`SignedVote`]s. Signer indices
/// resolve through `resolver` at the votes' height, which must not be above
/// the block being executed. A rejected report leaves `staged` untouched.
pub fn apply_double_vote_report<R: AuthorResolver + ?Sized>(
    message1: &[u8],
    message2: &[u8],
    staged: &mut StagedValidatorSet,
    resolver: &R,
) -> ReportOutcome {
    let outcome = match run_report(message1, message2, staged, resolver) {
        Ok(outcome) => outcome,
        Err(err) => ReportOutcome::Rejected(err),
    };

    match &outcome {
        ReportOutcome::Banned(id) => info!("⚔️ Double vote by {} punished at block {}", id, staged.height()),
        ReportOutcome::AlreadyBanned(id) => info!("Double vote by {} reported again; already banned", id),
        ReportOutcome::Rejected(err) => warn!("❌ Double-vote report rejected at {}: {}", err.stage(), err),
    }
    outcome
}

fn run_report<R: AuthorResolver + ?Sized>(
    message1: &[u8],
    message2: &[u8],
    staged: &mut StagedValidatorSet,
    resolver: &R,
) -> Result<ReportOutcome, EvidenceError> {
    enter(ReportStage::Received);

    enter(ReportStage::Decoding);
    let vote1 = SignedVote::from_rlp(message1).map_err(|e| EvidenceError::Malformed(format!("message1: {}", e)))?;
    let vote2 = SignedVote::from_rlp(message2).map_err(|e| EvidenceError::Malformed(format!("message2: {}", e)))?;
    let evidence = DoubleVoteEvidence::new(vote1, vote2);
    enter(ReportStage::Decoded);

    let evidence_height = evidence.max_height();
    if evidence_height > staged.height() {
        return Err(EvidenceError::FutureEvidence {
            evidence_height,
            current_height: staged.height(),
        });
    }

    enter(ReportStage::Verifying);
    let detection = detect(&evidence.vote_a, &evidence.vote_b, resolver).map_err(|e| EvidenceError::Store(e.to_string()))?;
    let offender = match detection {
        Detection::Genuine(offender) => offender,
        Detection::NotConflicting | Detection::DifferentHeight => return Err(EvidenceError::NotConflicting),
        Detection::IdentityMismatch => return Err(EvidenceError::IdentityMismatch),
        Detection::SignatureInvalid => return Err(EvidenceError::SignatureInvalid),
    };
    enter(ReportStage::Resolved);

    enter(ReportStage::Applying);
    match staged.ban(&offender).map_err(|e| EvidenceError::Store(e.to_string()))? {
        BanStatus::Applied => {
            enter(ReportStage::Banned);
            Ok(ReportOutcome::Banned(offender))
        }
        BanStatus::AlreadyBanned => {
            enter(ReportStage::AlreadyBanned);
            Ok(ReportOutcome::AlreadyBanned(offender))
        }
    }
}
