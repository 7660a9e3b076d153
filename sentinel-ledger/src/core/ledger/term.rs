use serde::{Deserialize, Serialize};
use tracing::debug;

/// A contiguous range of heights with a fixed authority ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub first_block: u64,
    pub last_finished_block: u64,
}

impl Term {
    pub fn genesis() -> Self {
        Self::default()
    }

    /// Term that starts right after `closing_height`.
    pub fn next(&self, closing_height: u64) -> Self {
        Self {
            id: self.id + 1,
            first_block: closing_height + 1,
            last_finished_block: closing_height,
        }
    }
}

/// External term-close trigger, e.g. a chain-specific clock or governance hook.
pub trait BoundarySignal: Send + Sync {
    fn is_boundary(&self, height: u64) -> bool;
}

/// Decides when a term closes.
pub struct TermScheduler {
    term_length: u64,
    signal: Option<Box<dyn BoundarySignal>>,
}

impl std::fmt::Debug for TermScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermScheduler")
            .field("term_length", &self.term_length)
            .field("signal", &self.signal.is_some())
            .finish()
    }
}

impl TermScheduler {
    pub fn new(term_length: u64) -> Self {
        Self {
            term_length: term_length.max(1),
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: Box<dyn BoundarySignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn term_length(&self) -> u64 {
        self.term_length
    }

    /// Whether block `height` is the last block of `current`.
    pub fn is_term_boundary(&self, height: u64, current: &Term) -> bool {
        let elapsed = height.saturating_sub(current.first_block) + 1;
        if elapsed >= self.term_length {
            debug!("Term {} closes at height {} (length reached)", current.id, height);
            return true;
        }
        match &self.signal {
            Some(signal) if signal.is_boundary(height) => {
                debug!("Term {} closes at height {} (external signal)", current.id, height);
                true
            }
            _ => false,
        }
    }
}
