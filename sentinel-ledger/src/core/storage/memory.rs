use std::collections::BTreeMap;

use sentinel_common::error::Result;

use super::{StateBackend, StateKey};

/// In-memory backend used by tests and the `memory` node backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<(StateKey, u64), Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateBackend for MemoryBackend {
    fn get(&self, key: StateKey, height: u64) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .range((key, 0)..=(key, height))
            .next_back()
            .map(|(_, value)| value.clone()))
    }

    fn write_batch(&mut self, height: u64, batch: &[(StateKey, Vec<u8>)]) -> Result<()> {
        for (key, value) in batch {
            self.entries.insert((*key, height), value.clone());
        }
        Ok(())
    }
}
