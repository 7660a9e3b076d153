pub mod memory;
pub mod redb_backend;

pub use memory::MemoryBackend;
pub use redb_backend::RedbBackend;

use sentinel_common::error::Result;

/// Entities persisted per height.
///
/// Every entity is written at the height from which it becomes effective and
/// read back as the latest value written at or below the requested height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    Validators,
    Delegations,
    Banned,
    Authorities,
    Term,
    LastBlock,
}

impl StateKey {
    pub const ALL: [StateKey; 6] = [
        StateKey::Validators,
        StateKey::Delegations,
        StateKey::Banned,
        StateKey::Authorities,
        StateKey::Term,
        StateKey::LastBlock,
    ];

    pub fn tag(self) -> u8 {
        match self {
            StateKey::Validators => 1,
            StateKey::Delegations => 2,
            StateKey::Banned => 3,
            StateKey::Authorities => 4,
            StateKey::Term => 5,
            StateKey::LastBlock => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StateKey::Validators => "validators",
            StateKey::Delegations => "delegations",
            StateKey::Banned => "banned",
            StateKey::Authorities => "authorities",
            StateKey::Term => "term",
            StateKey::LastBlock => "last_block",
        }
    }
}

/// Height-versioned key/value storage.
pub trait StateBackend {
    /// Latest value of `key` written at a height `<= height`.
    fn get(&self, key: StateKey, height: u64) -> Result<Option<Vec<u8>>>;

    /// Writes every entry of `batch` at `height`. Either all entries become
    /// visible or none do.
    fn write_batch(&mut self, height: u64, batch: &[(StateKey, Vec<u8>)]) -> Result<()>;
}

impl<B: StateBackend + ?Sized> StateBackend for Box<B> {
    fn get(&self, key: StateKey, height: u64) -> Result<Option<Vec<u8>>> {
        (**self).get(key, height)
    }

    fn write_batch(&mut self, height: u64, batch: &[(StateKey, Vec<u8>)]) -> Result<()> {
        (**self).write_batch(height, batch)
    }
}
