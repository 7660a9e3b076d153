use std::fmt;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use sentinel_common::error::{Result, SentinelError};

use super::{StateBackend, StateKey};

const STATE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("validator_state");

fn storage_err<E: fmt::Display>(e: E) -> SentinelError {
    SentinelError::Storage(e.to_string())
}

/// `[tag][height big-endian]` so a range scan walks one entity in height order.
fn encode_key(key: StateKey, height: u64) -> [u8; 9] {
    let mut out = [0u8; 9];
    out[0] = key.tag();
    out[1..].copy_from_slice(&height.to_be_bytes());
    out
}

/// Persistent backend stored in a single redb file under the data dir.
pub struct RedbBackend {
    db: Database,
}

impl fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbBackend")
            .field("db", &"Redb")
            .finish()
    }
}

impl RedbBackend {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let path = data_dir.as_ref().join("state.redb");

        let db = Database::create(path).map_err(storage_err)?;

        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _table = write_txn.open_table(STATE_TABLE).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(Self { db })
    }
}

impl StateBackend for RedbBackend {
    fn get(&self, key: StateKey, height: u64) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(STATE_TABLE).map_err(storage_err)?;

        let lo = encode_key(key, 0);
        let hi = encode_key(key, height);
        let mut range = table
            .range::<&[u8]>(lo.as_slice()..=hi.as_slice())
            .map_err(storage_err)?;

        let found = match range.next_back() {
            Some(entry) => {
                let (_key, value) = entry.map_err(storage_err)?;
                Some(value.value().to_vec())
            }
            None => None,
        };
        Ok(found)
    }

    fn write_batch(&mut self, height: u64, batch: &[(StateKey, Vec<u8>)]) -> Result<()> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(STATE_TABLE).map_err(storage_err)?;
            for (key, value) in batch {
                let encoded = encode_key(*key, height);
                table
                    .insert(encoded.as_slice(), value.as_slice())
                    .map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redb_versioned_reads() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = RedbBackend::open(dir.path()).unwrap();

        backend
            .write_batch(0, &[(StateKey::Authorities, vec![1]), (StateKey::LastBlock, vec![0])])
            .unwrap();
        backend.write_batch(12, &[(StateKey::Authorities, vec![2])]).unwrap();

        assert_eq!(backend.get(StateKey::Authorities, 11).unwrap(), Some(vec![1]));
        assert_eq!(backend.get(StateKey::Authorities, 12).unwrap(), Some(vec![2]));
        assert_eq!(backend.get(StateKey::LastBlock, 12).unwrap(), Some(vec![0]));
        assert_eq!(backend.get(StateKey::Banned, 12).unwrap(), None);
    }

    #[test]
    fn test_redb_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut backend = RedbBackend::open(dir.path()).unwrap();
            backend.write_batch(3, &[(StateKey::Term, vec![7])]).unwrap();
        }
        let backend = RedbBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get(StateKey::Term, 4).unwrap(), Some(vec![7]));
        assert_eq!(backend.get(StateKey::Term, 2).unwrap(), None);
    }

    #[test]
    fn test_key_order_is_height_order() {
        assert!(encode_key(StateKey::Term, 255) < encode_key(StateKey::Term, 256));
        assert!(encode_key(StateKey::Validators, u64::MAX) < encode_key(StateKey::Delegations, 0));
    }
}
