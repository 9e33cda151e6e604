//! KeyMap Module
//!
//! The emulated device's storage: an ordered map of owned keys to owned
//! values plus the capacity ledger that accounts for them.
//!
//! ## Responsibilities
//! - Own a private copy of every stored key
//! - Keep keys ordered so group prefixes form contiguous runs
//! - Charge/refund `key.len + value.len` on every insert/overwrite/removal
//!
//! ## Locking
//! `MapState` has no interior locking. The engine wraps it in a single
//! mutex, so the map and the ledger always change together.

mod ledger;
mod table;

pub use ledger::CapacityLedger;
pub use table::KeyMap;

use crate::error::{KvError, KvResult};
use crate::group::GroupCondition;
use crate::options::StoreOption;

/// Bytes an entry occupies on the device
pub fn entry_size(key: &[u8], value: &[u8]) -> u64 {
    (key.len() + value.len()) as u64
}

/// Result of a successful store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    /// New key; `consumed` = key + value bytes
    Inserted { consumed: u64 },

    /// Existing key overwritten; `consumed` = new value bytes
    Updated { consumed: u64 },
}

impl Stored {
    pub fn consumed(&self) -> u64 {
        match *self {
            Stored::Inserted { consumed } | Stored::Updated { consumed } => consumed,
        }
    }
}

/// Key map and capacity ledger, guarded together by the engine's map lock
#[derive(Debug)]
pub struct MapState {
    pub table: KeyMap,
    pub ledger: CapacityLedger,
}

impl MapState {
    pub fn new(capacity: u64) -> Self {
        Self {
            table: KeyMap::new(),
            ledger: CapacityLedger::new(capacity),
        }
    }

    /// Insert or overwrite. No state changes unless every check passes.
    pub fn store(&mut self, key: &[u8], value: &[u8], option: StoreOption) -> KvResult<Stored> {
        match self.table.get(key).map(<[u8]>::len) {
            Some(_) if option == StoreOption::Idempotent => Err(KvError::KeyExist),
            Some(old_len) => {
                let new_len = value.len();
                if new_len > old_len {
                    self.ledger.ensure_fits((new_len - old_len) as u64)?;
                }
                self.table.overwrite(key, value);
                self.ledger.refund(old_len as u64);
                self.ledger.charge(new_len as u64);
                Ok(Stored::Updated {
                    consumed: new_len as u64,
                })
            }
            None => {
                let size = entry_size(key, value);
                self.ledger.ensure_fits(size)?;
                self.table.insert(key, value);
                self.ledger.charge(size);
                Ok(Stored::Inserted { consumed: size })
            }
        }
    }

    /// Remove a key, returning the bytes it occupied
    pub fn remove(&mut self, key: &[u8]) -> Option<u64> {
        let value = self.table.remove(key)?;
        let size = entry_size(key, &value);
        self.ledger.refund(size);
        Some(size)
    }

    /// Remove the contiguous run of keys matching `cond`, starting at its
    /// seek key. Returns (entries removed, bytes recovered).
    pub fn remove_group(&mut self, cond: &GroupCondition) -> (usize, u64) {
        let mut cursor = cond.seek_key();
        let mut removed = 0;
        let mut recovered = 0;

        loop {
            let key = match self.table.lower_bound(&cursor) {
                Some((k, _)) if cond.matches(k) => k.to_vec(),
                _ => break,
            };
            if let Some(size) = self.remove(&key) {
                removed += 1;
                recovered += size;
            }
            cursor = key;
        }

        (removed, recovered)
    }

    /// Drop every entry and reset the ledger
    pub fn purge(&mut self) -> usize {
        self.ledger.reset();
        self.table.clear()
    }
}
