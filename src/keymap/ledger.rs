//! Capacity ledger
//!
//! Tracks how many device bytes the stored keys and values consume. Always
//! mutated together with the key map, under the same lock.

use crate::error::{KvError, KvResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLedger {
    /// 0 means unlimited
    capacity: u64,
    used: u64,
}

impl CapacityLedger {
    pub fn new(capacity: u64) -> Self {
        Self { capacity, used: 0 }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn is_bounded(&self) -> bool {
        self.capacity != 0
    }

    /// Bytes still free. Unlimited devices report `u64::MAX`.
    pub fn available(&self) -> u64 {
        if self.is_bounded() {
            self.capacity.saturating_sub(self.used)
        } else {
            u64::MAX
        }
    }

    /// Fail with `DevCapacity` unless `bytes` more would fit
    pub fn ensure_fits(&self, bytes: u64) -> KvResult<()> {
        let available = self.available();
        if bytes > available {
            return Err(KvError::DevCapacity {
                required: bytes,
                available,
            });
        }
        Ok(())
    }

    pub fn charge(&mut self, bytes: u64) {
        self.used += bytes;
    }

    pub fn refund(&mut self, bytes: u64) {
        debug_assert!(bytes <= self.used, "refund exceeds charged bytes");
        self.used = self.used.saturating_sub(bytes);
    }

    /// Forget all consumption (purge)
    pub fn reset(&mut self) {
        self.used = 0;
    }
}
