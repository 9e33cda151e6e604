//! Engine Module
//!
//! The emulated KV-SSD controller that coordinates all components.
//!
//! ## Responsibilities
//! - Point operations: store, retrieve, exist, delete, purge
//! - Group operations: iterators and grouped delete
//! - Capacity accounting
//! - Simulated device latency

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{KvError, KvResult};
use crate::group::GroupCondition;
use crate::iterator::{
    fill_batch, step, IterEntry, IterList, IterState, IteratorHandle, IteratorInfo,
    IteratorRegistry, SharedIter,
};
use crate::keymap::{MapState, Stored};
use crate::latency::{DeadlineTimer, IopsModel, LatencyModel, OpKind};
use crate::options::{IteratorMode, PurgeOption, StoreOption};

/// Completion callback a queue layer would register
pub type InterruptHandler = Box<dyn Fn() + Send + Sync>;

/// In-memory KV-SSD emulator
///
/// ## Concurrency Model: two independent locks
///
/// - **Map lock** (`map`): key map + capacity ledger. Held only while a
///   single operation traverses or mutates the map.
/// - **Registry lock** (`iterators`): the set of open iterators. Held only
///   to open, close, list, or resolve a handle.
///
/// No call holds both. An iterator step resolves its handle under the
/// registry lock, drops it, then locks the iterator's own state followed by
/// the map lock.
///
/// Simulated latency is paid after the map lock is released: the start
/// instant is marked before locking, and the caller blocks until
/// `expected_latency - queue_latency` has elapsed since then.
pub struct KvEmulator {
    /// Emulator configuration
    config: Config,

    /// Key map and capacity ledger
    map: Mutex<MapState>,

    /// Open iterators
    iterators: Mutex<IteratorRegistry>,

    /// Expected latency per operation
    latency: Box<dyn LatencyModel>,

    timer: DeadlineTimer,

    /// Subtracted from every simulated wait (time already spent queueing)
    queue_latency_ns: AtomicU64,

    /// Map operations served
    op_count: AtomicU64,
}

impl KvEmulator {
    /// Create an emulator using the polynomial IOPS model from the config
    pub fn new(config: Config) -> KvResult<Self> {
        let model = IopsModel::new(config.iops_model_coefficients.clone());
        Self::with_latency_model(config, Box::new(model))
    }

    /// Create an emulator with a custom latency model
    pub fn with_latency_model(config: Config, latency: Box<dyn LatencyModel>) -> KvResult<Self> {
        config.validate()?;

        debug!(
            capacity = config.capacity,
            max_iterators = config.max_iterators,
            iops_model = config.use_iops_model,
            "creating kv emulator"
        );

        Ok(Self {
            map: Mutex::new(MapState::new(config.capacity)),
            iterators: Mutex::new(IteratorRegistry::new(config.max_iterators)),
            latency,
            timer: DeadlineTimer::new(),
            queue_latency_ns: AtomicU64::new(config.queue_latency_ns),
            op_count: AtomicU64::new(0),
            config,
        })
    }

    // =========================================================================
    // Latency
    // =========================================================================

    fn mark_start(&self) -> Option<Instant> {
        self.config.use_iops_model.then(|| self.timer.start())
    }

    /// Block until the simulated device time for this op has passed.
    /// Must be called with no lock held.
    fn charge_latency(&self, start: Option<Instant>, op: OpKind, bytes: u64) {
        let Some(start) = start else {
            return;
        };
        let expected = self.latency.expected_latency_ns(op, bytes);
        let wait = expected.saturating_sub(self.queue_latency_ns.load(Ordering::Relaxed));
        self.timer.wait_until(start, wait);
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Store a key-value pair
    ///
    /// Returns the bytes consumed: key + value for a new key, the new value
    /// length for an overwrite.
    pub fn store(&self, key: &[u8], value: &[u8], option: StoreOption) -> KvResult<u64> {
        if key.is_empty() {
            return Err(KvError::KeyInvalid("empty key"));
        }

        let start = self.mark_start();
        let stored = {
            let mut map = self.map.lock();
            map.store(key, value, option)?
        };
        self.op_count.fetch_add(1, Ordering::Relaxed);

        let op = match stored {
            Stored::Inserted { .. } => OpKind::Insert,
            Stored::Updated { .. } => OpKind::Update,
        };
        trace!(key_len = key.len(), value_len = value.len(), ?op, "store");

        self.charge_latency(start, op, value.len() as u64);
        Ok(stored.consumed())
    }

    /// Read a window of a value starting at `offset` into `buf`
    ///
    /// Copies `min(stored_len - offset, buf.len())` bytes and returns that
    /// count.
    pub fn retrieve(&self, key: &[u8], offset: u32, buf: &mut [u8]) -> KvResult<usize> {
        let start = self.mark_start();
        let copied = {
            let map = self.map.lock();
            let value = map.table.get(key).ok_or(KvError::KeyNotExist)?;

            let offset_at = offset as usize;
            if offset_at >= value.len() {
                return Err(KvError::ValueOffsetInvalid {
                    offset,
                    length: value.len() as u32,
                });
            }

            let copied = (value.len() - offset_at).min(buf.len());
            buf[..copied].copy_from_slice(&value[offset_at..offset_at + copied]);
            copied
        };
        self.op_count.fetch_add(1, Ordering::Relaxed);

        trace!(key_len = key.len(), offset, copied, "retrieve");

        self.charge_latency(start, OpKind::Read, copied as u64);
        Ok(copied)
    }

    /// Existence check for a batch of keys
    ///
    /// Sets bit `i` (LSB first within each byte) of `bitmap` iff `keys[i]`
    /// is stored. Returns the number of bitmap bytes used.
    pub fn exist<K: AsRef<[u8]>>(&self, keys: &[K], bitmap: &mut [u8]) -> KvResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let required = keys.len().div_ceil(8);
        if bitmap.len() < required {
            return Err(KvError::BufferSmall {
                required,
                provided: bitmap.len(),
            });
        }

        let used = &mut bitmap[..required];
        used.fill(0);

        {
            let map = self.map.lock();
            for (i, key) in keys.iter().enumerate() {
                if map.table.contains(key.as_ref()) {
                    used[i / 8] |= 1 << (i % 8);
                }
            }
        }
        self.op_count.fetch_add(1, Ordering::Relaxed);

        Ok(required)
    }

    /// Delete a key, returning the bytes recovered
    ///
    /// Deleting an absent key succeeds and recovers nothing.
    pub fn delete(&self, key: &[u8]) -> KvResult<u64> {
        if key.is_empty() {
            return Err(KvError::KeyInvalid("empty key"));
        }

        let recovered = self.map.lock().remove(key).unwrap_or(0);
        self.op_count.fetch_add(1, Ordering::Relaxed);

        trace!(key_len = key.len(), recovered, "delete");
        Ok(recovered)
    }

    /// Erase every entry and reset available space to capacity
    pub fn purge(&self, option: PurgeOption) -> KvResult<()> {
        if option != PurgeOption::Default {
            warn!(?option, "only the default purge option is supported");
            return Err(KvError::OptionInvalid(format!("purge option {:?}", option)));
        }

        let removed = self.map.lock().purge();

        debug!(removed, "purged device");
        Ok(())
    }

    // =========================================================================
    // Group Operations
    // =========================================================================

    /// Delete the run of keys matching `condition`, returning bytes recovered
    pub fn delete_group(&self, condition: GroupCondition) -> KvResult<u64> {
        let (removed, recovered) = self.map.lock().remove_group(&condition);

        debug!(
            bitmask = condition.bitmask,
            bit_pattern = condition.bit_pattern,
            removed,
            recovered,
            "deleted group"
        );
        Ok(recovered)
    }

    /// Open an iterator over the keys matching `condition`
    pub fn open_iterator(
        &self,
        mode: IteratorMode,
        condition: GroupCondition,
        fixed_keylen: bool,
    ) -> KvResult<IteratorHandle> {
        let state = IterState::new(mode, condition, fixed_keylen);
        let handle = self.iterators.lock().open(state)?;

        debug!(id = handle.id(), ?mode, fixed_keylen, "opened iterator");
        Ok(handle)
    }

    fn resolve(&self, handle: IteratorHandle) -> KvResult<SharedIter> {
        self.iterators
            .lock()
            .get(handle)
            .ok_or(KvError::IteratorNotExist)
    }

    /// Copy the next matching entry into `key_buf` (and `value_buf` when the
    /// iterator returns values)
    ///
    /// On `BufferSmall` the entry stays pending; retry with larger buffers.
    pub fn iterator_next(
        &self,
        handle: IteratorHandle,
        key_buf: &mut [u8],
        value_buf: &mut [u8],
    ) -> KvResult<IterEntry> {
        if key_buf.is_empty() {
            return Err(KvError::ParamNull("key buffer"));
        }

        let shared = self.resolve(handle)?;
        let mut iter = shared.lock();
        let mut map = self.map.lock();
        step(&mut iter, &mut map, key_buf, value_buf)
    }

    /// Fill `buffer` with as many matching entries as fit
    ///
    /// `IterList::status()` is `WrnMore` when the buffer filled up before
    /// the group was drained.
    pub fn iterator_next_set(&self, handle: IteratorHandle, buffer: &mut [u8]) -> KvResult<IterList> {
        let shared = self.resolve(handle)?;
        let mut iter = shared.lock();
        let list = {
            let mut map = self.map.lock();
            fill_batch(&mut iter, &mut map, buffer)
        };

        trace!(
            id = handle.id(),
            entries = list.num_entries,
            bytes = list.len,
            end = list.end,
            "iterator next set"
        );
        Ok(list)
    }

    /// Close an iterator. Closing an unknown or already closed handle is a
    /// no-op.
    pub fn close_iterator(&self, handle: IteratorHandle) -> KvResult<()> {
        let closed = self.iterators.lock().close(handle);

        if closed {
            debug!(id = handle.id(), "closed iterator");
        }
        Ok(())
    }

    /// Descriptors of up to `max` open iterators
    pub fn list_iterators(&self, max: usize) -> Vec<IteratorInfo> {
        self.iterators.lock().list(max)
    }

    // =========================================================================
    // Queue-level Entry Points
    // =========================================================================

    /// Interrupts are wired up by the queue layer, not the device core
    pub fn set_interrupt_handler(&self, _handler: InterruptHandler) -> KvResult<()> {
        warn!("set_interrupt_handler called on the emulator core");
        Err(KvError::DevInit)
    }

    /// Completions are polled at the queue layer, not the device core
    pub fn poll_completion(&self, _timeout: Duration) -> KvResult<u32> {
        warn!("poll_completion called on the emulator core");
        Err(KvError::DevInit)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Device capacity in bytes (0 = unlimited)
    pub fn total_capacity(&self) -> u64 {
        self.map.lock().ledger.capacity()
    }

    /// Free bytes (`u64::MAX` when unlimited)
    pub fn available(&self) -> u64 {
        self.map.lock().ledger.available()
    }

    /// Bytes consumed by stored keys and values
    pub fn used_bytes(&self) -> u64 {
        self.map.lock().ledger.used()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.map.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().table.is_empty()
    }

    pub fn open_iterator_count(&self) -> usize {
        self.iterators.lock().len()
    }

    /// Number of map operations served so far
    pub fn op_count(&self) -> u64 {
        self.op_count.load(Ordering::Relaxed)
    }

    pub fn queue_latency_ns(&self) -> u64 {
        self.queue_latency_ns.load(Ordering::Relaxed)
    }

    /// Set the time (ns) callers already spent queueing, subtracted from
    /// every simulated wait
    pub fn set_queue_latency_ns(&self, ns: u64) {
        self.queue_latency_ns.store(ns, Ordering::Relaxed);
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for KvEmulator {
    fn drop(&mut self) {
        let closed = self.iterators.get_mut().clear();
        let entries = self.map.get_mut().purge();
        debug!(entries, iterators = closed, "dropping kv emulator");
    }
}
