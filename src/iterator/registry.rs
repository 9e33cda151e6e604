//! Iterator Registry
//!
//! Arena of live iterators indexed by generation-checked handles.
//!
//! ## Handles
//! A handle is `(slot index, generation)`. Closing an iterator bumps the
//! slot's generation, so a closed handle (or one whose slot was reused by a
//! later `open`) no longer resolves. Double close and use-after-close are
//! detected instead of touching someone else's cursor.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{KvError, KvResult};
use crate::group::GroupCondition;
use crate::options::IteratorMode;

use super::IterState;

/// Opaque reference to an open iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IteratorHandle {
    index: u32,
    generation: u32,
}

impl IteratorHandle {
    /// Slot id, stable while the iterator is open
    pub fn id(&self) -> u32 {
        self.index
    }
}

/// Descriptor of an open iterator, as reported by `list_iterators`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IteratorInfo {
    pub id: u32,
    pub handle: IteratorHandle,
    pub mode: IteratorMode,
    pub condition: GroupCondition,
    pub fixed_keylen: bool,
}

/// Iterator state shared between the registry and an in-flight step
pub(crate) type SharedIter = Arc<Mutex<IterState>>;

struct Live {
    info: IteratorInfo,
    state: SharedIter,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    live: Option<Live>,
}

pub struct IteratorRegistry {
    slots: Vec<Slot>,
    open: usize,
    max: usize,
}

impl IteratorRegistry {
    pub fn new(max: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max),
            open: 0,
            max,
        }
    }

    /// Number of open iterators
    pub fn len(&self) -> usize {
        self.open
    }

    pub fn is_empty(&self) -> bool {
        self.open == 0
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Register a new iterator, reusing the lowest free slot
    pub fn open(&mut self, state: IterState) -> KvResult<IteratorHandle> {
        if self.open >= self.max {
            return Err(KvError::TooManyIteratorsOpen { max: self.max });
        }

        let index = match self.slots.iter().position(|s| s.live.is_none()) {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        let handle = IteratorHandle {
            index: index as u32,
            generation: slot.generation,
        };
        let info = IteratorInfo {
            id: handle.index,
            handle,
            mode: state.mode,
            condition: state.condition,
            fixed_keylen: state.fixed_keylen,
        };
        slot.live = Some(Live {
            info,
            state: Arc::new(Mutex::new(state)),
        });
        self.open += 1;

        Ok(handle)
    }

    /// Resolve a handle to its state, if it is still open
    pub(crate) fn get(&self, handle: IteratorHandle) -> Option<SharedIter> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.live.as_ref().map(|live| Arc::clone(&live.state))
    }

    /// Close an iterator. Returns false if the handle was not open.
    pub fn close(&mut self, handle: IteratorHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.live.is_none() {
            return false;
        }

        slot.live = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.open -= 1;
        true
    }

    /// Up to `max` descriptors of open iterators, in slot order
    pub fn list(&self, max: usize) -> Vec<IteratorInfo> {
        self.slots
            .iter()
            .filter_map(|slot| slot.live.as_ref().map(|live| live.info))
            .take(max)
            .collect()
    }

    /// Close everything (engine teardown)
    pub fn clear(&mut self) -> usize {
        let closed = self.open;
        for slot in self.slots.iter_mut().filter(|s| s.live.is_some()) {
            slot.live = None;
            slot.generation = slot.generation.wrapping_add(1);
        }
        self.open = 0;
        closed
    }
}
