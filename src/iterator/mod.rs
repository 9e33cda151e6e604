//! Iterator Module
//!
//! Resumable cursors over one group of keys.
//!
//! ## State machine
//! ```text
//!  open ──► OPEN ──next/next_set──► OPEN (cursor advanced)
//!             │                        │
//!             └────────► EXHAUSTED ◄───┘
//!                            │
//!          close (any state) ▼
//!                         CLOSED
//! ```
//!
//! The cursor holds the key bytes to resume a lower-bound scan from. When a
//! caller's buffer is too small the cursor is left on the entry that did not
//! fit, so the next call (with a larger buffer) picks it up again. Nothing
//! is skipped or returned twice.

mod cursor;
mod registry;

pub use cursor::{IterEntry, IterList};
pub use registry::{IteratorHandle, IteratorInfo, IteratorRegistry};

pub(crate) use cursor::{fill_batch, step};
pub(crate) use registry::SharedIter;

use crate::group::GroupCondition;
use crate::options::IteratorMode;

/// Per-iterator cursor state
#[derive(Debug, Clone)]
pub struct IterState {
    pub mode: IteratorMode,
    pub condition: GroupCondition,
    /// Omit per-key length fields in batched output
    pub fixed_keylen: bool,
    /// Lower bound for the next scan
    pub cursor: Vec<u8>,
    pub exhausted: bool,
}

impl IterState {
    /// New cursor seeded with the smallest key that could match
    pub fn new(mode: IteratorMode, condition: GroupCondition, fixed_keylen: bool) -> Self {
        Self {
            mode,
            condition,
            fixed_keylen,
            cursor: condition.seek_key(),
            exhausted: false,
        }
    }
}
