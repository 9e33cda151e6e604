//! # kvemu
//!
//! An in-memory emulator of a key-value SSD with:
//! - The device's command set: store, retrieve, exist, delete, purge
//! - Prefix-grouped iterators with resumable, bounded-buffer batches
//! - Grouped delete and capacity accounting
//! - Simulated per-operation latency from an IOPS model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Drivers / Harnesses / Benches                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        KvEmulator                            │
//! │        lock → mutate → unlock → simulated latency            │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌──────────────────┐              ┌───────────────────┐
//!   │  MapState        │              │ IteratorRegistry  │
//!   │  (map lock)      │◄── cursors ──│ (registry lock)   │
//!   │  KeyMap + Ledger │              │ handle arena      │
//!   └──────────────────┘              └───────────────────┘
//!            ▲
//!            │
//!   ┌──────────────────┐
//!   │ LatencyModel +   │
//!   │ DeadlineTimer    │
//!   └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod options;

pub mod group;
pub mod keymap;
pub mod iterator;
pub mod latency;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, KvResult, Status};
pub use config::Config;
pub use engine::KvEmulator;
pub use group::GroupCondition;
pub use iterator::{IterEntry, IterList, IteratorHandle, IteratorInfo};
pub use options::{IteratorMode, PurgeOption, StoreOption};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvemu
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
