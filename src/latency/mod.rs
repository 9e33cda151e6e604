//! Latency Module
//!
//! Simulated device timing.
//!
//! ## Responsibilities
//! - Turn (operation kind, byte count) into an expected device latency
//! - Block the calling thread until that latency has elapsed since the
//!   operation started
//!
//! The engine marks the start instant before taking the map lock and waits
//! only after releasing it, so one thread paying its simulated delay never
//! stalls another thread's map access.

mod model;
mod timer;

pub use model::{IopsModel, LatencyModel};
pub use timer::DeadlineTimer;

/// Operation kinds the latency model distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Store of a new key
    Insert,

    /// Store over an existing key
    Update,

    /// Retrieve
    Read,
}
