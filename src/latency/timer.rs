//! Deadline timer
//!
//! "Mark start" and "block until start + offset" primitives.

use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Remaining time below which the timer spins instead of sleeping
const SPIN_THRESHOLD: Duration = Duration::from_micros(200);

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineTimer;

impl DeadlineTimer {
    pub fn new() -> Self {
        Self
    }

    /// Mark the start of an operation
    pub fn start(&self) -> Instant {
        Instant::now()
    }

    /// Block until `offset_ns` nanoseconds have passed since `start`.
    /// Returns immediately if the deadline is already behind us.
    pub fn wait_until(&self, start: Instant, offset_ns: u64) {
        let deadline = start + Duration::from_nanos(offset_ns);

        loop {
            let now = Instant::now();
            if now >= deadline {
                return;
            }

            let remaining = deadline - now;
            if remaining > SPIN_THRESHOLD {
                thread::sleep(remaining - SPIN_THRESHOLD);
            } else {
                hint::spin_loop();
            }
        }
    }
}
