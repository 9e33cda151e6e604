//! Latency models
//!
//! The emulator only needs "how long should this take"; the model behind
//! that answer is pluggable.

use super::OpKind;

/// Expected device latency for an operation
pub trait LatencyModel: Send + Sync {
    /// Expected latency in nanoseconds for `op` moving `bytes` bytes
    fn expected_latency_ns(&self, op: OpKind, bytes: u64) -> u64;
}

/// Polynomial IOPS model: `c0 + c1*bytes + c2*bytes^2 + ...` nanoseconds.
///
/// The same curve is used for every operation kind. An empty coefficient
/// list yields zero latency.
#[derive(Debug, Clone, Default)]
pub struct IopsModel {
    coefficients: Vec<f64>,
}

impl IopsModel {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl LatencyModel for IopsModel {
    fn expected_latency_ns(&self, _op: OpKind, bytes: u64) -> u64 {
        let x = bytes as f64;
        // Horner's rule, highest order first
        let ns = self
            .coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c);

        if ns.is_finite() && ns > 0.0 {
            ns.round() as u64
        } else {
            0
        }
    }
}
