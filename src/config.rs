//! Configuration for kvemu
//!
//! Centralized configuration with sensible defaults.

use crate::error::{KvError, KvResult};

/// Maximum number of iterators a KV-SSD keeps open at once
pub const DEFAULT_MAX_ITERATORS: usize = 16;

/// Main configuration for a kvemu instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Device Configuration
    // -------------------------------------------------------------------------
    /// Device capacity in bytes (keys + values). 0 means unlimited.
    pub capacity: u64,

    /// Maximum number of simultaneously open iterators
    pub max_iterators: usize,

    // -------------------------------------------------------------------------
    // Latency Configuration
    // -------------------------------------------------------------------------
    /// Charge simulated device latency on store/retrieve
    pub use_iops_model: bool,

    /// Polynomial coefficients of the IOPS model, lowest order first.
    /// Latency (ns) = c0 + c1 * bytes + c2 * bytes^2 + ...
    pub iops_model_coefficients: Vec<f64>,

    /// Initial queue-latency adjustment (ns), subtracted from every
    /// simulated wait
    pub queue_latency_ns: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 0,
            max_iterators: DEFAULT_MAX_ITERATORS,
            use_iops_model: false,
            iops_model_coefficients: Vec::new(),
            queue_latency_ns: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> KvResult<()> {
        if self.max_iterators == 0 {
            return Err(KvError::Config("max_iterators must be > 0".into()));
        }
        if let Some(c) = self
            .iops_model_coefficients
            .iter()
            .find(|c| !c.is_finite() || **c < 0.0)
        {
            return Err(KvError::Config(format!(
                "iops model coefficients must be finite and >= 0, got {}",
                c
            )));
        }
        Ok(())
    }

    /// Whether the capacity ledger enforces a limit
    pub fn is_bounded(&self) -> bool {
        self.capacity != 0
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the device capacity in bytes (0 = unlimited)
    pub fn capacity(mut self, bytes: u64) -> Self {
        self.config.capacity = bytes;
        self
    }

    /// Set the maximum number of open iterators
    pub fn max_iterators(mut self, count: usize) -> Self {
        self.config.max_iterators = count;
        self
    }

    /// Enable or disable simulated latency
    pub fn use_iops_model(mut self, enabled: bool) -> Self {
        self.config.use_iops_model = enabled;
        self
    }

    /// Set the IOPS model coefficients (lowest order first)
    pub fn iops_model_coefficients(mut self, coefficients: impl Into<Vec<f64>>) -> Self {
        self.config.iops_model_coefficients = coefficients.into();
        self
    }

    /// Set the initial queue-latency adjustment (in nanoseconds)
    pub fn queue_latency_ns(mut self, ns: u64) -> Self {
        self.config.queue_latency_ns = ns;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
