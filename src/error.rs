//! Error types for kvemu
//!
//! Every engine operation reports failures through `KvError`. Each variant
//! maps onto the result code a KV-SSD controller would return, see
//! [`KvError::status`].

use thiserror::Error;

/// Result type alias using KvError
pub type KvResult<T> = std::result::Result<T, KvError>;

/// Device result codes
///
/// `Success` and `WrnMore` are not errors; they are reported by operations
/// that complete (fully or partially) and never appear inside a `KvError`.
///
/// The numeric values are local to this emulator and do not match any
/// vendor KVS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    Success = 0x000,

    // Soft results
    WrnMore = 0x001,

    // Device
    DevCapacity = 0x010,
    DevInit = 0x011,

    // Keys and values
    KeyExist = 0x020,
    KeyNotExist = 0x021,
    KeyInvalid = 0x022,
    ValueOffsetInvalid = 0x023,

    // Caller parameters
    BufferSmall = 0x030,
    ParamNull = 0x031,
    OptionInvalid = 0x032,

    // Iterators
    TooManyIteratorsOpen = 0x040,
    IteratorNotExist = 0x041,
    IteratorEnd = 0x042,

    // Emulator setup
    ConfigInvalid = 0x0F0,
}

impl Status {
    /// True for results a caller can treat as completed work
    pub fn is_ok(self) -> bool {
        matches!(self, Status::Success | Status::WrnMore)
    }
}

/// Unified error type for kvemu operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("device capacity exceeded: {required} bytes required, {available} available")]
    DevCapacity { required: u64, available: u64 },

    #[error("device not initialized for this entry point")]
    DevInit,

    // -------------------------------------------------------------------------
    // Key / Value Errors
    // -------------------------------------------------------------------------
    #[error("key already exists")]
    KeyExist,

    #[error("key does not exist")]
    KeyNotExist,

    #[error("invalid key: {0}")]
    KeyInvalid(&'static str),

    #[error("value offset {offset} is out of range for a {length}-byte value")]
    ValueOffsetInvalid { offset: u32, length: u32 },

    // -------------------------------------------------------------------------
    // Parameter Errors
    // -------------------------------------------------------------------------
    #[error("buffer too small: {required} bytes required, {provided} provided")]
    BufferSmall { required: usize, provided: usize },

    #[error("missing parameter: {0}")]
    ParamNull(&'static str),

    #[error("unsupported option: {0}")]
    OptionInvalid(String),

    // -------------------------------------------------------------------------
    // Iterator Errors
    // -------------------------------------------------------------------------
    #[error("too many open iterators (max {max})")]
    TooManyIteratorsOpen { max: usize },

    #[error("iterator handle is closed or unknown")]
    IteratorNotExist,

    #[error("iterator reached the end of its group")]
    IteratorEnd,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// Device result code for this error
    pub fn status(&self) -> Status {
        match self {
            KvError::DevCapacity { .. } => Status::DevCapacity,
            KvError::DevInit => Status::DevInit,
            KvError::KeyExist => Status::KeyExist,
            KvError::KeyNotExist => Status::KeyNotExist,
            KvError::KeyInvalid(_) => Status::KeyInvalid,
            KvError::ValueOffsetInvalid { .. } => Status::ValueOffsetInvalid,
            KvError::BufferSmall { .. } => Status::BufferSmall,
            KvError::ParamNull(_) => Status::ParamNull,
            KvError::OptionInvalid(_) => Status::OptionInvalid,
            KvError::TooManyIteratorsOpen { .. } => Status::TooManyIteratorsOpen,
            KvError::IteratorNotExist => Status::IteratorNotExist,
            KvError::IteratorEnd => Status::IteratorEnd,
            KvError::Config(_) => Status::ConfigInvalid,
        }
    }

    /// Whether the caller can retry the same call with a larger buffer
    pub fn is_retryable(&self) -> bool {
        matches!(self, KvError::BufferSmall { .. })
    }
}

/// Collapse an operation result into its device result code
pub fn status_of<T>(result: &KvResult<T>) -> Status {
    match result {
        Ok(_) => Status::Success,
        Err(e) => e.status(),
    }
}
