//! Operation options
//!
//! Option enums accepted by the engine's store, purge and iterator calls.

/// Store behavior when the key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreOption {
    /// Overwrite an existing value
    #[default]
    None,

    /// Fail with `KeyExist` instead of overwriting
    Idempotent,
}

/// Purge flavors a KV-SSD may advertise. Only `Default` is emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurgeOption {
    #[default]
    Default,
    KvErase,
    CryptoErase,
}

/// What an iterator returns for each visited entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorMode {
    /// Keys only
    KeyOnly,

    /// Keys and values
    KeyValue,

    /// Keys and values; each visited entry is deleted
    KeyValueDelete,
}

impl IteratorMode {
    pub fn includes_value(self) -> bool {
        matches!(self, IteratorMode::KeyValue | IteratorMode::KeyValueDelete)
    }

    pub fn deletes_on_visit(self) -> bool {
        self == IteratorMode::KeyValueDelete
    }
}
