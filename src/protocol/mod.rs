//! Protocol Module
//!
//! Byte layouts shared with callers of the emulator.
//!
//! ### Batched iterator output
//! `iterator_next_set` fills a flat caller buffer with back-to-back records:
//! ```text
//! ┌──────────┬───────┬──────────┬─────────┬──────────┬───────┬─────
//! │KeyLen (4)│  Key  │ValLen (4)│  Value  │KeyLen (4)│  Key  │ ...
//! └──────────┴───────┴──────────┴─────────┴──────────┴───────┴─────
//! ```
//! See [`batch`] for which fields are present for a given iterator.

pub mod batch;

pub use batch::{BatchLayout, BatchReader, BatchRecord, BatchWriter, LEN_FIELD_SIZE};
