//! Batch codec
//!
//! Encoding of `iterator_next_set` output and a reader for callers.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬───────────┬────────────────┬─────────────┐
//! │ KeyLen (4)?  │    Key    │  ValLen (4)?   │   Value?    │
//! └──────────────┴───────────┴────────────────┴─────────────┘
//! ```
//! - KeyLen is omitted when the iterator was opened with fixed key length
//! - ValLen and Value are omitted when the iterator returns keys only
//! - Length fields are little-endian u32

use bytes::{Buf, BufMut};

use crate::error::{KvError, KvResult};

/// Size of a length field
pub const LEN_FIELD_SIZE: usize = 4;

/// Which fields a record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLayout {
    pub fixed_keylen: bool,
    pub include_value: bool,
}

impl BatchLayout {
    /// Serialized size of one record
    pub fn record_size(&self, key_len: usize, value_len: usize) -> usize {
        let mut size = key_len;
        if !self.fixed_keylen {
            size += LEN_FIELD_SIZE;
        }
        if self.include_value {
            size += LEN_FIELD_SIZE + value_len;
        }
        size
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Appends records to a caller-provided buffer
pub struct BatchWriter<'a> {
    buf: &'a mut [u8],
    capacity: usize,
    layout: BatchLayout,
}

impl<'a> BatchWriter<'a> {
    pub fn new(buf: &'a mut [u8], layout: BatchLayout) -> Self {
        let capacity = buf.len();
        Self {
            buf,
            capacity,
            layout,
        }
    }

    /// Bytes written so far
    pub fn written(&self) -> usize {
        self.capacity - self.buf.remaining_mut()
    }

    /// Whether a record of this size still fits
    pub fn fits(&self, key_len: usize, value_len: usize) -> bool {
        self.layout.record_size(key_len, value_len) <= self.buf.remaining_mut()
    }

    /// Append one record. The caller checks [`fits`](Self::fits) first.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        if !self.layout.fixed_keylen {
            self.buf.put_u32_le(key.len() as u32);
        }
        self.buf.put_slice(key);

        if self.layout.include_value {
            self.buf.put_u32_le(value.len() as u32);
            self.buf.put_slice(value);
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// One decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRecord<'a> {
    pub key: &'a [u8],
    pub value: Option<&'a [u8]>,
}

/// Walks the records of a filled batch buffer
///
/// `fixed_key_len` must be given when the iterator was opened with fixed key
/// length, since the records then carry no key length field.
pub struct BatchReader<'a> {
    buf: &'a [u8],
    remaining: u32,
    include_value: bool,
    fixed_key_len: Option<usize>,
}

impl<'a> BatchReader<'a> {
    pub fn new(
        buf: &'a [u8],
        num_entries: u32,
        include_value: bool,
        fixed_key_len: Option<usize>,
    ) -> Self {
        Self {
            buf,
            remaining: num_entries,
            include_value,
            fixed_key_len,
        }
    }

    fn take(&mut self, len: usize) -> KvResult<&'a [u8]> {
        if self.buf.remaining() < len {
            return Err(KvError::BufferSmall {
                required: len,
                provided: self.buf.remaining(),
            });
        }
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn take_len(&mut self) -> KvResult<usize> {
        if self.buf.remaining() < LEN_FIELD_SIZE {
            return Err(KvError::BufferSmall {
                required: LEN_FIELD_SIZE,
                provided: self.buf.remaining(),
            });
        }
        Ok(self.buf.get_u32_le() as usize)
    }

    fn read_record(&mut self) -> KvResult<BatchRecord<'a>> {
        let key_len = match self.fixed_key_len {
            Some(len) => len,
            None => self.take_len()?,
        };
        let key = self.take(key_len)?;

        let value = if self.include_value {
            let value_len = self.take_len()?;
            Some(self.take(value_len)?)
        } else {
            None
        };

        Ok(BatchRecord { key, value })
    }
}

impl<'a> Iterator for BatchReader<'a> {
    type Item = KvResult<BatchRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let record = self.read_record();
        if record.is_err() {
            // Stop after a malformed record
            self.remaining = 0;
        }
        Some(record)
    }
}
