//! Cursor stepping
//!
//! Single-entry and batched advances of an iterator over the key map. Both
//! run with the map lock held by the caller.

use crate::error::{KvError, KvResult, Status};
use crate::keymap::MapState;
use crate::protocol::{BatchLayout, BatchWriter};

use super::IterState;

/// Sizes of the entry copied out by a single-entry step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterEntry {
    pub key_len: usize,
    /// 0 when the iterator does not return values
    pub value_len: usize,
}

/// Outcome of a batched step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterList {
    /// Records written to the buffer
    pub num_entries: u32,
    /// Bytes of the buffer in use
    pub len: usize,
    /// False when the buffer filled up with matching entries still pending
    pub end: bool,
}

impl IterList {
    /// `WrnMore` while entries remain, `Success` once the group is drained
    pub fn status(&self) -> Status {
        if self.end {
            Status::Success
        } else {
            Status::WrnMore
        }
    }
}

/// Copy the next matching entry into `key_buf` / `value_buf`
pub(crate) fn step(
    iter: &mut IterState,
    map: &mut MapState,
    key_buf: &mut [u8],
    value_buf: &mut [u8],
) -> KvResult<IterEntry> {
    if iter.exhausted {
        return Err(KvError::IteratorEnd);
    }

    let include_value = iter.mode.includes_value();

    let (key, value) = match map.table.lower_bound(&iter.cursor) {
        Some((k, v)) if iter.condition.matches(k) => (k, v),
        _ => return Err(KvError::IteratorEnd),
    };

    // Park the cursor on this entry so a retry sees it again
    if key.len() > key_buf.len() {
        iter.cursor = key.to_vec();
        return Err(KvError::BufferSmall {
            required: key.len(),
            provided: key_buf.len(),
        });
    }
    if include_value && value.len() > value_buf.len() {
        iter.cursor = key.to_vec();
        return Err(KvError::BufferSmall {
            required: value.len(),
            provided: value_buf.len(),
        });
    }

    key_buf[..key.len()].copy_from_slice(key);
    let value_len = if include_value {
        value_buf[..value.len()].copy_from_slice(value);
        value.len()
    } else {
        0
    };

    let key = key.to_vec();
    if iter.mode.deletes_on_visit() {
        map.remove(&key);
    }

    match map.table.successor(&key) {
        Some(next) => iter.cursor = next.to_vec(),
        None => iter.exhausted = true,
    }

    Ok(IterEntry {
        key_len: key.len(),
        value_len,
    })
}

/// Serialize as many matching entries as fit into `buffer`
pub(crate) fn fill_batch(iter: &mut IterState, map: &mut MapState, buffer: &mut [u8]) -> IterList {
    let mut list = IterList {
        num_entries: 0,
        len: 0,
        end: true,
    };
    if iter.exhausted {
        return list;
    }

    let layout = BatchLayout {
        fixed_keylen: iter.fixed_keylen,
        include_value: iter.mode.includes_value(),
    };
    let mut writer = BatchWriter::new(buffer, layout);

    loop {
        let Some((key, value)) = map.table.lower_bound(&iter.cursor) else {
            break;
        };

        // Groups are contiguous: the first mismatch ends the scan
        if !iter.condition.matches(key) {
            iter.cursor = key.to_vec();
            break;
        }

        if !writer.fits(key.len(), value.len()) {
            iter.cursor = key.to_vec();
            list.end = false;
            break;
        }

        writer.put(key, value);
        list.num_entries += 1;

        let key = key.to_vec();
        if iter.mode.deletes_on_visit() {
            map.remove(&key);
        }

        match map.table.successor(&key) {
            Some(next) => iter.cursor = next.to_vec(),
            None => {
                iter.exhausted = true;
                break;
            }
        }
    }

    list.len = writer.written();
    list
}
