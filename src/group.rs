//! Group conditions
//!
//! A KV-SSD groups keys by their leading 4 bytes. A group condition is a
//! `(bitmask, bit_pattern)` pair; a key belongs to the group iff
//!
//! ```text
//! (prefix(key) & bitmask) == (bitmask & bit_pattern)
//! ```
//!
//! ## Prefix byte order
//! The prefix is the first 4 key bytes read as a **big-endian** `u32`, with
//! shorter keys zero-padded on the right. Under lexicographic key ordering
//! this makes the prefix non-decreasing in key order, so a group selected by
//! leading bits is one contiguous run of the map and can be found with a
//! single lower-bound scan.
//!
//! The scan starts at the target bytes with trailing zeros dropped: a short
//! key such as `[0x12, 0x34]` pads to `0x12340000` but sorts before
//! `[0x12, 0x34, 0, 0]`.

/// Number of leading key bytes that form the group prefix
pub const PREFIX_LEN: usize = 4;

/// Read the group prefix of a key
pub fn key_prefix(key: &[u8]) -> u32 {
    let mut prefix = [0u8; PREFIX_LEN];
    let n = key.len().min(PREFIX_LEN);
    prefix[..n].copy_from_slice(&key[..n]);
    u32::from_be_bytes(prefix)
}

/// A (bitmask, bit_pattern) pair selecting a group of keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GroupCondition {
    pub bitmask: u32,
    pub bit_pattern: u32,
}

impl GroupCondition {
    /// Matches every key
    pub const ALL: GroupCondition = GroupCondition {
        bitmask: 0,
        bit_pattern: 0,
    };

    pub fn new(bitmask: u32, bit_pattern: u32) -> Self {
        Self {
            bitmask,
            bit_pattern,
        }
    }

    /// Prefix value every member must show under the mask
    pub fn target(&self) -> u32 {
        self.bitmask & self.bit_pattern
    }

    /// True if the condition selects the whole key space
    pub fn is_all(&self) -> bool {
        self.bitmask == 0
    }

    pub fn matches_prefix(&self, prefix: u32) -> bool {
        (prefix & self.bitmask) == self.target()
    }

    pub fn matches(&self, key: &[u8]) -> bool {
        self.is_all() || self.matches_prefix(key_prefix(key))
    }

    /// Smallest key that could belong to the group, used to seed scans
    ///
    /// This is the shortest key whose padded prefix equals the target, so
    /// `ALL` seeks from the empty key.
    pub fn seek_key(&self) -> Vec<u8> {
        let bytes = self.target().to_be_bytes();
        let len = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        bytes[..len].to_vec()
    }
}
