//! KeyMap implementation
//!
//! BTreeMap keyed by owned byte vectors. Keys order lexicographically over
//! their raw bytes, which keeps every group prefix contiguous (see
//! [`crate::group`]).

use std::collections::BTreeMap;
use std::ops::Bound;

/// Ordered map of owned keys to owned values
#[derive(Debug, Default)]
pub struct KeyMap {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl KeyMap {
    /// Create a new empty KeyMap
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Replace the value of an existing key in place.
    /// Returns the previous value length, or None if the key is absent.
    pub fn overwrite(&mut self, key: &[u8], value: &[u8]) -> Option<usize> {
        let slot = self.entries.get_mut(key)?;
        let old_len = slot.len();
        slot.clear();
        slot.extend_from_slice(value);
        Some(old_len)
    }

    /// Insert a private copy of `key`. The caller checks absence first.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    /// First entry with key >= `from`
    pub fn lower_bound(&self, from: &[u8]) -> Option<(&[u8], &[u8])> {
        self.entries
            .range::<[u8], _>((Bound::Included(from), Bound::Unbounded))
            .next()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// First key strictly greater than `key`
    pub fn successor(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries
            .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.as_slice())
    }

    /// Remove every entry, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
