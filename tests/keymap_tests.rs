//! KeyMap Tests
//!
//! Tests verify:
//! - Ordering over raw key bytes
//! - Lower-bound and successor scans
//! - Prefix monotonicity that group scans rely on
//! - MapState store/remove/group accounting

use kvemu::group::{key_prefix, GroupCondition};
use kvemu::keymap::{entry_size, KeyMap, MapState, Stored};
use kvemu::{KvError, StoreOption};

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_iteration_is_lexicographic() {
    let mut map = KeyMap::new();
    map.insert(b"b", b"2");
    map.insert(b"ab", b"1");
    map.insert(b"a", b"0");
    map.insert(b"\xFF", b"3");

    let keys: Vec<&[u8]> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![&b"a"[..], b"ab", b"b", b"\xFF"]);
}

#[test]
fn test_prefix_is_monotonic_in_key_order() {
    let mut map = KeyMap::new();
    let samples: &[&[u8]] = &[
        b"",
        b"\x00",
        b"\x00\x00\x00\x00\x01",
        b"\x00\x01",
        b"\x12",
        b"\x12\x34",
        b"\x12\x34\x00\x00\xFF\xFF",
        b"\x12\x34\x00\x01",
        b"\x12\x35",
        b"\x80\x00\x00\x00",
        b"\xFF\xFF\xFF\xFF\x00",
    ];
    for key in samples {
        map.insert(key, b"");
    }

    let prefixes: Vec<u32> = map.iter().map(|(k, _)| key_prefix(k)).collect();
    assert!(prefixes.windows(2).all(|w| w[0] <= w[1]), "{:x?}", prefixes);
}

#[test]
fn test_group_members_are_contiguous() {
    let mut map = KeyMap::new();
    for a in 0..4u8 {
        for b in 0..4u8 {
            map.insert(&[a, b, 0x55, 0x66, a ^ b], b"v");
        }
    }

    let cond = GroupCondition::new(0xFF00_0000, 0x0200_0000);
    let flags: Vec<bool> = map.iter().map(|(k, _)| cond.matches(k)).collect();
    let first = flags.iter().position(|m| *m).unwrap();
    let last = flags.iter().rposition(|m| *m).unwrap();
    assert!(flags[first..=last].iter().all(|m| *m));
    assert_eq!(last - first + 1, 4);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_lower_bound_and_successor() {
    let mut map = KeyMap::new();
    map.insert(b"key1", b"v1");
    map.insert(b"key3", b"v3");

    assert_eq!(map.lower_bound(b"key1"), Some((&b"key1"[..], &b"v1"[..])));
    assert_eq!(map.lower_bound(b"key2"), Some((&b"key3"[..], &b"v3"[..])));
    assert_eq!(map.lower_bound(b"key4"), None);

    assert_eq!(map.successor(b"key1"), Some(&b"key3"[..]));
    assert_eq!(map.successor(b"key2"), Some(&b"key3"[..]));
    assert_eq!(map.successor(b"key3"), None);
}

#[test]
fn test_overwrite_in_place() {
    let mut map = KeyMap::new();
    map.insert(b"key", b"long value");
    assert_eq!(map.overwrite(b"key", b"short"), Some(10));
    assert_eq!(map.get(b"key"), Some(&b"short"[..]));
    assert_eq!(map.overwrite(b"absent", b"x"), None);
    assert_eq!(map.len(), 1);
}

#[test]
fn test_clear() {
    let mut map = KeyMap::new();
    map.insert(b"a", b"1");
    map.insert(b"b", b"2");
    assert_eq!(map.clear(), 2);
    assert!(map.is_empty());
}

// =============================================================================
// MapState Tests
// =============================================================================

#[test]
fn test_state_store_reports_insert_and_update() {
    let mut state = MapState::new(0);
    assert_eq!(
        state.store(b"key", b"value", StoreOption::None),
        Ok(Stored::Inserted { consumed: 8 })
    );
    assert_eq!(
        state.store(b"key", b"v", StoreOption::None),
        Ok(Stored::Updated { consumed: 1 })
    );
    assert_eq!(
        state.store(b"key", b"x", StoreOption::Idempotent),
        Err(KvError::KeyExist)
    );
    assert_eq!(state.ledger.used(), 4);
}

#[test]
fn test_state_remove_refunds() {
    let mut state = MapState::new(64);
    state.store(b"key", b"value", StoreOption::None).unwrap();
    assert_eq!(state.remove(b"key"), Some(entry_size(b"key", b"value")));
    assert_eq!(state.remove(b"key"), None);
    assert_eq!(state.ledger.available(), 64);
}

#[test]
fn test_state_remove_group_stops_at_first_mismatch() {
    let mut state = MapState::new(0);
    for key in [&b"\x01\x00\x00\x00a"[..], b"\x01\x00\x00\x00b", b"\x02\x00", b"\x03"] {
        state.store(key, b"v", StoreOption::None).unwrap();
    }

    let (removed, recovered) = state.remove_group(&GroupCondition::new(0xFF00_0000, 0x0100_0000));
    assert_eq!(removed, 2);
    assert_eq!(recovered, 12);
    assert_eq!(state.table.len(), 2);
}

#[test]
fn test_state_remove_group_includes_short_keys() {
    let mut state = MapState::new(0);
    for key in [&b"\x01"[..], b"\x01\x00\x00\x00a", b"\x01\x01"] {
        state.store(key, b"v", StoreOption::None).unwrap();
    }

    let (removed, recovered) = state.remove_group(&GroupCondition::new(0xFFFF_0000, 0x0100_0000));
    assert_eq!(removed, 2);
    assert_eq!(recovered, 8);
    assert_eq!(state.table.get(b"\x01\x01"), Some(&b"v"[..]));
}

#[test]
fn test_state_purge() {
    let mut state = MapState::new(100);
    state.store(b"a", b"1", StoreOption::None).unwrap();
    state.store(b"b", b"2", StoreOption::None).unwrap();
    assert_eq!(state.purge(), 2);
    assert_eq!(state.ledger.available(), 100);
    assert!(state.table.is_empty());
}
