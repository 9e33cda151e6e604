//! Batch Codec Tests
//!
//! Tests verify:
//! - Record sizes per layout
//! - Writer capacity checks
//! - Reader handling of each layout and of truncated buffers

use kvemu::protocol::{BatchLayout, BatchReader, BatchRecord, BatchWriter, LEN_FIELD_SIZE};
use kvemu::KvError;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_record_sizes() {
    let full = BatchLayout {
        fixed_keylen: false,
        include_value: true,
    };
    assert_eq!(full.record_size(8, 100), LEN_FIELD_SIZE + 8 + LEN_FIELD_SIZE + 100);

    let fixed_keys_only = BatchLayout {
        fixed_keylen: true,
        include_value: false,
    };
    assert_eq!(fixed_keys_only.record_size(8, 100), 8);
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_writer_tracks_space() {
    let layout = BatchLayout {
        fixed_keylen: false,
        include_value: false,
    };
    let mut buffer = [0u8; 10];
    let mut writer = BatchWriter::new(&mut buffer, layout);

    assert!(writer.fits(6, 0));
    assert!(!writer.fits(7, 0));

    writer.put(b"abc", b"ignored");
    assert_eq!(writer.written(), 7);
    assert!(!writer.fits(0, 0));

    assert_eq!(&buffer[..7], b"\x03\x00\x00\x00abc");
}

// =============================================================================
// Reader Tests
// =============================================================================

#[test]
fn test_reader_decodes_written_records() {
    let layout = BatchLayout {
        fixed_keylen: false,
        include_value: true,
    };
    let mut buffer = [0u8; 64];
    let len = {
        let mut writer = BatchWriter::new(&mut buffer, layout);
        writer.put(b"k1", b"first");
        writer.put(b"key2", b"");
        writer.written()
    };

    let records: Vec<_> = BatchReader::new(&buffer[..len], 2, true, None)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        records,
        vec![
            BatchRecord {
                key: b"k1",
                value: Some(&b"first"[..]),
            },
            BatchRecord {
                key: b"key2",
                value: Some(&b""[..]),
            },
        ]
    );
}

#[test]
fn test_reader_fixed_key_length() {
    let buffer = b"aaaabbbbcccc";
    let keys: Vec<_> = BatchReader::new(buffer, 3, false, Some(4))
        .map(|r| r.unwrap().key)
        .collect();
    assert_eq!(keys, vec![&b"aaaa"[..], b"bbbb", b"cccc"]);
}

#[test]
fn test_reader_reports_truncation_once() {
    // Claims a 9-byte key but only 3 bytes follow
    let buffer = b"\x09\x00\x00\x00abc";
    let mut reader = BatchReader::new(buffer, 2, false, None);

    assert_eq!(
        reader.next(),
        Some(Err(KvError::BufferSmall {
            required: 9,
            provided: 3
        }))
    );
    assert_eq!(reader.next(), None);
}
