//! Tests for the object-form codec

use super::read::{hunt_magic, parse_mso, read_table, resolve_vector};
use super::write::write_mso;
use crate::model::{Instrument, Score, SoundBank, Track, Wave};
use crate::{MedleyError, INSTRUMENT_BLOCK_LEN, SCORE_BLOCK_LEN};

/// Minimal object: partial tables, no names, one wave at index 1 with four
/// bytes of cycle data
fn tiny_wave_object() -> Vec<u8> {
    let mut buf = vec![0u8; 40];
    buf[..4].copy_from_slice(b"MSOB");
    buf[37] = 1; // partial tables; score/track/instrument vectors stay null

    buf.push(1); // wave table slot count, at offset 40
    let table_base = buf.len(); // 41
    buf[16..20].copy_from_slice(&((table_base - 16) as u32).to_be_bytes());
    buf.extend_from_slice(&[0u8; 4]); // reserved cell 0
    let cell = buf.len(); // 45
    buf.extend_from_slice(&4u32.to_be_bytes()); // slot 1 -> record at 49

    assert_eq!(buf.len(), cell + 4);
    buf.extend_from_slice(&[0x00, 0x04]); // cycle size
    buf.extend_from_slice(&[0x01, 0x02]); // dummy
    buf.push(0x02); // octave
    buf.push(0x01); // frag factor
    buf.push(0x01); // double buffered
    buf.push(0x00); // pad
    buf.extend_from_slice(&[0x10, 0x20, 0x30, 0x40]);
    buf
}

#[test]
fn test_resolve_vector() {
    let mut buf = vec![0u8; 12];
    buf[0..4].copy_from_slice(&8u32.to_be_bytes());
    assert_eq!(resolve_vector(&buf, 0).unwrap(), Some(8));
    // zero is the null sentinel, not an address
    assert_eq!(resolve_vector(&buf, 4).unwrap(), None);
    // reading past the end
    assert_eq!(
        resolve_vector(&buf, 10),
        Err(MedleyError::OutOfBounds { offset: 10 })
    );
    // vector resolving outside the buffer
    buf[4..8].copy_from_slice(&100u32.to_be_bytes());
    assert_eq!(
        resolve_vector(&buf, 4),
        Err(MedleyError::OutOfBounds { offset: 104 })
    );
}

#[test]
fn test_read_table_partial() {
    // count byte 2, slot 1 defined, slot 2 undefined
    let mut buf = vec![0u8; 16];
    buf[3] = 2; // count at base - 1
    let base = 4;
    buf[base + 4..base + 8].copy_from_slice(&4u32.to_be_bytes());
    let table = read_table(&buf, base, true).unwrap();
    assert_eq!(table.count, 2);
    assert_eq!(table.get(1), Some(12));
    assert_eq!(table.get(2), None);
    assert_eq!(table.iter_defined().collect::<Vec<_>>(), vec![(1, 12)]);
}

#[test]
fn test_read_table_partial_empty() {
    let buf = [0u8; 8];
    let table = read_table(&buf, 4, true).unwrap();
    assert_eq!(table.count, 0);
    assert_eq!(table.get(1), None);
    assert_eq!(table.iter_defined().count(), 0);
}

#[test]
fn test_read_table_full() {
    // a full table always has 255 slots, all null here
    let buf = vec![0u8; 4 + 4 * 256];
    let table = read_table(&buf, 4, false).unwrap();
    assert_eq!(table.count, 255);
    assert_eq!(table.iter_defined().count(), 0);
    // truncated full table fails
    let short = vec![0u8; 64];
    assert!(matches!(
        read_table(&short, 4, false),
        Err(MedleyError::OutOfBounds { .. })
    ));
}

#[test]
fn test_hunt_magic() {
    assert_eq!(hunt_magic(b"MSOB...."), Some(0));
    assert_eq!(hunt_magic(b"....MSOB...."), Some(4));
    assert_eq!(hunt_magic(b"MSO"), None);
    assert_eq!(hunt_magic(b"no magic here"), None);
}

#[test]
fn test_parse_tiny_wave_object() {
    let buf = tiny_wave_object();
    let bank = parse_mso(&buf).unwrap();

    assert!(!bank.names_included);
    assert!(bank.partial_tables);
    assert!(bank.scores.is_empty());
    assert!(bank.tracks.is_empty());
    assert!(bank.instruments.is_empty());
    assert_eq!(bank.waves.len(), 1);

    let wave = bank.waves.get(1).unwrap();
    assert_eq!(wave.name, None);
    assert_eq!(wave.cycle_size(), 4);
    assert_eq!(wave.dummy, 0x0102);
    assert_eq!(wave.octave, 0x02);
    assert_eq!(wave.frag_factor, 0x01);
    assert_eq!(wave.double_buffered, 0x01);
    assert_eq!(wave.data, vec![0x10, 0x20, 0x30, 0x40]);
}

#[test]
fn test_parse_embedded_magic() {
    // the object sits 16 bytes into a larger container; every offset,
    // including the reserved-field checks, is relative to the magic
    let mut buf = vec![0xEE; 16];
    buf.extend_from_slice(&tiny_wave_object());
    let bank = parse_mso(&buf).unwrap();
    assert_eq!(bank.waves.len(), 1);
    assert_eq!(bank.waves.get(1).unwrap().data, vec![0x10, 0x20, 0x30, 0x40]);
}

#[test]
fn test_parse_no_magic() {
    assert_eq!(
        parse_mso(&[0u8; 64]),
        Err(MedleyError::MagicNotFound)
    );
}

#[test]
fn test_reserved_fields_tolerated() {
    let mut buf = tiny_wave_object();
    // nonzero reserved field is a warning, not an error
    buf[20] = 0x01;
    assert!(parse_mso(&buf).is_ok());
}

#[test]
fn test_track_stream_missing_terminator() {
    let mut buf = vec![0u8; 40];
    buf[..4].copy_from_slice(b"MSOB");
    buf[37] = 1;

    buf.push(1); // track table slot count
    let table_base = buf.len();
    buf[8..12].copy_from_slice(&((table_base - 8) as u32).to_be_bytes());
    buf.extend_from_slice(&[0u8; 4]);
    buf.extend_from_slice(&4u32.to_be_bytes());
    // one event line, then the buffer just ends
    buf.extend_from_slice(&[0x10, 0x10]);

    assert_eq!(
        parse_mso(&buf),
        Err(MedleyError::TruncatedEventStream { index: 1 })
    );
}

fn sample_bank(names_included: bool, partial_tables: bool) -> SoundBank {
    let mut bank = SoundBank::new(names_included, partial_tables);

    let mut score_block = [0u8; SCORE_BLOCK_LEN];
    score_block[0] = 1;
    score_block[32] = 0x7D;
    bank.scores.insert(
        2,
        Score {
            name: Some(*b"Main theme\0\0\0\0\0\0"),
            block: score_block,
        },
    );

    bank.tracks.insert(
        1,
        Track {
            name: Some(*b"Bass line\0\0\0\0\0\0\0"),
            lines: vec![0x7E01, 0x1040, 0x0004],
        },
    );

    let mut ins_block = [0u8; INSTRUMENT_BLOCK_LEN];
    ins_block[0] = 3;
    ins_block[50] = 0xAA;
    bank.instruments.insert(
        1,
        Instrument {
            name: Some(*b"Square lead\0\0\0\0\0"),
            block: ins_block,
        },
    );

    bank.waves.insert(
        3,
        Wave {
            name: Some(*b"Square\0\0\0\0\0\0\0\0\0\0"),
            dummy: 0,
            octave: 1,
            frag_factor: 2,
            double_buffered: 0,
            data: vec![0x7F, 0x00, 0x81, 0x00],
        },
    );

    bank
}

#[test]
fn test_write_then_parse_round_trip() {
    let bank = sample_bank(true, true);
    let buf = write_mso(&bank);
    let reparsed = parse_mso(&buf).unwrap();

    assert!(reparsed.names_included);
    assert!(reparsed.partial_tables);
    assert_eq!(reparsed.scores.get(2), bank.scores.get(2));
    assert_eq!(reparsed.tracks.get(1), bank.tracks.get(1));
    assert_eq!(reparsed.instruments.get(1), bank.instruments.get(1));
    assert_eq!(reparsed.waves.get(3), bank.waves.get(3));
    assert_eq!(reparsed.scores.len(), 1);
    assert_eq!(reparsed.tracks.len(), 1);
}

#[test]
fn test_write_full_tables_round_trip() {
    let bank = sample_bank(true, false);
    let buf = write_mso(&bank);
    let reparsed = parse_mso(&buf).unwrap();
    assert!(!reparsed.partial_tables);
    assert_eq!(reparsed.waves.get(3), bank.waves.get(3));
    assert_eq!(reparsed.scores.get(2), bank.scores.get(2));
}

#[test]
fn test_write_without_names_synthesizes_nothing() {
    // no-names banks carry no name bytes at all in the object form
    let bank = sample_bank(false, true);
    let buf = write_mso(&bank);
    let reparsed = parse_mso(&buf).unwrap();
    assert!(!reparsed.names_included);
    assert_eq!(reparsed.tracks.get(1).unwrap().name, None);
    assert_eq!(
        reparsed.tracks.get(1).unwrap().lines,
        bank.tracks.get(1).unwrap().lines
    );
}

#[test]
fn test_write_compacts_track_lines() {
    let mut bank = sample_bank(true, true);
    bank.tracks.insert(
        4,
        Track {
            name: Some(*b"Sparse\0\0\0\0\0\0\0\0\0\0"),
            lines: vec![0x0000, 0x7F44, 0x1040, 0x0000, 0x0002],
        },
    );
    let reparsed = parse_mso(&write_mso(&bank)).unwrap();
    // zero-length rests and time-signature lines are gone, the rest intact
    assert_eq!(reparsed.tracks.get(4).unwrap().lines, vec![0x1040, 0x0002]);
}

#[test]
fn test_write_empty_bank() {
    let bank = SoundBank::new(false, true);
    let reparsed = parse_mso(&write_mso(&bank)).unwrap();
    assert!(reparsed.scores.is_empty());
    assert!(reparsed.tracks.is_empty());
    assert!(reparsed.instruments.is_empty());
    assert!(reparsed.waves.is_empty());
}
