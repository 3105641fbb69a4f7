//! Project-form decoding: chunk walking and record reconstruction

use std::io::Cursor;

use crate::error::MedleyError;
use crate::io::{read_array, read_i16, read_u16, read_u32, read_u8, read_vec};
use crate::model::{Category, Instrument, Score, SoundBank, Track, Wave};
use crate::{
    END_TAG, INSTRUMENT_BLOCK_LEN, INSTRUMENT_TAG, LINE_END, MAX_RECORDS, NAME_LEN, PVMS_MAGIC,
    SCORE_BLOCK_LEN, SCORE_TAG, TRACK_TAG, WAVE_TAG,
};

/// Decode a project buffer into a [`SoundBank`]
///
/// The magic must sit at offset 0. Chunks are dispatched on their 4-byte
/// tag; the `END.` tag ends decoding successfully regardless of any
/// trailing bytes, and an unrecognized tag is fatal since nothing after it
/// can be trusted.
pub fn parse_pvms(buf: &[u8]) -> Result<SoundBank, MedleyError> {
    if buf.len() < PVMS_MAGIC.len() || buf[..PVMS_MAGIC.len()] != PVMS_MAGIC {
        return Err(MedleyError::UnknownFileType);
    }
    let mut cursor = Cursor::new(buf);
    cursor.set_position(PVMS_MAGIC.len() as u64);

    // project records always carry names, and the object re-encode path
    // uses partial tables (they are the size optimization this converter
    // exists to produce)
    let mut bank = SoundBank::new(true, true);

    loop {
        let offset = cursor.position() as usize;
        let tag: [u8; 4] = read_array(&mut cursor)?;
        match tag {
            WAVE_TAG => read_wave_chunk(&mut cursor, &mut bank)?,
            INSTRUMENT_TAG => read_instrument_chunk(&mut cursor, &mut bank)?,
            TRACK_TAG => read_track_chunk(&mut cursor, &mut bank)?,
            SCORE_TAG => read_score_chunk(&mut cursor, &mut bank)?,
            END_TAG => break,
            _ => return Err(MedleyError::BrokenSource { tag, offset }),
        }
    }

    Ok(bank)
}

/// Validate the declared per-record header size against the category
/// constant; a mismatch means an incompatible format version, fatal before
/// any record is read
fn expect_header_size(cursor: &mut Cursor<&[u8]>, category: Category) -> Result<(), MedleyError> {
    let found = read_u16(cursor)?;
    let expected = category.header_size();
    if found != expected {
        return Err(MedleyError::HeaderSizeMismatch {
            category,
            expected,
            found,
        });
    }
    Ok(())
}

/// Read the next record index, or `None` on the end-of-chunk sentinel
/// (any negative word); 0 and values above 255 are fatal
fn read_record_index(cursor: &mut Cursor<&[u8]>) -> Result<Option<u8>, MedleyError> {
    let raw = read_i16(cursor)?;
    if raw < 0 {
        return Ok(None);
    }
    if raw == 0 || raw > MAX_RECORDS as i16 {
        return Err(MedleyError::IndexOutOfBounds { index: raw as u16 });
    }
    Ok(Some(raw as u8))
}

fn read_wave_chunk(cursor: &mut Cursor<&[u8]>, bank: &mut SoundBank) -> Result<(), MedleyError> {
    expect_header_size(cursor, Category::Wave)?;
    while let Some(index) = read_record_index(cursor)? {
        let name: [u8; NAME_LEN] = read_array(cursor)?;
        let _pointer = read_u32(cursor)?; // loader scratch, always rewritten
        let cycle_size = read_u16(cursor)?;
        let dummy = read_u16(cursor)?;
        let double_buffered = read_u8(cursor)?;
        let frag_factor = read_u8(cursor)?;
        let octave = read_u8(cursor)?;
        let _pad = read_u8(cursor)?;
        let data = read_vec(cursor, cycle_size as usize)?;
        bank.waves.insert(
            index,
            Wave {
                name: Some(name),
                dummy,
                octave,
                frag_factor,
                double_buffered,
                data,
            },
        );
    }
    Ok(())
}

fn read_instrument_chunk(
    cursor: &mut Cursor<&[u8]>,
    bank: &mut SoundBank,
) -> Result<(), MedleyError> {
    expect_header_size(cursor, Category::Instrument)?;
    while let Some(index) = read_record_index(cursor)? {
        let name: [u8; NAME_LEN] = read_array(cursor)?;
        let block: [u8; INSTRUMENT_BLOCK_LEN] = read_array(cursor)?;
        bank.instruments.insert(
            index,
            Instrument {
                name: Some(name),
                block,
            },
        );
    }
    Ok(())
}

fn read_track_chunk(cursor: &mut Cursor<&[u8]>, bank: &mut SoundBank) -> Result<(), MedleyError> {
    expect_header_size(cursor, Category::Track)?;
    while let Some(index) = read_record_index(cursor)? {
        let name: [u8; NAME_LEN] = read_array(cursor)?;
        let _reserved = read_u32(cursor)?;
        let declared = read_u16(cursor)?;
        let _reserved2: [u8; 8] = read_array(cursor)?;
        let _marker = read_u16(cursor)?;

        let mut lines = Vec::new();
        loop {
            let word =
                read_u16(cursor).map_err(|_| MedleyError::TruncatedEventStream { index })?;
            if word == LINE_END {
                break;
            }
            lines.push(word);
        }

        let track = Track {
            name: Some(name),
            lines,
        };
        if track.stream_len() != declared as usize {
            tracing::warn!(
                "track {:02x}: declared stream length {} does not match measured {}; using measured",
                index,
                declared,
                track.stream_len()
            );
        }
        bank.tracks.insert(index, track);
    }
    Ok(())
}

fn read_score_chunk(cursor: &mut Cursor<&[u8]>, bank: &mut SoundBank) -> Result<(), MedleyError> {
    expect_header_size(cursor, Category::Score)?;
    while let Some(index) = read_record_index(cursor)? {
        let name: [u8; NAME_LEN] = read_array(cursor)?;
        let block: [u8; SCORE_BLOCK_LEN] = read_array(cursor)?;
        bank.scores.insert(
            index,
            Score {
                name: Some(name),
                block,
            },
        );
    }
    Ok(())
}
