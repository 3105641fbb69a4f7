//! Project-form encoding

use crate::io::{put_u16, put_u32};
use crate::model::{Category, SoundBank};
use crate::{CHUNK_END, END_TAG, LINE_END, PVMS_MAGIC};

/// Encode a bank into the project form
///
/// Chunks are emitted in the fixed Wave, Instrument, Track, Score order and
/// the stream ends with the global `END.` tag. The output is fully
/// self-delimiting: record indices are explicit and no relative addressing
/// survives from the object form.
pub fn write_pvms(bank: &SoundBank) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PVMS_MAGIC);
    write_wave_chunk(&mut out, bank);
    write_instrument_chunk(&mut out, bank);
    write_track_chunk(&mut out, bank);
    write_score_chunk(&mut out, bank);
    out.extend_from_slice(&END_TAG);
    out
}

fn open_chunk(out: &mut Vec<u8>, category: Category) {
    out.extend_from_slice(&category.tag());
    put_u16(out, category.header_size());
}

fn push_record_head(out: &mut Vec<u8>, bank: &SoundBank, category: Category, index: u8, stored: Option<&[u8; crate::NAME_LEN]>) {
    put_u16(out, index as u16);
    out.extend_from_slice(&bank.record_name(stored, category, index));
}

fn write_wave_chunk(out: &mut Vec<u8>, bank: &SoundBank) {
    open_chunk(out, Category::Wave);
    for (index, wave) in bank.waves.iter() {
        push_record_head(out, bank, Category::Wave, index, wave.name.as_ref());
        put_u32(out, 0); // wave data pointer, overwritten by the loader
        put_u16(out, wave.cycle_size());
        put_u16(out, wave.dummy);
        // single-byte fields are reordered relative to the object layout
        out.push(wave.double_buffered);
        out.push(wave.frag_factor);
        out.push(wave.octave);
        out.push(0); // pad byte
        out.extend_from_slice(&wave.data);
    }
    put_u16(out, CHUNK_END);
}

fn write_instrument_chunk(out: &mut Vec<u8>, bank: &SoundBank) {
    open_chunk(out, Category::Instrument);
    for (index, instrument) in bank.instruments.iter() {
        push_record_head(out, bank, Category::Instrument, index, instrument.name.as_ref());
        out.extend_from_slice(&instrument.block);
    }
    put_u16(out, CHUNK_END);
}

fn write_track_chunk(out: &mut Vec<u8>, bank: &SoundBank) {
    open_chunk(out, Category::Track);
    for (index, track) in bank.tracks.iter() {
        push_record_head(out, bank, Category::Track, index, track.name.as_ref());
        // the project form carries a richer per-track header than the
        // object form: reserved fields, the stream byte length and a marker
        put_u32(out, 0);
        put_u16(out, track.stream_len() as u16);
        out.extend_from_slice(&[0u8; 8]);
        put_u16(out, CHUNK_END);
        for line in &track.lines {
            put_u16(out, *line);
        }
        put_u16(out, LINE_END);
    }
    put_u16(out, CHUNK_END);
}

fn write_score_chunk(out: &mut Vec<u8>, bank: &SoundBank) {
    open_chunk(out, Category::Score);
    for (index, score) in bank.scores.iter() {
        push_record_head(out, bank, Category::Score, index, score.name.as_ref());
        out.extend_from_slice(&score.block);
    }
    put_u16(out, CHUNK_END);
}
