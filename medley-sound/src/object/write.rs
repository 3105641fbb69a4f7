//! Object-form re-encoding

use crate::io::{patch_u32, put_u16};
use crate::model::{Category, SoundBank};
use crate::object::{
    HEADER_LEN, INSTRUMENT_TABLE_VECTOR, NAMES_FLAG, PARTIAL_TABLES_FLAG, SCORE_TABLE_VECTOR,
    TRACK_TABLE_VECTOR, WAVE_TABLE_VECTOR,
};
use crate::{LINE_END, MAX_RECORDS, MSO_MAGIC, NAME_LEN};

/// Re-encode a bank into the object form
///
/// Emits the fixed header, then per category the optional count byte, the
/// vector table and the records behind it. All table vectors and slot
/// vectors are relative to their own storage offset, so the layout is
/// position independent and re-parses with [`crate::parse_mso`].
///
/// Track streams are compacted on this path: zero-length rests and
/// time-signature lines are not written back, since the playback routine
/// ignores them.
pub fn write_mso(bank: &SoundBank) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MSO_MAGIC);
    out.resize(HEADER_LEN, 0);
    out[NAMES_FLAG] = bank.names_included as u8;
    out[PARTIAL_TABLES_FLAG] = bank.partial_tables as u8;

    let scores = collect_scores(bank);
    write_category(
        &mut out,
        SCORE_TABLE_VECTOR,
        bank.partial_tables,
        bank.scores.count(),
        &scores,
    );

    let tracks = collect_tracks(bank);
    write_category(
        &mut out,
        TRACK_TABLE_VECTOR,
        bank.partial_tables,
        bank.tracks.count(),
        &tracks,
    );

    let instruments = collect_instruments(bank);
    write_category(
        &mut out,
        INSTRUMENT_TABLE_VECTOR,
        bank.partial_tables,
        bank.instruments.count(),
        &instruments,
    );

    let waves = collect_waves(bank);
    write_category(
        &mut out,
        WAVE_TABLE_VECTOR,
        bank.partial_tables,
        bank.waves.count(),
        &waves,
    );

    out
}

/// Lay out one category: count byte (partial tables only), the table with
/// its reserved index-0 cell, then the records, patching each slot vector
/// as its record lands
fn write_category(
    out: &mut Vec<u8>,
    vector_offset: usize,
    partial: bool,
    declared_count: u8,
    records: &[(u8, Vec<u8>)],
) {
    let count = if partial { declared_count } else { MAX_RECORDS };
    if count == 0 {
        // empty partial table: the header vector stays null
        return;
    }
    if partial {
        out.push(count);
    }

    let table_base = out.len();
    patch_u32(out, vector_offset, (table_base - vector_offset) as u32);
    out.resize(table_base + 4 * (count as usize + 1), 0);

    for (index, record) in records {
        let cell = table_base + 4 * *index as usize;
        let addr = out.len();
        patch_u32(out, cell, (addr - cell) as u32);
        out.extend_from_slice(record);
    }
}

fn push_name(
    rec: &mut Vec<u8>,
    bank: &SoundBank,
    stored: Option<&[u8; NAME_LEN]>,
    category: Category,
    index: u8,
) {
    if bank.names_included {
        rec.extend_from_slice(&bank.record_name(stored, category, index));
    }
}

fn collect_scores(bank: &SoundBank) -> Vec<(u8, Vec<u8>)> {
    bank.scores
        .iter()
        .map(|(index, score)| {
            let mut rec = Vec::new();
            push_name(&mut rec, bank, score.name.as_ref(), Category::Score, index);
            rec.extend_from_slice(&score.block);
            (index, rec)
        })
        .collect()
}

fn collect_tracks(bank: &SoundBank) -> Vec<(u8, Vec<u8>)> {
    bank.tracks
        .iter()
        .map(|(index, track)| {
            let mut rec = Vec::new();
            push_name(&mut rec, bank, track.name.as_ref(), Category::Track, index);
            for line in track.compacted_lines() {
                put_u16(&mut rec, line);
            }
            put_u16(&mut rec, LINE_END);
            (index, rec)
        })
        .collect()
}

fn collect_instruments(bank: &SoundBank) -> Vec<(u8, Vec<u8>)> {
    bank.instruments
        .iter()
        .map(|(index, instrument)| {
            let mut rec = Vec::new();
            push_name(
                &mut rec,
                bank,
                instrument.name.as_ref(),
                Category::Instrument,
                index,
            );
            rec.extend_from_slice(&instrument.block);
            (index, rec)
        })
        .collect()
}

fn collect_waves(bank: &SoundBank) -> Vec<(u8, Vec<u8>)> {
    bank.waves
        .iter()
        .map(|(index, wave)| {
            let mut rec = Vec::new();
            push_name(&mut rec, bank, wave.name.as_ref(), Category::Wave, index);
            put_u16(&mut rec, wave.cycle_size());
            put_u16(&mut rec, wave.dummy);
            rec.push(wave.octave);
            rec.push(wave.frag_factor);
            rec.push(wave.double_buffered);
            rec.push(0); // pad byte
            rec.extend_from_slice(&wave.data);
            (index, rec)
        })
        .collect()
}
