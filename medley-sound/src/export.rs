//! Score export selection: reference closure and index substitution
//!
//! Given a set of chosen scores, everything they transitively reference
//! (tracks, instruments, waves) is kept and renumbered into compact 1-based
//! indices; every other record is dropped. The rewritten references keep
//! the filtered bank playable after re-encoding. References to undefined
//! records are dropped with a warning rather than failing the export.

use crate::model::{is_instrument_select, SoundBank, VOICE_SLOTS};
use crate::INSTRUMENT_LINE;

/// Per-category substitution table: old index to new index, 0 = dropped
struct Remap([u8; 256]);

impl Remap {
    /// Compact the kept indices, preserving ascending order
    fn build(keep: &[bool; 256]) -> Remap {
        let mut map = [0u8; 256];
        let mut next = 0u8;
        for index in 1..=u8::MAX as usize {
            if keep[index] {
                next += 1;
                map[index] = next;
            }
        }
        Remap(map)
    }

    fn get(&self, old: u8) -> u8 {
        self.0[old as usize]
    }
}

/// Filter a bank down to the chosen scores and their transitive references
pub fn select_scores(bank: &SoundBank, chosen: &[u8]) -> SoundBank {
    let mut keep_scores = [false; 256];
    let mut keep_tracks = [false; 256];
    let mut keep_instruments = [false; 256];
    let mut keep_waves = [false; 256];

    for &index in chosen {
        match bank.scores.get(index) {
            Some(score) => {
                keep_scores[index as usize] = true;
                for track in score.track_refs() {
                    if bank.tracks.get(track).is_some() {
                        keep_tracks[track as usize] = true;
                    } else {
                        tracing::warn!(
                            "score {:02x} references undefined track {:02x}; reference dropped",
                            index,
                            track
                        );
                    }
                }
            }
            None => tracing::warn!("score {:02x} is undefined; selection skipped", index),
        }
    }

    for (index, track) in bank.tracks.iter() {
        if !keep_tracks[index as usize] {
            continue;
        }
        for instrument in track.instrument_refs() {
            if bank.instruments.get(instrument).is_some() {
                keep_instruments[instrument as usize] = true;
            } else {
                tracing::warn!(
                    "track {:02x} selects undefined instrument {:02x}; reference dropped",
                    index,
                    instrument
                );
            }
        }
    }

    for (index, instrument) in bank.instruments.iter() {
        if !keep_instruments[index as usize] {
            continue;
        }
        if let Some(wave) = instrument.wave_ref() {
            if bank.waves.get(wave).is_some() {
                keep_waves[wave as usize] = true;
            } else {
                tracing::warn!(
                    "instrument {:02x} references undefined wave {:02x}; reference dropped",
                    index,
                    wave
                );
            }
        }
    }

    let score_map = Remap::build(&keep_scores);
    let track_map = Remap::build(&keep_tracks);
    let instrument_map = Remap::build(&keep_instruments);
    let wave_map = Remap::build(&keep_waves);

    let mut out = SoundBank::new(bank.names_included, bank.partial_tables);

    for (index, score) in bank.scores.iter() {
        let new_index = score_map.get(index);
        if new_index == 0 {
            continue;
        }
        let mut score = score.clone();
        for slot in &mut score.block[..VOICE_SLOTS] {
            // empty slots and dropped references both end up 0
            *slot = track_map.get(*slot);
        }
        out.scores.insert(new_index, score);
    }

    for (index, track) in bank.tracks.iter() {
        let new_index = track_map.get(index);
        if new_index == 0 {
            continue;
        }
        let mut track = track.clone();
        for line in &mut track.lines {
            if is_instrument_select(*line) {
                let new = instrument_map.get(*line as u8);
                *line = u16::from(INSTRUMENT_LINE) << 8 | u16::from(new);
            }
        }
        out.tracks.insert(new_index, track);
    }

    for (index, instrument) in bank.instruments.iter() {
        let new_index = instrument_map.get(index);
        if new_index == 0 {
            continue;
        }
        let mut instrument = instrument.clone();
        instrument.block[0] = wave_map.get(instrument.block[0]);
        out.instruments.insert(new_index, instrument);
    }

    for (index, wave) in bank.waves.iter() {
        let new_index = wave_map.get(index);
        if new_index == 0 {
            continue;
        }
        out.waves.insert(new_index, wave.clone());
    }

    out
}
