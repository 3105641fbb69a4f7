//! Object-form decoding: magic hunt, vector resolution, table and record reads

use crate::error::MedleyError;
use crate::io::{array_at, be_u16_at, be_u32_at, byte_at};
use crate::model::{Instrument, Score, SoundBank, Track, Wave};
use crate::object::{
    INSTRUMENT_TABLE_VECTOR, NAMES_FLAG, PARTIAL_TABLES_FLAG, RESERVED_VECTORS, SCORE_TABLE_VECTOR,
    TRACK_TABLE_VECTOR, WAVE_TABLE_VECTOR,
};
use crate::{
    INSTRUMENT_BLOCK_LEN, LINE_END, MAX_RECORDS, MSO_MAGIC, NAME_LEN, SCORE_BLOCK_LEN,
    WAVE_BLOCK_LEN,
};

/// Find the object magic anywhere in the buffer
///
/// The magic is the root for everything else and is not always at the start
/// of the file: objects get appended to loader stubs and other containers.
pub fn hunt_magic(buf: &[u8]) -> Option<usize> {
    buf.windows(MSO_MAGIC.len()).position(|w| w == MSO_MAGIC)
}

/// Resolve a stored relative vector into an absolute buffer offset
///
/// A vector is a 4-byte big-endian value interpreted relative to its own
/// storage offset; 0 is the null sentinel. The resolved address is
/// bounds-checked so a nonsense vector fails here instead of corrupting
/// every read after it.
pub fn resolve_vector(buf: &[u8], offset: usize) -> Result<Option<usize>, MedleyError> {
    let vector = be_u32_at(buf, offset)? as usize;
    if vector == 0 {
        return Ok(None);
    }
    let target = offset + vector;
    if target >= buf.len() {
        return Err(MedleyError::OutOfBounds { offset: target });
    }
    Ok(Some(target))
}

/// A resolved index table: declared slot count plus absolute addresses
///
/// Slot 0 is the reserved count/sentinel cell and never holds an address;
/// `None` slots mean "record undefined at this index" and are skipped by
/// consumers, never treated as errors.
#[derive(Debug, Clone)]
pub struct AddressTable {
    pub count: u8,
    slots: Vec<Option<usize>>,
}

impl AddressTable {
    pub(crate) fn empty() -> Self {
        Self {
            count: 0,
            slots: vec![None],
        }
    }

    /// Absolute address of the record at a 1-based index, if defined
    pub fn get(&self, index: u8) -> Option<usize> {
        self.slots.get(index as usize).copied().flatten()
    }

    /// Defined slots in ascending index order
    pub fn iter_defined(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|addr| (i as u8, addr)))
    }
}

/// Read an index table at `base` into a uniform in-memory form
///
/// A partial table carries its true slot count in the byte immediately
/// before the table; count 0 means the table is absent and nothing further
/// is read. A full table always has 255 slots. Slot `i` lives at
/// `base + 4*i`; the cell at `base` itself belongs to reserved index 0.
pub fn read_table(buf: &[u8], base: usize, partial: bool) -> Result<AddressTable, MedleyError> {
    let count = if partial {
        if base == 0 {
            return Err(MedleyError::OutOfBounds { offset: 0 });
        }
        byte_at(buf, base - 1)?
    } else {
        MAX_RECORDS
    };
    if count == 0 {
        return Ok(AddressTable::empty());
    }

    let mut slots = vec![None; count as usize + 1];
    for i in 1..=count as usize {
        slots[i] = resolve_vector(buf, base + 4 * i)?;
    }
    Ok(AddressTable { count, slots })
}

/// Decode an object buffer into a [`SoundBank`]
pub fn parse_mso(data: &[u8]) -> Result<SoundBank, MedleyError> {
    let base = hunt_magic(data).ok_or(MedleyError::MagicNotFound)?;
    // everything from here on is relative to the magic position
    let buf = &data[base..];

    for offset in RESERVED_VECTORS {
        let value = be_u32_at(buf, offset)?;
        if value != 0 {
            tracing::warn!(
                "reserved header field at {:#010x} is not zero: {:#010x}",
                offset,
                value
            );
        }
    }

    let names_included = byte_at(buf, NAMES_FLAG)? != 0;
    let partial_tables = byte_at(buf, PARTIAL_TABLES_FLAG)? != 0;

    let mut bank = SoundBank::new(names_included, partial_tables);

    let scores = header_table(buf, SCORE_TABLE_VECTOR, partial_tables)?;
    bank.scores.set_count(scores.count);
    for (index, addr) in scores.iter_defined() {
        let (name, addr) = read_name(buf, addr, names_included)?;
        let block = array_at::<SCORE_BLOCK_LEN>(buf, addr)?;
        bank.scores.insert(index, Score { name, block });
    }

    let tracks = header_table(buf, TRACK_TABLE_VECTOR, partial_tables)?;
    bank.tracks.set_count(tracks.count);
    for (index, addr) in tracks.iter_defined() {
        let (name, addr) = read_name(buf, addr, names_included)?;
        let lines = read_track_lines(buf, addr, index)?;
        tracing::debug!("track {:02x}: {} lines", index, lines.len());
        bank.tracks.insert(index, Track { name, lines });
    }

    let instruments = header_table(buf, INSTRUMENT_TABLE_VECTOR, partial_tables)?;
    bank.instruments.set_count(instruments.count);
    for (index, addr) in instruments.iter_defined() {
        let (name, addr) = read_name(buf, addr, names_included)?;
        let block = array_at::<INSTRUMENT_BLOCK_LEN>(buf, addr)?;
        bank.instruments.insert(index, Instrument { name, block });
    }

    let waves = header_table(buf, WAVE_TABLE_VECTOR, partial_tables)?;
    bank.waves.set_count(waves.count);
    for (index, addr) in waves.iter_defined() {
        let (name, addr) = read_name(buf, addr, names_included)?;
        let mut wave = read_wave(buf, addr)?;
        wave.name = name;
        tracing::debug!("wave {:02x}: {} bytes of cycle data", index, wave.data.len());
        bank.waves.insert(index, wave);
    }

    Ok(bank)
}

/// Resolve a header table vector and read the table behind it;
/// a null vector means the whole category is absent
fn header_table(buf: &[u8], vector_offset: usize, partial: bool) -> Result<AddressTable, MedleyError> {
    match resolve_vector(buf, vector_offset)? {
        Some(base) => read_table(buf, base, partial),
        None => Ok(AddressTable::empty()),
    }
}

/// Read the optional 16-byte name prefix, returning the advanced offset
fn read_name(
    buf: &[u8],
    addr: usize,
    names_included: bool,
) -> Result<(Option<[u8; NAME_LEN]>, usize), MedleyError> {
    if !names_included {
        return Ok((None, addr));
    }
    let name = array_at::<NAME_LEN>(buf, addr)?;
    Ok((Some(name), addr + NAME_LEN))
}

/// Read event words up to the 0x8000 terminator (terminator not stored)
fn read_track_lines(buf: &[u8], mut offset: usize, index: u8) -> Result<Vec<u16>, MedleyError> {
    let mut lines = Vec::new();
    loop {
        let word = be_u16_at(buf, offset)
            .map_err(|_| MedleyError::TruncatedEventStream { index })?;
        offset += 2;
        if word == LINE_END {
            return Ok(lines);
        }
        lines.push(word);
    }
}

/// Read a wave header block and its cycle data
fn read_wave(buf: &[u8], addr: usize) -> Result<Wave, MedleyError> {
    let cycle_size = be_u16_at(buf, addr)?;
    let dummy = be_u16_at(buf, addr + 2)?;
    let octave = byte_at(buf, addr + 4)?;
    let frag_factor = byte_at(buf, addr + 5)?;
    let double_buffered = byte_at(buf, addr + 6)?;
    // byte 7 is padding
    let data = crate::io::slice_at(buf, addr + WAVE_BLOCK_LEN, cycle_size as usize)?.to_vec();
    Ok(Wave {
        name: None,
        dummy,
        octave,
        frag_factor,
        double_buffered,
        data,
    })
}
