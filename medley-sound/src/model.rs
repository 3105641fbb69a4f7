//! In-memory model of a Medley Sound asset collection

use std::fmt;

use crate::{
    INSTRUMENT_BLOCK_LEN, INSTRUMENT_HEADER_SIZE, INSTRUMENT_LINE, INSTRUMENT_TAG, NAME_LEN,
    SCORE_BLOCK_LEN, SCORE_HEADER_SIZE, SCORE_TAG, TIME_SIG_LINE, TRACK_HEADER_SIZE, TRACK_TAG,
    WAVE_HEADER_SIZE, WAVE_TAG,
};

/// Number of track-index bytes at the start of a score block
/// (four voices, eight sequence slots each)
pub const VOICE_SLOTS: usize = 32;

/// The four record categories of the asset model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Score,
    Track,
    Instrument,
    Wave,
}

impl Category {
    /// Human-readable label, also used for synthesized names
    pub fn label(self) -> &'static str {
        match self {
            Category::Score => "Score",
            Category::Track => "Track",
            Category::Instrument => "Instrument",
            Category::Wave => "Wave",
        }
    }

    /// Project-form chunk tag
    pub fn tag(self) -> [u8; 4] {
        match self {
            Category::Score => SCORE_TAG,
            Category::Track => TRACK_TAG,
            Category::Instrument => INSTRUMENT_TAG,
            Category::Wave => WAVE_TAG,
        }
    }

    /// Declared per-record header size of this category's project chunk
    pub fn header_size(self) -> u16 {
        match self {
            Category::Score => SCORE_HEADER_SIZE,
            Category::Track => TRACK_HEADER_SIZE,
            Category::Instrument => INSTRUMENT_HEADER_SIZE,
            Category::Wave => WAVE_HEADER_SIZE,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Synthesize the deterministic placeholder name for a record without one,
/// e.g. `"Wave 01"` NUL-padded to 16 bytes
pub fn synthesize_name(category: Category, index: u8) -> [u8; NAME_LEN] {
    let mut name = [0u8; NAME_LEN];
    let text = format!("{} {:02x}", category.label(), index);
    name[..text.len()].copy_from_slice(text.as_bytes());
    name
}

/// Render a fixed-width stored name for display: cut at the first NUL,
/// lossy-decode, trim trailing blanks
pub fn display_name(name: &[u8; NAME_LEN]) -> String {
    let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    String::from_utf8_lossy(&name[..len]).trim_end().to_string()
}

/// Fixed-capacity category storage indexed by 1-based record index
///
/// Mirrors the disk tables: 256 slots where slot 0 is permanently vacant
/// (it is the count/sentinel cell on disk, never a record) and `count` is
/// the declared table length, which bounds every defined index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable<T> {
    count: u8,
    slots: Vec<Option<T>>,
}

impl<T> CategoryTable<T> {
    pub fn new() -> Self {
        Self {
            count: 0,
            slots: (0..=u8::MAX as usize).map(|_| None).collect(),
        }
    }

    /// Declared slot count (table length on disk, not the number of records)
    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn set_count(&mut self, count: u8) {
        self.count = self.count.max(count);
    }

    /// Store a record; index 0 is never a record and is ignored
    pub fn insert(&mut self, index: u8, value: T) {
        if index == 0 {
            return;
        }
        self.count = self.count.max(index);
        self.slots[index as usize] = Some(value);
    }

    pub fn get(&self, index: u8) -> Option<&T> {
        self.slots[index as usize].as_ref()
    }

    pub fn get_mut(&mut self, index: u8) -> Option<&mut T> {
        self.slots[index as usize].as_mut()
    }

    /// Defined records in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u8, v)))
    }

    /// Number of defined records
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }
}

impl<T> Default for CategoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A score record: opaque 34-byte data block, optionally named
///
/// The first [`VOICE_SLOTS`] bytes of the block are the four voice
/// sequences of track indices; the codec copies them verbatim and only the
/// export selector reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub name: Option<[u8; NAME_LEN]>,
    pub block: [u8; SCORE_BLOCK_LEN],
}

impl Score {
    /// Track indices referenced by the voice sequences (nonzero slots)
    pub fn track_refs(&self) -> impl Iterator<Item = u8> + '_ {
        self.block[..VOICE_SLOTS].iter().copied().filter(|&t| t != 0)
    }
}

/// A track record: the event-line stream, terminator not stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: Option<[u8; NAME_LEN]>,
    pub lines: Vec<u16>,
}

impl Track {
    /// Byte length of the stream as stored on disk, terminator included
    pub fn stream_len(&self) -> usize {
        (self.lines.len() + 1) * 2
    }

    /// Instrument indices selected by the stream
    pub fn instrument_refs(&self) -> impl Iterator<Item = u8> + '_ {
        self.lines
            .iter()
            .filter(|&&line| is_instrument_select(line))
            .map(|&line| line as u8)
    }

    /// The stream with lines the playback routine ignores removed:
    /// zero-length rests and time-signature markers, nothing else
    pub fn compacted_lines(&self) -> Vec<u16> {
        self.lines
            .iter()
            .copied()
            .filter(|&line| line != 0x0000 && !is_time_signature(line))
            .collect()
    }
}

/// A line that selects the instrument in its low byte
pub fn is_instrument_select(line: u16) -> bool {
    (line >> 8) as u8 == INSTRUMENT_LINE
}

/// A time-signature marker line (editor display metadata)
pub fn is_time_signature(line: u16) -> bool {
    (line >> 8) as u8 == TIME_SIG_LINE
}

/// An instrument record: opaque 106-byte data block
///
/// Byte 0 is the wave index; the rest is synthesis parameters the codec
/// never interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub name: Option<[u8; NAME_LEN]>,
    pub block: [u8; INSTRUMENT_BLOCK_LEN],
}

impl Instrument {
    /// Wave referenced by this instrument, if any
    pub fn wave_ref(&self) -> Option<u8> {
        match self.block[0] {
            0 => None,
            w => Some(w),
        }
    }
}

/// A wave record: header fields plus the raw cycle data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    pub name: Option<[u8; NAME_LEN]>,
    pub dummy: u16,
    pub octave: u8,
    pub frag_factor: u8,
    pub double_buffered: u8,
    pub data: Vec<u8>,
}

impl Wave {
    /// Cycle data length in bytes
    pub fn cycle_size(&self) -> u16 {
        self.data.len() as u16
    }
}

/// A decoded asset collection: one table per category plus the two
/// bank-wide flags from the object header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundBank {
    pub scores: CategoryTable<Score>,
    pub tracks: CategoryTable<Track>,
    pub instruments: CategoryTable<Instrument>,
    pub waves: CategoryTable<Wave>,
    /// Records carry stored 16-byte names (otherwise names are synthesized)
    pub names_included: bool,
    /// Tables are length-prefixed partial tables rather than full 255-slot ones
    pub partial_tables: bool,
}

impl SoundBank {
    pub fn new(names_included: bool, partial_tables: bool) -> Self {
        Self {
            names_included,
            partial_tables,
            ..Default::default()
        }
    }

    /// The name to write for a record: the stored one when the bank carries
    /// names, a synthesized placeholder otherwise
    pub fn record_name(
        &self,
        stored: Option<&[u8; NAME_LEN]>,
        category: Category,
        index: u8,
    ) -> [u8; NAME_LEN] {
        if self.names_included {
            if let Some(name) = stored {
                return *name;
            }
        }
        synthesize_name(category, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_name() {
        assert_eq!(&synthesize_name(Category::Wave, 0x01)[..7], b"Wave 01");
        assert_eq!(synthesize_name(Category::Wave, 0x01)[7..], [0u8; 9]);
        assert_eq!(
            &synthesize_name(Category::Instrument, 0xAB)[..13],
            b"Instrument ab"
        );
        // longest label still fits the fixed width
        assert!(format!("{} {:02x}", Category::Instrument, 0xFF).len() <= NAME_LEN);
    }

    #[test]
    fn test_display_name() {
        let mut name = [0u8; NAME_LEN];
        name[..5].copy_from_slice(b"Lead ");
        assert_eq!(display_name(&name), "Lead");
        assert_eq!(display_name(&synthesize_name(Category::Score, 2)), "Score 02");
    }

    #[test]
    fn test_category_table() {
        let mut table: CategoryTable<u32> = CategoryTable::new();
        assert!(table.is_empty());
        assert_eq!(table.count(), 0);

        table.insert(3, 30);
        table.insert(1, 10);
        table.insert(0, 99); // index 0 is never a record
        assert_eq!(table.len(), 2);
        assert_eq!(table.count(), 3);
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(1), Some(&10));
        assert_eq!(table.get(2), None);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![(1, &10), (3, &30)]
        );

        table.insert(255, 50);
        assert_eq!(table.count(), 255);
    }

    #[test]
    fn test_track_refs_and_compaction() {
        let track = Track {
            name: None,
            lines: vec![0x7E02, 0x1040, 0x0000, 0x7F34, 0x0004, 0x7E05],
        };
        assert_eq!(track.instrument_refs().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(track.stream_len(), 14);
        // zero-length rest and time-signature line are dropped, order kept
        assert_eq!(
            track.compacted_lines(),
            vec![0x7E02, 0x1040, 0x0004, 0x7E05]
        );
    }

    #[test]
    fn test_score_track_refs() {
        let mut block = [0u8; SCORE_BLOCK_LEN];
        block[0] = 4;
        block[9] = 7;
        block[32] = 9; // tempo byte, not a voice slot
        let score = Score { name: None, block };
        assert_eq!(score.track_refs().collect::<Vec<_>>(), vec![4, 7]);
    }

    #[test]
    fn test_record_name() {
        let bank = SoundBank::new(false, true);
        let stored = [b'X'; NAME_LEN];
        assert_eq!(
            bank.record_name(Some(&stored), Category::Wave, 1),
            synthesize_name(Category::Wave, 1)
        );

        let named_bank = SoundBank::new(true, true);
        assert_eq!(
            named_bank.record_name(Some(&stored), Category::Wave, 1),
            stored
        );
    }
}
