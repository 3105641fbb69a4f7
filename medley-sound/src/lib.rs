//! Medley-Sound: codec for the Medley Sound editor's binary asset formats
//!
//! This crate converts between the two on-disk representations of a Medley
//! Sound asset collection: the pointer-linked "object" form (MSOB) that the
//! playback routine consumes, and the flat chunk-tagged "project" form (PVMS)
//! that the editor saves. Both directions are supported, along with the
//! score-selection export path that drops unreferenced records.
//!
//! # Key Features
//!
//! - **Bidirectional**: MSOB -> PVMS and PVMS -> MSOB
//! - **Exact layouts**: relative offset vectors, sparse index tables and
//!   sentinel words are reproduced byte for byte
//! - **Opaque payloads**: instrument and score data blocks are copied
//!   verbatim, never interpreted by the codec itself
//! - **Export selection**: transitive closure over score references with
//!   compact index renumbering
//!
//! # Format Overview
//!
//! An MSOB object holds four record categories (scores, tracks, instruments,
//! waves) addressed through tables of self-relative offset vectors; tables are
//! either full (255 slots) or length-prefixed partial tables. A PVMS project
//! stores the same records as sequential tagged chunks keyed by small integer
//! indices, one chunk per category, ending in a global `END.` tag.
//!
//! # Usage
//!
//! ```ignore
//! use medley_sound::{parse_mso, write_pvms};
//!
//! let data = std::fs::read("songs.mso").unwrap();
//! let bank = parse_mso(&data).unwrap();
//!
//! println!("{} scores, {} waves", bank.scores.len(), bank.waves.len());
//!
//! let project = write_pvms(&bank);
//! std::fs::write("songs.mso.pvms", &project).unwrap();
//! ```
//!
//! # Format Reference
//!
//! - Medley Sound format notes
//! - <https://github.com/the1stArchyx/medley-sound-docs>

mod error;
mod export;
mod io;
mod model;
mod object;
mod project;

pub use error::MedleyError;
pub use export::select_scores;
pub use model::{
    display_name, synthesize_name, Category, CategoryTable, Instrument, Score, SoundBank, Track,
    Wave,
};
pub use object::read::{hunt_magic, parse_mso, read_table, resolve_vector, AddressTable};
pub use object::write::write_mso;
pub use project::read::parse_pvms;
pub use project::write::write_pvms;

// =============================================================================
// Constants
// =============================================================================

/// Object-form magic bytes
pub const MSO_MAGIC: [u8; 4] = *b"MSOB";

/// Project-form magic bytes (always at offset 0)
pub const PVMS_MAGIC: [u8; 4] = *b"PVMS";

/// Project-form global end tag
pub const END_TAG: [u8; 4] = *b"END.";

/// Wave chunk tag
pub const WAVE_TAG: [u8; 4] = *b"WAV2";

/// Instrument chunk tag
pub const INSTRUMENT_TAG: [u8; 4] = *b"INS:";

/// Track chunk tag
pub const TRACK_TAG: [u8; 4] = *b"TRK:";

/// Score chunk tag
pub const SCORE_TAG: [u8; 4] = *b"SCO:";

/// Highest record index in any category (index 0 is never a record)
pub const MAX_RECORDS: u8 = 255;

/// Fixed width of a stored record name
pub const NAME_LEN: usize = 16;

/// Size of the score data block
pub const SCORE_BLOCK_LEN: usize = 34;

/// Size of the instrument data block
pub const INSTRUMENT_BLOCK_LEN: usize = 106;

/// Size of the wave header block in the object form
pub const WAVE_BLOCK_LEN: usize = 8;

// =============================================================================
// Per-record header sizes declared in project chunks
// =============================================================================

/// Declared record header size of a `WAV2` chunk
pub const WAVE_HEADER_SIZE: u16 = 0x001C;

/// Declared record header size of an `INS:` chunk
pub const INSTRUMENT_HEADER_SIZE: u16 = 0x007A;

/// Declared record header size of a `TRK:` chunk
pub const TRACK_HEADER_SIZE: u16 = 0x0020;

/// Declared record header size of a `SCO:` chunk
pub const SCORE_HEADER_SIZE: u16 = 0x0032;

// =============================================================================
// Track event lines
// =============================================================================

/// Event word terminating a track line stream
pub const LINE_END: u16 = 0x8000;

/// High byte of a time-signature marker line
pub const TIME_SIG_LINE: u8 = 0x7F;

/// High byte of an instrument-select line (low byte = instrument index)
pub const INSTRUMENT_LINE: u8 = 0x7E;

/// End-of-chunk / end-of-record-header sentinel word in the project form
pub const CHUNK_END: u16 = 0xFFFF;

// =============================================================================
// Tests
// =============================================================================
