//! Error types for object and project decoding

use crate::model::Category;

/// Errors that can occur when decoding either binary form
///
/// Every variant is fatal: the formats carry no redundancy, so a single
/// misread offset or tag corrupts everything after it. Recoverable quirks
/// (nonzero reserved fields, track length mismatches) are logged as warnings
/// instead and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MedleyError {
    /// No "MSOB" magic anywhere in the input
    #[error("magic bytes \"MSOB\" not found")]
    MagicNotFound,
    /// "PVMS" magic missing at offset 0
    #[error("unknown file type (missing \"PVMS\" magic)")]
    UnknownFileType,
    /// Unrecognized chunk tag in the project stream
    #[error("broken source: unknown chunk tag {tag:02X?} at offset {offset:#010x}")]
    BrokenSource { tag: [u8; 4], offset: usize },
    /// Declared record header size does not match the category constant
    #[error("{category} header size mismatch: expected {expected:#06x}, found {found:#06x}")]
    HeaderSizeMismatch {
        category: Category,
        expected: u16,
        found: u16,
    },
    /// Record index outside [1, 255]
    #[error("record index {index} out of bounds (valid range is 1..=255)")]
    IndexOutOfBounds { index: u16 },
    /// Vector, table or record read past the end of the buffer
    #[error("read out of bounds at offset {offset:#010x}")]
    OutOfBounds { offset: usize },
    /// Track event stream reached the end of the data without 0x8000
    #[error("track {index:#04x} event stream is missing the 0x8000 terminator")]
    TruncatedEventStream { index: u8 },
    /// Project chunk stream ended in the middle of a record
    #[error("unexpected end of file")]
    UnexpectedEof,
}
