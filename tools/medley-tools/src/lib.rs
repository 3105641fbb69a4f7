//! Shared plumbing for the Medley Sound command-line tools
//!
//! Each binary is a thin driver over the `medley-sound` codec: read one
//! file, convert, write one file. Everything the binaries share lives here.

use std::path::{Path, PathBuf};

/// Fixed hunk framing prefix the editor's sample loader expects
pub const HUNK_HEADER: [u8; 12] = [
    0x00, 0x00, 0x03, 0xE7, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xE9,
];

/// Longest raw sample the editor can load
pub const MAX_SAMPLE_LEN: usize = 32768;

/// Install the fmt subscriber; `RUST_LOG` overrides the INFO default
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

/// Derive the output path by appending a suffix to the input path:
/// `songs.mso` becomes `songs.mso.pvms`
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Parse an interactive score selection: `all` (or an empty line) selects
/// everything, otherwise space- or comma-separated record indices.
/// Returns `None` when the input cannot be parsed.
pub fn parse_selection(input: &str, available: &[u8]) -> Option<Vec<u8>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return Some(available.to_vec());
    }
    let mut chosen = Vec::new();
    for token in trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<u8>() {
            Ok(n) if n >= 1 => chosen.push(n),
            _ => return None,
        }
    }
    Some(chosen)
}

/// Wrap raw 8-bit signed sample data in the minimal hunk framing the
/// editor's loader expects: fixed header, big-endian longword count, then
/// the payload zero-padded to a 4-byte multiple. Data over 32 KiB is
/// truncated with a warning.
pub fn wrap_sample(data: &[u8]) -> Vec<u8> {
    let mut payload = if data.len() > MAX_SAMPLE_LEN {
        tracing::warn!(
            "source data is {} bytes, over the 32 KiB limit; truncated",
            data.len()
        );
        data[..MAX_SAMPLE_LEN].to_vec()
    } else {
        data.to_vec()
    };
    while payload.len() % 4 != 0 {
        payload.push(0);
    }

    let mut out = Vec::with_capacity(HUNK_HEADER.len() + 4 + payload.len());
    out.extend_from_slice(&HUNK_HEADER);
    out.extend_from_slice(&((payload.len() / 4) as u32).to_be_bytes());
    out.extend_from_slice(&payload);
    out
}
