//! hunkwrap - make raw 8-bit signed samples loadable by the editor
//!
//! Prepends the fixed hunk tag and a longword count to arbitrary raw PCM
//! data. Pure byte concatenation; the codec is not involved.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Wrap raw sample data in a loadable hunk file
#[derive(Parser)]
#[command(name = "hunkwrap")]
#[command(about = "Wrap raw 8-bit signed sample data in a hunk header (max 32 KiB)")]
struct Cli {
    /// Raw sample file; output is written next to it with ".hunk" appended
    input: PathBuf,
}

fn main() -> Result<()> {
    medley_tools::init_logging();
    let cli = Cli::parse();

    let data = fs::read(&cli.input).with_context(|| format!("reading {:?}", cli.input))?;
    let out = medley_tools::wrap_sample(&data);

    let out_path = medley_tools::output_path(&cli.input, ".hunk");
    fs::write(&out_path, &out).with_context(|| format!("writing {:?}", out_path))?;
    println!("Wrote {} ({} bytes)", out_path.display(), out.len());

    Ok(())
}
