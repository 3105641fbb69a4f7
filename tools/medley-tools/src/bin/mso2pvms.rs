//! mso2pvms - convert a Medley Sound object (MSOB) to a project (PVMS) file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use medley_sound::{display_name, parse_mso, synthesize_name, write_pvms, Category};

/// Convert a Medley Sound object file to the project form
#[derive(Parser)]
#[command(name = "mso2pvms")]
#[command(about = "Convert a Medley Sound object (MSOB) to a project (PVMS) file")]
struct Cli {
    /// Object file to convert; output is written next to it with ".pvms" appended
    input: PathBuf,
}

fn main() -> Result<()> {
    medley_tools::init_logging();
    let cli = Cli::parse();

    let data = fs::read(&cli.input).with_context(|| format!("reading {:?}", cli.input))?;
    let bank = parse_mso(&data)?;

    println!(
        "{} scores, {} tracks, {} instruments, {} waves",
        bank.scores.len(),
        bank.tracks.len(),
        bank.instruments.len(),
        bank.waves.len()
    );
    for (index, wave) in bank.waves.iter() {
        let name = wave
            .name
            .unwrap_or_else(|| synthesize_name(Category::Wave, index));
        println!(
            " -- Wave {:02x} : {:04x} bytes - {}",
            index,
            wave.cycle_size(),
            display_name(&name)
        );
    }
    for (index, track) in bank.tracks.iter() {
        let name = track
            .name
            .unwrap_or_else(|| synthesize_name(Category::Track, index));
        println!(
            " -- Track {:02x} : {:03} lines - {}",
            index,
            track.lines.len() + 1,
            display_name(&name)
        );
    }

    let out = write_pvms(&bank);
    let out_path = medley_tools::output_path(&cli.input, ".pvms");
    fs::write(&out_path, &out).with_context(|| format!("writing {:?}", out_path))?;
    println!("Wrote {}", out_path.display());

    Ok(())
}
