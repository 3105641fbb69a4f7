//! msodecode - print the contents of a Medley Sound object file

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use medley_sound::{
    display_name, hunt_magic, parse_mso, resolve_vector, synthesize_name, Category, NAME_LEN,
};

/// Inspect a Medley Sound object file
#[derive(Parser)]
#[command(name = "msodecode")]
#[command(about = "Print the header, tables and record names of a Medley Sound object")]
struct Cli {
    /// Object file to inspect
    input: PathBuf,
}

fn main() -> Result<()> {
    medley_tools::init_logging();
    let cli = Cli::parse();

    let data = fs::read(&cli.input).with_context(|| format!("reading {:?}", cli.input))?;

    let Some(base) = hunt_magic(&data) else {
        bail!("magic bytes \"MSOB\" not found in {:?}", cli.input);
    };
    println!("Magic bytes \"MSOB\" found at: {:#010x}", base);
    if base > 0 {
        println!("All following offsets are relative to the location of the magic bytes!");
    }

    // header vectors at 4/8/12/16: score, track, instrument, wave tables
    let buf = &data[base..];
    let mut tables = Vec::new();
    for offset in [4usize, 8, 12, 16] {
        let addr = resolve_vector(buf, offset)?.unwrap_or(0);
        tables.push(format!("{:#010x}", addr));
    }
    println!(
        "Score/Track/Instrument/Wave tables at: {}",
        tables.join(" / ")
    );

    let bank = parse_mso(&data)?;
    println!(
        "Flags:\n - Names are included: {}\n - Partial tables used: {}",
        bank.names_included, bank.partial_tables
    );

    println!("\nScore list:");
    for (index, score) in bank.scores.iter() {
        println!(" - {:#04x}: {}", index, name_of(score.name, Category::Score, index));
    }

    println!("\nTrack list:");
    for (index, track) in bank.tracks.iter() {
        println!(
            " - {:#04x}: {:<16} // {:03} lines",
            index,
            name_of(track.name, Category::Track, index),
            track.lines.len() + 1
        );
    }

    println!("\nInstrument list:");
    for (index, instrument) in bank.instruments.iter() {
        println!(
            " - {:#04x}: {}",
            index,
            name_of(instrument.name, Category::Instrument, index)
        );
    }

    println!("\nWave list:");
    for (index, wave) in bank.waves.iter() {
        println!(
            " - {:#04x}: {:<16} // CycleSize = {:04x} ; Octave = {:02x} ; FragFactor = {:02x} ; IsDoubleBufd = {:02x}",
            index,
            name_of(wave.name, Category::Wave, index),
            wave.cycle_size(),
            wave.octave,
            wave.frag_factor,
            wave.double_buffered
        );
    }

    Ok(())
}

fn name_of(stored: Option<[u8; NAME_LEN]>, category: Category, index: u8) -> String {
    let name = stored.unwrap_or_else(|| synthesize_name(category, index));
    display_name(&name)
}
