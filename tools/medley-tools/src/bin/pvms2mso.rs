//! pvms2mso - optimising converter from Medley Sound projects to objects
//!
//! Decodes the project, asks which scores to export, drops everything the
//! chosen scores do not reference and writes a compact object with partial
//! tables and trimmed track streams.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use medley_sound::{display_name, parse_pvms, select_scores, synthesize_name, write_mso, Category};

/// Convert a Medley Sound project file to the object form
#[derive(Parser)]
#[command(name = "pvms2mso")]
#[command(about = "Convert a Medley Sound project (PVMS) to an object (MSOB) file")]
struct Cli {
    /// Project file to convert; output is written next to it with ".mso" appended
    input: PathBuf,
}

fn main() -> Result<()> {
    medley_tools::init_logging();
    let cli = Cli::parse();

    let data = fs::read(&cli.input).with_context(|| format!("reading {:?}", cli.input))?;
    let bank = parse_pvms(&data)?;

    let available: Vec<u8> = bank.scores.iter().map(|(index, _)| index).collect();
    if available.is_empty() {
        bail!("{:?} contains no scores", cli.input);
    }

    println!("Scores:");
    for (index, score) in bank.scores.iter() {
        let name = score
            .name
            .unwrap_or_else(|| synthesize_name(Category::Score, index));
        println!(" - {:3}: {}", index, display_name(&name));
    }

    let chosen = prompt_selection(&available)?;
    let filtered = select_scores(&bank, &chosen);

    let out = write_mso(&filtered);
    let out_path = medley_tools::output_path(&cli.input, ".mso");
    fs::write(&out_path, &out).with_context(|| format!("writing {:?}", out_path))?;
    println!(
        "Wrote {} ({} scores, {} tracks, {} instruments, {} waves)",
        out_path.display(),
        filtered.scores.len(),
        filtered.tracks.len(),
        filtered.instruments.len(),
        filtered.waves.len()
    );

    Ok(())
}

/// Ask until the user gives a parseable selection
fn prompt_selection(available: &[u8]) -> Result<Vec<u8>> {
    let stdin = io::stdin();
    loop {
        print!("Select scores to export (all, or numbers like \"1 3\"): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            bail!("no selection given");
        }
        match medley_tools::parse_selection(&line, available) {
            Some(chosen) if !chosen.is_empty() => return Ok(chosen),
            _ => println!("Invalid selection."),
        }
    }
}
