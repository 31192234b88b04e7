//! # Selecta
//!
//! Randomly choose music from an iTunes or Clementine library to fill the
//! limited space on a phone, tablet or music player.
//!
//! ## Usage
//!
//! ```bash
//! # Fill 4 GB, favouring jazz and avoiding anything festive
//! selecta select -s 4GB -p jazz -d christmas -o phone.m3u
//!
//! # Two hours of rock or blues, printed to the console
//! selecta select -t 2h -m rock -m blues
//!
//! # What is in the library?
//! selecta library -l ~/.config/Clementine/clementine.db
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use selecta::cli::{self, SelectArgs};
use selecta::config::RuntimeConfig;
use selecta::output::{self, PlaylistFormat, Summary};
use selecta::selector::{Budget, ConstrainedPlaylist, GenreCriteria};
use selecta::{completion, loaders};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

/// Main entry point for Selecta.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug selecta select -s 1GB` - Selection statistics
/// - `RUST_LOG=selecta::selector=trace selecta select -s 1GB` - Every pick
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Select(select) => run_select(select)?,
        cli::Command::Library { load_from } => show_library(load_from)?,
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(
                completion::shell_to_completion_shell(shell),
                &mut cmd,
                &mut io::stdout(),
            );
        }
    }

    Ok(())
}

fn run_select(args: SelectArgs) -> Result<()> {
    // Reject an unwritable format before spending time on the selection.
    if let Some(path) = &args.output {
        PlaylistFormat::from_path(path)?;
    }

    let config = RuntimeConfig::resolve(args.load_from)?;
    let library = loaders::load_library(config.library_path())?;

    let budget = Budget::new(args.max_size, args.max_time)?;
    let criteria = GenreCriteria {
        promote: args.promote,
        demote: args.demote,
        must_match: args.must_match,
    };
    debug!("Selection criteria: {criteria:?}");

    let mut playlist = ConstrainedPlaylist::new(budget, &criteria)?.with_max_draws(args.max_draws);
    let selected = match args.seed {
        Some(seed) => playlist.select_with_rng(&library, &mut StdRng::seed_from_u64(seed)),
        None => playlist.select(&library),
    };
    selected.context("Selection failed")?;

    let mut tracks = playlist.into_tracks();
    tracks.sort_for_output();

    match &args.output {
        Some(path) => {
            output::write_playlist_file(&tracks, path)?;
            info!("Wrote {} tracks to {}", tracks.len(), path.display());
        }
        None => output::write_listing(&tracks, &mut io::stdout().lock())?,
    }

    println!("{}", Summary::of(&tracks));
    Ok(())
}

fn show_library(load_from: Option<PathBuf>) -> Result<()> {
    let config = RuntimeConfig::resolve(load_from)?;
    let library = loaders::load_library(config.library_path())?;

    let mut genres: HashMap<&str, usize> = HashMap::new();
    for track in library.iter() {
        let genre = track.genre.as_deref().filter(|g| !g.is_empty()).unwrap_or("(none)");
        *genres.entry(genre).or_default() += 1;
    }
    let mut genres: Vec<_> = genres.into_iter().collect();
    genres.sort_by(|(a_name, a_count), (b_name, b_count)| b_count.cmp(a_count).then(a_name.cmp(b_name)));

    let mut out = io::stdout().lock();
    writeln!(out, "Library: {}", config.library_path().display())?;
    writeln!(out, "{}", Summary::of(&library))?;
    writeln!(out, "Genres:")?;
    for (genre, count) in genres {
        writeln!(out, "  {count:>6}  {genre}")?;
    }
    Ok(())
}
