//! # Command-Line Interface Module
//!
//! Clap derive definitions for `selecta`, plus the parsers for human-friendly
//! size and time budgets.
//!
//! ## Commands
//!
//! - `select`: Pick random tracks until a size/time budget is filled
//! - `library`: Show totals and genre counts for a library
//! - `completion`: Print a shell completion script
//!
//! ## Examples
//!
//! ```bash
//! selecta select --max-size 4GB --promote jazz --demote "christmas|holiday"
//! selecta select -t 1.5h -m rock -m blues -o road-trip.m3u
//! selecta library -l ~/.config/Clementine/clementine.db
//! ```

use crate::selector::DEFAULT_MAX_DRAWS;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "selecta")]
#[command(about = "Randomly choose some music from a library, given criteria for what \
    should be chosen: some genres promoted, others avoided, some required, all within \
    a maximum size or playing time.")]
#[command(after_help = "The maximum size and time are met loosely and may \"overflow\" by \
    at most one track (usually ~5 minutes / 5 MB), so they should not be considered hard limits.")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select a random, genre-biased playlist that fits a size/time budget
    ///
    /// Tracks are drawn from a reshuffled library over and over and kept on
    /// a weighted coin flip until the budget is filled. The result is sorted
    /// by artist, album and title.
    Select(SelectArgs),

    /// Show totals and genre counts for a library
    Library {
        /// Library file (.xml iTunes export or Clementine .db)
        #[arg(short, long, env = "SELECTA_LIBRARY", value_hint = clap::ValueHint::FilePath)]
        load_from: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Usage: selecta completion bash > ~/.local/share/bash-completion/completions/selecta
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Options for `selecta select`.
#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("budget")
        .required(true)
        .multiple(true)
        .args(["max_size", "max_time"])
))]
pub struct SelectArgs {
    /// Maximum total size, e.g. 700MB, 4.5GB or a byte count
    #[arg(short = 's', long, value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Maximum total playing time, e.g. 90m, 1.5h, 45s or a number of seconds
    #[arg(short = 't', long, value_parser = parse_time)]
    pub max_time: Option<Duration>,

    /// Genre pattern to favour (repeatable, case-insensitive, matches the start of the genre)
    #[arg(short, long, value_name = "PATTERN")]
    pub promote: Vec<String>,

    /// Genre pattern to avoid (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub demote: Vec<String>,

    /// Genre pattern every track must match (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub must_match: Vec<String>,

    /// Write the playlist to a file (.m3u or .json) instead of the console
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Library file (.xml iTunes export or Clementine .db)
    #[arg(short, long, env = "SELECTA_LIBRARY", value_hint = clap::ValueHint::FilePath)]
    pub load_from: Option<PathBuf>,

    /// Seed the random source for a reproducible selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up after this many draws from the library
    #[arg(long, default_value_t = DEFAULT_MAX_DRAWS)]
    pub max_draws: u64,
}

fn split_unit(spec: &str) -> (String, String) {
    let lower = spec.trim().to_lowercase();
    let at = lower
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(lower.len());
    let (number, unit) = lower.split_at(at);
    (number.trim().to_string(), unit.to_string())
}

fn parse_amount(number: &str, spec: &str, what: &str) -> Result<f64, String> {
    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid {what} specification '{spec}'"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Invalid {what} specification '{spec}': must be a non-negative number"));
    }
    Ok(value)
}

/// Parse a size such as `10MB` or `1.5GB` into bytes.
///
/// Units are binary multiples (1 KB = 1024 bytes) and case-insensitive; a
/// bare number is a byte count.
///
/// # Errors
///
/// Returns a message for unknown units, negative values and garbage.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_size(spec: &str) -> Result<u64, String> {
    let (number, unit) = split_unit(spec);
    let multiplier = match unit.as_str() {
        "" | "b" => 1,
        "kb" => KB,
        "mb" => MB,
        "gb" => GB,
        other => return Err(format!("Unknown size unit '{other}' in '{spec}' (use KB, MB or GB)")),
    };
    let bytes = parse_amount(&number, spec, "size")? * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(format!("Size '{spec}' is too large"));
    }
    Ok(bytes.round() as u64)
}

/// Parse a time such as `10m`, `1.5h` or `300ms`.
///
/// A bare number is in seconds.
///
/// # Errors
///
/// Returns a message for unknown units, negative values and garbage.
pub fn parse_time(spec: &str) -> Result<Duration, String> {
    let (number, unit) = split_unit(spec);
    let to_secs: fn(f64) -> f64 = match unit.as_str() {
        "" | "s" => |n| n,
        "h" => |n| n * 3600.0,
        "m" => |n| n * 60.0,
        "ms" => |n| n / 1000.0,
        other => return Err(format!("Unknown time unit '{other}' in '{spec}' (use h, m, s or ms)")),
    };
    let secs = to_secs(parse_amount(&number, spec, "time")?);
    Duration::try_from_secs_f64(secs).map_err(|e| format!("Invalid time '{spec}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512"), Ok(512));
        assert_eq!(parse_size("10KB"), Ok(10 * KB));
        assert_eq!(parse_size("10mb"), Ok(10 * MB));
        assert_eq!(parse_size("1.5GB"), Ok(3 * GB / 2));
        assert_eq!(parse_size(" 2 Mb "), Ok(2 * MB));
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(parse_size("lots").is_err());
        assert!(parse_size("10TB").is_err());
        assert!(parse_size("-5MB").is_err());
        assert!(parse_size("").is_err());
    }

    #[test]
    fn test_parse_time_units() {
        assert_eq!(parse_time("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_time("10m"), Ok(Duration::from_secs(600)));
        assert_eq!(parse_time("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_time("45s"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_time("250ms"), Ok(Duration::from_millis(250)));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("soon").is_err());
        assert!(parse_time("3d").is_err());
        assert!(parse_time("-1h").is_err());
    }

    #[test]
    fn test_select_requires_a_budget() {
        let err = Args::try_parse_from(["selecta", "select", "-p", "rock"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_select_collects_repeated_patterns() {
        let args = Args::try_parse_from([
            "selecta", "select", "-s", "700MB", "-t", "1h", "-p", "jazz", "-p", "blues", "-m", "rock",
            "--seed", "7",
        ])
        .unwrap();

        let Command::Select(select) = args.command else {
            panic!("expected select");
        };
        assert_eq!(select.max_size, Some(700 * MB));
        assert_eq!(select.max_time, Some(Duration::from_secs(3600)));
        assert_eq!(select.promote, ["jazz", "blues"]);
        assert!(select.demote.is_empty());
        assert_eq!(select.must_match, ["rock"]);
        assert_eq!(select.seed, Some(7));
        assert_eq!(select.max_draws, DEFAULT_MAX_DRAWS);
    }
}
