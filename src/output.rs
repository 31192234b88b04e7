//! Ways of writing out the selected track list.

use crate::track::{Collection, Track};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// File formats chosen by the output file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    /// Extended M3U (`.m3u`)
    M3u,
    /// JSON array of tracks (`.json`)
    Json,
}

impl PlaylistFormat {
    /// # Errors
    ///
    /// Fails for any extension other than `m3u` or `json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "m3u" => Ok(Self::M3u),
            "json" => Ok(Self::Json),
            other => bail!("Don't know how to write '.{other}'!"),
        }
    }
}

/// Write `tracks` to `path` in the format its extension names.
///
/// # Errors
///
/// Fails for unsupported extensions and on I/O errors.
pub fn write_playlist_file(tracks: &[Track], path: &Path) -> Result<()> {
    let format = PlaylistFormat::from_path(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create playlist file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    match format {
        PlaylistFormat::M3u => write_m3u(tracks, &mut out)?,
        PlaylistFormat::Json => write_json(tracks, &mut out)?,
    }
    out.flush()
        .with_context(|| format!("Failed to write playlist file {}", path.display()))?;
    Ok(())
}

/// Extended M3U: a `#EXTINF` line with whole seconds and "artist - title",
/// then the file path, one blank line between entries.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_m3u<W: Write>(tracks: &[Track], out: &mut W) -> io::Result<()> {
    writeln!(out, "#EXTM3U\n")?;
    for track in tracks {
        writeln!(
            out,
            "#EXTINF:{}, {} - {}\n{}\n",
            track.duration().as_secs(),
            track.artist.as_deref().unwrap_or_default(),
            track.name.as_deref().unwrap_or_default(),
            track.file_path().unwrap_or_default(),
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Propagates serialization and write errors.
pub fn write_json<W: Write>(tracks: &[Track], out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, tracks).context("Failed to serialize playlist")?;
    writeln!(out)?;
    Ok(())
}

/// One line per track, as shown on the console.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_listing<W: Write>(tracks: &[Track], out: &mut W) -> io::Result<()> {
    for track in tracks {
        writeln!(out, "{track}")?;
    }
    Ok(())
}

/// Totals printed after a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub tracks: usize,
    pub total_size: u64,
    pub total_secs: u64,
}

impl Summary {
    #[must_use]
    pub fn of(collection: &Collection) -> Self {
        Self {
            tracks: collection.len(),
            total_size: collection.total_size(),
            total_secs: collection.total_time().as_secs(),
        }
    }
}

impl fmt::Display for Summary {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total length: {} tracks", self.tracks)?;
        writeln!(f, "Total size: {:.2}MB", self.total_size as f64 / BYTES_PER_MB)?;
        write!(
            f,
            "Total time: {}h{}m{}s",
            self.total_secs / 3600,
            (self.total_secs % 3600) / 60,
            self.total_secs % 60,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Track> {
        vec![
            Track {
                id: 1,
                name: Some("So What".to_string()),
                artist: Some("Miles Davis".to_string()),
                genre: Some("Jazz".to_string()),
                size: 3 * 1024 * 1024,
                duration_ms: 562_999,
                location: Some("file://localhost/Music/So%20What.m4a".to_string()),
                ..Default::default()
            },
            Track {
                id: 2,
                name: Some("Untitled".to_string()),
                size: 1024 * 1024 / 2,
                duration_ms: 3_600_000,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_write_m3u() {
        let mut out = Vec::new();
        write_m3u(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "#EXTM3U\n\n\
             #EXTINF:562, Miles Davis - So What\n/Music/So What.m4a\n\n\
             #EXTINF:3600,  - Untitled\n\n\n"
        );
    }

    #[test]
    fn test_write_m3u_empty() {
        let mut out = Vec::new();
        write_m3u(&[], &mut out).unwrap();
        assert_eq!(out, b"#EXTM3U\n\n");
    }

    #[test]
    fn test_write_json_round_trips_fields() {
        let mut out = Vec::new();
        write_json(&sample(), &mut out).unwrap();
        let parsed: Vec<Track> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_write_listing_one_line_per_track() {
        let mut out = Vec::new();
        write_listing(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("So What (artist=Miles Davis"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(PlaylistFormat::from_path(Path::new("a.m3u")).unwrap(), PlaylistFormat::M3u);
        assert_eq!(PlaylistFormat::from_path(Path::new("a.JSON")).unwrap(), PlaylistFormat::Json);
        let err = PlaylistFormat::from_path(Path::new("a.pls")).unwrap_err();
        assert_eq!(err.to_string(), "Don't know how to write '.pls'!");
    }

    #[test]
    fn test_summary_display() {
        let collection: Collection = sample().into();
        let summary = Summary::of(&collection);
        assert_eq!(summary.tracks, 2);
        assert_eq!(
            summary.to_string(),
            "Total length: 2 tracks\nTotal size: 3.50MB\nTotal time: 1h9m22s"
        );
    }
}
