//! Track records and the collections built up out of them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::time::Duration;

/// A single music item as handed over by a loader.
///
/// The typed fields are the ones selection and output care about. Anything
/// else a loader finds (year, bit rate, play counts, ...) is kept verbatim in
/// `extra`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// The only field the selector looks at.
    pub genre: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Play time in milliseconds.
    pub duration_ms: u64,
    /// Where the file lives, usually a `file://` URL.
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Track {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Play time in (fractional) seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_in_seconds(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// The location as a plain filesystem path.
    ///
    /// `file://` URLs (with or without a `localhost` host) are stripped and
    /// percent-decoded; anything else is returned untouched.
    #[must_use]
    pub fn file_path(&self) -> Option<String> {
        let location = self.location.as_deref()?;
        let Some(rest) = location.strip_prefix("file://") else {
            return Some(location.to_string());
        };
        let rest = rest.strip_prefix("localhost").unwrap_or(rest);
        let path = urlencoding::decode(rest).map_or_else(|_| rest.to_string(), |p| p.into_owned());
        Some(path)
    }

    /// Ordering used for the final playlist: artist, then album, then name.
    /// Missing fields sort as empty strings.
    #[must_use]
    pub fn output_order(&self, other: &Self) -> Ordering {
        let key = |t: &Self| {
            (
                t.artist.clone().unwrap_or_default(),
                t.album.clone().unwrap_or_default(),
                t.name.clone().unwrap_or_default(),
            )
        };
        key(self).cmp(&key(other))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_unknown = |field: &Option<String>| field.clone().unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "{} (artist={}, album={}, genre={})",
            or_unknown(&self.name),
            or_unknown(&self.artist),
            or_unknown(&self.album),
            or_unknown(&self.genre),
        )
    }
}

/// An ordered group of tracks.
///
/// Totals are recomputed on every call so they always reflect the current
/// contents.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    tracks: Vec<Track>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Sum of all sizes, in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.tracks.iter().fold(0u64, |acc, t| acc.saturating_add(t.size))
    }

    /// Sum of all play times.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        Duration::from_millis(
            self.tracks
                .iter()
                .fold(0u64, |acc, t| acc.saturating_add(t.duration_ms)),
        )
    }

    /// Sort into playlist order (artist, album, name).
    pub fn sort_for_output(&mut self) {
        self.tracks.sort_by(Track::output_order);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Track> {
        self.tracks
    }
}

impl Deref for Collection {
    type Target = [Track];

    fn deref(&self) -> &Self::Target {
        &self.tracks
    }
}

impl From<Vec<Track>> for Collection {
    fn from(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

impl FromIterator<Track> for Collection {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Collection {
    type Item = Track;
    type IntoIter = std::vec::IntoIter<Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artist: Option<&str>, size: u64, duration_ms: u64) -> Track {
        Track {
            name: Some(name.to_string()),
            artist: artist.map(str::to_string),
            size,
            duration_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_totals_track_current_contents() {
        let mut collection = Collection::new();
        assert_eq!(collection.total_size(), 0);
        assert_eq!(collection.total_time(), Duration::ZERO);

        collection.push(track("One", None, 5_000_000, 200_000));
        collection.push(track("Two", None, 3_000_000, 180_500));

        assert_eq!(collection.total_size(), 8_000_000);
        assert_eq!(collection.total_time(), Duration::from_millis(380_500));
        assert!((collection.total_time().as_secs_f64() - 380.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sort_for_output_treats_missing_as_empty() {
        let mut collection: Collection = vec![
            track("B", Some("Zappa"), 1, 1),
            track("A", Some("Abba"), 1, 1),
            track("C", None, 1, 1),
        ]
        .into_iter()
        .collect();

        collection.sort_for_output();
        let names: Vec<_> = collection.iter().map(|t| t.name.as_deref().unwrap()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_file_path_decodes_itunes_locations() {
        let mut t = Track {
            location: Some("file://localhost/Users/me/Music/My%20Song.mp3".to_string()),
            ..Default::default()
        };
        assert_eq!(t.file_path().as_deref(), Some("/Users/me/Music/My Song.mp3"));

        t.location = Some("file:///home/me/a%26b.flac".to_string());
        assert_eq!(t.file_path().as_deref(), Some("/home/me/a&b.flac"));

        t.location = Some("/already/plain.ogg".to_string());
        assert_eq!(t.file_path().as_deref(), Some("/already/plain.ogg"));

        t.location = None;
        assert!(t.file_path().is_none());
    }

    #[test]
    fn test_display_marks_unknown_fields() {
        let t = Track {
            name: Some("Song".to_string()),
            genre: Some("Jazz".to_string()),
            ..Default::default()
        };
        assert_eq!(t.to_string(), "Song (artist=?, album=?, genre=Jazz)");
    }

    #[test]
    fn test_time_in_seconds() {
        let t = track("x", None, 0, 1_500);
        assert!((t.time_in_seconds() - 1.5).abs() < f64::EPSILON);
        assert_eq!(t.duration(), Duration::from_millis(1_500));
    }
}
