//! Loader for a Clementine `SQLite` database.

use crate::track::{Collection, Track};
use anyhow::{Context, Result};
use log::trace;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;

/// Clementine keeps lengths in nanoseconds.
const NANOS_PER_MILLI: i64 = 1_000_000;

const SELECT_SONGS: &str = "SELECT title, artist, album, genre, filesize, length, filename,
        year, bitrate, samplerate, filetype
    FROM songs";

/// Open the database read-only and return its songs.
///
/// # Errors
///
/// Fails if the database cannot be opened or has no usable `songs` table.
pub fn load_file(path: &Path) -> Result<Collection> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open Clementine database at {}", path.display()))?;
    retrieve_tracks(&conn)
}

/// Read every row of `songs`. Ids are handed out 1..=n in row order.
///
/// # Errors
///
/// Fails on SQL errors, e.g. when the `songs` table is missing.
pub fn retrieve_tracks(conn: &Connection) -> Result<Collection> {
    let mut stmt = conn
        .prepare(SELECT_SONGS)
        .context("Invalid SQL statement when SELECTing FROM songs.")?;

    let rows = stmt
        .query_map([], row_to_track)
        .context("Cannot query songs.")?;

    let mut tracks = Collection::new();
    for (id, track) in (1..).zip(rows) {
        let mut track = track.context("Queried song unwrap failed.")?;
        track.id = id;
        trace!("Loaded `{track}'");
        tracks.push(track);
    }

    Ok(tracks)
}

fn row_to_track(row: &Row<'_>) -> rusqlite::Result<Track> {
    let length_ns: Option<i64> = row.get(5)?;
    let filesize: Option<i64> = row.get(4)?;

    let mut track = Track {
        name: text(row, 0)?,
        artist: text(row, 1)?,
        album: text(row, 2)?,
        genre: text(row, 3)?,
        size: filesize.and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
        duration_ms: length_ns
            .and_then(|ns| u64::try_from(ns / NANOS_PER_MILLI).ok())
            .unwrap_or(0),
        location: text(row, 6)?,
        ..Default::default()
    };

    for (idx, key) in [(7, "year"), (8, "bitrate"), (9, "samplerate"), (10, "filetype")] {
        if let Some(value) = text(row, idx)? {
            track.extra.insert(key.to_string(), value);
        }
    }

    Ok(track)
}

/// Column as text, whatever affinity it was stored with.
///
/// Clementine stores `filename` as a BLOB and leaves empty tags as `''`.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(x) => Some(x.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    };
    Ok(value.filter(|s| !s.is_empty()))
}
