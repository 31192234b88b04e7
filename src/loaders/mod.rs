//! Library loaders.
//!
//! Each loader turns an on-disk music library into a [`Collection`]. The
//! format is picked from the file extension:
//!
//! - `.xml` - iTunes / Music.app library export ([`plist`])
//! - `.db`, `.db3`, `.sqlite`, `.sqlite3` - Clementine database ([`sqlite`])

pub mod plist;
pub mod sqlite;

use crate::track::Collection;
use anyhow::{bail, Result};
use log::info;
use std::path::Path;

/// Load the library at `path`, choosing a loader by extension.
///
/// # Errors
///
/// Fails for unknown extensions and for anything the chosen loader rejects.
pub fn load_library(path: &Path) -> Result<Collection> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let tracks = match extension.as_str() {
        "xml" => plist::load_file(path)?,
        "db" | "db3" | "sqlite" | "sqlite3" => sqlite::load_file(path)?,
        "" => bail!("Cannot tell the library format of {} without an extension", path.display()),
        other => bail!("Don't know how to load '.{other}' libraries ({})", path.display()),
    };

    info!("Loaded {} tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}
