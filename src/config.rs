//! # Configuration Module
//!
//! Works out where the music library lives when the command line does not
//! say.
//!
//! Resolution order:
//! 1. `--load-from PATH`
//! 2. the `SELECTA_LIBRARY` environment variable (handled by clap)
//! 3. the iTunes library export in the platform music directory:
//!    - Linux: `$XDG_MUSIC_DIR/iTunes/iTunes Music Library.xml`
//!    - macOS: `~/Music/iTunes/iTunes Music Library.xml`
//!    - Windows: `{FOLDERID_Music}\iTunes\iTunes Music Library.xml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ITUNES_DIR: &str = "iTunes";
const ITUNES_LIBRARY: &str = "iTunes Music Library.xml";

/// Returns the platform-appropriate iTunes library export path.
///
/// Falls back to `~/Music` when the platform has no registered music
/// directory.
///
/// # Errors
///
/// Fails if neither a music directory nor a home directory can be
/// determined.
///
/// # Examples
///
/// ```no_run
/// use selecta::config::default_library_path;
///
/// let library = default_library_path()?;
/// println!("Library location: {}", library.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn default_library_path() -> Result<PathBuf> {
    let music_dir = dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .context("Could not determine the music directory. Use --load-from or SELECTA_LIBRARY.")?;

    Ok(music_dir.join(ITUNES_DIR).join(ITUNES_LIBRARY))
}

/// Configuration for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Library file to load tracks from
    pub library_path: PathBuf,
}

impl RuntimeConfig {
    /// Resolve the library path, preferring an explicit one.
    ///
    /// # Errors
    ///
    /// See [`default_library_path`].
    pub fn resolve(load_from: Option<PathBuf>) -> Result<Self> {
        let library_path = match load_from {
            Some(path) => path,
            None => default_library_path()?,
        };
        Ok(Self { library_path })
    }

    #[must_use]
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }
}
