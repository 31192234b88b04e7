//! Random music picks that fit your device.
//!
//! Selecta fills a playlist from a music library until a size or playing-time
//! budget is reached, nudging the odds by genre.
//!
//! Core modules:
//! - [`selector`] - Constrained random selection
//! - [`matcher`] - Genre predicates
//! - [`track`] - Track records and collections
//! - [`error`] - Selection errors
//!
//! ### Supporting Modules
//!
//! - [`loaders`] - iTunes XML and Clementine `SQLite` libraries
//! - [`output`] - M3U / JSON / console writers
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`config`] - Library location
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```
//! use selecta::selector::{Budget, ConstrainedPlaylist, GenreCriteria};
//! use selecta::track::Track;
//! use rand::SeedableRng;
//!
//! let library = vec![
//!     Track {
//!         id: 1,
//!         name: Some("So What".to_string()),
//!         genre: Some("Jazz".to_string()),
//!         size: 5_000_000,
//!         duration_ms: 562_000,
//!         ..Default::default()
//!     },
//!     Track {
//!         id: 2,
//!         name: Some("Paranoid".to_string()),
//!         genre: Some("Rock".to_string()),
//!         size: 3_000_000,
//!         duration_ms: 170_000,
//!         ..Default::default()
//!     },
//! ];
//!
//! let budget = Budget::new(Some(8_000_000), None)?;
//! let criteria = GenreCriteria {
//!     promote: vec!["jazz".to_string()],
//!     ..Default::default()
//! };
//!
//! let mut playlist = ConstrainedPlaylist::new(budget, &criteria)?;
//! playlist.select_with_rng(&library, &mut rand::rngs::StdRng::seed_from_u64(7))?;
//! assert!(playlist.tracks().total_size() >= 8_000_000);
//! # Ok::<(), selecta::error::SelectionError>(())
//! ```
//!
//! ## Selection
//!
//! Each track drawn from the endlessly reshuffled library is kept on a coin
//! flip: a threshold of 0.5, lowered by 0.3 for promoted genres and raised by
//! 0.3 for demoted ones. Must-match genres are a hard filter. The budget is
//! checked before each draw, so the playlist may overflow by one track.
//!
//! ## Error Handling
//!
//! Selection returns [`error::SelectionError`]; loaders, writers and the
//! binary use `anyhow::Result` with context messages.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod loaders;
pub mod matcher;
pub mod output;
pub mod selector;
pub mod track;
