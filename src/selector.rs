//! Constrained random selection.
//!
//! Fills a playlist from a library until a size and/or time budget is
//! reached, biasing each pick by genre.
//!
//! # Algorithm
//!
//! The library is walked as an endless sequence: shuffle, hand out every
//! track once, reshuffle, repeat. Each drawn track goes through
//! [`ConstrainedPlaylist::choose_track`]:
//!
//! ```text
//! must-match fails        => reject
//! threshold  = 0.5
//! promoted               => threshold -= 0.3
//! demoted                => threshold += 0.3
//! accept iff uniform[0,1) >= threshold
//! ```
//!
//! The budget is checked before every draw, never after an append, so the
//! playlist overshoots its budget by at most the one track that crossed the
//! line. Treat the budget as a soft limit.
//!
//! # Termination
//!
//! The loop ends almost surely as long as some track can be accepted and
//! carries a positive size (or duration) towards a set budget. Selection
//! checks this up front and fails with
//! [`SelectionError::UnreachableBudget`] otherwise; on top of that, the
//! number of draws is capped (see [`DEFAULT_MAX_DRAWS`]) and running out
//! yields [`SelectionError::DrawLimitExceeded`].

use crate::error::{PatternList, Result, SelectionError};
use crate::matcher::GenreMatcher;
use crate::track::{Collection, Track};
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Draws allowed before selection gives up.
pub const DEFAULT_MAX_DRAWS: u64 = 10_000_000;

/// Upper bounds on the playlist. At least one is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    max_size: Option<u64>,
    max_time: Option<Duration>,
}

impl Budget {
    /// # Errors
    ///
    /// Returns [`SelectionError::MissingBudget`] if both limits are `None`.
    pub fn new(max_size: Option<u64>, max_time: Option<Duration>) -> Result<Self> {
        if max_size.is_none() && max_time.is_none() {
            return Err(SelectionError::MissingBudget);
        }
        Ok(Self { max_size, max_time })
    }

    /// Maximum total size in bytes.
    #[must_use]
    pub const fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    #[must_use]
    pub const fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    /// True once either set limit has been met or exceeded.
    #[must_use]
    pub fn is_reached(&self, tracks: &Collection) -> bool {
        self.max_size.is_some_and(|max| tracks.total_size() >= max)
            || self.max_time.is_some_and(|max| tracks.total_time() >= max)
    }

    /// Does adding `track` move the playlist towards any set limit?
    #[must_use]
    pub fn counts_towards(&self, track: &Track) -> bool {
        (self.max_size.is_some() && track.size > 0)
            || (self.max_time.is_some() && track.duration_ms > 0)
    }
}

/// Genre pattern lists, as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreCriteria {
    pub promote: Vec<String>,
    pub demote: Vec<String>,
    pub must_match: Vec<String>,
}

/// Acceptance threshold tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWeights {
    /// Threshold for a track that is neither promoted nor demoted.
    pub base_threshold: f64,
    /// Subtracted from the threshold for promoted tracks.
    pub promote_factor: f64,
    /// Added to the threshold for demoted tracks.
    pub demote_factor: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            base_threshold: 0.5,
            promote_factor: 0.3,
            demote_factor: 0.3,
        }
    }
}

/// Endless, repeatedly reshuffled walk over a slice.
///
/// Every pass hands out each element exactly once in a fresh random order.
/// Only an index permutation is kept; tracks are never copied.
#[derive(Debug)]
pub struct ShuffledCycle<'a> {
    tracks: &'a [Track],
    order: Vec<usize>,
    cursor: usize,
}

impl<'a> ShuffledCycle<'a> {
    #[must_use]
    pub fn new(tracks: &'a [Track]) -> Self {
        let order: Vec<usize> = (0..tracks.len()).collect();
        // Start exhausted so the first draw shuffles.
        let cursor = order.len();
        Self { tracks, order, cursor }
    }

    /// Next track of the walk, or `None` if the slice is empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&'a Track> {
        if self.order.is_empty() {
            return None;
        }
        if self.cursor >= self.order.len() {
            self.order.shuffle(rng);
            self.cursor = 0;
        }
        let track = self.tracks.get(self.order[self.cursor]);
        self.cursor += 1;
        track
    }
}

/// A playlist that grows itself from a library under a [`Budget`].
#[derive(Debug, Clone)]
pub struct ConstrainedPlaylist {
    budget: Budget,
    promoted: GenreMatcher,
    demoted: GenreMatcher,
    must: GenreMatcher,
    weights: SelectionWeights,
    max_draws: u64,
    tracks: Collection,
}

impl ConstrainedPlaylist {
    /// Compile the genre criteria and start with an empty playlist.
    ///
    /// Without promote or demote patterns no track is flagged either way;
    /// without must-match patterns every track passes the gate.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidPattern`] for a pattern that does
    /// not compile.
    pub fn new(budget: Budget, criteria: &GenreCriteria) -> Result<Self> {
        Ok(Self {
            budget,
            promoted: GenreMatcher::new(&criteria.promote, false, PatternList::Promote)?,
            demoted: GenreMatcher::new(&criteria.demote, false, PatternList::Demote)?,
            must: GenreMatcher::new(&criteria.must_match, true, PatternList::MustMatch)?,
            weights: SelectionWeights::default(),
            max_draws: DEFAULT_MAX_DRAWS,
            tracks: Collection::new(),
        })
    }

    #[must_use]
    pub fn with_weights(mut self, weights: SelectionWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_max_draws(mut self, max_draws: u64) -> Self {
        self.max_draws = max_draws;
        self
    }

    #[must_use]
    pub const fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Tracks selected so far.
    #[must_use]
    pub const fn tracks(&self) -> &Collection {
        &self.tracks
    }

    #[must_use]
    pub fn into_tracks(self) -> Collection {
        self.tracks
    }

    /// Has the playlist reached its budget?
    #[must_use]
    pub fn constraints_reached(&self) -> bool {
        self.budget.is_reached(&self.tracks)
    }

    /// Acceptance threshold for `track`, or `None` if it fails must-match.
    ///
    /// Not clamped: a track that is both promoted and demoted lands back on
    /// the base threshold.
    #[must_use]
    pub fn threshold(&self, track: &Track) -> Option<f64> {
        if !self.must.matches(track) {
            return None;
        }

        let mut threshold = self.weights.base_threshold;
        if self.promoted.matches(track) {
            threshold -= self.weights.promote_factor;
        }
        if self.demoted.matches(track) {
            threshold += self.weights.demote_factor;
        }
        Some(threshold)
    }

    /// Coin flip against the track's threshold. Must-match failures are
    /// rejected without consuming randomness.
    pub fn choose_track<R: Rng + ?Sized>(&self, track: &Track, rng: &mut R) -> bool {
        match self.threshold(track) {
            None => false,
            Some(threshold) => rng.gen::<f64>() >= threshold,
        }
    }

    /// Fill the playlist from `library` using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// See [`Self::select_with_rng`].
    pub fn select(&mut self, library: &[Track]) -> Result<()> {
        self.select_with_rng(library, &mut rand::thread_rng())
    }

    /// Fill the playlist from `library` until the budget is reached.
    ///
    /// The same seeded `rng` over the same library always yields the same
    /// playlist. If the draw cap runs out, the tracks picked so far stay in
    /// the playlist.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::EmptyLibrary`] if `library` is empty
    /// - [`SelectionError::UnreachableBudget`] if no track can ever be
    ///   accepted and count towards the budget
    /// - [`SelectionError::DrawLimitExceeded`] if the draw cap is hit
    pub fn select_with_rng<R: Rng + ?Sized>(&mut self, library: &[Track], rng: &mut R) -> Result<()> {
        if library.is_empty() {
            return Err(SelectionError::EmptyLibrary);
        }
        if self.constraints_reached() {
            return Ok(());
        }
        if !library.iter().any(|track| self.can_advance(track)) {
            return Err(SelectionError::UnreachableBudget);
        }

        debug!(
            "Selecting from {} tracks (max size: {:?} bytes, max time: {:?})",
            library.len(),
            self.budget.max_size,
            self.budget.max_time,
        );

        let mut cycle = ShuffledCycle::new(library);
        let mut draws: u64 = 0;
        while !self.constraints_reached() {
            if draws >= self.max_draws {
                return Err(SelectionError::DrawLimitExceeded {
                    draws,
                    selected: self.tracks.len(),
                });
            }
            let Some(track) = cycle.draw(rng) else {
                return Err(SelectionError::EmptyLibrary);
            };
            draws += 1;

            if self.choose_track(track, rng) {
                trace!("Picked `{track}'");
                self.tracks.push(track.clone());
            }
        }

        debug!(
            "Selected {} tracks in {draws} draws ({} bytes, {:?})",
            self.tracks.len(),
            self.tracks.total_size(),
            self.tracks.total_time(),
        );
        Ok(())
    }

    /// Could `track` ever be accepted and bring the budget closer?
    fn can_advance(&self, track: &Track) -> bool {
        self.budget.counts_towards(track)
            && self.threshold(track).is_some_and(|threshold| threshold < 1.0)
    }
}
