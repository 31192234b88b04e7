//! Genre predicates built from user-supplied pattern lists.
//!
//! Patterns are regular-expression fragments. A list is joined by
//! alternation, compiled case-insensitively and anchored at the start of the
//! genre, so `rock` matches "Rock", "Rock & Roll" and "rockabilly" but not
//! "Punk Rock". Metacharacters keep their regex meaning.

use crate::error::{PatternList, Result, SelectionError};
use crate::track::Track;
use regex::{Regex, RegexBuilder};

/// Predicate over a track's genre.
#[derive(Debug, Clone)]
pub enum GenreMatcher {
    /// No patterns were given; every track gets the same answer.
    Constant(bool),
    /// Compiled alternation of the given patterns.
    Pattern(Regex),
}

impl GenreMatcher {
    /// Build a matcher from `patterns`, falling back to `default` when the
    /// list is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidPattern`] if the joined patterns do
    /// not compile.
    pub fn new<S: AsRef<str>>(patterns: &[S], default: bool, list: PatternList) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::Constant(default));
        }

        let alternation = patterns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&format!("^(?:{alternation})"))
            .case_insensitive(true)
            .build()
            .map_err(|source| SelectionError::InvalidPattern { list, source })?;

        log::trace!("Compiled {list} matcher `{}'", regex.as_str());
        Ok(Self::Pattern(regex))
    }

    /// Does `track` satisfy this matcher?
    ///
    /// A pattern matcher never accepts a track without a genre, or with an
    /// empty one.
    #[must_use]
    pub fn matches(&self, track: &Track) -> bool {
        match self {
            Self::Constant(answer) => *answer,
            Self::Pattern(regex) => track
                .genre
                .as_deref()
                .is_some_and(|genre| !genre.is_empty() && regex.is_match(genre)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(g: Option<&str>) -> Track {
        Track {
            genre: g.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_patterns_return_default() {
        let none: [&str; 0] = [];
        let yes = GenreMatcher::new(&none, true, PatternList::MustMatch).unwrap();
        let no = GenreMatcher::new(&none, false, PatternList::Promote).unwrap();

        for g in [None, Some(""), Some("Rock")] {
            assert!(yes.matches(&genre(g)));
            assert!(!no.matches(&genre(g)));
        }
    }

    #[test]
    fn test_match_is_case_insensitive_and_anchored() {
        let m = GenreMatcher::new(&["rock", "Jazz"], false, PatternList::Promote).unwrap();

        assert!(m.matches(&genre(Some("Rock"))));
        assert!(m.matches(&genre(Some("ROCKABILLY"))));
        assert!(m.matches(&genre(Some("jazz fusion"))));
        assert!(!m.matches(&genre(Some("Punk Rock"))));
        assert!(!m.matches(&genre(Some("Acid Jazz"))));
    }

    #[test]
    fn test_anchor_applies_to_every_alternative() {
        let m = GenreMatcher::new(&["pop", "metal"], false, PatternList::Demote).unwrap();
        assert!(!m.matches(&genre(Some("Heavy Metal"))));
        assert!(m.matches(&genre(Some("Metalcore"))));
    }

    #[test]
    fn test_missing_or_empty_genre_never_matches_patterns() {
        let m = GenreMatcher::new(&[".*"], true, PatternList::MustMatch).unwrap();
        assert!(!m.matches(&genre(None)));
        assert!(!m.matches(&genre(Some(""))));
        assert!(m.matches(&genre(Some("Anything"))));
    }

    #[test]
    fn test_regex_metacharacters_keep_their_meaning() {
        let m = GenreMatcher::new(&["r&b|soul", "hip.hop"], false, PatternList::Promote).unwrap();
        assert!(m.matches(&genre(Some("R&B"))));
        assert!(m.matches(&genre(Some("Soul"))));
        assert!(m.matches(&genre(Some("Hip-Hop"))));
    }

    #[test]
    fn test_invalid_pattern_reports_its_list() {
        let err = GenreMatcher::new(&["(unclosed"], false, PatternList::Demote).unwrap_err();
        match err {
            SelectionError::InvalidPattern { list, .. } => assert_eq!(list, PatternList::Demote),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
