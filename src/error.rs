//! Error types for the selection core.
//!
//! Loaders, writers and the binary use `anyhow` for context chains; the
//! pieces that decide *which* tracks end up in a playlist report a closed set
//! of failures so callers can match on them.

use thiserror::Error;

/// Result type for matcher construction and selection.
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Which genre pattern list a matcher was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternList {
    Promote,
    Demote,
    MustMatch,
}

impl std::fmt::Display for PatternList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Promote => "promote",
            Self::Demote => "demote",
            Self::MustMatch => "must-match",
        };
        f.write_str(name)
    }
}

/// Failures surfaced by matcher construction and the constrained selector.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// Neither a maximum size nor a maximum time was supplied
    #[error("Either maximum size or time must be given")]
    MissingBudget,

    /// The library handed to the selector has no tracks
    #[error("Cannot select from an empty library")]
    EmptyLibrary,

    /// No track can ever move the playlist towards its budget
    #[error(
        "No track passes the must-match criteria with a non-zero size or duration; \
         the budget can never be reached"
    )]
    UnreachableBudget,

    /// The draw cap ran out before the budget was reached
    #[error("Gave up after {draws} draws with {selected} tracks selected and the budget still open")]
    DrawLimitExceeded { draws: u64, selected: usize },

    /// A genre pattern could not be compiled
    #[error("Invalid {list} pattern: {source}")]
    InvalidPattern {
        list: PatternList,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_list_names_match_cli_flags() {
        assert_eq!(PatternList::Promote.to_string(), "promote");
        assert_eq!(PatternList::Demote.to_string(), "demote");
        assert_eq!(PatternList::MustMatch.to_string(), "must-match");
    }

    #[test]
    fn test_draw_limit_message_mentions_counts() {
        let err = SelectionError::DrawLimitExceeded { draws: 42, selected: 3 };
        let message = err.to_string();
        assert!(message.contains("42"));
        assert!(message.contains('3'));
    }
}
