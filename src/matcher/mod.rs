//! Character-mapped text location across fragmented runs.
//!
//! A paragraph's logical text is frequently split across several
//! independently-styled runs. The matcher flattens each paragraph into a
//! single buffer, records every byte's originating `(run, offset)`, and maps
//! literal, regex, and fuzzy hits back to run-relative [`Span`]s.

pub mod charmap;
pub mod errors;
pub mod find;
pub mod span;

pub use errors::MatchError;
pub use find::{find, find_unique, FuzzyAlgorithm, SearchMode, SearchOptions};
pub use span::Span;
