use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("empty search pattern")]
    EmptyPattern,

    #[error("invalid regular expression: {message}")]
    InvalidRegex { message: String },

    #[error("fuzzy threshold {threshold} outside [0, 1]")]
    ThresholdOutOfRange { threshold: f64 },

    #[error("pattern matched 0 locations")]
    NoMatch,

    #[error("pattern matched {count} locations, expected exactly 1")]
    AmbiguousMatch { count: usize },
}
