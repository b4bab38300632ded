use thiserror::Error;

/// Structural precondition violations. Every variant indicates caller
/// misuse (typically a span reused after an intervening mutation) and is
/// never silently patched.
#[derive(Error, Debug)]
pub enum MutateError {
    #[error("span no longer matches paragraph structure at child {child}")]
    StaleSpan { child: usize },

    #[error("span run range inverted: {start_run}..{end_run} over {considered} runs")]
    InvertedSpan {
        start_run: usize,
        end_run: usize,
        considered: usize,
    },

    #[error("span offsets inverted: {start}..{end} within one run")]
    InvertedOffsets { start: usize, end: usize },

    #[error("offset {offset} out of bounds for run of length {len}")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("offset {offset} not on a character boundary")]
    NotCharBoundary { offset: usize },
}
