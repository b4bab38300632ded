//! Per-paragraph flat buffer with byte-level origin tracking.

use crate::matcher::span::Span;
use crate::tree::{Paragraph, RunLoc};

/// How the buffer is derived from the paragraph's runs.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MapOptions {
    /// Include runs under deletion / move-source wrappers.
    pub include_deleted: bool,
    /// Lower-case the buffer (case-insensitive literal and fuzzy search).
    pub lowercase: bool,
    /// Collapse whitespace runs to a single space (fuzzy normalization).
    pub collapse_whitespace: bool,
}

/// Origin of one buffer byte: which considered run it came from, the byte
/// offset of its source character in that run's text, and the source
/// character's byte length.
#[derive(Debug, Clone, Copy)]
struct Origin {
    run: usize,
    offset: usize,
    len: usize,
}

/// Flattened paragraph text with a parallel per-byte origin table.
///
/// Lower-casing can expand one source character into several buffer
/// characters, and whitespace collapsing can fold several source characters
/// into one buffer space; in both cases every buffer byte maps back to one
/// source character, and a match end maps to the end of the source character
/// containing it.
pub(crate) struct ParagraphMap {
    buffer: String,
    origins: Vec<Origin>,
    locs: Vec<RunLoc>,
}

impl ParagraphMap {
    pub fn build(paragraph: &Paragraph, options: MapOptions) -> Self {
        let considered = paragraph.considered_runs(options.include_deleted);
        let mut map = Self {
            buffer: String::new(),
            origins: Vec::new(),
            locs: considered.iter().map(|(loc, _)| *loc).collect(),
        };

        // Whitespace collapse state spans run boundaries.
        let mut in_whitespace = false;
        for (run_idx, (_, run)) in considered.iter().enumerate() {
            for (offset, c) in run.text_str().char_indices() {
                let origin = Origin {
                    run: run_idx,
                    offset,
                    len: c.len_utf8(),
                };
                if options.collapse_whitespace && c.is_whitespace() {
                    if !in_whitespace {
                        map.push(' ', origin);
                        in_whitespace = true;
                    }
                    continue;
                }
                in_whitespace = false;
                if options.lowercase {
                    for lc in c.to_lowercase() {
                        map.push(lc, origin);
                    }
                } else {
                    map.push(c, origin);
                }
            }
        }
        map
    }

    fn push(&mut self, c: char, origin: Origin) {
        self.buffer.push(c);
        for _ in 0..c.len_utf8() {
            self.origins.push(origin);
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Map a non-empty buffer byte range back to a run-relative span.
    pub fn to_span(
        &self,
        paragraph: usize,
        start_byte: usize,
        end_byte: usize,
        captures: Vec<Option<String>>,
    ) -> Span {
        debug_assert!(start_byte < end_byte && end_byte <= self.origins.len());
        let start = self.origins[start_byte];
        let last = self.origins[end_byte - 1];
        Span {
            paragraph,
            runs: self.locs.clone(),
            start_run: start.run,
            end_run: last.run,
            start_offset: start.offset,
            end_offset: last.offset + last.len,
            captures,
        }
    }
}
