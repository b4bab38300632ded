use crate::tree::{Paragraph, Run, RunLoc};

/// A located match: the owning paragraph, the run list that was considered,
/// and the covered run range with byte offsets inside the boundary runs.
///
/// Spans are ephemeral read-only views. Any mutation of the owning paragraph
/// invalidates every span referencing it; a span must never be reused across
/// two mutator calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Index of the owning paragraph in the slice handed to the matcher.
    pub paragraph: usize,
    /// The considered run list, in document order.
    pub runs: Vec<RunLoc>,
    /// Index into `runs` of the first covered run.
    pub start_run: usize,
    /// Index into `runs` of the last covered run.
    pub end_run: usize,
    /// Byte offset of the match start inside the start run's text.
    pub start_offset: usize,
    /// Exclusive byte offset of the match end inside the end run's text.
    pub end_offset: usize,
    /// Regex capture groups (group 1 onward), retained for backreference
    /// expansion. Empty for literal and fuzzy matches.
    pub captures: Vec<Option<String>>,
}

impl Span {
    /// True when the span covers no text and only names a position.
    pub fn is_insertion_point(&self) -> bool {
        self.start_run == self.end_run && self.start_offset == self.end_offset
    }

    /// Zero-width span at the start of the match. Feeding it to a
    /// remove-and-insert realizes "insert before the matched text".
    pub fn collapse_to_start(&self) -> Span {
        Span {
            end_run: self.start_run,
            end_offset: self.start_offset,
            captures: Vec::new(),
            ..self.clone()
        }
    }

    /// Zero-width span at the end of the match.
    pub fn collapse_to_end(&self) -> Span {
        Span {
            start_run: self.end_run,
            start_offset: self.end_offset,
            captures: Vec::new(),
            ..self.clone()
        }
    }

    /// Reconstruct the matched text from the live tree via run/offset math.
    /// `None` when the tree no longer matches the span's structure.
    pub fn matched_text(&self, paragraph: &Paragraph) -> Option<String> {
        let mut out = String::new();
        for idx in self.start_run..=self.end_run {
            let run = paragraph.run_at(*self.runs.get(idx)?)?;
            let text = run.text_str();
            let start = if idx == self.start_run {
                self.start_offset
            } else {
                0
            };
            let end = if idx == self.end_run {
                self.end_offset
            } else {
                text.len()
            };
            if start > end || end > text.len() {
                return None;
            }
            out.push_str(&text[start..end]);
        }
        Some(out)
    }

    /// Clones of the covered content: boundary runs sliced to the covered
    /// sub-range, interior runs whole, formatting inherited throughout.
    /// This is the raw material for a tracked deletion or move.
    pub fn covered_runs(&self, paragraph: &Paragraph) -> Option<Vec<Run>> {
        let mut out = Vec::new();
        for idx in self.start_run..=self.end_run {
            let run = paragraph.run_at(*self.runs.get(idx)?)?;
            let text = run.text_str();
            let start = if idx == self.start_run {
                self.start_offset
            } else {
                0
            };
            let end = if idx == self.end_run {
                self.end_offset
            } else {
                text.len()
            };
            if start > end || end > text.len() {
                return None;
            }
            if start < end {
                out.push(run.slice(start, end));
            }
        }
        Some(out)
    }

    /// Expand `$1`..`$9` backreferences in a template against this span's
    /// capture groups. An unmatched group expands to nothing; `$$` is a
    /// literal dollar sign.
    pub fn expand_template(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    out.push('$');
                }
                Some(d) if d.is_ascii_digit() => {
                    let group = d.to_digit(10).unwrap_or(0) as usize;
                    chars.next();
                    if group >= 1 {
                        if let Some(Some(text)) = self.captures.get(group - 1) {
                            out.push_str(text);
                        }
                    }
                }
                _ => out.push('$'),
            }
        }
        out
    }
}
