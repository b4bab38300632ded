use crate::matcher::charmap::{MapOptions, ParagraphMap};
use crate::matcher::errors::MatchError;
use crate::matcher::span::Span;
use crate::tree::Paragraph;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Similarity scorer for fuzzy search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyAlgorithm {
    /// Normalized Levenshtein edit distance.
    Levenshtein,
    JaroWinkler,
    SorensenDice,
}

impl FuzzyAlgorithm {
    fn score(self, pattern: &str, window: &str) -> f64 {
        match self {
            FuzzyAlgorithm::Levenshtein => strsim::normalized_levenshtein(pattern, window),
            FuzzyAlgorithm::JaroWinkler => strsim::jaro_winkler(pattern, window),
            FuzzyAlgorithm::SorensenDice => strsim::sorensen_dice(pattern, window),
        }
    }
}

/// Search mode, dispatched once per call. Fuzzy and regex are mutually
/// exclusive by construction.
#[derive(Debug, Clone)]
pub enum SearchMode {
    Literal,
    Regex,
    Fuzzy {
        /// Minimum similarity in [0, 1].
        threshold: f64,
        algorithm: FuzzyAlgorithm,
        /// Collapse whitespace runs in both buffer and pattern first.
        normalize_whitespace: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub case_sensitive: bool,
    /// Match inside deleted and move-source content too.
    pub include_deleted: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Literal,
            case_sensitive: true,
            include_deleted: false,
        }
    }
}

/// Find every match of `pattern` across the given paragraphs, in document
/// order, non-overlapping left to right.
///
/// Zero matches is not an error at this layer; only a malformed pattern or
/// an out-of-range fuzzy configuration fails.
pub fn find(
    pattern: &str,
    paragraphs: &[Paragraph],
    options: &SearchOptions,
) -> Result<Vec<Span>, MatchError> {
    if pattern.is_empty() {
        return Err(MatchError::EmptyPattern);
    }

    match &options.mode {
        SearchMode::Literal => {
            let needle = if options.case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            };
            let map_options = MapOptions {
                include_deleted: options.include_deleted,
                lowercase: !options.case_sensitive,
                collapse_whitespace: false,
            };
            Ok(scan(paragraphs, map_options, |map, spans, para_idx| {
                literal_scan(map, &needle, para_idx, spans);
            }))
        }
        SearchMode::Regex => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!options.case_sensitive)
                .build()
                .map_err(|e| MatchError::InvalidRegex {
                    message: e.to_string(),
                })?;
            let map_options = MapOptions {
                include_deleted: options.include_deleted,
                lowercase: false,
                collapse_whitespace: false,
            };
            Ok(scan(paragraphs, map_options, |map, spans, para_idx| {
                regex_scan(map, &regex, para_idx, spans);
            }))
        }
        SearchMode::Fuzzy {
            threshold,
            algorithm,
            normalize_whitespace,
        } => {
            if !(0.0..=1.0).contains(threshold) {
                return Err(MatchError::ThresholdOutOfRange {
                    threshold: *threshold,
                });
            }
            let mut needle = if options.case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            };
            if *normalize_whitespace {
                needle = collapse_whitespace(&needle);
            }
            let map_options = MapOptions {
                include_deleted: options.include_deleted,
                lowercase: !options.case_sensitive,
                collapse_whitespace: *normalize_whitespace,
            };
            let threshold = *threshold;
            let algorithm = *algorithm;
            Ok(scan(paragraphs, map_options, move |map, spans, para_idx| {
                fuzzy_scan(map, &needle, threshold, algorithm, para_idx, spans);
            }))
        }
    }
}

/// Find exactly one match. Zero matches is [`MatchError::NoMatch`], more
/// than one is [`MatchError::AmbiguousMatch`]; the caller supplies an
/// explicit occurrence selector by calling [`find`] instead.
pub fn find_unique(
    pattern: &str,
    paragraphs: &[Paragraph],
    options: &SearchOptions,
) -> Result<Span, MatchError> {
    let mut matches = find(pattern, paragraphs, options)?;
    match matches.len() {
        0 => Err(MatchError::NoMatch),
        1 => Ok(matches.remove(0)),
        n => Err(MatchError::AmbiguousMatch { count: n }),
    }
}

fn scan<F>(paragraphs: &[Paragraph], map_options: MapOptions, per_paragraph: F) -> Vec<Span>
where
    F: Fn(&ParagraphMap, &mut Vec<Span>, usize),
{
    let mut spans = Vec::new();
    for (para_idx, paragraph) in paragraphs.iter().enumerate() {
        let map = ParagraphMap::build(paragraph, map_options);
        if map.is_empty() {
            continue;
        }
        per_paragraph(&map, &mut spans, para_idx);
    }
    spans
}

/// Literal scan: the cursor advances one character past each hit start, so
/// adjacent short-pattern hits are all reported while overlap within one hit
/// start is not.
fn literal_scan(map: &ParagraphMap, needle: &str, para_idx: usize, spans: &mut Vec<Span>) {
    let buffer = map.buffer();
    let mut cursor = 0;
    while cursor <= buffer.len() {
        let Some(rel) = buffer[cursor..].find(needle) else {
            break;
        };
        let start = cursor + rel;
        spans.push(map.to_span(para_idx, start, start + needle.len(), Vec::new()));
        let step = buffer[start..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);
        cursor = start + step;
    }
}

fn regex_scan(map: &ParagraphMap, regex: &regex::Regex, para_idx: usize, spans: &mut Vec<Span>) {
    for caps in regex.captures_iter(map.buffer()) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() == whole.end() {
            // An empty match names no run content.
            continue;
        }
        let groups = (1..caps.len())
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();
        spans.push(map.to_span(para_idx, whole.start(), whole.end(), groups));
    }
}

/// Variable-width sliding-window scan: window width ranges over pattern
/// length ±30%. Among overlapping candidate windows at or above threshold
/// only the highest-scoring one is kept; a kept window is replaced only on a
/// strictly higher score, so on ties the earliest candidate wins.
fn fuzzy_scan(
    map: &ParagraphMap,
    pattern: &str,
    threshold: f64,
    algorithm: FuzzyAlgorithm,
    para_idx: usize,
    spans: &mut Vec<Span>,
) {
    let buffer = map.buffer();
    let char_starts: Vec<usize> = buffer
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(buffer.len()))
        .collect();
    let n = char_starts.len() - 1;
    let pattern_chars = pattern.chars().count();
    let min_width = ((pattern_chars as f64) * 0.7).floor().max(1.0) as usize;
    let max_width = ((pattern_chars as f64) * 1.3).ceil() as usize;

    // (start char, end char exclusive, score)
    let mut kept: Option<(usize, usize, f64)> = None;
    let commit = |candidate: (usize, usize, f64), spans: &mut Vec<Span>, map: &ParagraphMap| {
        spans.push(map.to_span(
            para_idx,
            char_starts[candidate.0],
            char_starts[candidate.1],
            Vec::new(),
        ));
    };

    for start in 0..n {
        for width in min_width..=max_width {
            let end = start + width;
            if end > n {
                break;
            }
            let window = &buffer[char_starts[start]..char_starts[end]];
            let score = algorithm.score(pattern, window);
            if score < threshold {
                continue;
            }
            match kept {
                None => kept = Some((start, end, score)),
                Some(best) if start < best.1 => {
                    if score > best.2 {
                        kept = Some((start, end, score));
                    }
                }
                Some(best) => {
                    commit(best, spans, map);
                    kept = Some((start, end, score));
                }
            }
        }
    }
    if let Some(best) = kept {
        commit(best, spans, map);
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            out.push(c);
        }
    }
    out
}
