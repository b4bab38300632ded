use serde::{Deserialize, Serialize};

/// Formatting properties of a run. Absence of a block on a run means
/// "inherit the paragraph default".
///
/// Splitting a run clones this block onto both sides, so structural equality
/// is the contract: two runs format identically iff their blocks compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProps {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strike: bool,
    /// Character style id (`w:rStyle`).
    #[serde(default)]
    pub style: Option<String>,
    /// Font family (`w:rFonts`).
    #[serde(default)]
    pub font: Option<String>,
    /// Font size in half-points (`w:sz`).
    #[serde(default)]
    pub size_half_points: Option<u32>,
    /// Hex RGB color without leading `#` (`w:color`).
    #[serde(default)]
    pub color: Option<String>,
}

/// Text payload of a run.
///
/// The deleted variant (`w:delText`) keeps removed content visible to
/// reviewers while excluding it from current-text reads. The preservation
/// flag (`xml:space="preserve"`) is derived from the value on construction:
/// without it a renderer may collapse boundary whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunText {
    value: String,
    deleted: bool,
    preserve_space: bool,
}

impl RunText {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let preserve_space = needs_space_preservation(&value);
        Self {
            value,
            deleted: false,
            preserve_space,
        }
    }

    pub fn deleted(value: impl Into<String>) -> Self {
        let mut text = Self::new(value);
        text.deleted = true;
        text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn preserve_space(&self) -> bool {
        self.preserve_space
    }

    /// Rewrite the payload variant from normal to deleted. The preservation
    /// flag is untouched.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

/// True when the text starts or ends with whitespace and must carry
/// `xml:space="preserve"`.
pub(crate) fn needs_space_preservation(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

/// The atomic styled-text unit. A run never nests another run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub props: Option<RunProps>,
    pub text: Option<RunText>,
    /// Revision-session token (8 hex digits). Opaque merge bookkeeping for
    /// the host format; this engine writes it but never reads it back.
    pub rsid: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            props: None,
            text: Some(RunText::new(text)),
            rsid: None,
        }
    }

    pub fn styled(text: impl Into<String>, props: RunProps) -> Self {
        Self {
            props: Some(props),
            text: Some(RunText::new(text)),
            rsid: None,
        }
    }

    /// Display text of this run; empty for a text-less run.
    pub fn text_str(&self) -> &str {
        self.text.as_ref().map(RunText::value).unwrap_or("")
    }

    /// Copy of this run holding `text[start..end]`, with the formatting
    /// block, payload variant, and session token of the original. The
    /// preservation flag is re-derived for the sliced value.
    pub fn slice(&self, start: usize, end: usize) -> Run {
        let value = &self.text_str()[start..end];
        let text = match &self.text {
            Some(t) if t.is_deleted() => RunText::deleted(value),
            _ => RunText::new(value),
        };
        Run {
            props: self.props.clone(),
            text: Some(text),
            rsid: self.rsid.clone(),
        }
    }
}

/// Metadata identifying one tracked change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionMeta {
    /// Monotonically increasing change id, unique within a session.
    pub id: u64,
    pub author: String,
    /// Second-precision UTC timestamp (`w:date`).
    pub date: String,
    /// Millisecond-capable UTC timestamp (`w16du:dateUtc`).
    pub date_utc: String,
}

/// Which kind of tracked change a wrapper records.
#[derive(Debug, Clone, PartialEq)]
pub enum RevisionKind {
    Insertion,
    Deletion,
    /// Source half of a move pair; linked to its destination by `name`.
    MoveSource { name: String },
    /// Destination half of a move pair.
    MoveDestination { name: String },
    /// Formatting change: the pre-edit block alongside the new one,
    /// wrapping no content.
    FormatChange {
        previous: Option<RunProps>,
        current: Option<RunProps>,
    },
}

/// A revision wrapper node owning the runs it marks up.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub kind: RevisionKind,
    pub meta: RevisionMeta,
    pub runs: Vec<Run>,
}

impl Revision {
    /// Content under this wrapper is excluded from current-text reads.
    pub fn hides_from_current_text(&self) -> bool {
        matches!(
            self.kind,
            RevisionKind::Deletion | RevisionKind::MoveSource { .. }
        )
    }

    /// Wrapper with the same kind and metadata but different content.
    /// Used when a mutation splits a wrapper in two.
    pub(crate) fn with_runs(&self, runs: Vec<Run>) -> Revision {
        Revision {
            kind: self.kind.clone(),
            meta: self.meta.clone(),
            runs,
        }
    }
}

/// An inline child of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    Revision(Revision),
}

impl From<Run> for Inline {
    fn from(run: Run) -> Self {
        Inline::Run(run)
    }
}

impl From<Revision> for Inline {
    fn from(rev: Revision) -> Self {
        Inline::Revision(rev)
    }
}

/// Position of a run among a paragraph's children.
///
/// `child` indexes into `Paragraph::children`; `inner` is set when the run
/// is owned by a revision wrapper at that child position. Positional only:
/// any mutation of the paragraph invalidates every outstanding location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLoc {
    pub child: usize,
    pub inner: Option<usize>,
}

impl RunLoc {
    pub fn direct(child: usize) -> Self {
        Self { child, inner: None }
    }

    pub fn nested(child: usize, inner: usize) -> Self {
        Self {
            child,
            inner: Some(inner),
        }
    }
}

/// An ordered sequence of inline children. Identity is positional; the host
/// format has no stable paragraph or run ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub children: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph with one plain run per text fragment.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: texts.into_iter().map(|t| Run::new(t).into()).collect(),
        }
    }

    pub fn push_run(&mut self, run: Run) {
        self.children.push(run.into());
    }

    /// Runs in document order together with their locations.
    ///
    /// When `include_deleted` is false, runs descending from a deletion or
    /// move-source wrapper are skipped. Format-change wrappers own no runs
    /// and never contribute.
    pub fn considered_runs(&self, include_deleted: bool) -> Vec<(RunLoc, &Run)> {
        let mut out = Vec::new();
        for (child, inline) in self.children.iter().enumerate() {
            match inline {
                Inline::Run(run) => out.push((RunLoc::direct(child), run)),
                Inline::Revision(rev) => {
                    if rev.hides_from_current_text() && !include_deleted {
                        continue;
                    }
                    for (inner, run) in rev.runs.iter().enumerate() {
                        out.push((RunLoc::nested(child, inner), run));
                    }
                }
            }
        }
        out
    }

    /// Concatenated display text. Deleted-text payloads read identically to
    /// normal payloads when included.
    pub fn display_text(&self, include_deleted: bool) -> String {
        self.considered_runs(include_deleted)
            .iter()
            .map(|(_, run)| run.text_str())
            .collect()
    }

    /// Resolve a run location against the live tree. `None` when the
    /// structure no longer matches.
    pub fn run_at(&self, loc: RunLoc) -> Option<&Run> {
        match (self.children.get(loc.child)?, loc.inner) {
            (Inline::Run(run), None) => Some(run),
            (Inline::Revision(rev), Some(inner)) => rev.runs.get(inner),
            _ => None,
        }
    }
}

/// Maximum change id present in the given paragraphs, 0 when none.
/// Seeds the session change-id counter.
pub fn max_revision_id(paragraphs: &[Paragraph]) -> u64 {
    paragraphs
        .iter()
        .flat_map(|p| &p.children)
        .filter_map(|inline| match inline {
            Inline::Revision(rev) => Some(rev.meta.id),
            Inline::Run(_) => None,
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: u64) -> RevisionMeta {
        RevisionMeta {
            id,
            author: "Reviewer".to_string(),
            date: "2026-08-27T12:00:00Z".to_string(),
            date_utc: "2026-08-27T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn preserve_flag_derived_from_boundary_whitespace() {
        assert!(RunText::new(" leading").preserve_space());
        assert!(RunText::new("trailing ").preserve_space());
        assert!(!RunText::new("interior space only").preserve_space());
        assert!(!RunText::new("plain").preserve_space());
    }

    #[test]
    fn mark_deleted_keeps_preserve_flag() {
        let mut text = RunText::new("lo wo ");
        assert!(text.preserve_space());
        text.mark_deleted();
        assert!(text.is_deleted());
        assert!(text.preserve_space());
    }

    #[test]
    fn slice_inherits_formatting_and_variant() {
        let props = RunProps {
            bold: true,
            style: Some("Emphasis".to_string()),
            ..Default::default()
        };
        let mut run = Run::styled("Hello world", props.clone());
        run.rsid = Some("00AB12CD".to_string());

        let left = run.slice(0, 6);
        assert_eq!(left.text_str(), "Hello ");
        assert_eq!(left.props, Some(props.clone()));
        assert_eq!(left.rsid.as_deref(), Some("00AB12CD"));
        assert!(left.text.as_ref().unwrap().preserve_space());

        let right = run.slice(6, 11);
        assert_eq!(right.text_str(), "world");
        assert_eq!(right.props, Some(props));
        assert!(!right.text.as_ref().unwrap().preserve_space());
    }

    #[test]
    fn display_text_skips_deletion_wrappers() {
        let mut para = Paragraph::from_texts(["Hell"]);
        para.children.push(
            Revision {
                kind: RevisionKind::Deletion,
                meta: meta(3),
                runs: vec![Run {
                    props: None,
                    text: Some(RunText::deleted("lo wo")),
                    rsid: None,
                }],
            }
            .into(),
        );
        para.push_run(Run::new("rld"));

        assert_eq!(para.display_text(false), "Hellrld");
        assert_eq!(para.display_text(true), "Helllo world");
    }

    #[test]
    fn move_source_hidden_destination_counts_as_current_text() {
        let mut para = Paragraph::from_texts(["See "]);
        para.children.push(
            Revision {
                kind: RevisionKind::MoveSource {
                    name: "move5".to_string(),
                },
                meta: meta(5),
                runs: vec![Run::new("the appendix")],
            }
            .into(),
        );
        para.push_run(Run::new(" below. "));
        para.children.push(
            Revision {
                kind: RevisionKind::MoveDestination {
                    name: "move5".to_string(),
                },
                meta: meta(6),
                runs: vec![Run::new("the appendix")],
            }
            .into(),
        );

        assert_eq!(para.display_text(false), "See  below. the appendix");
        assert_eq!(para.display_text(true), "See the appendix below. the appendix");

        let current = para.considered_runs(false);
        assert_eq!(current.len(), 3);
        assert!(current.iter().all(|(loc, _)| loc.child != 1));
        assert_eq!(para.considered_runs(true).len(), 4);
    }

    #[test]
    fn insertion_wrapper_counts_as_current_text() {
        let mut para = Paragraph::from_texts(["The quick"]);
        para.children.push(
            Revision {
                kind: RevisionKind::Insertion,
                meta: meta(2),
                runs: vec![Run::new("ly")],
            }
            .into(),
        );
        para.push_run(Run::new(" brown fox"));

        assert_eq!(para.display_text(false), "The quickly brown fox");
        let runs = para.considered_runs(false);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].0, RunLoc::nested(1, 0));
    }

    #[test]
    fn max_revision_id_scans_all_paragraphs() {
        let mut a = Paragraph::new();
        a.children.push(
            Revision {
                kind: RevisionKind::Insertion,
                meta: meta(4),
                runs: vec![Run::new("x")],
            }
            .into(),
        );
        let mut b = Paragraph::new();
        b.children.push(
            Revision {
                kind: RevisionKind::Deletion,
                meta: meta(9),
                runs: vec![],
            }
            .into(),
        );

        assert_eq!(max_revision_id(&[a, b]), 9);
        assert_eq!(max_revision_id(&[Paragraph::from_texts(["plain"])]), 0);
    }

    #[test]
    fn run_at_resolves_direct_and_nested() {
        let mut para = Paragraph::from_texts(["a"]);
        para.children.push(
            Revision {
                kind: RevisionKind::Insertion,
                meta: meta(1),
                runs: vec![Run::new("b")],
            }
            .into(),
        );

        assert_eq!(para.run_at(RunLoc::direct(0)).unwrap().text_str(), "a");
        assert_eq!(para.run_at(RunLoc::nested(1, 0)).unwrap().text_str(), "b");
        assert!(para.run_at(RunLoc::direct(1)).is_none());
        assert!(para.run_at(RunLoc::nested(1, 5)).is_none());
        assert!(para.run_at(RunLoc::direct(9)).is_none());
    }
}
