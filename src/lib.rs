//! Trackedit: tracked-change editing engine for WordprocessingML run trees
//!
//! Applies surgical, reviewer-visible edits to a word-processing document
//! without hand-writing its markup. A paragraph's text is stored as a
//! sequence of independently-styled runs, and the same logical phrase is
//! frequently fragmented across several of them; the engine locates a phrase
//! regardless of fragmentation and mutates the run tree in place so the edit
//! lands as a tracked (attributable, reversible) change.
//!
//! # Architecture
//!
//! Three components, composed as a pipeline:
//!
//! - the **matcher** flattens each paragraph into a character-mapped buffer
//!   and returns every literal, regex, or fuzzy hit as a run-relative
//!   [`Span`];
//! - the **revision tagger** wraps new or removed content with change
//!   metadata (monotonic id, author, timestamps) as [`Revision`] nodes;
//! - the **mutator** consumes a span plus a decision and splices the new
//!   structure, splitting partially covered runs so untouched formatting
//!   survives byte for byte.
//!
//! Every span is a transient view: the next mutation of its paragraph
//! invalidates it, and a batch of edits is a sequence of independent
//! match-then-mutate cycles against current tree state.
//!
//! # Example
//!
//! ```
//! use trackedit::{apply, find_unique, MutateOp, Paragraph, RevisionTagger, SearchOptions};
//!
//! let mut para = Paragraph::from_texts(["Net 30 days."]);
//! let mut tagger = RevisionTagger::new("Reviewer");
//!
//! let span = find_unique("30 days", std::slice::from_ref(&para), &SearchOptions::default())?;
//! let removed = span.covered_runs(&para).expect("span is live");
//! let del = tagger.tag_deletion(removed, None);
//! let ins = tagger.tag_insertion(vec![trackedit::Run::new("45 days")], None);
//! apply(&mut para, &span, MutateOp::RemoveAndInsert, vec![del.into(), ins.into()])?;
//!
//! assert_eq!(para.display_text(false), "Net 45 days.");
//! assert_eq!(para.display_text(true), "Net 30 days45 days.");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod matcher;
pub mod mutator;
pub mod revision;
pub mod tree;

// Re-exports
pub use matcher::{find, find_unique, FuzzyAlgorithm, MatchError, SearchMode, SearchOptions, Span};
pub use mutator::{apply, MutateError, MutateOp};
pub use revision::{AuthorIdentity, RevisionTagger};
pub use tree::{
    max_revision_id, write_paragraph, Inline, Paragraph, Revision, RevisionKind, RevisionMeta,
    Run, RunLoc, RunProps, RunText,
};
