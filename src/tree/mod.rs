//! In-memory document tree: paragraphs, styled runs, and revision wrappers.
//!
//! The tree mirrors the body markup of a WordprocessingML document. It is
//! exclusively owned by the caller for the session; nothing here persists or
//! caches a copy.

pub mod node;
pub mod writer;

pub use node::{
    max_revision_id, Inline, Paragraph, Revision, RevisionKind, RevisionMeta, Run, RunLoc,
    RunProps, RunText,
};
pub use writer::write_paragraph;
