//! In-place transformation of a paragraph's run sequence.
//!
//! Consumes a [`Span`](crate::matcher::Span) plus a decision and splices new
//! tree structure at the located position. Unaffected runs are untouched;
//! partially covered runs split into before/after siblings inheriting the
//! original formatting.

pub mod apply;
pub mod errors;

pub use apply::{apply, MutateOp};
pub use errors::MutateError;
