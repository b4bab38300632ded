//! Revision markup generation: attributable, reversible change metadata.

pub mod author;
pub mod tagger;

pub use author::AuthorIdentity;
pub use tagger::RevisionTagger;
