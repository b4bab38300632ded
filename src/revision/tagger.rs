use crate::revision::author::AuthorIdentity;
use crate::tree::{max_revision_id, Paragraph, Revision, RevisionKind, RevisionMeta, Run, RunProps};
use chrono::{DateTime, SecondsFormat, Utc};
use xxhash_rust::xxh3::xxh3_64;

/// Generates the markup wrappers that record edits as tracked changes.
///
/// Owns the session-scoped change-id counter (seeded strictly above the
/// maximum id present in the loaded tree), the session default author, and
/// the session revision token attached to newly created runs. One tagger per
/// loaded document; never share one across documents.
#[derive(Debug)]
pub struct RevisionTagger {
    next_id: u64,
    author: AuthorIdentity,
    rsid: String,
    fixed_now: Option<DateTime<Utc>>,
}

impl RevisionTagger {
    /// Tagger for a freshly created document: ids start at 1.
    pub fn new(author: impl Into<AuthorIdentity>) -> Self {
        Self::with_seed(author, 0)
    }

    /// Tagger whose ids start strictly above `max_seen_id`.
    pub fn with_seed(author: impl Into<AuthorIdentity>, max_seen_id: u64) -> Self {
        let author = author.into();
        let created = Utc::now();
        let rsid = session_token(&author.name, created);
        Self {
            next_id: max_seen_id + 1,
            author,
            rsid,
            fixed_now: None,
        }
    }

    /// Tagger seeded from the maximum change id present in the tree.
    pub fn for_tree(author: impl Into<AuthorIdentity>, paragraphs: &[Paragraph]) -> Self {
        Self::with_seed(author, max_revision_id(paragraphs))
    }

    /// Pin the timestamp, for deterministic serialization.
    pub fn with_timestamp(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn author(&self) -> &AuthorIdentity {
        &self.author
    }

    /// The 8-hex-digit session token attached to runs this tagger creates.
    pub fn session_rsid(&self) -> &str {
        &self.rsid
    }

    /// Next id the tagger would allocate; useful for asserting monotonicity.
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Wrap new content as a tracked insertion. Consumes one change id.
    pub fn tag_insertion(&mut self, runs: Vec<Run>, author: Option<&str>) -> Revision {
        let runs = self.attach_rsid(runs);
        Revision {
            kind: RevisionKind::Insertion,
            meta: self.next_meta(author),
            runs,
        }
    }

    /// Wrap removed content as a tracked deletion: every contained text
    /// payload is rewritten from normal to deleted, preservation flags
    /// untouched. Consumes one change id.
    pub fn tag_deletion(&mut self, mut runs: Vec<Run>, author: Option<&str>) -> Revision {
        for run in &mut runs {
            if let Some(text) = &mut run.text {
                text.mark_deleted();
            }
        }
        let runs = self.attach_rsid(runs);
        Revision {
            kind: RevisionKind::Deletion,
            meta: self.next_meta(author),
            runs,
        }
    }

    /// Source and destination wrappers for relocated content, linked by a
    /// shared move name. Consumes two change ids (source first).
    pub fn tag_move(
        &mut self,
        source: Vec<Run>,
        destination: Vec<Run>,
        author: Option<&str>,
    ) -> (Revision, Revision) {
        let source_meta = self.next_meta(author);
        let name = format!("move{}", source_meta.id);
        let from = Revision {
            kind: RevisionKind::MoveSource { name: name.clone() },
            meta: source_meta,
            runs: self.attach_rsid(source),
        };
        let to = Revision {
            kind: RevisionKind::MoveDestination { name },
            meta: self.next_meta(author),
            runs: self.attach_rsid(destination),
        };
        (from, to)
    }

    /// Property-change wrapper recording the pre-edit formatting block
    /// alongside the new one; wraps no content. Consumes one change id.
    pub fn tag_format_change(
        &mut self,
        previous: Option<RunProps>,
        current: Option<RunProps>,
        author: Option<&str>,
    ) -> Revision {
        Revision {
            kind: RevisionKind::FormatChange { previous, current },
            meta: self.next_meta(author),
            runs: Vec::new(),
        }
    }

    fn next_meta(&mut self, author: Option<&str>) -> RevisionMeta {
        let id = self.next_id;
        self.next_id += 1;
        let now = self.fixed_now.unwrap_or_else(Utc::now);
        RevisionMeta {
            id,
            author: author.unwrap_or(&self.author.name).to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            date_utc: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn attach_rsid(&self, mut runs: Vec<Run>) -> Vec<Run> {
        for run in &mut runs {
            if run.rsid.is_none() {
                run.rsid = Some(self.rsid.clone());
            }
        }
        runs
    }
}

fn session_token(author: &str, created: DateTime<Utc>) -> String {
    let seed = created.timestamp_nanos_opt().unwrap_or_default() as u64;
    let hash = xxh3_64(format!("{author}:{seed}").as_bytes());
    format!("{:08X}", (hash & 0xFFFF_FFFF) as u32)
}
