use crate::matcher::Span;
use crate::mutator::errors::MutateError;
use crate::tree::{Inline, Paragraph, Run, RunLoc};

/// The decision applied to a located span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateOp {
    /// Splice new nodes immediately before the start boundary run's child
    /// position; run contents untouched.
    InsertBefore,
    /// Splice new nodes immediately after the end boundary run's child
    /// position; run contents untouched.
    InsertAfter,
    /// Remove the covered content (splitting partially covered runs) and
    /// splice replacements at the resulting position. Empty replacements
    /// realize a plain delete; a zero-width span realizes an in-text insert.
    RemoveAndInsert,
}

/// Mutate the paragraph in place. The span is validated against the live
/// tree first: a mismatch means the span was obtained before an intervening
/// mutation and is rejected outright.
///
/// Every previously obtained span referencing this paragraph is invalid once
/// this returns; positions are neither updated nor tracked.
pub fn apply(
    paragraph: &mut Paragraph,
    span: &Span,
    op: MutateOp,
    replacements: Vec<Inline>,
) -> Result<(), MutateError> {
    validate(paragraph, span)?;
    match op {
        MutateOp::InsertBefore => {
            let at = span.runs[span.start_run].child;
            paragraph.children.splice(at..at, replacements);
            Ok(())
        }
        MutateOp::InsertAfter => {
            let at = span.runs[span.end_run].child + 1;
            paragraph.children.splice(at..at, replacements);
            Ok(())
        }
        MutateOp::RemoveAndInsert => {
            let start_child = span.runs[span.start_run].child;
            let end_child = span.runs[span.end_run].child;
            if start_child == end_child {
                same_child(paragraph, span, start_child, replacements)
            } else {
                multi_child(paragraph, span, start_child, end_child, replacements)
            }
        }
    }
}

fn validate(paragraph: &Paragraph, span: &Span) -> Result<(), MutateError> {
    if span.start_run > span.end_run || span.end_run >= span.runs.len() {
        return Err(MutateError::InvertedSpan {
            start_run: span.start_run,
            end_run: span.end_run,
            considered: span.runs.len(),
        });
    }
    if span.start_run == span.end_run && span.start_offset > span.end_offset {
        return Err(MutateError::InvertedOffsets {
            start: span.start_offset,
            end: span.end_offset,
        });
    }
    for idx in span.start_run..=span.end_run {
        let loc = span.runs[idx];
        let run = paragraph
            .run_at(loc)
            .ok_or(MutateError::StaleSpan { child: loc.child })?;
        if idx == span.start_run {
            check_offset(run, span.start_offset)?;
        }
        if idx == span.end_run {
            check_offset(run, span.end_offset)?;
        }
    }
    Ok(())
}

fn check_offset(run: &Run, offset: usize) -> Result<(), MutateError> {
    let text = run.text_str();
    if offset > text.len() {
        return Err(MutateError::OffsetOutOfRange {
            offset,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(MutateError::NotCharBoundary { offset });
    }
    Ok(())
}

/// The whole span sits under one paragraph child: a direct run splits into
/// up to before/after siblings; a revision wrapper splits into two wrappers
/// sharing metadata so replacements land between them at paragraph level.
fn same_child(
    paragraph: &mut Paragraph,
    span: &Span,
    child: usize,
    replacements: Vec<Inline>,
) -> Result<(), MutateError> {
    let mut new_children: Vec<Inline> = Vec::new();
    match &paragraph.children[child] {
        Inline::Run(run) => {
            // A direct run child maps to exactly one considered run.
            if span.start_run != span.end_run {
                return Err(MutateError::StaleSpan { child });
            }
            let len = run.text_str().len();
            if span.start_offset > 0 {
                new_children.push(run.slice(0, span.start_offset).into());
            }
            new_children.extend(replacements);
            if span.end_offset < len {
                new_children.push(run.slice(span.end_offset, len).into());
            }
        }
        Inline::Revision(rev) => {
            let first = span.runs[span.start_run]
                .inner
                .ok_or(MutateError::StaleSpan { child })?;
            let last = span.runs[span.end_run]
                .inner
                .ok_or(MutateError::StaleSpan { child })?;

            let mut left: Vec<Run> = rev.runs[..first].to_vec();
            if span.start_offset > 0 {
                left.push(rev.runs[first].slice(0, span.start_offset));
            }
            let mut right: Vec<Run> = Vec::new();
            let last_len = rev.runs[last].text_str().len();
            if span.end_offset < last_len {
                right.push(rev.runs[last].slice(span.end_offset, last_len));
            }
            right.extend(rev.runs[last + 1..].iter().cloned());

            if !left.is_empty() {
                new_children.push(rev.with_runs(left).into());
            }
            new_children.extend(replacements);
            if !right.is_empty() {
                new_children.push(rev.with_runs(right).into());
            }
        }
    }
    paragraph.children.splice(child..=child, new_children);
    Ok(())
}

/// The span crosses paragraph children. Children are processed back to
/// front so positional indices stay valid: the end boundary keeps its
/// after-part, interior covered children are removed, skipped children
/// (deleted or move-source content lying inside the range) are left
/// untouched, and the start boundary keeps its before-part. Replacements
/// land where the first covered content stood.
fn multi_child(
    paragraph: &mut Paragraph,
    span: &Span,
    start_child: usize,
    end_child: usize,
    replacements: Vec<Inline>,
) -> Result<(), MutateError> {
    let mut insert_at = start_child;

    for child_idx in (start_child..=end_child).rev() {
        let covered: Vec<(usize, RunLoc)> = (span.start_run..=span.end_run)
            .map(|k| (k, span.runs[k]))
            .filter(|(_, loc)| loc.child == child_idx)
            .collect();
        if covered.is_empty() {
            continue;
        }

        let survivors: Vec<Inline> = match &paragraph.children[child_idx] {
            Inline::Run(run) => {
                let k = covered[0].0;
                let len = run.text_str().len();
                if k == span.start_run && span.start_offset > 0 {
                    vec![run.slice(0, span.start_offset).into()]
                } else if k == span.end_run && span.end_offset < len {
                    vec![run.slice(span.end_offset, len).into()]
                } else {
                    Vec::new()
                }
            }
            Inline::Revision(rev) => {
                let (first_k, first_loc) = covered[0];
                let (last_k, last_loc) = covered[covered.len() - 1];
                let first = first_loc
                    .inner
                    .ok_or(MutateError::StaleSpan { child: child_idx })?;
                let last = last_loc
                    .inner
                    .ok_or(MutateError::StaleSpan { child: child_idx })?;

                let mut left: Vec<Run> = rev.runs[..first].to_vec();
                if first_k == span.start_run && span.start_offset > 0 {
                    left.push(rev.runs[first].slice(0, span.start_offset));
                }
                let mut right: Vec<Run> = Vec::new();
                let last_len = rev.runs[last].text_str().len();
                if last_k == span.end_run && span.end_offset < last_len {
                    right.push(rev.runs[last].slice(span.end_offset, last_len));
                }
                right.extend(rev.runs[last + 1..].iter().cloned());

                let mut out: Vec<Inline> = Vec::new();
                if !left.is_empty() {
                    out.push(rev.with_runs(left).into());
                }
                if !right.is_empty() {
                    out.push(rev.with_runs(right).into());
                }
                out
            }
        };

        let surviving = survivors.len();
        paragraph.children.splice(child_idx..=child_idx, survivors);
        if child_idx == start_child {
            // Coverage of the start child extends to its end, so every
            // survivor there is before-content.
            insert_at = start_child + surviving;
        }
    }

    paragraph.children.splice(insert_at..insert_at, replacements);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{find, SearchOptions};
    use crate::tree::{Revision, RevisionKind, RevisionMeta, RunText};

    fn meta(id: u64) -> RevisionMeta {
        RevisionMeta {
            id,
            author: "Reviewer".to_string(),
            date: "2026-08-27T12:00:00Z".to_string(),
            date_utc: "2026-08-27T12:00:00.000Z".to_string(),
        }
    }

    fn ins_wrapper(id: u64, texts: &[&str]) -> Revision {
        Revision {
            kind: RevisionKind::Insertion,
            meta: meta(id),
            runs: texts.iter().map(|t| Run::new(*t)).collect(),
        }
    }

    fn del_wrapper(id: u64, text: &str) -> Revision {
        Revision {
            kind: RevisionKind::Deletion,
            meta: meta(id),
            runs: vec![Run {
                props: None,
                text: Some(RunText::deleted(text)),
                rsid: None,
            }],
        }
    }

    fn find_one(pattern: &str, paragraphs: &[Paragraph]) -> Span {
        let spans = find(pattern, paragraphs, &SearchOptions::default()).unwrap();
        assert_eq!(spans.len(), 1);
        spans.into_iter().next().unwrap()
    }

    fn child_texts(para: &Paragraph) -> Vec<String> {
        para.children
            .iter()
            .map(|c| match c {
                Inline::Run(r) => r.text_str().to_string(),
                Inline::Revision(rev) => {
                    let inner: String = rev.runs.iter().map(Run::text_str).collect();
                    format!("<rev:{inner}>")
                }
            })
            .collect()
    }

    #[test]
    fn insert_before_and_after_leave_runs_untouched() {
        let mut para = Paragraph::from_texts(["alpha", "beta"]);
        let span = find_one("beta", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::InsertBefore,
            vec![ins_wrapper(1, &["x"]).into()],
        )
        .unwrap();
        assert_eq!(child_texts(&para), vec!["alpha", "<rev:x>", "beta"]);

        let span = find_one("alpha", std::slice::from_ref(&para));
        apply(
            &mut para,
            &span,
            MutateOp::InsertAfter,
            vec![ins_wrapper(2, &["y"]).into()],
        )
        .unwrap();
        assert_eq!(child_texts(&para), vec!["alpha", "<rev:y>", "<rev:x>", "beta"]);
    }

    #[test]
    fn whole_run_removal_splices_at_former_position() {
        let mut para = Paragraph::from_texts(["Net ", "30 days", "."]);
        let span = find_one("30 days", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![del_wrapper(1, "30 days").into(), ins_wrapper(2, &["45 days"]).into()],
        )
        .unwrap();

        assert_eq!(
            child_texts(&para),
            vec!["Net ", "<rev:30 days>", "<rev:45 days>", "."]
        );
    }

    #[test]
    fn sub_range_split_inherits_formatting() {
        use crate::tree::RunProps;
        let props = RunProps {
            italic: true,
            font: Some("Georgia".to_string()),
            ..Default::default()
        };
        let mut para = Paragraph {
            children: vec![Run::styled("Net 30 days.", props.clone()).into()],
        };
        let span = find_one("30 days", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![del_wrapper(1, "30 days").into(), ins_wrapper(2, &["45 days"]).into()],
        )
        .unwrap();

        assert_eq!(
            child_texts(&para),
            vec!["Net ", "<rev:30 days>", "<rev:45 days>", "."]
        );
        for child in [&para.children[0], &para.children[3]] {
            match child {
                Inline::Run(run) => assert_eq!(run.props, Some(props.clone())),
                other => panic!("expected run, got {other:?}"),
            }
        }
        // "Net " ends with a space and must carry the preservation flag.
        match &para.children[0] {
            Inline::Run(run) => assert!(run.text.as_ref().unwrap().preserve_space()),
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn multi_run_span_with_partial_boundaries() {
        let mut para = Paragraph::from_texts(["Hello ", "world"]);
        let span = find_one("lo wo", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![del_wrapper(1, "lo wo").into()],
        )
        .unwrap();

        assert_eq!(child_texts(&para), vec!["Hel", "<rev:lo wo>", "rld"]);
    }

    #[test]
    fn plain_delete_with_empty_replacements() {
        let mut para = Paragraph::from_texts(["one two three"]);
        let span = find_one("two ", std::slice::from_ref(&para));

        apply(&mut para, &span, MutateOp::RemoveAndInsert, Vec::new()).unwrap();
        assert_eq!(para.display_text(false), "one three");
    }

    #[test]
    fn zero_width_span_realizes_in_text_insert() {
        let mut para = Paragraph::from_texts(["The quick brown fox"]);
        let span = find_one("quick", std::slice::from_ref(&para)).collapse_to_end();

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![ins_wrapper(1, &["ly"]).into()],
        )
        .unwrap();

        assert_eq!(
            child_texts(&para),
            vec!["The quick", "<rev:ly>", " brown fox"]
        );
        assert_eq!(para.display_text(false), "The quickly brown fox");
    }

    #[test]
    fn skipped_deleted_child_inside_range_left_untouched() {
        let mut para = Paragraph::from_texts(["AB"]);
        para.children.push(del_wrapper(1, "X").into());
        para.push_run(Run::new("CD"));
        // Current text is "ABCD"; cover "BC" across the deletion wrapper.
        let span = find_one("BC", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![ins_wrapper(2, &["--"]).into()],
        )
        .unwrap();

        assert_eq!(child_texts(&para), vec!["A", "<rev:-->", "<rev:X>", "D"]);
    }

    #[test]
    fn wrapper_splits_into_metadata_sharing_halves() {
        let mut para = Paragraph::from_texts(["before "]);
        para.children.push(ins_wrapper(5, &["quickly"]).into());
        let span = find_one("ly", std::slice::from_ref(&para));

        apply(
            &mut para,
            &span,
            MutateOp::RemoveAndInsert,
            vec![del_wrapper(6, "ly").into()],
        )
        .unwrap();

        assert_eq!(child_texts(&para), vec!["before ", "<rev:quick>", "<rev:ly>"]);
        match (&para.children[1], &para.children[2]) {
            (Inline::Revision(kept), Inline::Revision(del)) => {
                assert_eq!(kept.meta.id, 5);
                assert!(matches!(kept.kind, RevisionKind::Insertion));
                assert_eq!(del.meta.id, 6);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn span_reused_after_mutation_is_rejected() {
        let mut para = Paragraph::from_texts(["Hello ", "world"]);
        let span = find_one("world", std::slice::from_ref(&para));

        apply(&mut para, &span, MutateOp::RemoveAndInsert, Vec::new()).unwrap();
        assert_eq!(child_texts(&para), vec!["Hello "]);

        let result = apply(&mut para, &span, MutateOp::RemoveAndInsert, Vec::new());
        assert!(matches!(result, Err(MutateError::StaleSpan { .. })));
    }

    #[test]
    fn inverted_and_out_of_range_spans_rejected() {
        let mut para = Paragraph::from_texts(["abc"]);
        let mut span = find_one("b", std::slice::from_ref(&para));
        span.start_offset = 2;
        span.end_offset = 1;
        assert!(matches!(
            apply(&mut para, &span, MutateOp::RemoveAndInsert, Vec::new()),
            Err(MutateError::InvertedOffsets { .. })
        ));

        let mut span = find_one("b", std::slice::from_ref(&para));
        span.end_offset = 10;
        assert!(matches!(
            apply(&mut para, &span, MutateOp::RemoveAndInsert, Vec::new()),
            Err(MutateError::OffsetOutOfRange { .. })
        ));
    }
}
