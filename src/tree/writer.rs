//! WordprocessingML serialization of a paragraph subtree.
//!
//! Third-party readers validate this markup bit-exactly: attribute order on
//! revision wrappers is `w:id`, `w:author`, `w:date`, `w16du:dateUtc`, text
//! bounded by whitespace carries `xml:space="preserve"`, and every attribute
//! value is escaped for markup metacharacters.

use crate::tree::node::{Inline, Paragraph, Revision, RevisionKind, Run, RunProps, RunText};
use std::fmt::Write;

/// Serialize one paragraph to its `w:p` element.
pub fn write_paragraph(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    out.push_str("<w:p>");
    for child in &paragraph.children {
        match child {
            Inline::Run(run) => write_run(&mut out, run),
            Inline::Revision(rev) => write_revision(&mut out, rev),
        }
    }
    out.push_str("</w:p>");
    out
}

fn write_revision(out: &mut String, rev: &Revision) {
    let attrs = format!(
        "w:id=\"{}\" w:author=\"{}\" w:date=\"{}\" w16du:dateUtc=\"{}\"",
        rev.meta.id,
        escape_attr(&rev.meta.author),
        escape_attr(&rev.meta.date),
        escape_attr(&rev.meta.date_utc),
    );

    match &rev.kind {
        RevisionKind::Insertion => wrap(out, "w:ins", &attrs, &rev.runs),
        RevisionKind::Deletion => wrap(out, "w:del", &attrs, &rev.runs),
        RevisionKind::MoveSource { name } => {
            let _ = write!(
                out,
                "<w:moveFromRangeStart w:id=\"{}\" w:name=\"{}\"/>",
                rev.meta.id,
                escape_attr(name),
            );
            wrap(out, "w:moveFrom", &attrs, &rev.runs);
            let _ = write!(out, "<w:moveFromRangeEnd w:id=\"{}\"/>", rev.meta.id);
        }
        RevisionKind::MoveDestination { name } => {
            let _ = write!(
                out,
                "<w:moveToRangeStart w:id=\"{}\" w:name=\"{}\"/>",
                rev.meta.id,
                escape_attr(name),
            );
            wrap(out, "w:moveTo", &attrs, &rev.runs);
            let _ = write!(out, "<w:moveToRangeEnd w:id=\"{}\"/>", rev.meta.id);
        }
        RevisionKind::FormatChange { previous, current } => {
            // A format change wraps no content: it is a property block
            // carrying the pre-edit block inside w:rPrChange.
            out.push_str("<w:r><w:rPr>");
            if let Some(props) = current {
                write_props_body(out, props);
            }
            let _ = write!(out, "<w:rPrChange {attrs}>");
            out.push_str("<w:rPr>");
            if let Some(props) = previous {
                write_props_body(out, props);
            }
            out.push_str("</w:rPr></w:rPrChange></w:rPr></w:r>");
        }
    }
}

fn wrap(out: &mut String, element: &str, attrs: &str, runs: &[Run]) {
    let _ = write!(out, "<{element} {attrs}>");
    for run in runs {
        write_run(out, run);
    }
    let _ = write!(out, "</{element}>");
}

fn write_run(out: &mut String, run: &Run) {
    match &run.rsid {
        Some(rsid) => {
            let _ = write!(out, "<w:r w:rsidR=\"{}\">", escape_attr(rsid));
        }
        None => out.push_str("<w:r>"),
    }
    if let Some(props) = &run.props {
        out.push_str("<w:rPr>");
        write_props_body(out, props);
        out.push_str("</w:rPr>");
    }
    if let Some(text) = &run.text {
        write_text(out, text);
    }
    out.push_str("</w:r>");
}

fn write_text(out: &mut String, text: &RunText) {
    let element = if text.is_deleted() { "w:delText" } else { "w:t" };
    if text.preserve_space() {
        let _ = write!(out, "<{element} xml:space=\"preserve\">");
    } else {
        let _ = write!(out, "<{element}>");
    }
    out.push_str(&escape_text(text.value()));
    let _ = write!(out, "</{element}>");
}

// Child order follows the host schema: rStyle, rFonts, b, i, strike,
// color, sz, u.
fn write_props_body(out: &mut String, props: &RunProps) {
    if let Some(style) = &props.style {
        let _ = write!(out, "<w:rStyle w:val=\"{}\"/>", escape_attr(style));
    }
    if let Some(font) = &props.font {
        let font = escape_attr(font);
        let _ = write!(out, "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/>");
    }
    if props.bold {
        out.push_str("<w:b/>");
    }
    if props.italic {
        out.push_str("<w:i/>");
    }
    if props.strike {
        out.push_str("<w:strike/>");
    }
    if let Some(color) = &props.color {
        let _ = write!(out, "<w:color w:val=\"{}\"/>", escape_attr(color));
    }
    if let Some(size) = props.size_half_points {
        let _ = write!(out, "<w:sz w:val=\"{size}\"/>");
    }
    if props.underline {
        out.push_str("<w:u w:val=\"single\"/>");
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
