//! Parser, resolver and constructors for tracked markup spans.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::RedlineError;

/// Kind of a tracked markup span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    /// `{++text++}`
    Addition,
    /// `{--text--}`
    Deletion,
    /// `{~~old~>new~~}`
    Substitution,
    /// `{==text==}`, optionally followed by an attached `{>>comment<<}`
    Highlight,
    /// `{>>comment<<}`
    Comment,
}

impl MarkupKind {
    fn opener(self) -> &'static str {
        match self {
            MarkupKind::Addition => "{++",
            MarkupKind::Deletion => "{--",
            MarkupKind::Substitution => "{~~",
            MarkupKind::Highlight => "{==",
            MarkupKind::Comment => "{>>",
        }
    }

    fn closer(self) -> &'static str {
        match self {
            MarkupKind::Addition => "++}",
            MarkupKind::Deletion => "--}",
            MarkupKind::Substitution => "~~}",
            MarkupKind::Highlight => "==}",
            MarkupKind::Comment => "<<}",
        }
    }

    fn from_opener(rest: &str) -> Option<Self> {
        [
            MarkupKind::Addition,
            MarkupKind::Deletion,
            MarkupKind::Substitution,
            MarkupKind::Highlight,
            MarkupKind::Comment,
        ]
        .into_iter()
        .find(|kind| rest.starts_with(kind.opener()))
    }
}

/// One parsed span. `start..end` is a byte range into the parsed string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupMatch {
    pub kind: MarkupKind,
    pub start: usize,
    pub end: usize,
    /// Inner text; the old side for substitutions
    pub content: String,
    /// New side of a substitution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Comment attached to a highlight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Parse result including spans that could not be parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMarkup {
    pub matches: Vec<MarkupMatch>,
    /// Always [`RedlineError::MalformedTrackedMarkup`]
    pub malformed: Vec<RedlineError>,
}

/// Parse all tracked spans, ignoring code blocks and inline code
///
/// Malformed spans are left as literal text.
pub fn parse(content: &str) -> Vec<MarkupMatch> {
    parse_with_diagnostics(content).matches
}

/// Parse all tracked spans and report malformed ones
pub fn parse_with_diagnostics(content: &str) -> ParsedMarkup {
    let mut code = code_ranges(content, 0);
    let mut parsed = ParsedMarkup::default();
    let mut pos = 0;

    while let Some(rel) = content[pos..].find('{') {
        let start = pos + rel;
        if let Some(range) = code.iter().find(|r| r.contains(&start)) {
            pos = range.end;
            continue;
        }
        let Some(kind) = MarkupKind::from_opener(&content[start..]) else {
            pos = start + 1;
            continue;
        };

        match parse_span(content, start, kind) {
            Ok(found) => {
                pos = found.end;
                parsed.matches.push(found);
                // Fences and backticks inside a span body do not carry past it
                code = code_ranges(content, pos);
            }
            Err(err) => {
                tracing::warn!(error = %err, "treating malformed tracked markup as literal text");
                parsed.malformed.push(err);
                pos = start + 1;
            }
        }
    }
    parsed
}

fn parse_span(content: &str, start: usize, kind: MarkupKind) -> Result<MarkupMatch, RedlineError> {
    let body_start = start + kind.opener().len();
    let close = content[body_start..]
        .find(kind.closer())
        .map(|rel| body_start + rel)
        .ok_or_else(|| RedlineError::MalformedTrackedMarkup {
            offset: start,
            reason: format!("unclosed {}", kind.opener()),
        })?;
    let body = &content[body_start..close];
    let mut end = close + kind.closer().len();

    let mut found = MarkupMatch {
        kind,
        start,
        end,
        content: body.to_string(),
        replacement: None,
        comment: None,
    };

    match kind {
        MarkupKind::Substitution => {
            let (old, new) =
                body.split_once("~>")
                    .ok_or_else(|| RedlineError::MalformedTrackedMarkup {
                        offset: start,
                        reason: "substitution without ~> separator".to_string(),
                    })?;
            found.content = old.to_string();
            found.replacement = Some(new.to_string());
        }
        MarkupKind::Highlight => {
            let rest = &content[end..];
            if rest.starts_with(MarkupKind::Comment.opener()) {
                let comment_start = end + MarkupKind::Comment.opener().len();
                if let Some(rel) = content[comment_start..].find(MarkupKind::Comment.closer()) {
                    found.comment = Some(content[comment_start..comment_start + rel].to_string());
                    end = comment_start + rel + MarkupKind::Comment.closer().len();
                }
            }
        }
        _ => {}
    }

    found.end = end;
    Ok(found)
}

/// Byte ranges at or after `from` covered by fenced code blocks and inline
/// code spans
fn code_ranges(content: &str, from: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = from;
    let mut fence: Option<(usize, char, usize)> = None;
    let mut at_line_start = from == 0 || content[..from].ends_with('\n');

    for line in content[from..].split_inclusive('\n') {
        if !at_line_start {
            at_line_start = true;
            offset += line.len();
            continue;
        }
        let trimmed = line.trim_start_matches(' ');
        let indent = line.len() - trimmed.len();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~');
        let run = marker.map_or(0, |c| trimmed.chars().take_while(|x| *x == c).count());

        match fence {
            None if indent <= 3 && run >= 3 => {
                if let Some(c) = marker {
                    fence = Some((offset, c, run));
                }
            }
            Some((open_at, c, len)) if marker == Some(c) && run >= len && indent <= 3 => {
                ranges.push(open_at..offset + line.len());
                fence = None;
            }
            _ => {}
        }
        offset += line.len();
    }
    if let Some((open_at, _, _)) = fence {
        ranges.push(open_at..content.len());
    }

    let mut inline = Vec::new();
    let bytes = content.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if let Some(range) = ranges.iter().find(|r| r.contains(&i)) {
            i = range.end;
            continue;
        }
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
        let mut j = i + run;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let other = bytes[j..].iter().take_while(|b| **b == b'`').count();
                if other == run {
                    closed = Some(j + other);
                    break;
                }
                j += other;
            } else {
                j += 1;
            }
        }
        match closed {
            Some(end) => {
                inline.push(i..end);
                i = end;
            }
            None => i += run,
        }
    }
    ranges.extend(inline);
    ranges
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Accept,
    Reject,
}

fn resolved_text(found: &MarkupMatch, resolution: Resolution) -> &str {
    match (found.kind, resolution) {
        (MarkupKind::Addition, Resolution::Accept) => &found.content,
        (MarkupKind::Addition, Resolution::Reject) => "",
        (MarkupKind::Deletion, Resolution::Accept) => "",
        (MarkupKind::Deletion, Resolution::Reject) => &found.content,
        (MarkupKind::Substitution, Resolution::Accept) => {
            found.replacement.as_deref().unwrap_or_default()
        }
        (MarkupKind::Substitution, Resolution::Reject) => &found.content,
        (MarkupKind::Highlight, _) => &found.content,
        (MarkupKind::Comment, _) => "",
    }
}

fn resolve(content: &str, found: &MarkupMatch, resolution: Resolution) -> String {
    let span = content.get(found.start..found.end);
    if !span.is_some_and(|s| s.starts_with(found.kind.opener())) {
        tracing::warn!(
            start = found.start,
            end = found.end,
            "tracked span does not match content; leaving it unresolved"
        );
        return content.to_string();
    }
    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..found.start]);
    out.push_str(resolved_text(found, resolution));
    out.push_str(&content[found.end..]);
    out
}

/// Resolve one span in favour of the change: insertions kept, deletions
/// removed, substitutions replaced by their new side. Highlights keep their
/// text; comments are dropped. Nothing outside the span is touched.
///
/// A match whose range no longer points at a span of its kind leaves the
/// content unchanged.
pub fn accept(content: &str, found: &MarkupMatch) -> String {
    resolve(content, found, Resolution::Accept)
}

/// Resolve one span against the change, restoring the original text
pub fn reject(content: &str, found: &MarkupMatch) -> String {
    resolve(content, found, Resolution::Reject)
}

/// Accept every span
pub fn accept_all(content: &str) -> String {
    parse(content)
        .iter()
        .rev()
        .fold(content.to_string(), |acc, found| accept(&acc, found))
}

/// Reject every span
pub fn reject_all(content: &str) -> String {
    parse(content)
        .iter()
        .rev()
        .fold(content.to_string(), |acc, found| reject(&acc, found))
}

/// True if the content holds at least one well-formed span
pub fn has_tracked_markup(content: &str) -> bool {
    !parse(content).is_empty()
}

/// Split `text` so that no piece contains `closer`. Each cut falls just
/// before the closing brace.
fn closer_free_pieces<'a>(text: &'a str, closer: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find(closer) {
        let cut = at + closer.len() - 1;
        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    pieces.push(rest);
    pieces
}

fn wrap(text: &str, kind: MarkupKind) -> String {
    closer_free_pieces(text, kind.closer())
        .into_iter()
        .map(|piece| format!("{}{}{}", kind.opener(), piece, kind.closer()))
        .collect()
}

/// Build an addition. Text containing `++}` becomes several adjacent
/// additions so every span still parses.
pub fn create_addition(text: &str) -> String {
    wrap(text, MarkupKind::Addition)
}

/// Build a deletion, split like [`create_addition`] around `--}`
pub fn create_deletion(text: &str) -> String {
    wrap(text, MarkupKind::Deletion)
}

/// Build a substitution
///
/// When either side contains `~>` or `~~}` the span could not be parsed
/// back, so a deletion followed by an addition is built instead.
pub fn create_substitution(old: &str, new: &str) -> String {
    let closer = MarkupKind::Substitution.closer();
    if [old, new].iter().any(|side| side.contains("~>") || side.contains(closer)) {
        return format!("{}{}", create_deletion(old), create_addition(new));
    }
    format!("{{~~{}~>{}~~}}", old, new)
}

/// Build a comment span, collapsing internal whitespace
pub fn create_comment(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{{>>{}<<}}", collapsed)
}

/// Build a highlight, with an attached comment when one is given
pub fn create_highlight(text: &str, comment: Option<&str>) -> String {
    let mut out = format!("{{=={}==}}", text);
    if let Some(comment) = comment {
        out.push_str(&create_comment(comment));
    }
    out
}
