//! Resolve every tracked span to produce plain markdown.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::codec::{parse, MarkupKind, MarkupMatch};

/// Tokens that must never survive a strip
pub const DELIMITERS: [&str; 10] = [
    "{++", "++}", "{--", "--}", "{~~", "~~}", "{==", "==}", "{>>", "<<}",
];

/// Which side of each change to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripMode {
    #[default]
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Keep comments as `<!-- review-comment ... -->` instead of dropping them
    pub preserve_comments_as_html: bool,
}

static EMPTY_LIST_ITEM: OnceLock<Regex> = OnceLock::new();
static EXTRA_BLANK_LINES: OnceLock<Regex> = OnceLock::new();

fn format_comment(raw: &str, options: StripOptions) -> String {
    let trimmed = raw.trim();
    if !options.preserve_comments_as_html || trimmed.is_empty() {
        return String::new();
    }
    format!("<!-- review-comment {} -->", trimmed.replace("--", "- -"))
}

fn resolve(found: &MarkupMatch, mode: StripMode, options: StripOptions) -> String {
    match (found.kind, mode) {
        (MarkupKind::Addition, StripMode::Accept) | (MarkupKind::Deletion, StripMode::Reject) => {
            found.content.clone()
        }
        (MarkupKind::Addition, StripMode::Reject) | (MarkupKind::Deletion, StripMode::Accept) => {
            String::new()
        }
        (MarkupKind::Substitution, StripMode::Accept) => {
            found.replacement.clone().unwrap_or_default()
        }
        (MarkupKind::Substitution, StripMode::Reject) => found.content.clone(),
        (MarkupKind::Highlight, _) => {
            let comment = found
                .comment
                .as_deref()
                .map(|c| format_comment(c, options))
                .unwrap_or_default();
            format!("{}{}", found.content, comment)
        }
        (MarkupKind::Comment, _) => format_comment(&found.content, options),
    }
}

/// Resolve all tracked markup in `content`
///
/// In accept mode, list items emptied by a deletion are removed and runs of
/// blank lines are collapsed. Any delimiter token left over from malformed
/// spans is removed, so the result never contains tracked-markup syntax.
pub fn strip_tracked_markup(content: &str, mode: StripMode, options: StripOptions) -> String {
    let matches = parse(content);
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for found in &matches {
        out.push_str(&content[last..found.start]);
        out.push_str(&resolve(found, mode, options));
        last = found.end;
    }
    out.push_str(&content[last..]);

    let removed_text = matches.iter().any(|m| {
        matches!(
            (m.kind, mode),
            (MarkupKind::Deletion | MarkupKind::Substitution, StripMode::Accept)
        )
    });
    if removed_text {
        let empty_item = EMPTY_LIST_ITEM.get_or_init(|| {
            Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+[.)])[ \t]*(?:\n|\z)").expect("Invalid empty list item regex")
        });
        let blank_run = EXTRA_BLANK_LINES
            .get_or_init(|| Regex::new(r"\n{3,}").expect("Invalid blank line regex"));
        out = empty_item.replace_all(&out, "").into_owned();
        out = blank_run.replace_all(&out, "\n\n").into_owned();
    }

    remove_orphan_delimiters(out)
}

/// Remove delimiter tokens until none remain
pub fn remove_orphan_delimiters(mut text: String) -> String {
    loop {
        let mut changed = false;
        for token in DELIMITERS {
            if text.contains(token) {
                text = text.replace(token, "");
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

/// True if any delimiter token occurs in `text`
pub fn contains_delimiter(text: &str) -> bool {
    DELIMITERS.iter().any(|d| text.contains(d))
}
