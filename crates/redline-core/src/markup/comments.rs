//! Comment side channel for segment editing.
//!
//! [`extract`] lifts comment markup out of an element's content so the text
//! can be edited without it; [`reattach`] puts the comments back into the
//! edited text. Both are pure.

use serde::{Deserialize, Serialize};

use super::codec::{parse, MarkupKind};

/// Where a comment sat in the comment-free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentAnchor {
    /// Byte offset into the comment-free text
    Offset(usize),
    /// After the last non-whitespace character
    Trailing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedComment {
    /// The `{>>...<<}` span exactly as it appeared
    pub markup: String,
    /// Highlighted text the comment was attached to
    pub highlight: Option<String>,
    pub anchor: CommentAnchor,
}

/// Remove bare comments and commented highlights from `content`
///
/// Highlighted text stays in place. Tracked insertions and deletions are left
/// untouched.
pub fn extract(content: &str) -> (String, Vec<ExtractedComment>) {
    let mut text = String::with_capacity(content.len());
    let mut comments = Vec::new();
    let mut last = 0;

    for found in parse(content) {
        let markup = match (found.kind, &found.comment) {
            (MarkupKind::Comment, _) => content[found.start..found.end].to_string(),
            (MarkupKind::Highlight, Some(comment)) => format!("{{>>{}<<}}", comment),
            _ => continue,
        };
        text.push_str(&content[last..found.start]);
        let offset = text.len();
        let highlight = if found.kind == MarkupKind::Highlight {
            text.push_str(&found.content);
            Some(found.content.clone())
        } else {
            None
        };
        comments.push(ExtractedComment {
            markup,
            highlight,
            anchor: CommentAnchor::Offset(offset),
        });
        last = found.end;
    }
    text.push_str(&content[last..]);

    let body_len = text.trim_end().len();
    let mut trailing = false;
    for comment in comments.iter_mut() {
        if comment.highlight.is_none()
            && matches!(comment.anchor, CommentAnchor::Offset(o) if o >= body_len)
        {
            comment.anchor = CommentAnchor::Trailing;
            trailing = true;
        }
    }
    if trailing {
        text.truncate(body_len);
    }

    (text, comments)
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Put extracted comments back into (possibly edited) text
///
/// A commented highlight is restored around its text when that text is still
/// present, preferring the occurrence at the recorded offset; otherwise the
/// comment is inserted bare. Offsets beyond the edited text clamp to its end.
pub fn reattach(content: &str, comments: &[ExtractedComment]) -> String {
    let mut text = content.to_string();

    let mut anchored: Vec<(usize, &ExtractedComment)> = comments
        .iter()
        .filter_map(|c| match c.anchor {
            CommentAnchor::Offset(o) => Some((o, c)),
            CommentAnchor::Trailing => None,
        })
        .collect();
    // Highest offset first so earlier offsets stay valid; ties keep source order.
    anchored.reverse();
    anchored.sort_by(|a, b| b.0.cmp(&a.0));

    for (offset, comment) in anchored {
        let at = floor_boundary(&text, offset);
        match comment.highlight.as_deref() {
            Some(highlight) if !highlight.is_empty() => {
                let position = if text[at..].starts_with(highlight) {
                    Some(at)
                } else {
                    text.find(highlight)
                };
                match position {
                    Some(p) => {
                        let wrapped = format!("{{=={}==}}{}", highlight, comment.markup);
                        text.replace_range(p..p + highlight.len(), &wrapped);
                    }
                    None => text.insert_str(at, &comment.markup),
                }
            }
            _ => text.insert_str(at, &comment.markup),
        }
    }

    let trailing: Vec<&str> = comments
        .iter()
        .filter(|c| c.anchor == CommentAnchor::Trailing)
        .map(|c| c.markup.as_str())
        .collect();
    if !trailing.is_empty() {
        let body = text.trim_end().to_string();
        text = if body.is_empty() {
            trailing.join(" ")
        } else {
            format!("{} {}", body, trailing.join(" "))
        };
    }
    text
}
