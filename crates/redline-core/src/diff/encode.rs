//! Tracked-markup encoding of consolidated diffs.
//!
//! Word diffs wrap each changed run directly. In line diffs a deleted line
//! paired with an inserted line keeps the shared line break (and a shared
//! list or quote marker) outside the markup and is refined word by word, so
//! list structure survives in the tracked output. Unpaired lines are wrapped
//! whole, break included.
//!
//! Span markup is not recognised inside code, and literal delimiters in the
//! text can capture a span's closer. Encoded output is therefore checked
//! against both sides, and text that would not resolve back is tracked as
//! one whole deletion plus one whole addition.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tokenize::{lines, split_newline};
use super::{diff_with_threshold, DiffOptions, DiffRun, Granularity, RunKind, TextDiff};
use crate::markup::{accept_all, create_addition, create_deletion, create_substitution, reject_all};

/// How a deletion immediately followed by an insertion is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionPolicy {
    /// `{--old--}{++new++}`
    #[default]
    Adjacent,
    /// `{~~old~>new~~}`
    Substitution,
}

static LINE_PREFIX: OnceLock<Regex> = OnceLock::new();

fn line_prefix(line: &str) -> (&str, &str) {
    let re = LINE_PREFIX.get_or_init(|| {
        Regex::new(r"^(?:\s*(?:[-*+]|\d+[.)])\s+|\s*>\s?)").expect("Invalid line prefix regex")
    });
    match re.find(line) {
        Some(m) => line.split_at(m.end()),
        None => ("", line),
    }
}

/// Render `diff` as tracked markup
///
/// Accepting every span of the result gives the modified side and rejecting
/// every span gives the original side.
pub fn encode(diff: &TextDiff, options: &DiffOptions) -> String {
    if diff.is_identical() {
        return diff.modified();
    }
    let tracked = encode_runs(diff, options);
    let (old, new) = (diff.original(), diff.modified());
    if accept_all(&tracked) == new && reject_all(&tracked) == old {
        return tracked;
    }
    tracing::debug!("span markup does not resolve to both sides; tracking whole text");
    whole_replacement(&old, &new)
}

fn whole_replacement(old: &str, new: &str) -> String {
    let mut out = String::new();
    if !old.is_empty() {
        out.push_str(&create_deletion(old));
    }
    if !new.is_empty() {
        out.push_str(&create_addition(new));
    }
    out
}

fn encode_runs(diff: &TextDiff, options: &DiffOptions) -> String {
    let mut out = String::new();
    let mut runs = diff.runs.iter().peekable();

    while let Some(run) = runs.next() {
        match run.kind {
            RunKind::Unchanged => out.push_str(&run.text),
            RunKind::Deleted => {
                let inserted = match runs.peek() {
                    Some(DiffRun {
                        kind: RunKind::Inserted,
                        text,
                    }) => Some(text.as_str()),
                    _ => None,
                };
                match inserted {
                    Some(new) => {
                        runs.next();
                        replacement(&mut out, diff.granularity, &run.text, new, options);
                    }
                    None => removal(&mut out, diff.granularity, &run.text, RunKind::Deleted),
                }
            }
            RunKind::Inserted => removal(&mut out, diff.granularity, &run.text, RunKind::Inserted),
        }
    }
    out
}

fn wrap(text: &str, kind: RunKind) -> String {
    match kind {
        RunKind::Deleted => create_deletion(text),
        RunKind::Inserted => create_addition(text),
        RunKind::Unchanged => text.to_string(),
    }
}

/// A lone deletion or insertion run. In line mode each line is wrapped
/// together with its break so resolving the span removes the whole line.
fn removal(out: &mut String, granularity: Granularity, text: &str, kind: RunKind) {
    match granularity {
        Granularity::Word => out.push_str(&wrap(text, kind)),
        Granularity::Line => {
            for line in lines(text) {
                out.push_str(&wrap(line, kind));
            }
        }
    }
}

fn replacement(
    out: &mut String,
    granularity: Granularity,
    old: &str,
    new: &str,
    options: &DiffOptions,
) {
    match (granularity, options.substitution) {
        (Granularity::Word, SubstitutionPolicy::Adjacent) => {
            out.push_str(&create_deletion(old));
            out.push_str(&create_addition(new));
        }
        (Granularity::Word, SubstitutionPolicy::Substitution) => {
            out.push_str(&create_substitution(old, new));
        }
        (Granularity::Line, SubstitutionPolicy::Substitution) => {
            let (old_body, old_nl) = split_newline(old);
            let (new_body, new_nl) = split_newline(new);
            if !old_nl.is_empty() && old_nl == new_nl {
                out.push_str(&create_substitution(old_body, new_body));
                out.push_str(old_nl);
            } else {
                out.push_str(&create_substitution(old, new));
            }
        }
        (Granularity::Line, SubstitutionPolicy::Adjacent) => {
            let old_lines = lines(old);
            let new_lines = lines(new);
            let paired = old_lines.len().min(new_lines.len());
            for (old_line, new_line) in old_lines.iter().zip(&new_lines) {
                out.push_str(&line_pair(old_line, new_line, options));
            }
            for line in &old_lines[paired..] {
                out.push_str(&create_deletion(line));
            }
            for line in &new_lines[paired..] {
                out.push_str(&create_addition(line));
            }
        }
    }
}

/// Encode one replaced line against its counterpart
fn line_pair(old_line: &str, new_line: &str, options: &DiffOptions) -> String {
    let (old_body, old_nl) = split_newline(old_line);
    let (new_body, new_nl) = split_newline(new_line);

    if old_nl != new_nl || old_body.is_empty() || new_body.is_empty() {
        return format!(
            "{}{}",
            create_deletion(old_line),
            create_addition(new_line)
        );
    }

    let (old_prefix, old_rest) = line_prefix(old_body);
    let (new_prefix, new_rest) = line_prefix(new_body);
    let (prefix, old_text, new_text) = if old_prefix == new_prefix {
        (old_prefix, old_rest, new_rest)
    } else {
        ("", old_body, new_body)
    };

    let words = diff_with_threshold(old_text, new_text, options.replacement_threshold);
    let word_options = DiffOptions {
        substitution: SubstitutionPolicy::Adjacent,
        ..options.clone()
    };
    format!("{}{}{}", prefix, encode_runs(&words, &word_options), old_nl)
}
