//! Text diffing and tracked-markup encoding.
//!
//! ## Granularity
//!
//! When either side is a single line the diff runs over word tokens
//! (whitespace is kept as its own token); when both sides span several lines
//! it runs over whole lines.
//!
//! ## Runs
//!
//! The LCS edit script is consolidated into runs. Every maximal region of
//! changed tokens becomes at most one [`RunKind::Deleted`] run followed by at
//! most one [`RunKind::Inserted`] run. In word mode a whitespace-only
//! unchanged gap between two changed regions is folded into them, and when
//! the word overlap of the two sides falls below the configured replacement
//! threshold the whole text is reported as a single replacement.
//!
//! ## Guarantees
//!
//! - Concatenating unchanged and deleted runs yields the original text;
//!   concatenating unchanged and inserted runs yields the modified text.
//! - Identical inputs produce no changed runs.
//! - An empty side produces a single run for the other side.

pub mod encode;
mod lcs;
pub mod normalize;
mod tokenize;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use lcs::Step;

pub use encode::SubstitutionPolicy;

/// Kind of a consolidated diff run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Unchanged,
    Deleted,
    Inserted,
}

/// A maximal stretch of text sharing one [`RunKind`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRun {
    pub kind: RunKind,
    pub text: String,
}

impl DiffRun {
    fn new(kind: RunKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Token unit the diff was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Word,
    Line,
}

/// Result of diffing two strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDiff {
    pub granularity: Granularity,
    pub runs: Vec<DiffRun>,
}

impl TextDiff {
    /// True when no run is a deletion or insertion
    pub fn is_identical(&self) -> bool {
        self.runs.iter().all(|r| r.kind == RunKind::Unchanged)
    }

    /// Runs that are deletions or insertions
    pub fn changed_runs(&self) -> impl Iterator<Item = &DiffRun> {
        self.runs.iter().filter(|r| r.kind != RunKind::Unchanged)
    }

    pub fn count(&self, kind: RunKind) -> usize {
        self.runs.iter().filter(|r| r.kind == kind).count()
    }

    /// Reconstruct the original side
    pub fn original(&self) -> String {
        self.side(RunKind::Deleted)
    }

    /// Reconstruct the modified side
    pub fn modified(&self) -> String {
        self.side(RunKind::Inserted)
    }

    fn side(&self, changed: RunKind) -> String {
        self.runs
            .iter()
            .filter(|r| r.kind == RunKind::Unchanged || r.kind == changed)
            .map(|r| r.text.as_str())
            .collect()
    }
}

/// Options controlling diff consolidation and encoding
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOptions {
    pub substitution: SubstitutionPolicy,
    /// Word-mode Dice similarity below which the whole text is one replacement
    pub replacement_threshold: f64,
    pub normalize_whitespace: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            substitution: SubstitutionPolicy::Adjacent,
            replacement_threshold: 0.5,
            normalize_whitespace: false,
        }
    }
}

/// Pick word or line granularity for a pair of strings
pub fn granularity_for(old: &str, new: &str) -> Granularity {
    if old.contains('\n') && new.contains('\n') {
        Granularity::Line
    } else {
        Granularity::Word
    }
}

/// Diff two strings with the default replacement threshold
pub fn diff_text(old: &str, new: &str) -> TextDiff {
    diff_with_threshold(old, new, DiffOptions::default().replacement_threshold)
}

pub(crate) fn diff_with_threshold(old: &str, new: &str, threshold: f64) -> TextDiff {
    match granularity_for(old, new) {
        Granularity::Word => diff_words(old, new, threshold),
        Granularity::Line => diff_lines(old, new),
    }
}

fn diff_words(old: &str, new: &str, threshold: f64) -> TextDiff {
    let old_tokens = tokenize::words(old);
    let new_tokens = tokenize::words(new);
    let steps = lcs::edit_script(&old_tokens, &new_tokens);

    let old_words = old_tokens.iter().filter(|t| !tokenize::is_blank(t)).count();
    let new_words = new_tokens.iter().filter(|t| !tokenize::is_blank(t)).count();
    let common_words = steps
        .iter()
        .filter(|s| matches!(s, Step::Equal(i, _) if !tokenize::is_blank(old_tokens[*i])))
        .count();

    let changed = steps.iter().any(|s| !matches!(s, Step::Equal(_, _)));
    if changed && old_words + new_words > 0 {
        let similarity = (2 * common_words) as f64 / (old_words + new_words) as f64;
        if similarity < threshold {
            tracing::trace!(similarity, threshold, "collapsing word diff into replacement");
            return TextDiff {
                granularity: Granularity::Word,
                runs: replacement_runs(old, new),
            };
        }
    }

    let segments = absorb_blank_gaps(segments(&old_tokens, &new_tokens, &steps));
    TextDiff {
        granularity: Granularity::Word,
        runs: into_runs(segments),
    }
}

fn diff_lines(old: &str, new: &str) -> TextDiff {
    let old_lines = tokenize::lines(old);
    let new_lines = tokenize::lines(new);
    let steps = lcs::edit_script(&old_lines, &new_lines);
    TextDiff {
        granularity: Granularity::Line,
        runs: into_runs(segments(&old_lines, &new_lines, &steps)),
    }
}

fn replacement_runs(old: &str, new: &str) -> Vec<DiffRun> {
    let mut runs = Vec::with_capacity(2);
    if !old.is_empty() {
        runs.push(DiffRun::new(RunKind::Deleted, old));
    }
    if !new.is_empty() {
        runs.push(DiffRun::new(RunKind::Inserted, new));
    }
    runs
}

#[derive(Debug)]
enum Segment {
    Same(String),
    Change { deleted: String, inserted: String },
}

fn segments(old: &[&str], new: &[&str], steps: &[Step]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for step in steps {
        match *step {
            Step::Equal(i, _) => match out.last_mut() {
                Some(Segment::Same(text)) => text.push_str(old[i]),
                _ => out.push(Segment::Same(old[i].to_string())),
            },
            Step::Delete(i) => match out.last_mut() {
                Some(Segment::Change { deleted, .. }) => deleted.push_str(old[i]),
                _ => out.push(Segment::Change {
                    deleted: old[i].to_string(),
                    inserted: String::new(),
                }),
            },
            Step::Insert(j) => match out.last_mut() {
                Some(Segment::Change { inserted, .. }) => inserted.push_str(new[j]),
                _ => out.push(Segment::Change {
                    deleted: String::new(),
                    inserted: new[j].to_string(),
                }),
            },
        }
    }
    out
}

/// Fold whitespace-only unchanged gaps that sit between two changed regions
fn absorb_blank_gaps(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut iter = segments.into_iter().peekable();

    while let Some(segment) = iter.next() {
        match segment {
            Segment::Same(text)
                if tokenize::is_blank(&text)
                    && matches!(out.last(), Some(Segment::Change { .. }))
                    && matches!(iter.peek(), Some(Segment::Change { .. })) =>
            {
                if let Some(Segment::Change { deleted, inserted }) = out.last_mut() {
                    deleted.push_str(&text);
                    inserted.push_str(&text);
                }
            }
            Segment::Change { deleted, inserted } => match out.last_mut() {
                Some(Segment::Change {
                    deleted: d,
                    inserted: i,
                }) => {
                    d.push_str(&deleted);
                    i.push_str(&inserted);
                }
                _ => out.push(Segment::Change { deleted, inserted }),
            },
            same => out.push(same),
        }
    }
    out
}

fn into_runs(segments: Vec<Segment>) -> Vec<DiffRun> {
    let mut runs = Vec::with_capacity(segments.len() * 2);
    for segment in segments {
        match segment {
            Segment::Same(text) => runs.push(DiffRun::new(RunKind::Unchanged, text)),
            Segment::Change { deleted, inserted } => {
                if !deleted.is_empty() {
                    runs.push(DiffRun::new(RunKind::Deleted, deleted));
                }
                if !inserted.is_empty() {
                    runs.push(DiffRun::new(RunKind::Inserted, inserted));
                }
            }
        }
    }
    runs
}

/// Diffs text and renders it as tracked markup under one set of options
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    options: DiffOptions,
}

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.diff_options())
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compute the consolidated diff between `old` and `new`
    pub fn diff(&self, old: &str, new: &str) -> TextDiff {
        let (old, new) = self.prepare(old, new);
        diff_with_threshold(&old, &new, self.options.replacement_threshold)
    }

    /// Render a diff as tracked markup
    pub fn encode(&self, diff: &TextDiff) -> String {
        encode::encode(diff, &self.options)
    }

    /// Diff and encode in one step
    ///
    /// With `normalize_whitespace` set, both sides are normalised first, so
    /// accepting the result gives the normalised `new` and not `new` itself.
    pub fn tracked(&self, old: &str, new: &str) -> String {
        self.encode(&self.diff(old, new))
    }

    fn prepare<'a>(&self, old: &'a str, new: &'a str) -> (Cow<'a, str>, Cow<'a, str>) {
        if self.options.normalize_whitespace {
            (
                Cow::Owned(normalize::normalize_markdown_whitespace(old)),
                Cow::Owned(normalize::normalize_markdown_whitespace(new)),
            )
        } else {
            (Cow::Borrowed(old), Cow::Borrowed(new))
        }
    }
}
