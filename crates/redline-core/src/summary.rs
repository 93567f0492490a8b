//! Human-readable summaries of an operation history.

use std::collections::BTreeMap;

use crate::model::{Operation, OperationData, OperationKind};

/// One-line aggregate of `ops`, grouped by kind
///
/// Parts are ordered edit, insert, delete, move and joined with `"; "`,
/// e.g. `"Edited 2 element(s); Added 1 element(s)"`. An empty slice gives
/// `"No changes"`.
pub fn summarize_operations(ops: &[Operation]) -> String {
    let mut counts: BTreeMap<OperationKind, usize> = BTreeMap::new();
    for op in ops {
        *counts.entry(op.kind()).or_default() += 1;
    }

    let parts: Vec<String> = counts
        .iter()
        .map(|(kind, n)| format!("{} {} element(s)", verb(*kind), n))
        .collect();

    if parts.is_empty() {
        "No changes".to_string()
    } else {
        parts.join("; ")
    }
}

fn verb(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Edit => "Edited",
        OperationKind::Insert => "Added",
        OperationKind::Delete => "Deleted",
        OperationKind::Move => "Moved",
    }
}

/// Render a Markdown report listing every operation in order
///
/// Intended for commit messages and review descriptions.
pub fn render_change_report(ops: &[Operation]) -> String {
    let mut out = String::new();

    out.push_str("## Changes\n\n");
    out.push_str(&format!("**Summary**: {}\n", summarize_operations(ops)));

    if ops.is_empty() {
        return out;
    }

    out.push('\n');
    for (n, op) in ops.iter().enumerate() {
        out.push_str(&format!("{}. {}", n + 1, describe(op)));
        if let Some(user) = &op.user_id {
            out.push_str(&format!(" by {}", user));
        }
        if let Some(source) = &op.source {
            out.push_str(&format!(" [{}]", source));
        }
        out.push('\n');
    }

    out
}

fn describe(op: &Operation) -> String {
    let id = op.element_id.as_str();
    match &op.data {
        OperationData::Edit {
            old_content,
            new_content,
            new_metadata,
            ..
        } => {
            let mut line = format!("Edited `{}`", id);
            if old_content != new_content {
                line.push_str(&format!(
                    " ({} to {} chars)",
                    old_content.chars().count(),
                    new_content.chars().count()
                ));
            }
            if let Some(metadata) = new_metadata {
                line.push_str(&format!(", now {}", metadata.kind.label()));
            }
            line
        }
        OperationData::Insert { metadata, .. } => {
            format!("Added `{}` ({})", id, metadata.kind.label())
        }
        OperationData::Delete { index, .. } => {
            format!("Deleted `{}` from position {}", id, index)
        }
        OperationData::Move {
            from_index,
            to_index,
        } => format!("Moved `{}` from position {} to {}", id, from_index, to_index),
    }
}
