//! Markdown whitespace normalisation applied before diffing when enabled.
//!
//! Removes formatting-only differences: trailing whitespace, list indentation
//! width, spacing after list and quote markers, and blank lines between list
//! items.

use std::sync::OnceLock;

use regex::Regex;

static LIST_ITEM: OnceLock<Regex> = OnceLock::new();
static QUOTE_LINE: OnceLock<Regex> = OnceLock::new();

fn list_item() -> &'static Regex {
    LIST_ITEM.get_or_init(|| {
        Regex::new(r"^(\s*)([-*+]|\d+[.)])\s+(.*)$").expect("Invalid list item regex")
    })
}

fn quote_line() -> &'static Regex {
    QUOTE_LINE.get_or_init(|| Regex::new(r"^\s*>\s*(.*)$").expect("Invalid quote regex"))
}

/// Normalise markdown whitespace so formatting-only edits do not show as changes
pub fn normalize_markdown_whitespace(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let quoted = lines.iter().filter(|l| quote_line().is_match(l)).count();
    if quoted > 0 && quoted * 2 >= lines.len() {
        normalize_quote(&lines)
    } else if is_list(&lines) {
        normalize_list(&lines)
    } else {
        lines
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn normalize_quote(lines: &[&str]) -> String {
    let bodies: Vec<String> = lines
        .iter()
        .map(|line| match quote_line().captures(line) {
            Some(caps) => {
                let body = caps.get(1).map_or("", |m| m.as_str()).trim_end();
                if body.is_empty() {
                    String::new()
                } else {
                    format!("> {}", body)
                }
            }
            None => line.trim_end().to_string(),
        })
        .collect();

    // Keep blank lines only when they separate two content lines.
    let mut out = Vec::with_capacity(bodies.len());
    for (idx, line) in bodies.iter().enumerate() {
        if line.is_empty() {
            let prev = idx.checked_sub(1).and_then(|i| bodies.get(i));
            let next = bodies.get(idx + 1);
            let between = matches!((prev, next), (Some(p), Some(n)) if !p.is_empty() && !n.is_empty());
            if !between {
                continue;
            }
        }
        out.push(line.as_str());
    }
    out.join("\n")
}

fn is_list(lines: &[&str]) -> bool {
    let non_empty: Vec<&&str> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
    if non_empty.is_empty() {
        return false;
    }
    let items = non_empty.iter().filter(|l| list_item().is_match(l)).count();
    items * 2 >= non_empty.len()
}

/// Indent width used by nested items: 4 when the shallowest nesting uses 3+ spaces
fn indent_unit(lines: &[&str]) -> usize {
    let min_indent = lines
        .iter()
        .filter_map(|l| list_item().captures(l))
        .filter_map(|c| c.get(1).map(|m| m.as_str().len()))
        .filter(|len| *len > 0)
        .min();
    match min_indent {
        Some(n) if n >= 3 => 4,
        _ => 2,
    }
}

fn normalize_list(lines: &[&str]) -> String {
    let unit = indent_unit(lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = list_item().captures(line) {
            let indent = caps.get(1).map_or(0, |m| m.as_str().len());
            let marker = caps.get(2).map_or("", |m| m.as_str());
            let body = caps.get(3).map_or("", |m| m.as_str()).trim_end();
            let level = (indent as f64 / unit as f64).round() as usize;
            out.push(format!("{}{} {}", "  ".repeat(level), marker, body));
        } else if line.trim().is_empty() {
            let prev_item = idx
                .checked_sub(1)
                .and_then(|i| lines.get(i))
                .is_some_and(|l| list_item().is_match(l));
            let next_item = lines.get(idx + 1).is_some_and(|l| list_item().is_match(l));
            if !(prev_item && next_item) {
                out.push(String::new());
            }
        } else {
            out.push(line.trim_end().to_string());
        }
    }
    out.join("\n")
}
