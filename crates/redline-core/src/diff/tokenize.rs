//! Word and line tokenizers. Both are lossless: concatenating the tokens
//! yields the input.

/// Split into maximal runs of whitespace and non-whitespace
pub(crate) fn words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Split into lines, each keeping its trailing `\n`
pub(crate) fn lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

pub(crate) fn is_blank(token: &str) -> bool {
    token.chars().all(char::is_whitespace)
}

/// Split a line into its body and trailing newline (`"\n"`, `"\r\n"` or `""`)
pub(crate) fn split_newline(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}
