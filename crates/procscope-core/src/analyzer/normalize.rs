//! Source text normalization: comment stripping and whitespace cleanup.

use regex::Regex;
use std::sync::OnceLock;

fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--[^\n]*").expect("Invalid regex pattern"))
}

fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid regex pattern"))
}

/// Strips `--` line comments and `/* */` block comments, collapses horizontal
/// whitespace runs and trims each line, dropping blank lines.
///
/// Line structure is preserved because the segmenter walks lines. There is no
/// failure mode: empty input normalizes to an empty string.
pub(crate) fn normalize(text: &str) -> String {
    let without_line = line_comment_re().replace_all(text, "");
    let without_block = block_comment_re().replace_all(&without_line, " ");

    let lines: Vec<String> = without_block
        .lines()
        .map(collapse_spaces)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}

/// Collapses every whitespace run (including newlines) to a single space and
/// trims. Used for clause-level regex matching where line structure does not
/// matter.
pub(crate) fn flatten(text: &str) -> String {
    collapse_spaces(text)
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = true; // leading whitespace is dropped
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
