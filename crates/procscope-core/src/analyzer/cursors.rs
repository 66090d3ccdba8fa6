//! Cursor declaration extraction from the declaration section.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::CursorDecl;

fn cursor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bCURSOR\s+(\w+)\s+IS\s+(.*?);").expect("Invalid regex pattern")
    })
}

/// Extracts `CURSOR <name> IS <query>;` declarations from flattened text.
pub(crate) fn extract(flat: &str) -> Vec<CursorDecl> {
    cursor_re()
        .captures_iter(flat)
        .map(|captures| CursorDecl {
            name: captures[1].to_string(),
            definition: captures[2].trim().to_string(),
        })
        .collect()
}
