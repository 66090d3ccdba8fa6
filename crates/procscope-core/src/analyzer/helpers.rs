//! Token-level helpers shared by the extraction stages.

/// SQL keywords that can never be table names.
const SQL_KEYWORDS: &[&str] = &[
    "select", "from", "where", "join", "on", "and", "or", "not", "group", "order", "having",
    "union", "insert", "update", "delete", "create", "table", "index", "view", "into", "values",
    "set", "inner", "left", "right", "full", "cross", "outer", "by", "as", "in", "like",
    "between", "exists", "null", "is", "distinct", "dual",
];

/// Suffixes that usually mark a field rather than a table.
const FIELD_SUFFIXES: &[&str] = &[
    "_id", "_name", "_date", "_count", "_code", "_status", "_type", "_amount",
];

/// Bare names that are almost always fields.
const COMMON_FIELD_NAMES: &[&str] = &[
    "id", "name", "code", "status", "type", "value", "amount",
];

/// Approximate field-vs-table disambiguation.
///
/// Heuristic by design: suffix conventions and a short list of generic column
/// names. Swap this predicate out if your schemas follow different naming
/// rules; everything else treats it as an opaque oracle.
pub(crate) fn is_likely_field_name(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    FIELD_SUFFIXES.iter().any(|s| lower.ends_with(s))
        || COMMON_FIELD_NAMES.iter().any(|n| lower == *n)
}

pub(crate) fn is_sql_keyword(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    SQL_KEYWORDS.iter().any(|k| lower == *k)
}

/// Valid Oracle-style identifier, allowing the `#` temp-table prefix.
pub(crate) fn is_valid_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '#' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '#')
}

/// Whether a token from a FROM/JOIN clause plausibly names a table.
///
/// Accepts `table`, `schema.table`, and `#`-prefixed temp spellings; rejects
/// keywords, field-looking tokens, and `alias.field` captures (short prefix
/// followed by a field-looking part).
pub(crate) fn is_valid_table_token(token: &str) -> bool {
    if token.is_empty() || is_sql_keyword(token) {
        return false;
    }
    match token.split_once('.') {
        Some((schema, table_part)) => {
            if token.matches('.').count() > 1 {
                return false;
            }
            // A one-to-three character prefix is usually an alias, which
            // makes `x.some_id` a field reference, not a table.
            if schema.len() <= 3 && is_likely_field_name(table_part) {
                return false;
            }
            is_valid_identifier(schema) && is_valid_identifier(table_part)
        }
        None => is_valid_identifier(token) && !is_likely_field_name(token),
    }
}

/// `schema.table` -> `table`; plain names pass through.
pub(crate) fn strip_schema(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, table)| table)
}

/// First identifier-like token of a line, uppercased.
pub(crate) fn leading_keyword(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    Some(trimmed[..end].to_ascii_uppercase())
}

/// Splits on a separator at paren depth 0, outside quoted literals.
///
/// Single-pass scanner tracking both quote state and paren depth, so commas
/// inside function calls and string literals do not split.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ if c == separator && depth == 0 => {
                    parts.push(current.trim().to_string());
                    current.clear();
                    continue;
                }
                _ => {}
            },
        }
        current.push(c);
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Parenthesis balance of a line, ignoring parens inside string literals.
/// `quote` carries open-literal state across lines.
pub(crate) fn paren_delta(line: &str, quote: &mut Option<char>) -> i32 {
    let mut delta = 0;
    for c in line.chars() {
        match quote {
            Some(q) => {
                if c == *q {
                    *quote = None;
                }
            }
            None => match c {
                '\'' | '"' => *quote = Some(c),
                '(' => delta += 1,
                ')' => delta -= 1,
                _ => {}
            },
        }
    }
    delta
}
