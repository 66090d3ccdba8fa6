//! Statement segmentation: splits a `BEGIN ... END` procedure body into an
//! ordered list of raw statement texts.
//!
//! One deterministic line scan with an explicit stack of open block kinds.
//! SQL statements nested inside IF/WHILE/FOR branches are extracted by the
//! same rules at any depth; the control structures themselves are emitted as
//! header segments so the classifier can record them as metadata. Output
//! order is source order and only exists to assign stable statement ids.

use regex::Regex;
use std::sync::OnceLock;

use super::helpers::{leading_keyword, paren_delta};

/// Keywords that open a statement accumulator.
const STATEMENT_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "CREATE"];

/// Keywords that close the current statement without being consumed by it.
const FLUSH_KEYWORDS: &[&str] = &[
    "IF", "ELSIF", "ELSE", "END", "WHILE", "FOR", "BEGIN", "EXCEPTION",
];

/// SQL candidates shorter than this are scan artifacts, not statements.
const MIN_STATEMENT_LEN: usize = 10;

fn begin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bBEGIN\b").expect("Invalid regex pattern"))
}

/// Open-block kinds tracked while walking the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Begin,
    If,
    While,
    For,
    /// A plain `LOOP ... END LOOP` block.
    Loop,
}

/// A statement being accumulated across lines.
struct Accumulator {
    text: String,
    depth: i32,
    quote: Option<char>,
}

impl Accumulator {
    fn new(line: &str) -> Self {
        let mut quote = None;
        let depth = paren_delta(line, &mut quote);
        Self {
            text: line.to_string(),
            depth,
            quote,
        }
    }

    fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
        self.depth += paren_delta(line, &mut self.quote);
    }

    /// A statement is complete once it ends with `;` at paren depth <= 0,
    /// outside any string literal.
    fn is_complete(&self) -> bool {
        self.depth <= 0 && self.quote.is_none() && self.text.trim_end().ends_with(';')
    }
}

/// Splits the outermost `BEGIN ... END` body of `normalized` into raw
/// statement texts. Returns `None` when the text contains no `BEGIN` at all.
pub(crate) fn split_statements(normalized: &str) -> Option<Vec<String>> {
    let begin = begin_re().find(normalized)?;
    let body = &normalized[begin.end()..];

    let mut segments: Vec<String> = Vec::new();
    let mut blocks: Vec<BlockKind> = vec![BlockKind::Begin];
    let mut current: Option<Accumulator> = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let keyword = match leading_keyword(line) {
            Some(kw) => kw,
            None => {
                // Punctuation-only line: continuation of the open statement.
                if let Some(acc) = current.as_mut() {
                    acc.push_line(line);
                    if acc.is_complete() {
                        flush(current.take(), &mut segments);
                    }
                }
                continue;
            }
        };
        let kw = keyword.as_str();

        if let Some(mut acc) = current.take() {
            let boundary = acc.depth <= 0
                && !continues_open_statement(&acc.text, kw)
                && (STATEMENT_KEYWORDS.contains(&kw) || FLUSH_KEYWORDS.contains(&kw));
            if boundary {
                // Flush without consuming this line; it is handled below.
                flush(Some(acc), &mut segments);
            } else {
                acc.push_line(line);
                if acc.is_complete() {
                    flush(Some(acc), &mut segments);
                } else {
                    current = Some(acc);
                }
                continue;
            }
        }

        let upper = line.to_ascii_uppercase();
        match kw {
            "BEGIN" => blocks.push(BlockKind::Begin),
            "END" => {
                // Stray or mismatched ENDs just pop the top; malformed input
                // degrades instead of aborting.
                blocks.pop();
                if blocks.is_empty() {
                    break;
                }
            }
            "IF" => {
                if !upper.contains("END IF") {
                    blocks.push(BlockKind::If);
                }
                segments.push(control_header(line));
            }
            "WHILE" => {
                if upper.contains("LOOP") {
                    blocks.push(BlockKind::While);
                }
                segments.push(control_header(line));
            }
            "FOR" => {
                if upper.contains("LOOP") {
                    blocks.push(BlockKind::For);
                }
                segments.push(control_header(line));
            }
            "LOOP" => blocks.push(BlockKind::Loop),
            _ if STATEMENT_KEYWORDS.contains(&kw) => {
                let acc = Accumulator::new(line);
                if acc.is_complete() {
                    flush(Some(acc), &mut segments);
                } else {
                    current = Some(acc);
                }
            }
            // ELSIF/ELSE/EXCEPTION/assignments/calls: nothing to extract.
            _ => {}
        }
    }

    flush(current, &mut segments);
    Some(segments)
}

/// A SELECT line is a continuation, not a new statement, when the open
/// accumulator is an INSERT still waiting for its source (no SELECT or
/// VALUES yet) or a `CREATE TABLE ... AS` header.
fn continues_open_statement(accumulated: &str, keyword: &str) -> bool {
    if keyword != "SELECT" {
        return false;
    }
    let upper = accumulated.to_ascii_uppercase();
    let open_insert = upper.trim_start().starts_with("INSERT")
        && !upper.contains("SELECT")
        && !upper.contains("VALUES");
    let open_create_as = upper.trim_start().starts_with("CREATE") && upper.trim_end().ends_with(" AS");
    open_insert || open_create_as
}

/// A WHILE/FOR header that did not carry its `LOOP` keyword gets it from the
/// following line; the header segment is the line as written either way.
fn control_header(line: &str) -> String {
    line.trim().trim_end_matches(';').trim_end().to_string()
}

/// Closes an accumulator: trims, strips one trailing `;`, and keeps the
/// candidate only if it clears the length floor.
fn flush(acc: Option<Accumulator>, segments: &mut Vec<String>) {
    let Some(acc) = acc else {
        return;
    };
    let mut text = acc.text.trim().to_string();
    if text.ends_with(';') {
        text.pop();
        text.truncate(text.trim_end().len());
    }
    if text.len() >= MIN_STATEMENT_LEN {
        segments.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(body: &str) -> Vec<String> {
        split_statements(body).expect("body should contain BEGIN")
    }

    #[test]
    fn no_begin_yields_none() {
        assert!(split_statements("SELECT 1 FROM dual").is_none());
    }

    #[test]
    fn splits_sequential_statements() {
        let body = "BEGIN\nUPDATE employees SET salary = salary * 1.1;\nDELETE FROM audit_log WHERE log_date < SYSDATE;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].starts_with("UPDATE employees"));
        assert!(segments[1].starts_with("DELETE FROM audit_log"));
        assert!(!segments[0].ends_with(';'));
    }

    #[test]
    fn multi_line_statement_accumulates_until_semicolon() {
        let body = "BEGIN\nINSERT INTO summary (dept_id, total)\nSELECT department_id, SUM(salary)\nFROM employees\nGROUP BY department_id;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].contains("GROUP BY department_id"));
    }

    #[test]
    fn statement_inside_if_appears_exactly_once() {
        let body = "BEGIN\nIF v_count > 0 THEN\nUPDATE employees SET salary = salary WHERE employee_id = p_id;\nEND IF;\nEND;";
        let segments = split(body);
        let updates: Vec<_> = segments
            .iter()
            .filter(|s| s.starts_with("UPDATE employees"))
            .collect();
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn control_headers_are_emitted_as_segments() {
        let body = "BEGIN\nIF v_count > 0 THEN\nDELETE FROM staging WHERE batch_id = p_batch;\nEND IF;\nWHILE v_i < 10 LOOP\nINSERT INTO ticks (n) VALUES (v_i);\nEND LOOP;\nEND;";
        let segments = split(body);
        assert_eq!(segments[0], "IF v_count > 0 THEN");
        assert!(segments[1].starts_with("DELETE FROM staging"));
        assert_eq!(segments[2], "WHILE v_i < 10 LOOP");
        assert!(segments[3].starts_with("INSERT INTO ticks"));
    }

    #[test]
    fn nested_begin_blocks_do_not_end_the_body() {
        let body = "BEGIN\nBEGIN\nUPDATE t1 SET a = 1 WHERE b = 2;\nEND;\nUPDATE t2 SET c = 3 WHERE d = 4;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 2);
        assert!(segments[1].starts_with("UPDATE t2"));
    }

    #[test]
    fn statement_flushed_by_new_statement_keyword() {
        // Missing semicolon: the next top-level keyword closes the statement.
        let body = "BEGIN\nUPDATE t1 SET a = 1 WHERE b = 2\nDELETE FROM t2 WHERE c = 3;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "UPDATE t1 SET a = 1 WHERE b = 2");
    }

    #[test]
    fn parens_keep_multi_line_statements_open() {
        let body = "BEGIN\nINSERT INTO t (a, b) VALUES (\n1,\n2\n);\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].contains("VALUES"));
    }

    #[test]
    fn semicolon_inside_literal_does_not_close() {
        let body = "BEGIN\nUPDATE t SET note = 'a;b' ||\nother_col WHERE id = 1;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn short_candidates_are_discarded() {
        let body = "BEGIN\nSELECT 1;\nUPDATE employees SET salary = 0 WHERE 1 = 0;\nEND;";
        let segments = split(body);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].starts_with("UPDATE"));
    }

    #[test]
    fn text_after_outer_end_is_ignored() {
        let body = "BEGIN\nUPDATE t SET a = 1 WHERE b = 2;\nEND;\nSELECT leftover FROM noise;";
        let segments = split(body);
        assert_eq!(segments.len(), 1);
    }
}
