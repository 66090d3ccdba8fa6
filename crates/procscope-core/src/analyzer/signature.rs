//! Procedure signature extraction: name and declared parameters.

use crate::types::{ParamDirection, Parameter};
use regex::Regex;
use std::sync::OnceLock;

use super::helpers::split_top_level;

/// Sentinel name returned when no procedure header matches.
pub(crate) const UNKNOWN_PROCEDURE: &str = "unknown_procedure";

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bCREATE\s+(?:OR\s+REPLACE\s+)?PROCEDURE\s+(\w+)")
            .expect("Invalid regex pattern")
    })
}

fn parameter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // name [IN|OUT|IN OUT] type[(args)] [DEFAULT|:= value]
        Regex::new(
            r"(?i)^(\w+)\s+(?:(IN\s+OUT|IN|OUT)\s+)?([\w.%]+(?:\s*\([^)]*\))?)(?:\s+(?:DEFAULT|:=)\s+(.+))?$",
        )
        .expect("Invalid regex pattern")
    })
}

/// Locates the `CREATE [OR REPLACE] PROCEDURE <name> (<params>)` header in
/// flattened text and parses the parameter list.
///
/// Returns `None` when no header matches; the caller substitutes the
/// [`UNKNOWN_PROCEDURE`] sentinel. A header without a parameter list yields
/// an empty parameter vector. This best-effort contract never fails.
pub(crate) fn extract(flat: &str) -> Option<(String, Vec<Parameter>)> {
    let captures = header_re().captures(flat)?;
    let name = captures[1].to_string();

    let rest = &flat[captures.get(0).expect("whole match").end()..];
    let parameters = parameter_list(rest)
        .map(|list| parse_parameters(&list))
        .unwrap_or_default();

    Some((name, parameters))
}

/// Extracts the parenthesized parameter list immediately following the
/// procedure name, balancing nested parens so `(size)` type qualifiers do not
/// end the list early.
fn parameter_list(rest: &str) -> Option<String> {
    let trimmed = rest.trim_start();
    if !trimmed.starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, c) in trimmed.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(trimmed[1..offset].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits the list on commas at paren depth 0 and parses each segment as
/// `<name> [IN|OUT|IN OUT] <type>`, defaulting the direction to IN.
/// Unparseable segments are skipped.
fn parse_parameters(list: &str) -> Vec<Parameter> {
    split_top_level(list, ',')
        .iter()
        .filter_map(|segment| parse_parameter(segment))
        .collect()
}

fn parse_parameter(segment: &str) -> Option<Parameter> {
    let captures = parameter_re().captures(segment.trim())?;

    let direction = match captures.get(2) {
        Some(m) => {
            let upper = m.as_str().to_ascii_uppercase();
            if upper.starts_with("IN") && upper.ends_with("OUT") {
                ParamDirection::InOut
            } else if upper == "OUT" {
                ParamDirection::Out
            } else {
                ParamDirection::In
            }
        }
        None => ParamDirection::In,
    };

    Some(Parameter {
        name: captures[1].to_string(),
        direction,
        data_type: captures[3].trim().to_string(),
        default_value: captures.get(4).map(|m| m.as_str().trim().to_string()),
        used_in_statements: Vec::new(),
    })
}
