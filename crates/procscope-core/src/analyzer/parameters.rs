//! Parameter usage analysis: cross-references declared parameters against
//! per-statement parameter tokens.

use crate::types::{Parameter, SqlStatement};

/// Fills each parameter's `used_in_statements` with the ids of statements
/// whose parameter-reference set contains its name.
///
/// Complexity is parameters x statements; both are tens, not millions, so no
/// indexing is warranted.
pub(crate) fn analyze_usage(parameters: &mut [Parameter], statements: &[SqlStatement]) {
    for parameter in parameters.iter_mut() {
        parameter.used_in_statements = statements
            .iter()
            .filter(|statement| {
                statement
                    .parameters
                    .iter()
                    .any(|token| token_matches(token, &parameter.name))
            })
            .map(|statement| statement.id)
            .collect();
    }
}

/// Compares a referenced token against a declared name; bind-style tokens
/// drop their `:` prefix, and SQL identifiers compare case-insensitively.
pub(crate) fn token_matches(token: &str, name: &str) -> bool {
    token
        .strip_prefix(':')
        .unwrap_or(token)
        .eq_ignore_ascii_case(name)
}
