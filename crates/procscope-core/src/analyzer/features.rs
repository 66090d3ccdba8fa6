//! Statement classification and per-statement feature extraction.
//!
//! Every sub-extractor is best-effort: a clause that fails to match yields an
//! empty result for that feature only, never aborting extraction of the
//! remaining features of the same statement.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::error::{issue_codes, Issue};
use crate::types::{
    FieldReference, JoinCondition, JoinType, SqlStatement, StatementKind, WhereCondition,
};

use super::helpers::{
    is_sql_keyword, is_valid_identifier, is_valid_table_token, leading_keyword, split_top_level,
};
use super::normalize::flatten;

fn from_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bFROM\s+(.*?)(?:\s+WHERE\b|\s+GROUP\b|\s+ORDER\b|\s+HAVING\b|\s*;|$)")
            .expect("Invalid regex pattern")
    })
}

fn select_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bSELECT\s+(.*?)\s+FROM\b").expect("Invalid regex pattern")
    })
}

fn where_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bWHERE\s+(.*?)(?:\s+GROUP\b|\s+ORDER\b|\s+HAVING\b|\s*;|$)")
            .expect("Invalid regex pattern")
    })
}

fn set_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bSET\s+(.*?)(?:\s+WHERE\b|\s*;|$)").expect("Invalid regex pattern")
    })
}

fn insert_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bINSERT\s+INTO\s+([\w.#]+)").expect("Invalid regex pattern"))
}

fn insert_columns_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)\bINSERT\s+INTO\s+[\w.#]+\s*\((.*?)\)\s*(?:SELECT|VALUES)\b")
            .expect("Invalid regex pattern")
    })
}

fn update_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bUPDATE\s+([\w.#]+)(?:\s+(\w+))?\s+SET\b").expect("Invalid regex pattern")
    })
}

fn delete_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bDELETE\s+FROM\s+([\w.#]+)").expect("Invalid regex pattern")
    })
}

fn create_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bCREATE\s+(?:GLOBAL\s+TEMPORARY\s+)?TABLE\s+([\w.#]+)")
            .expect("Invalid regex pattern")
    })
}

fn merge_target_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bMERGE\s+INTO\s+([\w.#]+)").expect("Invalid regex pattern"))
}

fn merge_using_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bUSING\s+([\w.#]+)").expect("Invalid regex pattern"))
}

fn join_head_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:(LEFT|RIGHT|FULL|CROSS|INNER)\s+)?(?:OUTER\s+)?JOIN\s+([\w.#]+)(?:\s+(\w+))?\s+ON\b")
            .expect("Invalid regex pattern")
    })
}

fn join_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bJOIN\s+([\w.#]+)(?:\s+(\w+))?").expect("Invalid regex pattern")
    })
}

fn join_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bJOIN\b").expect("Invalid regex pattern"))
}

fn condition_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+(?:WHERE|GROUP|ORDER|HAVING)\b|;").expect("Invalid regex pattern")
    })
}

fn qualified_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_#][\w#]*(?:\.[A-Za-z_#][\w#]*)?)\.([A-Za-z_#][\w#]*)")
            .expect("Invalid regex pattern")
    })
}

fn join_equality_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-Za-z_#][\w#]*(?:\.[A-Za-z_#][\w#]*)?)\.([A-Za-z_#][\w#]*)\s*=\s*([A-Za-z_#][\w#]*(?:\.[A-Za-z_#][\w#]*)?)\.([A-Za-z_#][\w#]*)",
        )
        .expect("Invalid regex pattern")
    })
}

fn param_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bp_\w+").expect("Invalid regex pattern"))
}

fn param_bind_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\w+").expect("Invalid regex pattern"))
}

fn comparison_lhs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([A-Za-z_]\w*)\s*(?:>=|<=|<>|!=|=|<|>|\bLIKE\b|\bIN\b|\bBETWEEN\b)")
            .expect("Invalid regex pattern")
    })
}

/// Maps the leading keyword to a statement kind; a CREATE clause containing
/// `GLOBAL TEMPORARY` classifies as a temp-table creation.
pub(crate) fn classify(text: &str) -> StatementKind {
    let Some(keyword) = leading_keyword(text) else {
        return StatementKind::Other;
    };
    let upper = flatten(text).to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" => StatementKind::Select,
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "MERGE" => StatementKind::Merge,
        "CREATE" if upper.contains("GLOBAL TEMPORARY") => StatementKind::CreateTempTable,
        "CREATE" if upper.contains("CREATE TABLE") => StatementKind::CreateTable,
        "IF" => StatementKind::If,
        "WHILE" => StatementKind::While,
        "FOR" => StatementKind::For,
        _ => StatementKind::Other,
    }
}

/// Classifies one raw statement and extracts every feature from it.
pub(crate) fn extract(id: usize, raw: &str, issues: &mut Vec<Issue>) -> SqlStatement {
    let kind = classify(raw);
    let flat = flatten(raw);
    let aliases = alias_map(&flat);

    let (source_tables, target_tables) = extract_tables(kind, &flat);
    let primary_table = single_table(&source_tables, &target_tables);

    let mut fields_read = select_field_reads(&flat, &aliases);
    let mut fields_written = Vec::new();

    match kind {
        StatementKind::Insert => {
            if let Some(target) = target_tables.first() {
                for column in insert_columns(&flat) {
                    fields_written.push(FieldReference::new(target.clone(), column));
                }
            }
        }
        StatementKind::Update => {
            if let Some(target) = target_tables.first() {
                let (reads, writes) = set_clause_fields(&flat, target, &aliases);
                fields_read.extend(reads);
                fields_written.extend(writes);
            }
        }
        _ => {}
    }

    let join_conditions = extract_joins(&flat, &aliases, issues, id);
    let where_conditions = extract_wheres(&flat, &aliases, primary_table.as_deref());
    let parameters = extract_parameters(&flat);

    if kind == StatementKind::Select && from_clause(&flat).is_none() {
        issues.push(
            Issue::warning(issue_codes::UNRECOGNIZED_CLAUSE, "no FROM clause matched")
                .with_statement(id),
        );
    }
    if kind == StatementKind::Other {
        issues.push(
            Issue::info(
                issue_codes::UNCLASSIFIED_STATEMENT,
                "leading keyword unrecognized; statement kept with kind OTHER",
            )
            .with_statement(id),
        );
    }

    SqlStatement {
        id,
        kind,
        text: raw.to_string(),
        source_tables,
        target_tables,
        fields_read,
        fields_written,
        join_conditions,
        where_conditions,
        parameters,
    }
}

fn from_clause(flat: &str) -> Option<String> {
    from_clause_re()
        .captures(flat)
        .map(|c| c[1].trim().to_string())
}

fn select_clause(flat: &str) -> Option<String> {
    select_clause_re()
        .captures(flat)
        .map(|c| c[1].trim().to_string())
}

/// Tables of the FROM clause (primary plus JOINed) with optional aliases.
fn from_entries(flat: &str) -> Vec<(String, Option<String>)> {
    let Some(clause) = from_clause(flat) else {
        return Vec::new();
    };

    let mut entries = Vec::new();

    // Primary part runs to the first JOIN-related keyword.
    let main_end = join_boundary_re()
        .find(&clause)
        .map_or(clause.len(), |m| m.start());
    for part in split_top_level(&clause[..main_end], ',') {
        let mut tokens = part.split_whitespace();
        let Some(table) = tokens.next() else { continue };
        if !is_valid_table_token(table) {
            continue;
        }
        let alias = tokens
            .next()
            .filter(|a| is_valid_identifier(a) && !is_sql_keyword(a))
            .map(|a| a.to_string());
        entries.push((table.to_string(), alias));
    }

    for captures in join_table_re().captures_iter(&clause) {
        let table = captures[1].to_string();
        if !is_valid_table_token(&table) {
            continue;
        }
        let alias = captures
            .get(2)
            .map(|m| m.as_str())
            .filter(|a| is_valid_identifier(a) && !is_sql_keyword(a))
            .map(|a| a.to_string());
        entries.push((table, alias));
    }

    entries
}

fn join_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:INNER|LEFT|RIGHT|FULL|CROSS|OUTER|JOIN)\b")
            .expect("Invalid regex pattern")
    })
}

/// Alias bindings from the statement's own FROM/JOIN (and UPDATE) clauses.
pub(crate) fn alias_map(flat: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (table, alias) in from_entries(flat) {
        if let Some(alias) = alias {
            map.insert(alias, table);
        }
    }
    if let Some(captures) = update_target_re().captures(flat) {
        if let Some(alias) = captures.get(2) {
            let alias = alias.as_str();
            if is_valid_identifier(alias) && !is_sql_keyword(alias) {
                map.insert(alias.to_string(), captures[1].to_string());
            }
        }
    }
    map
}

fn resolve<'a>(token: &'a str, aliases: &'a BTreeMap<String, String>) -> &'a str {
    aliases.get(token).map_or(token, String::as_str)
}

fn resolved_field(
    table_token: &str,
    field: &str,
    aliases: &BTreeMap<String, String>,
) -> FieldReference {
    let resolved = resolve(table_token, aliases);
    let mut reference = FieldReference::new(resolved, field);
    if resolved != table_token {
        reference = reference.with_alias(table_token);
    }
    reference
}

/// Source and target table names for a statement, order-preserving and
/// duplicate-free.
fn extract_tables(kind: StatementKind, flat: &str) -> (Vec<String>, Vec<String>) {
    let mut source = Vec::new();
    let mut target = Vec::new();

    // DELETE's `FROM` names its target, not a read source.
    if kind != StatementKind::Delete {
        for (table, _) in from_entries(flat) {
            push_unique(&mut source, table);
        }
    }

    match kind {
        StatementKind::Insert => {
            if let Some(captures) = insert_target_re().captures(flat) {
                push_valid(&mut target, &captures[1]);
            }
        }
        StatementKind::Update => {
            if let Some(captures) = update_target_re().captures(flat) {
                // The updated table is read as well as written.
                push_valid(&mut target, &captures[1]);
                push_valid(&mut source, &captures[1]);
            }
        }
        StatementKind::Delete => {
            if let Some(captures) = delete_target_re().captures(flat) {
                push_valid(&mut target, &captures[1]);
            }
        }
        StatementKind::CreateTable | StatementKind::CreateTempTable => {
            if let Some(captures) = create_target_re().captures(flat) {
                push_valid(&mut target, &captures[1]);
            }
        }
        StatementKind::Merge => {
            if let Some(captures) = merge_target_re().captures(flat) {
                push_valid(&mut target, &captures[1]);
            }
            if let Some(captures) = merge_using_re().captures(flat) {
                push_valid(&mut source, &captures[1]);
            }
        }
        _ => {}
    }

    (source, target)
}

fn push_valid(tables: &mut Vec<String>, token: &str) {
    if is_valid_table_token(token) {
        push_unique(tables, token.to_string());
    }
}

fn push_unique(tables: &mut Vec<String>, table: String) {
    if !tables.contains(&table) {
        tables.push(table);
    }
}

/// The statement's sole table, when it references exactly one. Used to
/// attribute unqualified WHERE columns.
fn single_table(source: &[String], target: &[String]) -> Option<String> {
    let distinct: BTreeSet<&String> = source.iter().chain(target.iter()).collect();
    if distinct.len() == 1 {
        distinct.into_iter().next().cloned()
    } else {
        None
    }
}

/// SELECT-clause expressions, split on commas at paren depth 0 outside
/// quoted literals.
pub(crate) fn select_expressions(flat: &str) -> Vec<String> {
    select_clause(flat)
        .map(|clause| split_top_level(&clause, ','))
        .unwrap_or_default()
}

/// One read reference per SELECT expression: the first `alias.field`
/// occurrence, alias-resolved.
fn select_field_reads(flat: &str, aliases: &BTreeMap<String, String>) -> Vec<FieldReference> {
    let mut reads = Vec::new();
    for expression in select_expressions(flat) {
        let trimmed = expression.trim();
        if trimmed.is_empty() || trimmed == "*" {
            continue;
        }
        if let Some(captures) = qualified_field_re().captures(trimmed) {
            reads.push(resolved_field(&captures[1], &captures[2], aliases));
        }
    }
    reads
}

/// INSERT column list, when explicitly written.
pub(crate) fn insert_columns(flat: &str) -> Vec<String> {
    insert_columns_re()
        .captures(flat)
        .map(|c| split_top_level(&c[1], ','))
        .unwrap_or_default()
}

/// Positionally zips the INSERT column list with the SELECT expression list.
/// Missing column names fall back to `field_<n>` placeholders.
pub(crate) fn insert_select_mapping(flat: &str) -> Vec<(String, String)> {
    let expressions = select_expressions(flat);
    if expressions.is_empty() {
        return Vec::new();
    }
    let columns = insert_columns(flat);
    expressions
        .into_iter()
        .enumerate()
        .map(|(index, expression)| {
            let column = columns
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("field_{}", index + 1));
            (column, expression)
        })
        .collect()
}

/// UPDATE `SET` clause: each assignment's left side is a write on the target
/// table; qualified references (or a bare column copied as-is) on the right
/// side are reads.
fn set_clause_fields(
    flat: &str,
    target: &str,
    aliases: &BTreeMap<String, String>,
) -> (Vec<FieldReference>, Vec<FieldReference>) {
    let mut reads = Vec::new();
    let mut writes = Vec::new();

    let Some(captures) = set_clause_re().captures(flat) else {
        return (reads, writes);
    };

    for assignment in split_top_level(&captures[1], ',') {
        let Some((lhs, rhs)) = assignment.split_once('=') else {
            continue;
        };
        let column = lhs.trim();
        if is_valid_identifier(column) && !is_sql_keyword(column) {
            writes.push(FieldReference::new(target, column));
        }

        let rhs = rhs.trim();
        let mut matched = false;
        for field in qualified_field_re().captures_iter(rhs) {
            reads.push(resolved_field(&field[1], &field[2], aliases));
            matched = true;
        }
        // A bare column copied from the same table, e.g. `salary = salary`.
        if !matched
            && is_valid_identifier(rhs)
            && !is_sql_keyword(rhs)
            && !rhs.to_ascii_lowercase().starts_with("p_")
        {
            reads.push(FieldReference::new(target, rhs));
        }
    }

    (reads, writes)
}

/// Join predicates: kind, joined table, and the ON condition running to the
/// next JOIN/WHERE/GROUP/ORDER/HAVING/`;`/end. When the condition holds no
/// `t1.f1 = t2.f2` equality, the edge is kept with fields marked `unknown`.
fn extract_joins(
    flat: &str,
    aliases: &BTreeMap<String, String>,
    issues: &mut Vec<Issue>,
    id: usize,
) -> Vec<JoinCondition> {
    let heads: Vec<_> = join_head_re().captures_iter(flat).collect();

    if heads.is_empty() {
        if join_keyword_re().is_match(flat) {
            issues.push(
                Issue::warning(issue_codes::UNRECOGNIZED_CLAUSE, "JOIN clause did not match")
                    .with_statement(id),
            );
        }
        return Vec::new();
    }

    let main_table = from_entries(flat).first().map(|(table, _)| table.clone());
    let mut joins = Vec::new();

    for (index, captures) in heads.iter().enumerate() {
        let join_type = match captures.get(1).map(|m| m.as_str().to_ascii_uppercase()) {
            Some(kind) => match kind.as_str() {
                "LEFT" => JoinType::Left,
                "RIGHT" => JoinType::Right,
                "FULL" => JoinType::Full,
                "CROSS" => JoinType::Cross,
                _ => JoinType::Inner,
            },
            None => JoinType::Inner,
        };
        let joined_table = captures[2].to_string();

        let start = captures.get(0).map_or(0, |m| m.end());
        let end = heads
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(flat.len(), |m| m.start());
        let mut condition = &flat[start..end];
        if let Some(terminator) = condition_end_re().find(condition) {
            condition = &condition[..terminator.start()];
        }
        let condition = condition.trim().to_string();

        let join = match join_equality_re().captures(&condition) {
            Some(eq) => JoinCondition {
                left_table: resolve(&eq[1], aliases).to_string(),
                left_field: eq[2].to_string(),
                right_table: resolve(&eq[3], aliases).to_string(),
                right_field: eq[4].to_string(),
                join_type,
                condition,
            },
            None => JoinCondition {
                left_table: main_table.clone().unwrap_or_else(|| "unknown".to_string()),
                left_field: "unknown".to_string(),
                right_table: joined_table,
                right_field: "unknown".to_string(),
                join_type,
                condition,
            },
        };
        joins.push(join);
    }

    joins
}

/// WHERE predicate: raw text, every qualified field occurrence, unqualified
/// comparison columns (single-table statements only), and parameter tokens.
fn extract_wheres(
    flat: &str,
    aliases: &BTreeMap<String, String>,
    primary_table: Option<&str>,
) -> Vec<WhereCondition> {
    let Some(captures) = where_clause_re().captures(flat) else {
        return Vec::new();
    };
    let condition = captures[1].trim().to_string();

    let mut fields = Vec::new();
    for reference in qualified_field_re().captures_iter(&condition) {
        fields.push(resolved_field(&reference[1], &reference[2], aliases));
    }

    if let Some(table) = primary_table {
        for lhs in comparison_lhs_re().captures_iter(&condition) {
            let Some(matched) = lhs.get(1) else { continue };
            if !unqualified_at(&condition, matched.start()) {
                continue;
            }
            let token = matched.as_str();
            if is_sql_keyword(token) || token.to_ascii_lowercase().starts_with("p_") {
                continue;
            }
            let reference = FieldReference::new(table, token);
            if !fields.contains(&reference) {
                fields.push(reference);
            }
        }
    }

    let parameters = extract_parameters(&condition);

    vec![WhereCondition {
        fields,
        condition,
        parameters,
    }]
}

/// True when the token starting at `start` is not the tail of a qualified or
/// bind reference.
fn unqualified_at(text: &str, start: usize) -> bool {
    match text[..start].chars().next_back() {
        Some(previous) => {
            previous != '.' && previous != ':' && !previous.is_alphanumeric() && previous != '_'
        }
        None => true,
    }
}

/// Every `alias.field` occurrence in an expression, alias-resolved. Used for
/// computed-field components, where all constituents matter.
pub(crate) fn expression_fields(
    expression: &str,
    aliases: &BTreeMap<String, String>,
) -> Vec<FieldReference> {
    qualified_field_re()
        .captures_iter(expression)
        .map(|captures| resolved_field(&captures[1], &captures[2], aliases))
        .collect()
}

/// Parameter tokens: `p_<identifier>` and `:<identifier>`, sorted and
/// de-duplicated.
pub(crate) fn extract_parameters(text: &str) -> Vec<String> {
    let mut parameters = BTreeSet::new();
    for m in param_prefix_re().find_iter(text) {
        if unqualified_at(text, m.start()) {
            parameters.insert(m.as_str().to_string());
        }
    }
    for m in param_bind_re().find_iter(text) {
        // `:=` assignments never reach here because `:` must be followed by
        // a word character; still guard against `x:y` oddities.
        parameters.insert(m.as_str().to_string());
    }
    parameters.into_iter().collect()
}
