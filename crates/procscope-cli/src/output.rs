//! Output formatting: JSON and human-readable tables.

use owo_colors::OwoColorize;
use procscope_core::{AnalysisResult, Severity, Table as AnalyzedTable};
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Serializes the full result as JSON.
pub fn format_json(result: &AnalysisResult, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    }
}

#[derive(Tabled)]
struct ParameterRow {
    name: String,
    direction: &'static str,
    #[tabled(rename = "type")]
    data_type: String,
    #[tabled(rename = "used in")]
    used_in: String,
}

#[derive(Tabled)]
struct TableRow {
    name: String,
    kind: &'static str,
    fields: String,
    #[tabled(rename = "written by")]
    written_by: String,
}

#[derive(Tabled)]
struct StatementRow {
    id: usize,
    kind: &'static str,
    targets: String,
    sources: String,
}

/// Formats the analysis result as human-readable text with optional colors.
pub fn format_table(result: &AnalysisResult, source_name: &str, colored: bool) -> String {
    let mut out = String::new();

    write_header(&mut out, result, source_name, colored);
    write_summary(&mut out, result, colored);

    if !result.parameters.is_empty() {
        write_section(&mut out, "Parameters", colored);
        let rows: Vec<ParameterRow> = result
            .parameters
            .iter()
            .map(|p| ParameterRow {
                name: p.name.clone(),
                direction: p.direction.as_str(),
                data_type: p.data_type.clone(),
                used_in: join_ids(&p.used_in_statements),
            })
            .collect();
        push_table(&mut out, rows);
    }

    let table_rows: Vec<TableRow> = result
        .tables
        .physical
        .values()
        .map(|t| table_row(t, "physical"))
        .chain(
            result
                .tables
                .temporary
                .values()
                .map(|t| table_row(t, "temporary")),
        )
        .collect();
    if !table_rows.is_empty() {
        write_section(&mut out, "Tables", colored);
        push_table(&mut out, table_rows);
    }

    if !result.statements.is_empty() {
        write_section(&mut out, "Statements", colored);
        let rows: Vec<StatementRow> = result
            .statements
            .iter()
            .map(|s| StatementRow {
                id: s.id,
                kind: s.kind.as_str(),
                targets: s.target_tables.join(", "),
                sources: s.source_tables.join(", "),
            })
            .collect();
        push_table(&mut out, rows);
    }

    if !result.tables.lineage.is_empty() {
        write_section(&mut out, "Field lineage", colored);
        for (target, sources) in &result.tables.lineage {
            let source_list: Vec<String> = sources.iter().map(|f| f.qualified()).collect();
            writeln!(out, "  {} <- {}", target, source_list.join(", ")).unwrap();
        }
        writeln!(out).unwrap();
    }

    out
}

fn table_row(table: &AnalyzedTable, kind: &'static str) -> TableRow {
    TableRow {
        name: table.name.clone(),
        kind,
        fields: table.fields.join(", "),
        written_by: join_ids(&table.written_by),
    }
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_header(out: &mut String, result: &AnalysisResult, source_name: &str, colored: bool) {
    let title = format!("procscope: {} ({})", result.procedure_name, source_name);
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
}

fn write_summary(out: &mut String, result: &AnalysisResult, colored: bool) {
    let summary = &result.summary;
    let stats = format!(
        "Summary: {} statements | {} tables ({} temporary) | {} joins | {} parameters",
        summary.statement_count,
        summary.table_count + summary.temp_table_count,
        summary.temp_table_count,
        summary.join_count,
        summary.parameter_count,
    );

    if colored {
        writeln!(out, "{}", stats.cyan()).unwrap();
    } else {
        writeln!(out, "{stats}").unwrap();
    }
    writeln!(out).unwrap();
}

fn write_section(out: &mut String, title: &str, colored: bool) {
    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
    }
}

fn push_table<R: Tabled>(out: &mut String, rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    writeln!(out, "{table}").unwrap();
    writeln!(out).unwrap();
}

/// Writes issues to stderr as `procscope: level: message` lines.
pub fn print_issues_to_stderr(result: &AnalysisResult) {
    for issue in &result.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };

        let location = issue
            .statement_id
            .map(|id| format!(" (statement {id})"))
            .unwrap_or_default();

        eprintln!("procscope: {level}:{location} {}", issue.message);
    }
}
