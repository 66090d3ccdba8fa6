//! Stored-procedure analysis pipeline.
//!
//! `analyze` runs a fixed sequence of pure stages over the input text:
//! normalize, signature extraction, segmentation, per-statement feature
//! extraction, parameter usage, table/field lineage, condition aggregation,
//! and final assembly. Every stage allocates fresh local collections; no
//! state survives between calls, so independent calls may run concurrently
//! with no locking. There are no suspension points and no I/O: one call runs
//! to completion on the calling thread.

use crate::error::{Issue, Severity};
use crate::types::{AnalysisResult, AnalyzeRequest, IssueCount, Summary};
#[cfg(feature = "tracing")]
use tracing::info_span;

mod conditions;
mod cursors;
mod features;
mod graph;
pub mod helpers;
mod lineage;
mod normalize;
mod parameters;
mod segmenter;
mod signature;

#[cfg(test)]
mod tests;

use crate::error::issue_codes;

/// Main entry point: analyzes one stored procedure.
///
/// Infallible by contract — malformed input degrades to a partial result
/// with warning issues, never an error (see [`crate::error`]).
pub fn analyze(request: &AnalyzeRequest) -> AnalysisResult {
    #[cfg(feature = "tracing")]
    let _span = info_span!(
        "analyze",
        input_bytes = request.stored_procedure.len(),
        detail = ?request.options.detail_level
    )
    .entered();

    let mut issues: Vec<Issue> = Vec::new();

    let normalized = normalize::normalize(&request.stored_procedure);
    let flat = normalize::flatten(&normalized);

    let (procedure_name, mut parameters) = match signature::extract(&flat) {
        Some(signature) => signature,
        None => {
            issues.push(Issue::warning(
                issue_codes::MALFORMED_SIGNATURE,
                "no CREATE PROCEDURE header found; using sentinel name",
            ));
            (signature::UNKNOWN_PROCEDURE.to_string(), Vec::new())
        }
    };

    let segments = match segmenter::split_statements(&normalized) {
        Some(segments) => segments,
        None => {
            if !normalized.is_empty() {
                issues.push(Issue::warning(
                    issue_codes::EMPTY_BODY,
                    "no BEGIN ... END body found",
                ));
            }
            Vec::new()
        }
    };

    let statements: Vec<_> = segments
        .iter()
        .enumerate()
        .map(|(id, text)| features::extract(id, text, &mut issues))
        .collect();

    parameters::analyze_usage(&mut parameters, &statements);

    let tables = lineage::build(&statements, request.options.detail_level);
    let conditions = conditions::aggregate(&statements);
    let cursors = cursors::extract(&flat);

    let graph = request
        .options
        .include_visualization
        .then(|| graph::build(&parameters, &statements, &tables, &conditions));

    let summary = summarize(&statements, &parameters, &tables, &conditions, &issues);

    AnalysisResult {
        procedure_name,
        parameters,
        statements,
        tables,
        conditions,
        cursors,
        issues,
        summary,
        graph,
    }
}

/// Splits procedure text into raw statement candidates without running the
/// full analysis. Useful for previewing what the segmenter sees.
pub fn split_statements(text: &str) -> Vec<String> {
    segmenter::split_statements(&normalize::normalize(text)).unwrap_or_default()
}

fn summarize(
    statements: &[crate::types::SqlStatement],
    parameters: &[crate::types::Parameter],
    tables: &crate::types::TableModel,
    conditions: &crate::types::ConditionModel,
    issues: &[Issue],
) -> Summary {
    let mut issue_count = IssueCount::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => issue_count.errors += 1,
            Severity::Warning => issue_count.warnings += 1,
            Severity::Info => issue_count.infos += 1,
        }
    }

    Summary {
        statement_count: statements.len(),
        table_count: tables.physical.len(),
        temp_table_count: tables.temporary.len(),
        parameter_count: parameters.len(),
        join_count: conditions.joins.len(),
        control_flow_count: conditions.control_flow.len(),
        has_errors: issue_count.errors > 0,
        issue_count,
    }
}
