//! Request types for the stored-procedure analysis API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A request to analyze a stored procedure for data flow.
///
/// This is the main entry point for the analysis API. It accepts the raw
/// procedure text along with options controlling the amount of detail in the
/// produced result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// The stored-procedure source to analyze (UTF-8 string)
    pub stored_procedure: String,

    /// Analysis options
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl AnalyzeRequest {
    /// Convenience constructor with default options.
    pub fn new(stored_procedure: impl Into<String>) -> Self {
        Self {
            stored_procedure: stored_procedure.into(),
            options: AnalysisOptions::default(),
        }
    }
}

/// Options controlling the analysis behavior.
///
/// Every recognized option is enumerated here; unknown keys in a request are
/// rejected at deserialization rather than silently ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Derive a visualization graph (nodes per parameter/table, edges for
    /// data flow, parameter usage, and joins) alongside the model
    #[serde(default)]
    pub include_visualization: bool,

    /// Granularity of the produced model
    #[serde(default)]
    pub detail_level: DetailLevel,
}

/// Granularity of the analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Table-level model only: statements, tables, conditions, parameter
    /// usage. Field-level artifacts (computed fields, the lineage map) are
    /// omitted.
    Basic,
    /// Everything, including field-level lineage (default)
    #[default]
    Full,
}
