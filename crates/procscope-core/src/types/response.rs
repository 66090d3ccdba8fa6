//! Response types for the stored-procedure analysis API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::{
    ComputedField, CursorDecl, FieldReference, JoinCondition, Summary, WhereCondition,
};
use crate::error::Issue;

/// The result of analyzing one stored procedure.
///
/// Produced once per `analyze` call and read-only afterwards: the engine
/// retains no state across calls, and consumers must not write back into it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Procedure name recovered from the header (or the sentinel
    /// `unknown_procedure` when no header matched)
    pub procedure_name: String,

    /// Declared parameters with their per-statement usage
    pub parameters: Vec<Parameter>,

    /// Extracted statements in source order
    pub statements: Vec<SqlStatement>,

    /// Physical/temporary tables and the field lineage map
    pub tables: TableModel,

    /// Flattened join/where predicates and control-flow summaries
    pub conditions: ConditionModel,

    /// Explicit cursor declarations found in the declaration section
    pub cursors: Vec<CursorDecl>,

    /// All issues encountered during analysis
    pub issues: Vec<Issue>,

    /// Summary statistics
    pub summary: Summary,

    /// Derived visualization graph (when requested via options)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Graph>,
}

/// Kind of an extracted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTable,
    CreateTempTable,
    If,
    While,
    For,
    Other,
}

impl StatementKind {
    /// Control-flow constructs are summarized as metadata rather than
    /// expanded into a tree.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, Self::If | Self::While | Self::For)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::CreateTable => "CREATE_TABLE",
            Self::CreateTempTable => "CREATE_TEMP_TABLE",
            Self::If => "IF",
            Self::While => "WHILE",
            Self::For => "FOR",
            Self::Other => "OTHER",
        }
    }
}

/// One top-level statement extracted from the procedure body.
///
/// Statement ids are assigned in source order and act as the join key linking
/// parameter usage lists and table reference lists back to this list.
/// Statements are created once by the classifier and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlStatement {
    /// Stable id, unique per run, assigned in source order
    pub id: usize,

    /// Classified statement kind
    pub kind: StatementKind,

    /// Raw statement text (trailing `;` stripped)
    pub text: String,

    /// Tables the statement reads from
    pub source_tables: Vec<String>,

    /// Tables the statement writes to
    pub target_tables: Vec<String>,

    /// Field references read by the statement
    pub fields_read: Vec<FieldReference>,

    /// Field references written by the statement
    pub fields_written: Vec<FieldReference>,

    /// Join predicates found in the statement
    pub join_conditions: Vec<JoinCondition>,

    /// WHERE predicates found in the statement
    pub where_conditions: Vec<WhereCondition>,

    /// Parameter tokens referenced anywhere in the statement, sorted
    pub parameters: Vec<String>,
}

/// Direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl ParamDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::InOut => "INOUT",
        }
    }
}

/// A declared procedure parameter.
///
/// Created at signature extraction; the usage list is filled in by the
/// parameter usage analyzer and the value is immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    /// IN / OUT / INOUT (defaults to IN when unspecified)
    pub direction: ParamDirection,

    /// Declared type, including any `(size)` qualifier
    pub data_type: String,

    /// Default value expression, when declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Ids of statements referencing this parameter
    pub used_in_statements: Vec<usize>,
}

/// A table touched by the procedure.
///
/// Created lazily on first reference by any statement. The temporary/physical
/// classification is decided once at creation and never flips; the field set
/// is a monotonically growing union that never shrinks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,

    pub is_temporary: bool,

    /// Known fields, insertion-ordered, duplicate-free
    pub fields: Vec<String>,

    /// Output fields derived from multi-field expressions
    pub computed_fields: Vec<ComputedField>,

    /// Ids of statements that write to this table
    pub written_by: Vec<usize>,
}

impl Table {
    pub fn new(name: impl Into<String>, is_temporary: bool) -> Self {
        Self {
            name: name.into(),
            is_temporary,
            fields: Vec::new(),
            computed_fields: Vec::new(),
            written_by: Vec::new(),
        }
    }

    /// Adds a field to the set; duplicates are ignored.
    pub fn add_field(&mut self, field: &str) {
        if !self.fields.iter().any(|f| f == field) {
            self.fields.push(field.to_string());
        }
    }

    /// Adds a computed field; duplicates collapse by expression text.
    pub fn add_computed_field(&mut self, computed: ComputedField) {
        if self
            .computed_fields
            .iter()
            .any(|c| c.expression == computed.expression)
        {
            return;
        }
        self.computed_fields.push(computed);
    }
}

/// Tables touched by the procedure, split by classification, plus the
/// field-level lineage map (`target_table.field` -> source field references).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableModel {
    pub physical: BTreeMap<String, Table>,
    pub temporary: BTreeMap<String, Table>,
    pub lineage: BTreeMap<String, Vec<FieldReference>>,
}

impl TableModel {
    /// Looks a table up in either map.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.physical.get(name).or_else(|| self.temporary.get(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        if let Some(table) = self.physical.get_mut(name) {
            return Some(table);
        }
        self.temporary.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.physical.contains_key(name) || self.temporary.contains_key(name)
    }
}

/// A control-flow construct summarized as metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlFlowEntry {
    pub kind: StatementKind,
    pub statement_id: usize,
    pub text: String,
}

/// Flattened predicates and control-flow summaries, in statement order and
/// within-statement order. Duplicates are preserved for traceability.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConditionModel {
    pub joins: Vec<JoinCondition>,
    pub filters: Vec<WhereCondition>,
    pub control_flow: Vec<ControlFlowEntry>,
}

/// Node kind in the visualization graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Parameter,
    PhysicalTable,
    TempTable,
}

/// Edge kind in the visualization graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    DataFlow,
    ParameterUsage,
    Join,
}

/// A node in the visualization graph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Stable string id (`param_<name>` / `table_<name>`)
    pub id: String,

    pub label: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Extra payload for renderers (fields, directions, statement ids)
    pub data: serde_json::Value,
}

/// An edge in the visualization graph.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,

    #[serde(rename = "type")]
    pub kind: EdgeKind,

    pub label: String,

    pub data: serde_json::Value,
}

/// A renderer-agnostic graph derived from the analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}
