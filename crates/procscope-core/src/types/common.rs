//! Common value types shared between statements, tables, and conditions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A reference to a field of a table, as it appeared in a statement.
///
/// `table` holds the resolved table name whenever the statement's own
/// FROM/JOIN alias bindings allow resolution; `alias` preserves the original
/// spelling in that case. This is a value type, not an entity: two references
/// to the same field compare equal regardless of where they were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    /// Owning table name (alias-resolved when possible).
    pub table: String,

    /// Field name.
    pub field: String,

    /// Original alias spelling, when the reference was written through one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl FieldReference {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// `table.field` form used as the lineage map key.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.field)
    }
}

/// An output field derived from an expression over several source fields,
/// e.g. a concatenation like `e.first_name || ' ' || e.last_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComputedField {
    /// Raw expression text.
    pub expression: String,

    /// Component fields, in expression order.
    pub components: Vec<FieldReference>,

    /// Field name this expression populates in the target table.
    pub target_field: String,
}

/// Kind of a join between two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Cross => "CROSS",
        }
    }
}

/// A join predicate connecting two tables.
///
/// When the ON clause contains no recognizable `t1.f1 = t2.f2` equality, the
/// condition is still recorded with both fields set to `unknown` so the
/// table-to-table edge is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinCondition {
    pub left_table: String,
    pub left_field: String,
    pub right_table: String,
    pub right_field: String,
    pub join_type: JoinType,

    /// Raw ON-clause text.
    pub condition: String,
}

/// A WHERE predicate and the fields/parameters it involves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhereCondition {
    /// Field references involved in the predicate.
    pub fields: Vec<FieldReference>,

    /// Raw clause text.
    pub condition: String,

    /// Parameter tokens referenced inside the predicate.
    pub parameters: Vec<String>,
}

/// An explicit cursor declaration (`CURSOR <name> IS <query>;`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorDecl {
    pub name: String,
    pub definition: String,
}

/// Summary statistics for the analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Total number of statements extracted from the body
    pub statement_count: usize,

    /// Physical tables discovered
    pub table_count: usize,

    /// Temporary tables discovered
    pub temp_table_count: usize,

    /// Declared procedure parameters
    pub parameter_count: usize,

    /// Join predicates across all statements
    pub join_count: usize,

    /// Control-flow constructs (IF/WHILE/FOR) recorded
    pub control_flow_count: usize,

    /// Issue counts by severity
    pub issue_count: IssueCount,

    /// Quick check: true if any errors were encountered
    pub has_errors: bool,
}

/// Counts of issues by severity level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueCount {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}
