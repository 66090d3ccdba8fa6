pub mod analyzer;
pub mod error;
pub mod types;

// Re-export main types and functions
pub use analyzer::{analyze, split_statements};
pub use error::{issue_codes, Issue, Severity};

// Re-export types explicitly
pub use types::{
    AnalysisOptions,
    AnalysisResult,
    // Request types
    AnalyzeRequest,
    ComputedField,
    ConditionModel,
    ControlFlowEntry,
    CursorDecl,
    DetailLevel,
    EdgeKind,
    // Response types
    FieldReference,
    Graph,
    GraphEdge,
    GraphNode,
    IssueCount,
    JoinCondition,
    JoinType,
    NodeKind,
    ParamDirection,
    Parameter,
    SqlStatement,
    StatementKind,
    Summary,
    Table,
    TableModel,
    WhereCondition,
};
