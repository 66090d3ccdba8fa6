//! Types for the stored-procedure analysis API.
//!
//! This module defines the request and response types for the procscope
//! analysis API. The API accepts the raw text of a procedural-SQL routine and
//! returns a structured data-flow model: parameters, statements, tables,
//! fields, join/filter predicates, and field-level lineage.

mod common;
mod request;
mod response;

// Re-export all public types
pub use common::{
    ComputedField, CursorDecl, FieldReference, IssueCount, JoinCondition, JoinType, Summary,
    WhereCondition,
};
pub use request::{AnalysisOptions, AnalyzeRequest, DetailLevel};
pub use response::{
    AnalysisResult, ConditionModel, ControlFlowEntry, EdgeKind, Graph, GraphEdge, GraphNode,
    NodeKind, Parameter, ParamDirection, SqlStatement, StatementKind, Table, TableModel,
};
