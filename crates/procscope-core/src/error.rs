//! Diagnostics for stored-procedure analysis.
//!
//! # Error Handling Strategy
//!
//! The engine's job is descriptive analysis of arbitrary, possibly
//! non-standard procedural SQL, not validation. Every recoverable condition
//! is therefore a non-fatal [`Issue`] collected during analysis and returned
//! alongside the result:
//!
//! - a missing `CREATE PROCEDURE` header recovers to a sentinel name and an
//!   empty parameter list ([`issue_codes::MALFORMED_SIGNATURE`]);
//! - a JOIN/WHERE/SELECT sub-pattern that does not match omits that one
//!   feature, never the whole statement ([`issue_codes::UNRECOGNIZED_CLAUSE`]);
//! - a statement with an unrecognized leading keyword is retained with kind
//!   `OTHER` so downstream counts stay consistent
//!   ([`issue_codes::UNCLASSIFIED_STATEMENT`]).
//!
//! There is no fatal tier: [`crate::analyze`] is infallible by contract, and
//! the normalizer's guarantees (any input, including empty, normalizes to a
//! valid string) make the conditions a fatal error would describe
//! unreachable. Boundaries that can genuinely fail — file decoding, transport
//! — live outside this crate and carry their own error types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An issue encountered during analysis (error, warning, or info).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Severity level
    pub severity: Severity,

    /// Machine-readable issue code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Optional: which statement id this issue relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_id: Option<usize>,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            statement_id: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            statement_id: None,
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
            statement_id: None,
        }
    }

    pub fn with_statement(mut self, id: usize) -> Self {
        self.statement_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Machine-readable issue codes.
pub mod issue_codes {
    /// No `CREATE [OR REPLACE] PROCEDURE` header found.
    pub const MALFORMED_SIGNATURE: &str = "MALFORMED_SIGNATURE";
    /// No `BEGIN ... END` body found in non-empty input.
    pub const EMPTY_BODY: &str = "EMPTY_BODY";
    /// A clause sub-pattern did not match; that feature was omitted.
    pub const UNRECOGNIZED_CLAUSE: &str = "UNRECOGNIZED_CLAUSE";
    /// Leading keyword unrecognized; statement kept with kind OTHER.
    pub const UNCLASSIFIED_STATEMENT: &str = "UNCLASSIFIED_STATEMENT";
}
