//! Condition aggregation: flattens per-statement predicates and records
//! control-flow summaries.

use crate::types::{ConditionModel, ControlFlowEntry, SqlStatement};

/// Flattens every statement's join and where conditions into two ordered
/// lists (statement order, then within-statement order) and records a
/// control-flow entry for every IF/WHILE/FOR-classified statement.
///
/// No deduplication: duplicates are preserved for traceability.
pub(crate) fn aggregate(statements: &[SqlStatement]) -> ConditionModel {
    let mut model = ConditionModel::default();

    for statement in statements {
        model
            .joins
            .extend(statement.join_conditions.iter().cloned());
        model
            .filters
            .extend(statement.where_conditions.iter().cloned());

        if statement.kind.is_control_flow() {
            model.control_flow.push(ControlFlowEntry {
                kind: statement.kind,
                statement_id: statement.id,
                text: statement.text.clone(),
            });
        }
    }

    model
}
