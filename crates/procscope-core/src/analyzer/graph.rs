//! Visualization graph derivation: nodes per parameter/table, edges for
//! per-statement data flow, parameter usage, and joins.
//!
//! The graph is a read-only projection of the analysis result for renderers;
//! nothing here feeds back into the model.

use serde_json::json;

use crate::types::{
    ConditionModel, EdgeKind, Graph, GraphEdge, GraphNode, NodeKind, Parameter, SqlStatement,
    Table, TableModel,
};

use super::parameters::token_matches;

pub(crate) fn build(
    parameters: &[Parameter],
    statements: &[SqlStatement],
    tables: &TableModel,
    conditions: &ConditionModel,
) -> Graph {
    let mut graph = Graph::default();

    for parameter in parameters {
        graph.nodes.push(GraphNode {
            id: format!("param_{}", parameter.name),
            label: parameter.name.clone(),
            kind: NodeKind::Parameter,
            data: json!({
                "direction": parameter.direction,
                "dataType": parameter.data_type,
                "usedIn": parameter.used_in_statements,
            }),
        });
    }

    for table in tables.physical.values() {
        graph.nodes.push(table_node(table, NodeKind::PhysicalTable));
    }
    for table in tables.temporary.values() {
        graph.nodes.push(table_node(table, NodeKind::TempTable));
    }

    for statement in statements {
        for source in &statement.source_tables {
            for target in &statement.target_tables {
                if source == target {
                    continue;
                }
                graph.edges.push(GraphEdge {
                    id: format!("flow_{}_{}_{}", statement.id, source, target),
                    from: format!("table_{source}"),
                    to: format!("table_{target}"),
                    kind: EdgeKind::DataFlow,
                    label: statement.kind.as_str().to_string(),
                    data: json!({ "statementId": statement.id }),
                });
            }
        }

        for token in &statement.parameters {
            // Only declared parameters become nodes; unmatched tokens (local
            // variables, binds of other scopes) have nothing to connect to.
            let Some(parameter) = parameters
                .iter()
                .find(|parameter| token_matches(token, &parameter.name))
            else {
                continue;
            };
            for table in statement
                .source_tables
                .iter()
                .chain(statement.target_tables.iter())
            {
                graph.edges.push(GraphEdge {
                    id: format!("param_{}_{}_{}", statement.id, parameter.name, table),
                    from: format!("param_{}", parameter.name),
                    to: format!("table_{table}"),
                    kind: EdgeKind::ParameterUsage,
                    label: "uses".to_string(),
                    data: json!({ "statementId": statement.id }),
                });
            }
        }
    }

    for join in &conditions.joins {
        if !tables.contains(&join.left_table) || !tables.contains(&join.right_table) {
            continue;
        }
        graph.edges.push(GraphEdge {
            id: format!("join_{}_{}", join.left_table, join.right_table),
            from: format!("table_{}", join.left_table),
            to: format!("table_{}", join.right_table),
            kind: EdgeKind::Join,
            label: format!("{} JOIN", join.join_type.as_str()),
            data: json!({
                "leftField": join.left_field,
                "rightField": join.right_field,
                "condition": join.condition,
            }),
        });
    }

    graph
}

fn table_node(table: &Table, kind: NodeKind) -> GraphNode {
    GraphNode {
        id: format!("table_{}", table.name),
        label: table.name.clone(),
        kind,
        data: json!({
            "fields": table.fields,
            "writtenBy": table.written_by,
        }),
    }
}
