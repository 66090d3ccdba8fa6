//! Table and field lineage: aggregates per-statement evidence into table
//! entities, field sets, computed fields, and the lineage map.

use std::collections::BTreeSet;

use crate::types::{ComputedField, DetailLevel, SqlStatement, StatementKind, Table, TableModel};

use super::features;
use super::helpers::strip_schema;
use super::normalize::flatten;

/// Builds the table model from the extracted statements.
///
/// Classification is decided once here and never revisited: a table is
/// temporary if some CREATE-TEMP statement targets it or its name looks
/// temporary; everything else is physical.
pub(crate) fn build(statements: &[SqlStatement], detail_level: DetailLevel) -> TableModel {
    let mut model = TableModel::default();

    // Pass 1: identify every temporary table name up front.
    let mut temp_names: BTreeSet<String> = BTreeSet::new();
    for statement in statements {
        if statement.kind == StatementKind::CreateTempTable {
            temp_names.extend(statement.target_tables.iter().cloned());
        }
        for table in statement
            .source_tables
            .iter()
            .chain(statement.target_tables.iter())
        {
            if is_temp_table_name(table) {
                temp_names.insert(table.clone());
            }
        }
    }

    // Pass 2: create tables and record write targets.
    for statement in statements {
        for table in &statement.target_tables {
            let entry = ensure_table(&mut model, &temp_names, table);
            entry.written_by.push(statement.id);
        }
        for table in &statement.source_tables {
            ensure_table(&mut model, &temp_names, table);
        }
    }

    // Pass 3: union every field reference into the owning table's field set.
    for statement in statements {
        for reference in statement
            .fields_read
            .iter()
            .chain(statement.fields_written.iter())
        {
            add_field(&mut model, &reference.table, &reference.field);
        }
        for join in &statement.join_conditions {
            if join.left_field != "unknown" {
                add_field(&mut model, &join.left_table, &join.left_field);
            }
            if join.right_field != "unknown" {
                add_field(&mut model, &join.right_table, &join.right_field);
            }
        }
        for filter in &statement.where_conditions {
            for reference in &filter.fields {
                add_field(&mut model, &reference.table, &reference.field);
            }
        }
    }

    if detail_level == DetailLevel::Basic {
        return model;
    }

    // Pass 4: attach computed fields from INSERT ... SELECT mappings.
    for statement in statements {
        if statement.kind != StatementKind::Insert {
            continue;
        }
        let Some(target) = statement.target_tables.first().cloned() else {
            continue;
        };
        let flat = flatten(&statement.text);
        let aliases = features::alias_map(&flat);

        for (target_field, expression) in features::insert_select_mapping(&flat) {
            if expression.contains("||") {
                let components = features::expression_fields(&expression, &aliases);
                for component in &components {
                    add_field(&mut model, &component.table, &component.field);
                }
                if let Some(table) = model.get_mut(&target) {
                    table.add_field(&target_field);
                    table.add_computed_field(ComputedField {
                        expression,
                        components,
                        target_field,
                    });
                }
            } else if let Some(table) = model.get_mut(&target) {
                // Simple mapping: only the target field name is guaranteed.
                table.add_field(&target_field);
            }
        }
    }

    // Pass 5: coarse lineage — every written field accumulates the writing
    // statement's full read list. Exact only in the computed-field case.
    for statement in statements {
        if statement.kind != StatementKind::Insert {
            continue;
        }
        for written in &statement.fields_written {
            let entry = model.lineage.entry(written.qualified()).or_default();
            entry.extend(statement.fields_read.iter().cloned());
        }
    }

    model
}

/// A table is temporary when its schema-stripped name contains `#` or starts
/// with `temp_`/`tmp_`, case-insensitively.
pub(crate) fn is_temp_table_name(name: &str) -> bool {
    let table_part = strip_schema(name).to_ascii_lowercase();
    table_part.contains('#') || table_part.starts_with("temp_") || table_part.starts_with("tmp_")
}

fn ensure_table<'a>(
    model: &'a mut TableModel,
    temp_names: &BTreeSet<String>,
    name: &str,
) -> &'a mut Table {
    let is_temporary = temp_names.contains(name);
    let map = if is_temporary {
        &mut model.temporary
    } else {
        &mut model.physical
    };
    map.entry(name.to_string())
        .or_insert_with(|| Table::new(name, is_temporary))
}

/// Idempotent union; references whose table never materialized (unresolvable
/// aliases) are dropped rather than creating phantom tables.
fn add_field(model: &mut TableModel, table: &str, field: &str) {
    if let Some(entry) = model.get_mut(table) {
        entry.add_field(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Issue;
    use rstest::rstest;

    fn extract(id: usize, text: &str) -> SqlStatement {
        let mut issues: Vec<Issue> = Vec::new();
        features::extract(id, text, &mut issues)
    }

    #[rstest]
    #[case("#results", true)]
    #[case("temp_balances", true)]
    #[case("TMP_ROLLUP", true)]
    #[case("hr.#staging", true)]
    #[case("hr.temp_load", true)]
    #[case("employees", false)]
    #[case("template_masters", false)]
    fn temp_name_predicate(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_temp_table_name(name), expected);
    }

    #[test]
    fn create_temp_statement_forces_temporary() {
        let statements = vec![
            extract(0, "CREATE GLOBAL TEMPORARY TABLE batch_work (id NUMBER)"),
            extract(1, "INSERT INTO batch_work (id) SELECT e.employee_id FROM employees e"),
        ];
        let model = build(&statements, DetailLevel::Full);
        assert!(model.temporary.contains_key("batch_work"));
        assert!(!model.physical.contains_key("batch_work"));
        assert!(model.physical.contains_key("employees"));
    }

    #[test]
    fn classification_is_fixed_at_creation() {
        // Read first as a source, later written: stays physical throughout.
        let statements = vec![
            extract(0, "SELECT e.salary FROM employees e WHERE e.salary > 0"),
            extract(1, "UPDATE employees SET salary = salary WHERE employee_id = p_id"),
        ];
        let model = build(&statements, DetailLevel::Full);
        let table = model.physical.get("employees").unwrap();
        assert!(!table.is_temporary);
        assert_eq!(table.written_by, vec![1]);
    }

    #[test]
    fn field_sets_union_from_all_evidence() {
        let statements = vec![extract(
            0,
            "UPDATE employees SET salary = salary WHERE employee_id = p_id",
        )];
        let model = build(&statements, DetailLevel::Full);
        let table = model.physical.get("employees").unwrap();
        assert!(table.fields.contains(&"salary".to_string()));
        assert!(table.fields.contains(&"employee_id".to_string()));
    }

    #[test]
    fn join_fields_land_on_both_tables() {
        let statements = vec![extract(
            0,
            "SELECT e.last_name FROM employees e JOIN departments d ON e.department_id = d.department_id",
        )];
        let model = build(&statements, DetailLevel::Full);
        assert!(model.physical.get("employees").unwrap().fields.contains(&"department_id".to_string()));
        assert!(model.physical.get("departments").unwrap().fields.contains(&"department_id".to_string()));
    }

    #[test]
    fn computed_field_from_concatenation() {
        let statements = vec![extract(
            0,
            "INSERT INTO report (full_name) SELECT e.first_name || ' ' || e.last_name FROM employees e",
        )];
        let model = build(&statements, DetailLevel::Full);

        let report = model.physical.get("report").unwrap();
        assert_eq!(report.computed_fields.len(), 1);
        let computed = &report.computed_fields[0];
        assert_eq!(computed.target_field, "full_name");
        let components: Vec<String> = computed.components.iter().map(|c| c.qualified()).collect();
        assert!(components.contains(&"employees.first_name".to_string()));
        assert!(components.contains(&"employees.last_name".to_string()));

        // Component fields propagate into the source table's field set.
        let employees = model.physical.get("employees").unwrap();
        assert!(employees.fields.contains(&"first_name".to_string()));
        assert!(employees.fields.contains(&"last_name".to_string()));
    }

    #[test]
    fn simple_mapping_adds_target_field_only() {
        let statements = vec![extract(
            0,
            "INSERT INTO summary (dept_id) SELECT d.department_id FROM departments d",
        )];
        let model = build(&statements, DetailLevel::Full);
        let summary = model.physical.get("summary").unwrap();
        assert!(summary.fields.contains(&"dept_id".to_string()));
        assert!(summary.computed_fields.is_empty());
    }

    #[test]
    fn lineage_maps_written_fields_to_statement_reads() {
        let statements = vec![extract(
            0,
            "INSERT INTO summary (dept_id, headcount) SELECT d.department_id, e.employee_id FROM departments d JOIN employees e ON e.department_id = d.department_id",
        )];
        let model = build(&statements, DetailLevel::Full);
        let sources = model.lineage.get("summary.dept_id").unwrap();
        assert!(sources.iter().any(|f| f.qualified() == "departments.department_id"));
        assert!(sources.iter().any(|f| f.qualified() == "employees.employee_id"));
    }

    #[test]
    fn basic_detail_skips_field_level_passes() {
        let statements = vec![extract(
            0,
            "INSERT INTO report (full_name) SELECT e.first_name || ' ' || e.last_name FROM employees e",
        )];
        let model = build(&statements, DetailLevel::Basic);
        assert!(model.lineage.is_empty());
        let report = model.physical.get("report").unwrap();
        assert!(report.computed_fields.is_empty());
    }
}
