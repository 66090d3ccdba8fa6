use super::*;
use crate::types::{AnalysisOptions, DetailLevel, JoinType, ParamDirection, StatementKind};
use proptest::prelude::*;

fn make_request(text: &str) -> AnalyzeRequest {
    AnalyzeRequest::new(text)
}

fn run(text: &str) -> AnalysisResult {
    analyze(&make_request(text))
}

const MINIMAL: &str = "\
CREATE OR REPLACE PROCEDURE p(p_id IN NUMBER) AS
BEGIN
  UPDATE employees SET salary = salary WHERE employee_id = p_id;
END;";

#[test]
fn minimal_round_trip() {
    let result = run(MINIMAL);

    assert_eq!(result.procedure_name, "p");

    assert_eq!(result.parameters.len(), 1);
    let parameter = &result.parameters[0];
    assert_eq!(parameter.name, "p_id");
    assert_eq!(parameter.direction, ParamDirection::In);
    assert_eq!(parameter.data_type, "NUMBER");
    assert_eq!(parameter.used_in_statements.len(), 1);

    assert_eq!(result.statements.len(), 1);
    assert_eq!(result.statements[0].kind, StatementKind::Update);

    assert_eq!(result.tables.physical.len(), 1);
    let employees = result.tables.physical.get("employees").unwrap();
    assert!(!employees.is_temporary);
    assert!(employees.fields.contains(&"salary".to_string()));
    assert!(employees.fields.contains(&"employee_id".to_string()));

    assert!(result.conditions.joins.is_empty());
    assert_eq!(result.summary.join_count, 0);
}

#[test]
fn analysis_is_deterministic() {
    let text = "\
CREATE OR REPLACE PROCEDURE refresh_report(p_dept IN NUMBER, p_cutoff IN DATE) AS
BEGIN
  CREATE GLOBAL TEMPORARY TABLE tmp_staging (emp_id NUMBER, full_name VARCHAR2(200));
  INSERT INTO tmp_staging (emp_id, full_name)
  SELECT e.employee_id, e.first_name || ' ' || e.last_name
  FROM employees e
  JOIN departments d ON e.department_id = d.department_id
  WHERE d.department_id = p_dept;
  IF v_count > 0 THEN
    DELETE FROM report_rows WHERE cutoff_date < p_cutoff;
  END IF;
END;";
    let mut request = make_request(text);
    request.options.include_visualization = true;

    let first = serde_json::to_string(&analyze(&request)).unwrap();
    let second = serde_json::to_string(&analyze(&request)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_insert_has_exactly_one_target() {
    let result = run("\
CREATE PROCEDURE load_all AS
BEGIN
  INSERT INTO summary (dept_id) SELECT d.department_id FROM departments d;
  INSERT INTO archive_rows SELECT r.id FROM report_rows r;
END;");
    let inserts: Vec<_> = result
        .statements
        .iter()
        .filter(|s| s.kind == StatementKind::Insert)
        .collect();
    assert_eq!(inserts.len(), 2);
    for insert in inserts {
        assert_eq!(insert.target_tables.len(), 1);
    }
}

#[test]
fn update_table_appears_in_source_and_target() {
    let result = run(MINIMAL);
    let update = &result.statements[0];
    assert!(update.source_tables.contains(&"employees".to_string()));
    assert!(update.target_tables.contains(&"employees".to_string()));
}

#[test]
fn parameter_usage_matches_raw_text_scan() {
    let result = run("\
CREATE PROCEDURE sync(p_id IN NUMBER, p_status IN VARCHAR2, p_unused IN NUMBER) AS
BEGIN
  UPDATE employees SET status_code = p_status WHERE employee_id = p_id;
  DELETE FROM audit_log WHERE employee_id = p_id;
  INSERT INTO history (emp_id) SELECT e.employee_id FROM employees e;
END;");

    for parameter in &result.parameters {
        let token = regex::Regex::new(&format!(r"\b{}\b", regex::escape(&parameter.name))).unwrap();
        let expected: Vec<usize> = result
            .statements
            .iter()
            .filter(|s| token.is_match(&s.text))
            .map(|s| s.id)
            .collect();
        assert_eq!(
            parameter.used_in_statements, expected,
            "usage list for {} diverges from raw-text scan",
            parameter.name
        );
    }
    let unused = result
        .parameters
        .iter()
        .find(|p| p.name == "p_unused")
        .unwrap();
    assert!(unused.used_in_statements.is_empty());
}

#[test]
fn temporary_tables_satisfy_the_classification_rule() {
    let result = run("\
CREATE PROCEDURE stage AS
BEGIN
  CREATE GLOBAL TEMPORARY TABLE batch_work (id NUMBER);
  INSERT INTO batch_work (id) SELECT e.employee_id FROM employees e;
  INSERT INTO tmp_rollup (id) SELECT b.id FROM batch_work b;
  UPDATE hr.#scratch SET flag = flag WHERE run_id = p_run;
END;");

    assert!(!result.tables.temporary.is_empty());
    let created_by_temp_statement: Vec<&String> = result
        .statements
        .iter()
        .filter(|s| s.kind == StatementKind::CreateTempTable)
        .flat_map(|s| s.target_tables.iter())
        .collect();

    for (name, table) in &result.tables.temporary {
        assert!(table.is_temporary);
        assert!(
            created_by_temp_statement.contains(&name) || lineage::is_temp_table_name(name),
            "{name} is marked temporary without satisfying the rule"
        );
    }
    assert!(result.tables.temporary.contains_key("batch_work"));
    assert!(result.tables.temporary.contains_key("tmp_rollup"));
    assert!(result.tables.temporary.contains_key("hr.#scratch"));
    assert!(result.tables.physical.contains_key("employees"));
}

#[test]
fn join_scenario() {
    let result = run("\
CREATE PROCEDURE j AS
BEGIN
  SELECT e.last_name FROM employees e JOIN departments d ON e.department_id = d.department_id;
END;");

    assert_eq!(result.conditions.joins.len(), 1);
    let join = &result.conditions.joins[0];
    assert_eq!(join.left_table, "employees");
    assert_eq!(join.left_field, "department_id");
    assert_eq!(join.right_table, "departments");
    assert_eq!(join.right_field, "department_id");
    assert_eq!(join.join_type, JoinType::Inner);
}

#[test]
fn computed_field_scenario() {
    let result = run("\
CREATE PROCEDURE c AS
BEGIN
  INSERT INTO t SELECT e.first_name || ' ' || e.last_name FROM employees e;
END;");

    let table = result.tables.physical.get("t").unwrap();
    assert_eq!(table.computed_fields.len(), 1);
    let qualified: Vec<String> = table.computed_fields[0]
        .components
        .iter()
        .map(|c| c.qualified())
        .collect();
    assert!(qualified.contains(&"employees.first_name".to_string()));
    assert!(qualified.contains(&"employees.last_name".to_string()));
}

#[test]
fn statement_nested_in_if_appears_exactly_once() {
    let result = run("\
CREATE PROCEDURE guard(p_id IN NUMBER) AS
BEGIN
  IF v_exists > 0 THEN
    UPDATE employees SET salary = salary WHERE employee_id = p_id;
  END IF;
END;");

    let updates: Vec<_> = result
        .statements
        .iter()
        .filter(|s| s.kind == StatementKind::Update)
        .collect();
    assert_eq!(updates.len(), 1);

    // The IF header is summarized as control-flow metadata.
    assert_eq!(result.conditions.control_flow.len(), 1);
    assert_eq!(result.conditions.control_flow[0].kind, StatementKind::If);
}

#[test]
fn missing_header_recovers_with_sentinel() {
    let result = run("BEGIN\nUPDATE t SET a = 1 WHERE b = 2;\nEND;");
    assert_eq!(result.procedure_name, "unknown_procedure");
    assert!(result.parameters.is_empty());
    assert!(result
        .issues
        .iter()
        .any(|i| i.code == issue_codes::MALFORMED_SIGNATURE));
    // Statements are still extracted.
    assert_eq!(result.statements.len(), 1);
}

#[test]
fn empty_input_yields_empty_result() {
    let result = run("");
    assert_eq!(result.procedure_name, "unknown_procedure");
    assert!(result.statements.is_empty());
    assert!(result.tables.physical.is_empty());
    assert_eq!(result.summary.statement_count, 0);
    // Empty input is not an EMPTY_BODY diagnostic; there is nothing to scan.
    assert!(!result.issues.iter().any(|i| i.code == issue_codes::EMPTY_BODY));
}

#[test]
fn body_without_begin_reports_empty_body() {
    let result = run("CREATE PROCEDURE p AS SELECT 1 FROM dual");
    assert!(result
        .issues
        .iter()
        .any(|i| i.code == issue_codes::EMPTY_BODY));
    assert!(result.statements.is_empty());
}

#[test]
fn visualization_graph_is_opt_in() {
    assert!(run(MINIMAL).graph.is_none());

    let mut request = make_request(MINIMAL);
    request.options.include_visualization = true;
    let graph = analyze(&request).graph.unwrap();
    assert!(graph.nodes.iter().any(|n| n.id == "param_p_id"));
    assert!(graph.nodes.iter().any(|n| n.id == "table_employees"));
}

#[test]
fn basic_detail_level_omits_lineage() {
    let text = "\
CREATE PROCEDURE d AS
BEGIN
  INSERT INTO t (ab) SELECT e.a || e.b FROM employees e;
END;";
    let mut request = make_request(text);
    request.options = AnalysisOptions {
        include_visualization: false,
        detail_level: DetailLevel::Basic,
    };
    let result = analyze(&request);
    assert!(result.tables.lineage.is_empty());
    assert!(result.tables.physical.get("t").unwrap().computed_fields.is_empty());

    // Full keeps them.
    let full = run(text);
    assert!(!full.tables.physical.get("t").unwrap().computed_fields.is_empty());
}

#[test]
fn cursor_declarations_are_collected() {
    let result = run("\
CREATE PROCEDURE with_cursor AS
  CURSOR c_emps IS SELECT employee_id FROM employees;
BEGIN
  UPDATE employees SET flag = flag WHERE employee_id = p_id;
END;");
    assert_eq!(result.cursors.len(), 1);
    assert_eq!(result.cursors[0].name, "c_emps");
}

#[test]
fn statement_ids_are_stable_and_sequential() {
    let result = run("\
CREATE PROCEDURE seq AS
BEGIN
  UPDATE t1 SET a = 1 WHERE b = 2;
  DELETE FROM t2 WHERE c = 3;
  INSERT INTO t3 (d) SELECT s.d FROM src s;
END;");
    let ids: Vec<usize> = result.statements.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn split_statements_previews_segments() {
    let segments = split_statements(MINIMAL);
    assert_eq!(segments.len(), 1);
    assert!(segments[0].starts_with("UPDATE employees"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn analyze_never_panics(text in "\\PC{0,400}") {
        let _ = run(&text);
    }

    #[test]
    fn analyze_is_pure(text in "\\PC{0,200}") {
        let first = serde_json::to_string(&run(&text)).unwrap();
        let second = serde_json::to_string(&run(&text)).unwrap();
        prop_assert_eq!(first, second);
    }
}
