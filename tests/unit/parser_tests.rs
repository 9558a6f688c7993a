//! Unit tests for statement splitting and reference extraction
//!
//! These go through the public parser API with a fixed registry of cruise
//! tables.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use rust_sqllineage::model::SchemaRegistry;
use rust_sqllineage::parser::{
    extract_sql_references, parse_routine_header, split_procedure, RoutineKind,
};
use rust_sqllineage::ParseWarning;

fn registry() -> SchemaRegistry {
    [
        "fact_bookings",
        "fact_revenue",
        "dim_passenger",
        "dim_segment",
        "dim_voyage",
        "dim_port",
        "a",
        "b",
        "t",
        "x",
    ]
    .into_iter()
    .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Statement classification
// ============================================================================

#[test]
fn test_truncate_is_write_only() {
    let refs = extract_sql_references("TRUNCATE TABLE x;", &registry());
    assert_eq!(refs.writes(), set(&["x"]));
    assert_eq!(refs.reads(), set(&[]));
}

#[test]
fn test_insert_select_with_join() {
    let sql = "INSERT INTO fact_bookings (booking_id, passenger_id) \
               SELECT p.id, s.id FROM dim_passenger p JOIN dim_segment s ON 1=1 \
               WHERE p.is_active = 1;";
    let refs = extract_sql_references(sql, &registry());
    assert_eq!(refs.writes(), set(&["fact_bookings"]));
    assert_eq!(refs.reads(), set(&["dim_passenger", "dim_segment"]));
}

#[test]
fn test_cte_name_excluded_body_kept() {
    let sql = "WITH tmp AS (SELECT * FROM dim_voyage v JOIN dim_port p ON p.id = v.port_id) \
               SELECT * FROM tmp";
    let refs = extract_sql_references(sql, &registry());
    assert_eq!(refs.reads(), set(&["dim_port", "dim_voyage"]));
    assert!(refs.warnings.is_empty(), "{:?}", refs.warnings);
}

#[test]
fn test_truncate_then_insert() {
    let refs = extract_sql_references("TRUNCATE TABLE a; INSERT INTO a SELECT * FROM b;", &registry());
    assert_eq!(refs.writes(), set(&["a"]));
    assert_eq!(refs.reads(), set(&["b"]));
}

#[test]
fn test_update_with_self_subquery() {
    let refs = extract_sql_references("UPDATE t SET x = (SELECT MAX(x) FROM t);", &registry());
    assert_eq!(refs.writes(), set(&["t"]));
    assert_eq!(refs.reads(), set(&["t"]));
}

#[test]
fn test_qualified_and_quoted_names() {
    let sql = "INSERT INTO `cruise`.`Fact_Revenue` SELECT * FROM cruise.dim_voyage;";
    let refs = extract_sql_references(sql, &registry());
    assert_eq!(refs.writes(), set(&["fact_revenue"]));
    assert_eq!(refs.reads(), set(&["dim_voyage"]));
}

#[test]
fn test_unregistered_table_warns_and_is_dropped() {
    let refs = extract_sql_references("INSERT INTO staging_tmp SELECT * FROM a;", &registry());
    assert_eq!(refs.writes(), set(&[]));
    assert_eq!(refs.reads(), set(&["a"]));
    assert_eq!(
        refs.warnings,
        vec![ParseWarning::UnregisteredTable {
            name: "staging_tmp".to_string(),
            statement: 1,
        }]
    );
}

#[test]
fn test_keywords_inside_strings_ignored() {
    let sql = "INSERT INTO a SELECT 'DELETE FROM b' FROM dim_port;";
    let refs = extract_sql_references(sql, &registry());
    assert_eq!(refs.writes(), set(&["a"]));
    assert_eq!(refs.reads(), set(&["dim_port"]));
}

#[test]
fn test_dynamic_sql_warns() {
    let refs = extract_sql_references("PREPARE s FROM @sql; EXECUTE s;", &registry());
    assert!(refs.references.is_empty());
    assert_eq!(
        refs.warnings
            .iter()
            .filter(|w| matches!(w, ParseWarning::DynamicSql { .. }))
            .count(),
        2
    );
}

#[test]
fn test_unterminated_quote_keeps_prefix() {
    let refs = extract_sql_references("DELETE FROM a; SELECT 'oops FROM b;", &registry());
    assert_eq!(refs.writes(), set(&["a"]));
    assert!(refs
        .warnings
        .iter()
        .any(|w| matches!(w, ParseWarning::UnterminatedQuote { .. })));
}

// ============================================================================
// Routine headers and splitting
// ============================================================================

#[test]
fn test_routine_header_with_definer() {
    let header = parse_routine_header(
        "CREATE DEFINER=`etl`@`%` PROCEDURE `cruise`.`sp_Load`(IN p INT)\nBEGIN\n  SELECT 1;\nEND",
    )
    .unwrap();
    assert_eq!(header.kind, RoutineKind::Procedure);
    assert_eq!(header.name, "sp_Load");
    assert_eq!(header.schema.as_deref(), Some("cruise"));
}

#[test]
fn test_function_header() {
    let header =
        parse_routine_header("CREATE FUNCTION f(x INT) RETURNS INT DETERMINISTIC BEGIN RETURN x; END")
            .unwrap();
    assert_eq!(header.kind, RoutineKind::Function);
}

#[test]
fn test_split_procedure_body() {
    let sql = "DELIMITER //\nCREATE PROCEDURE p()\nBEGIN\n  DELETE FROM a;\n  INSERT INTO a SELECT * FROM b;\nEND //\nDELIMITER ;\n";
    let result = split_procedure(sql);
    assert!(result.header.is_some());
    let texts: Vec<&str> = result.statements.iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(texts, vec!["DELETE FROM a", "INSERT INTO a SELECT * FROM b"]);
    assert!(result.warnings.is_empty());
}
