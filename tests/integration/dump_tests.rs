//! Integration tests for the dump analysis workflow

use pretty_assertions::assert_eq;

use rust_sqllineage::model::{build_lineage, ParseOptions};
use rust_sqllineage::project::{load_dump, DumpPatterns};
use rust_sqllineage::{LineageError, ParseWarning};

use crate::common::{fixture_path, names, TestContext};

fn sorted(set: &std::collections::BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_cruise_dump() {
    let contents = load_dump(&fixture_path("cruise_dump"), &DumpPatterns::default()).unwrap();

    // nine table files plus dim_cabin from dump_meta.json
    assert_eq!(contents.tables.len(), 10);

    let hints: Vec<_> = contents
        .procedures
        .iter()
        .filter_map(|p| p.name_hint.as_deref())
        .collect();
    assert_eq!(
        hints,
        vec![
            "sp_flag_old_ships",
            "sp_load_fact_bookings",
            "sp_port_report",
            "sp_refresh_revenue",
            "sp_update_occupancy",
        ]
    );

    assert_eq!(contents.skipped.len(), 1);
    assert!(contents.skipped[0].origin.ends_with("fn_total_fare.sql"));
}

// ============================================================================
// Per-procedure lineage
// ============================================================================

#[test]
fn test_cruise_dump_lineage() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();
    let graph = &report.graph;

    assert_eq!(graph.len(), 5);

    let bookings = "sp_load_fact_bookings";
    assert_eq!(sorted(graph.tables_written_by(bookings).unwrap()), names(&["fact_bookings"]));
    assert_eq!(
        sorted(graph.tables_read_by(bookings).unwrap()),
        names(&["dim_passenger", "dim_segment"])
    );

    let revenue = "sp_refresh_revenue";
    assert_eq!(sorted(graph.tables_written_by(revenue).unwrap()), names(&["fact_revenue"]));
    assert_eq!(
        sorted(graph.tables_read_by(revenue).unwrap()),
        names(&["dim_segment", "fact_bookings"])
    );

    let occupancy = "sp_update_occupancy";
    assert_eq!(sorted(graph.tables_written_by(occupancy).unwrap()), names(&["fact_occupancy"]));
    assert_eq!(
        sorted(graph.tables_read_by(occupancy).unwrap()),
        names(&["dim_ship", "dim_voyage", "fact_bookings"])
    );

    let report_proc = "sp_port_report";
    assert!(graph.tables_written_by(report_proc).unwrap().is_empty());
    assert_eq!(sorted(graph.tables_read_by(report_proc).unwrap()), names(&["dim_port"]));

    let flag = "sp_flag_old_ships";
    assert_eq!(sorted(graph.tables_written_by(flag).unwrap()), names(&["dim_ship"]));
    assert_eq!(
        sorted(graph.tables_read_by(flag).unwrap()),
        names(&["dim_cruise_companies"])
    );
}

#[test]
fn test_every_referenced_table_is_registered() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();
    let graph = &report.graph;

    let tables: Vec<&str> = graph.table_names().collect();
    for procedure in graph.procedure_names() {
        let reads = graph.tables_read_by(procedure).unwrap();
        let writes = graph.tables_written_by(procedure).unwrap();
        for table in reads.iter().chain(writes) {
            assert!(
                tables.contains(&table.as_str()),
                "{procedure} references unregistered table {table}"
            );
        }
    }
}

#[test]
fn test_unreferenced_tables_included() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();

    let cabin = report.graph.table("dim_cabin").unwrap();
    assert!(cabin.read_by.is_empty());
    assert!(cabin.written_by.is_empty());
    assert_eq!(report.graph.table_count(), 10);
}

#[test]
fn test_unreferenced_tables_excluded() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let mut options = ctx.options();
    options.parse.include_unreferenced_tables = false;
    let report = rust_sqllineage::analyze_dir(&options).unwrap();

    assert!(matches!(
        report.graph.table("dim_cabin"),
        Err(LineageError::UnknownTable { .. })
    ));
}

#[test]
fn test_table_queries() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();
    let graph = &report.graph;

    assert_eq!(
        sorted(graph.procedures_reading("fact_bookings")),
        names(&["sp_refresh_revenue", "sp_update_occupancy"])
    );
    assert_eq!(
        sorted(graph.procedures_writing("fact_bookings")),
        names(&["sp_load_fact_bookings"])
    );
    assert_eq!(
        sorted(graph.procedures_writing("dim_ship")),
        names(&["sp_flag_old_ships"])
    );
    assert!(graph.procedures_reading("no_such_table").is_empty());
}

// ============================================================================
// Warnings and skipped inputs
// ============================================================================

#[test]
fn test_warnings_attached_to_procedures() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();

    let occupancy = &report.warnings["sp_update_occupancy"];
    assert!(occupancy.iter().any(|w| matches!(
        w,
        ParseWarning::UnregisteredTable { name, .. } if name == "tmp_voyage_load"
    )));

    let dynamic = report.warnings["sp_port_report"]
        .iter()
        .filter(|w| matches!(w, ParseWarning::DynamicSql { .. }))
        .count();
    assert_eq!(dynamic, 2, "PREPARE and EXECUTE each warn, DEALLOCATE does not");

    assert_eq!(
        report.warnings["sp_flag_old_ships"],
        vec![ParseWarning::MissingProcedureHeader]
    );
    assert!(!report.warnings.contains_key("sp_load_fact_bookings"));
}

#[test]
fn test_function_reported_as_skipped() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, _) = ctx.analyze_successfully();

    assert!(report
        .skipped
        .iter()
        .any(|s| s.origin.ends_with("fn_total_fare.sql") && s.reason == "function definition"));
    assert!(report.graph.tables_read_by("fn_total_fare").is_err());
}

#[test]
fn test_exclude_self_references() {
    let ctx = TestContext::empty();
    ctx.write_file("table__t.sql", "CREATE TABLE t (x INT)");
    ctx.write_file(
        "sp_bump.sql",
        "CREATE PROCEDURE sp_bump() BEGIN UPDATE t SET x = (SELECT MAX(x) FROM t); END",
    );

    let report = rust_sqllineage::analyze_dir(&ctx.options()).unwrap();
    assert_eq!(sorted(report.graph.tables_read_by("sp_bump").unwrap()), names(&["t"]));

    let mut options = ctx.options();
    options.parse.exclude_self_references = true;
    let report = rust_sqllineage::analyze_dir(&options).unwrap();
    assert!(report.graph.tables_read_by("sp_bump").unwrap().is_empty());
    assert_eq!(sorted(report.graph.tables_written_by("sp_bump").unwrap()), names(&["t"]));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_duplicate_procedure_names_fail() {
    let ctx = TestContext::empty();
    ctx.write_file("table__a.sql", "CREATE TABLE a (id INT)");
    ctx.write_file("first.sql", "CREATE PROCEDURE sp_dup() BEGIN DELETE FROM a; END");
    ctx.write_file("second.sql", "CREATE PROCEDURE SP_DUP() BEGIN SELECT * FROM a; END");

    let err = rust_sqllineage::analyze_dir(&ctx.options()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LineageError>(),
        Some(LineageError::DuplicateProcedure { .. })
    ));
}

#[test]
fn test_dump_without_procedures_fails() {
    let ctx = TestContext::empty();
    ctx.write_file("table__a.sql", "CREATE TABLE a (id INT)");

    let err = rust_sqllineage::analyze_dir(&ctx.options()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LineageError>(),
        Some(LineageError::EmptyInput { kind: "procedure" })
    ));
}

#[test]
fn test_parse_twice_is_deterministic() {
    let contents = load_dump(&fixture_path("cruise_dump"), &DumpPatterns::default()).unwrap();
    let options = ParseOptions::default();

    let first = build_lineage(&contents.tables, &contents.procedures, &options).unwrap();
    let second = build_lineage(&contents.tables, &contents.procedures, &options).unwrap();

    assert_eq!(
        first.graph.to_serializable(),
        second.graph.to_serializable()
    );
    assert_eq!(first.graph.edges(), second.graph.edges());
}
