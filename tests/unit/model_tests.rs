//! Unit tests for lineage model building

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use rust_sqllineage::model::{
    build_lineage, build_registry, Direction, LineageEdge, LineageGraph, ParseOptions,
    ProcedureSource, SchemaRegistry, TableSource,
};
use rust_sqllineage::LineageError;

fn tables(names: &[&str]) -> Vec<TableSource> {
    names
        .iter()
        .map(|name| {
            TableSource::new(
                format!("table__{name}.sql"),
                format!("CREATE TABLE `{name}` (id INT)"),
            )
        })
        .collect()
}

fn procedure(name: &str, body: &str) -> ProcedureSource {
    ProcedureSource::new(
        format!("{name}.sql"),
        format!("CREATE PROCEDURE {name}()\nBEGIN\n{body}\nEND"),
    )
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_canonicalizes() {
    let registry: SchemaRegistry = ["`Cruise`.`Dim_Port`", "fact_bookings"].into_iter().collect();
    assert!(registry.contains("dim_port"));
    assert!(registry.contains("[DIM_PORT]"));
    assert!(registry.contains("other_db.fact_bookings"));
    assert!(!registry.contains("dim_ship"));
}

#[test]
fn test_registry_from_placeholder_ddl() {
    let sources = vec![
        TableSource::new("table__a.sql", "CREATE TABLE a (id INT)"),
        TableSource::new("table__b.sql", "-- No DDL for b").with_fallback_name("b"),
        TableSource::new("notes.sql", "-- nothing here"),
    ];
    let (registry, skipped) = build_registry(&sources);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].origin, "notes.sql");
}

// ============================================================================
// Building
// ============================================================================

#[test]
fn test_build_lineage_basic() {
    let report = build_lineage(
        &tables(&["a", "b", "c"]),
        &[
            procedure("sp_one", "TRUNCATE TABLE a;\nINSERT INTO a SELECT * FROM b;"),
            procedure("sp_two", "SELECT * FROM a;"),
        ],
        &ParseOptions::default(),
    )
    .unwrap();
    let graph = &report.graph;

    assert_eq!(graph.tables_written_by("sp_one").unwrap(), &set(&["a"]));
    assert_eq!(graph.tables_read_by("sp_one").unwrap(), &set(&["b"]));
    assert_eq!(graph.procedures_reading("a"), &set(&["sp_two"]));
    assert_eq!(graph.table("c").unwrap().read_by, set(&[]));
    assert_eq!(
        graph.statements_of("sp_one").unwrap(),
        &["TRUNCATE TABLE a".to_string(), "INSERT INTO a SELECT * FROM b".to_string()]
    );
    assert!(report.warnings.is_empty());
}

#[test]
fn test_empty_inputs_rejected() {
    let err = build_lineage(&[], &[procedure("p", "SELECT 1;")], &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, LineageError::EmptyInput { kind: "table" }));

    let err = build_lineage(&tables(&["a"]), &[], &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, LineageError::EmptyInput { kind: "procedure" }));
}

#[test]
fn test_unnamed_procedure_rejected() {
    let source = ProcedureSource::new("anonymous.sql", "BEGIN DELETE FROM a; END");
    let err = build_lineage(&tables(&["a"]), &[source], &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, LineageError::UnnamedProcedure { origin } if origin == "anonymous.sql"));
}

#[test]
fn test_name_hint_used_without_header() {
    let source =
        ProcedureSource::new("sp_hint.sql", "BEGIN DELETE FROM a; END").with_name_hint("sp_hint");
    let report = build_lineage(&tables(&["a"]), &[source], &ParseOptions::default()).unwrap();
    assert_eq!(report.graph.tables_written_by("sp_hint").unwrap(), &set(&["a"]));
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let names: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let table_sources = tables(&name_refs);
    let procedures: Vec<ProcedureSource> = (0..19)
        .map(|i| {
            procedure(
                &format!("sp_{i}"),
                &format!("INSERT INTO t{} SELECT * FROM t{};", i + 1, i),
            )
        })
        .collect();

    let parallel = ParseOptions {
        parallel_threshold: 1,
        ..Default::default()
    };
    let sequential = ParseOptions {
        parallel_threshold: usize::MAX,
        ..Default::default()
    };

    let a = build_lineage(&table_sources, &procedures, &parallel).unwrap();
    let b = build_lineage(&table_sources, &procedures, &sequential).unwrap();
    assert_eq!(a.graph.to_serializable(), b.graph.to_serializable());
    assert_eq!(a.graph.len(), 19);
}

// ============================================================================
// Graph
// ============================================================================

#[test]
fn test_edges_are_directed_and_sorted() {
    let mut graph = LineageGraph::new();
    graph.add_procedure("p", ["src"], ["dst"]).unwrap();

    assert_eq!(
        graph.edges(),
        vec![
            LineageEdge {
                from: "p".to_string(),
                to: "dst".to_string(),
                direction: Direction::Write,
            },
            LineageEdge {
                from: "src".to_string(),
                to: "p".to_string(),
                direction: Direction::Read,
            },
        ]
    );
}

#[test]
fn test_duplicate_procedure_leaves_graph_unchanged() {
    let mut graph = LineageGraph::new();
    graph.add_procedure("sp_load", ["a"], ["b"]).unwrap();
    let before = graph.to_serializable();

    let err = graph.add_procedure("SP_LOAD", ["c"], ["d"]).unwrap_err();
    assert!(matches!(err, LineageError::DuplicateProcedure { .. }));
    assert_eq!(graph.to_serializable(), before);
}

#[test]
fn test_unknown_lookups() {
    let graph = LineageGraph::new();
    assert!(matches!(
        graph.tables_read_by("missing"),
        Err(LineageError::UnknownProcedure { .. })
    ));
    assert!(matches!(
        graph.table("missing"),
        Err(LineageError::UnknownTable { .. })
    ));
    assert!(graph.procedures_writing("missing").is_empty());
    assert!(graph.is_empty());
}
