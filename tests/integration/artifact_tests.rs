//! Integration tests for the written lineage artifacts

use std::fs;

use pretty_assertions::assert_eq;

use rust_sqllineage::export::read_lineage_json;
use rust_sqllineage::model::LineageDocument;

use crate::common::TestContext;

#[test]
fn test_lineage_document_written() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (_, output_path) = ctx.analyze_successfully();

    assert_eq!(output_path, ctx.output_dir.join("parsed_lineage.json"));
    let text = fs::read_to_string(&output_path).unwrap();
    let document: LineageDocument = serde_json::from_str(&text).unwrap();

    let bookings = &document.procedures["sp_load_fact_bookings"];
    assert_eq!(
        bookings.writes.iter().collect::<Vec<_>>(),
        vec!["fact_bookings"]
    );
    assert!(document.tables["fact_bookings"]
        .read_by
        .contains("sp_refresh_revenue"));
    assert!(document.tables.contains_key("dim_cabin"));
}

#[test]
fn test_round_trip_preserves_queries() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let (report, output_path) = ctx.analyze_successfully();

    let restored = read_lineage_json(&output_path).unwrap();

    for table in report.graph.table_names() {
        assert_eq!(
            report.graph.procedures_reading(table),
            restored.procedures_reading(table),
            "readers of {table}"
        );
        assert_eq!(
            report.graph.procedures_writing(table),
            restored.procedures_writing(table),
            "writers of {table}"
        );
    }
    assert_eq!(report.graph.to_serializable(), restored.to_serializable());
}

#[test]
fn test_default_output_path_in_dump_dir() {
    let ctx = TestContext::with_fixture("cruise_dump");
    let mut options = ctx.options();
    options.output_path = None;
    options.dot_path = None;

    let (_, output_path) = rust_sqllineage::analyze_dump(&options).unwrap();
    assert_eq!(output_path, ctx.dump_dir.join("parsed_lineage.json"));
    assert!(output_path.is_file());
    assert!(!ctx.output_dir.join("lineage_graph.dot").exists());
}

#[test]
fn test_dot_graph_written() {
    let ctx = TestContext::with_fixture("cruise_dump");
    ctx.analyze_successfully();

    let dot = fs::read_to_string(ctx.output_dir.join("lineage_graph.dot")).unwrap();
    assert!(dot.contains("digraph lineage {"));
    assert!(dot.contains("\"proc:sp_load_fact_bookings\" -> \"table:fact_bookings\""));
    assert!(dot.contains("\"table:dim_port\" -> \"proc:sp_port_report\""));
}

#[test]
fn test_inconsistent_document_rejected() {
    let ctx = TestContext::empty();
    let path = ctx.dump_dir.join("broken.json");
    fs::write(
        &path,
        r#"{"procedures": {"p": {"reads": ["a"], "writes": []}}, "tables": {"a": {"read_by": [], "written_by": []}}}"#,
    )
    .unwrap();

    let err = read_lineage_json(&path).unwrap_err();
    assert!(err.to_string().contains("inconsistent"), "{err}");
}
