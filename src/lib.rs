//! rust-sqllineage: table-level data lineage for MySQL stored procedures
//!
//! This library reads a schema dump (table definitions and stored procedure
//! bodies), works out which tables each procedure reads and writes, and
//! produces a bipartite lineage graph that can be queried or exported.

pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod project;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use error::LineageError;
pub use model::{
    build_lineage, Direction, LineageGraph, LineageReport, ParseOptions, ProcedureSource,
    TableSource,
};
pub use parser::ParseWarning;

/// Default file name of the lineage document
pub const LINEAGE_FILE_NAME: &str = "parsed_lineage.json";

/// Default file name of the Graphviz export
pub const GRAPH_FILE_NAME: &str = "lineage_graph.dot";

/// Options for analyzing a dump directory
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Directory holding `table__*.sql` and routine files
    pub dump_dir: PathBuf,
    /// Output path for the lineage document (defaults to `<dump_dir>/parsed_lineage.json`)
    pub output_path: Option<PathBuf>,
    /// Output path for the DOT graph, if one is wanted
    pub dot_path: Option<PathBuf>,
    pub patterns: project::DumpPatterns,
    pub parse: ParseOptions,
}

impl AnalyzeOptions {
    pub fn new(dump_dir: impl Into<PathBuf>) -> Self {
        Self {
            dump_dir: dump_dir.into(),
            output_path: None,
            dot_path: None,
            patterns: project::DumpPatterns::default(),
            parse: ParseOptions::default(),
        }
    }

    /// Where the lineage document will be written
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.dump_dir.join(LINEAGE_FILE_NAME))
    }
}

/// Analyze a dump directory without writing anything.
pub fn analyze_dir(options: &AnalyzeOptions) -> Result<LineageReport> {
    let dump_dir = options.dump_dir.as_path();
    info!(dump_dir = %dump_dir.display(), "loading dump");

    // Step 1: Find and read the dump files
    let contents = project::load_dump(dump_dir, &options.patterns)
        .with_context(|| format!("Failed to load dump directory {}", dump_dir.display()))?;
    info!(
        tables = contents.tables.len(),
        procedures = contents.procedures.len(),
        skipped = contents.skipped.len(),
        "loaded dump"
    );

    // Step 2: Parse procedures and build the graph
    let mut report = build_lineage(&contents.tables, &contents.procedures, &options.parse)?;
    let mut skipped = contents.skipped;
    skipped.append(&mut report.skipped);
    report.skipped = skipped;

    for skipped in &report.skipped {
        warn!(origin = %skipped.origin, reason = %skipped.reason, "input skipped");
    }
    info!(
        procedures = report.graph.len(),
        tables = report.graph.table_count(),
        warnings = report.warning_count(),
        "built lineage graph"
    );

    Ok(report)
}

/// Analyze a dump directory and write the lineage artifacts.
///
/// Returns the report together with the path of the written document.
pub fn analyze_dump(options: &AnalyzeOptions) -> Result<(LineageReport, PathBuf)> {
    let report = analyze_dir(options)?;

    // Step 3: Write the lineage document
    let output_path = options.resolved_output_path();
    export::write_lineage_json(&report.graph, &output_path)?;
    info!(path = %output_path.display(), "wrote lineage document");

    // Step 4: Optional graph export
    if let Some(dot_path) = &options.dot_path {
        export::write_dot(&report.graph, dot_path)?;
        info!(path = %dot_path.display(), "wrote lineage graph");
    }

    Ok((report, output_path))
}
