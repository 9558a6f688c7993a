//! Build a lineage graph from table and procedure definitions
//!
//! Table definitions seed the [`SchemaRegistry`]; each procedure is then
//! split, extracted and aggregated independently (in parallel for larger
//! inputs) and the results are inserted into the [`LineageGraph`] one at a
//! time in input order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::LineageError;
use crate::parser::{extract_references, split_procedure, ParseWarning};

use super::{aggregate, LineageGraph, ProcedureLineage, SchemaRegistry};

/// Minimum number of procedures before parsing switches to rayon
pub const PARALLEL_THRESHOLD: usize = 8;

/// Options controlling a parse run
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Drop tables a procedure also writes from its reads
    pub exclude_self_references: bool,
    /// Keep registered tables that no procedure references in the graph
    pub include_unreferenced_tables: bool,
    /// Procedure count at which parsing runs in parallel
    pub parallel_threshold: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            exclude_self_references: false,
            include_unreferenced_tables: true,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

/// Raw `CREATE TABLE` text plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    /// File path or other label used in diagnostics
    pub origin: String,
    pub sql: String,
    /// Name to register when the text holds no `CREATE TABLE`
    pub fallback_name: Option<String>,
}

impl TableSource {
    pub fn new(origin: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            sql: sql.into(),
            fallback_name: None,
        }
    }

    pub fn with_fallback_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_name = Some(name.into());
        self
    }
}

/// Raw routine definition plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSource {
    /// File path or other label used in diagnostics
    pub origin: String,
    pub sql: String,
    /// Name to use when the text has no `CREATE PROCEDURE` header
    pub name_hint: Option<String>,
}

impl ProcedureSource {
    pub fn new(origin: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            sql: sql.into(),
            name_hint: None,
        }
    }

    pub fn with_name_hint(mut self, name: impl Into<String>) -> Self {
        self.name_hint = Some(name.into());
        self
    }
}

/// An input that contributed nothing to the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub origin: String,
    pub reason: String,
}

/// Outcome of a parse run
#[derive(Debug, Clone, Default)]
pub struct LineageReport {
    pub graph: LineageGraph,
    /// Parse warnings per procedure; procedures without warnings are absent
    pub warnings: BTreeMap<String, Vec<ParseWarning>>,
    pub skipped: Vec<SkippedInput>,
}

impl LineageReport {
    /// Total number of warnings across all procedures
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }
}

/// Build the registry from table definitions.
///
/// Inputs with neither a `CREATE TABLE` nor a fallback name are returned as
/// skipped.
pub fn build_registry(tables: &[TableSource]) -> (SchemaRegistry, Vec<SkippedInput>) {
    let mut registry = SchemaRegistry::new();
    let mut skipped = Vec::new();

    for source in tables {
        let names = registry.register_definition(&source.sql);
        if !names.is_empty() {
            debug!(origin = %source.origin, tables = ?names, "registered table definition");
            continue;
        }
        match source
            .fallback_name
            .as_deref()
            .and_then(|name| registry.register(name))
        {
            Some(name) => {
                debug!(origin = %source.origin, table = %name, "registered table from fallback name")
            }
            None => skipped.push(SkippedInput {
                origin: source.origin.clone(),
                reason: "no CREATE TABLE statement and no fallback name".to_string(),
            }),
        }
    }

    (registry, skipped)
}

/// Parse one procedure definition into its aggregated lineage.
///
/// The name comes from the `CREATE PROCEDURE` header, else from the source's
/// name hint. Malformed SQL never fails here; it only adds warnings.
pub fn parse_procedure(
    source: &ProcedureSource,
    registry: &SchemaRegistry,
    options: &ParseOptions,
) -> Result<ProcedureLineage, LineageError> {
    let split = split_procedure(&source.sql);

    let name = split
        .header
        .as_ref()
        .map(|h| h.name.clone())
        .or_else(|| source.name_hint.clone())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| LineageError::UnnamedProcedure {
            origin: source.origin.clone(),
        })?;

    let statement_refs = split
        .statements
        .iter()
        .map(|statement| extract_references(statement, registry));
    let mut lineage = aggregate(&name, statement_refs, options.exclude_self_references);

    lineage.statements = split.statements.into_iter().map(|s| s.sql).collect();
    let mut warnings = split.warnings;
    warnings.append(&mut lineage.warnings);
    lineage.warnings = warnings;

    Ok(lineage)
}

/// Build the lineage graph for a set of table and procedure definitions.
pub fn build_lineage(
    tables: &[TableSource],
    procedures: &[ProcedureSource],
    options: &ParseOptions,
) -> Result<LineageReport, LineageError> {
    if tables.is_empty() {
        return Err(LineageError::EmptyInput { kind: "table" });
    }
    if procedures.is_empty() {
        return Err(LineageError::EmptyInput { kind: "procedure" });
    }

    let (registry, mut skipped) = build_registry(tables);
    info!(
        tables = registry.len(),
        procedures = procedures.len(),
        "built schema registry"
    );

    let results: Vec<Result<ProcedureLineage, LineageError>> =
        if procedures.len() >= options.parallel_threshold {
            procedures
                .par_iter()
                .map(|source| parse_procedure(source, &registry, options))
                .collect()
        } else {
            procedures
                .iter()
                .map(|source| parse_procedure(source, &registry, options))
                .collect()
        };

    let mut graph = LineageGraph::new();
    if options.include_unreferenced_tables {
        for name in registry.names() {
            graph.register_table(name);
        }
    }

    let mut warnings = BTreeMap::new();
    for (source, result) in procedures.iter().zip(results) {
        let lineage = result?;
        debug!(
            origin = %source.origin,
            procedure = %lineage.name,
            reads = lineage.reads.len(),
            writes = lineage.writes.len(),
            "parsed procedure"
        );
        for warning in &lineage.warnings {
            warn!(procedure = %lineage.name, "{warning}");
        }

        graph.add_procedure_lineage(&lineage)?;
        if !lineage.warnings.is_empty() {
            warnings.insert(lineage.name.clone(), lineage.warnings);
        }
    }

    if registry.is_empty() {
        skipped.push(SkippedInput {
            origin: "<registry>".to_string(),
            reason: "no table names could be registered; every reference was dropped".to_string(),
        });
    }

    Ok(LineageReport {
        graph,
        warnings,
        skipped,
    })
}
