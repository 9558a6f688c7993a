//! Bipartite procedure/table lineage graph
//!
//! The graph keeps a forward index (procedure → reads/writes) and an inverse
//! index (table → read_by/written_by). Every insertion updates both, so the
//! inverse is always the exact transpose of the forward view.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::LineageError;
use crate::parser::canonical_table_name;

use super::{
    Direction, LineageDocument, LineageEdge, ProcedureLineage, ProcedureView, TableLineage,
    TableView,
};

static EMPTY: BTreeSet<String> = BTreeSet::new();

#[derive(Debug, Clone, Default, PartialEq)]
struct ProcedureEntry {
    reads: BTreeSet<String>,
    writes: BTreeSet<String>,
    statements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TableEntry {
    read_by: BTreeSet<String>,
    written_by: BTreeSet<String>,
}

/// Lineage of one run: procedures, tables and typed edges between them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineageGraph {
    procedures: BTreeMap<String, ProcedureEntry>,
    tables: BTreeMap<String, TableEntry>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Make a table known to the graph, even if no procedure references it.
    pub fn register_table(&mut self, name: &str) -> String {
        let canonical = canonical_table_name(name);
        self.tables.entry(canonical.clone()).or_default();
        canonical
    }

    /// Add a procedure with its aggregated reads and writes.
    ///
    /// Procedure names are matched case-insensitively, as MySQL does; adding
    /// a name that already exists fails and leaves the graph unchanged.
    pub fn add_procedure<R, W>(&mut self, name: &str, reads: R, writes: W) -> Result<(), LineageError>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        if self.find_procedure(name).is_some() {
            return Err(LineageError::DuplicateProcedure {
                name: name.to_string(),
            });
        }

        let mut entry = ProcedureEntry::default();
        for table in reads {
            let table = canonical_table_name(table.as_ref());
            self.tables
                .entry(table.clone())
                .or_default()
                .read_by
                .insert(name.to_string());
            entry.reads.insert(table);
        }
        for table in writes {
            let table = canonical_table_name(table.as_ref());
            self.tables
                .entry(table.clone())
                .or_default()
                .written_by
                .insert(name.to_string());
            entry.writes.insert(table);
        }

        self.procedures.insert(name.to_string(), entry);
        Ok(())
    }

    /// Add an aggregated procedure, keeping its statements for inspection.
    pub fn add_procedure_lineage(&mut self, lineage: &ProcedureLineage) -> Result<(), LineageError> {
        self.add_procedure(&lineage.name, &lineage.reads, &lineage.writes)?;
        if let Some(entry) = self.procedures.get_mut(&lineage.name) {
            entry.statements = lineage.statements.clone();
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn find_procedure(&self, name: &str) -> Option<&ProcedureEntry> {
        self.procedures.get(name).or_else(|| {
            self.procedures
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, entry)| entry)
        })
    }

    fn procedure_entry(&self, name: &str) -> Result<&ProcedureEntry, LineageError> {
        self.find_procedure(name)
            .ok_or_else(|| LineageError::UnknownProcedure {
                name: name.to_string(),
            })
    }

    /// Tables read by a procedure
    pub fn tables_read_by(&self, procedure: &str) -> Result<&BTreeSet<String>, LineageError> {
        Ok(&self.procedure_entry(procedure)?.reads)
    }

    /// Tables written by a procedure
    pub fn tables_written_by(&self, procedure: &str) -> Result<&BTreeSet<String>, LineageError> {
        Ok(&self.procedure_entry(procedure)?.writes)
    }

    /// Normalized statements recorded for a procedure
    pub fn statements_of(&self, procedure: &str) -> Result<&[String], LineageError> {
        Ok(&self.procedure_entry(procedure)?.statements)
    }

    /// Procedures reading a table. Unknown tables have no readers.
    pub fn procedures_reading(&self, table: &str) -> &BTreeSet<String> {
        self.tables
            .get(&canonical_table_name(table))
            .map(|t| &t.read_by)
            .unwrap_or(&EMPTY)
    }

    /// Procedures writing a table. Unknown tables have no writers.
    pub fn procedures_writing(&self, table: &str) -> &BTreeSet<String> {
        self.tables
            .get(&canonical_table_name(table))
            .map(|t| &t.written_by)
            .unwrap_or(&EMPTY)
    }

    /// Inverse view of one table; fails for a table the graph never saw.
    pub fn table(&self, name: &str) -> Result<TableLineage, LineageError> {
        let canonical = canonical_table_name(name);
        let entry = self
            .tables
            .get(&canonical)
            .ok_or_else(|| LineageError::UnknownTable {
                name: name.to_string(),
            })?;
        Ok(TableLineage {
            name: canonical,
            read_by: entry.read_by.clone(),
            written_by: entry.written_by.clone(),
        })
    }

    /// Procedure names in lexicographic order
    pub fn procedure_names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    /// Table names in lexicographic order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of procedures
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// True when the graph holds neither procedures nor tables
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty() && self.tables.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Typed edges: writes run procedure → table, reads run table → procedure.
    pub fn edges(&self) -> Vec<LineageEdge> {
        let mut edges = Vec::new();
        for (procedure, entry) in &self.procedures {
            for table in &entry.writes {
                edges.push(LineageEdge {
                    from: procedure.clone(),
                    to: table.clone(),
                    direction: Direction::Write,
                });
            }
            for table in &entry.reads {
                edges.push(LineageEdge {
                    from: table.clone(),
                    to: procedure.clone(),
                    direction: Direction::Read,
                });
            }
        }
        edges.sort();
        edges
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Nested mapping form, procedures and tables in lexicographic order.
    pub fn to_serializable(&self) -> LineageDocument {
        LineageDocument {
            procedures: self
                .procedures
                .iter()
                .map(|(name, entry)| {
                    (
                        name.clone(),
                        ProcedureView {
                            reads: entry.reads.clone(),
                            writes: entry.writes.clone(),
                        },
                    )
                })
                .collect(),
            tables: self
                .tables
                .iter()
                .map(|(name, entry)| {
                    (
                        name.clone(),
                        TableView {
                            read_by: entry.read_by.clone(),
                            written_by: entry.written_by.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Rebuild a graph from its serialized form.
    ///
    /// The forward view is replayed through [`add_procedure`](Self::add_procedure)
    /// and the document's `tables` section must then match the rebuilt
    /// inverse index exactly.
    pub fn from_serializable(document: &LineageDocument) -> Result<Self, LineageError> {
        let mut graph = LineageGraph::new();
        for (name, view) in &document.procedures {
            graph.add_procedure(name, &view.reads, &view.writes)?;
        }
        for name in document.tables.keys() {
            let canonical = graph.register_table(name);
            if &canonical != name {
                return Err(LineageError::InconsistentDocument {
                    message: format!("table name `{name}` is not in canonical form"),
                });
            }
        }

        for (name, entry) in &graph.tables {
            let Some(view) = document.tables.get(name) else {
                return Err(LineageError::InconsistentDocument {
                    message: format!("table `{name}` is referenced but missing from `tables`"),
                });
            };
            if view.read_by != entry.read_by || view.written_by != entry.written_by {
                return Err(LineageError::InconsistentDocument {
                    message: format!("table `{name}` does not mirror the procedure entries"),
                });
            }
        }

        Ok(graph)
    }
}
