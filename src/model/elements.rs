//! Lineage model element types

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::ParseWarning;

/// How a statement touches a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => f.write_str("READ"),
            Direction::Write => f.write_str("WRITE"),
        }
    }
}

/// One classified table occurrence: canonical table name plus direction
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableReference {
    pub table: String,
    pub direction: Direction,
}

impl TableReference {
    pub fn read(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            direction: Direction::Read,
        }
    }

    pub fn write(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            direction: Direction::Write,
        }
    }
}

/// Aggregated lineage of one procedure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureLineage {
    pub name: String,
    /// Normalized body statements, in source order
    pub statements: Vec<String>,
    pub reads: BTreeSet<String>,
    pub writes: BTreeSet<String>,
    pub warnings: Vec<ParseWarning>,
}

/// Per-table view of the inverse index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLineage {
    pub name: String,
    pub read_by: BTreeSet<String>,
    pub written_by: BTreeSet<String>,
}

/// A directed edge of the bipartite lineage graph.
///
/// Writes point procedure → table, reads point table → procedure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineageEdge {
    pub from: String,
    pub to: String,
    pub direction: Direction,
}
