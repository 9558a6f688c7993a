//! Serializable lineage document

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The persisted lineage artifact.
///
/// ```json
/// {
///   "procedures": { "sp_load": { "reads": ["b"], "writes": ["a"] } },
///   "tables": { "a": { "read_by": [], "written_by": ["sp_load"] } }
/// }
/// ```
///
/// Maps are ordered and every list is a sorted set, so identical input
/// always serializes to identical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageDocument {
    pub procedures: BTreeMap<String, ProcedureView>,
    pub tables: BTreeMap<String, TableView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureView {
    #[serde(default)]
    pub reads: BTreeSet<String>,
    #[serde(default)]
    pub writes: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    #[serde(default)]
    pub read_by: BTreeSet<String>,
    #[serde(default)]
    pub written_by: BTreeSet<String>,
}
