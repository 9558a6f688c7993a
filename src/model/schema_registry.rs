//! Known table names

use std::collections::BTreeSet;

use crate::parser::{canonical_table_name, parse_create_table_names};

/// Set of known table names, used to filter extracted identifiers.
///
/// Names are stored in canonical form (unquoted, schema prefix removed,
/// lowercased) and every lookup canonicalizes its argument the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    tables: BTreeSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table name. Returns the canonical name, or `None` for a
    /// blank name.
    pub fn register(&mut self, name: &str) -> Option<String> {
        let canonical = canonical_table_name(name);
        if canonical.is_empty() {
            return None;
        }
        self.tables.insert(canonical.clone());
        Some(canonical)
    }

    /// Register every table created by a DDL text. Returns the canonical
    /// names found (empty when the text holds no `CREATE TABLE`).
    pub fn register_definition(&mut self, ddl: &str) -> Vec<String> {
        let names = parse_create_table_names(ddl);
        for name in &names {
            self.tables.insert(name.clone());
        }
        names
    }

    /// Case-insensitive lookup after unquoting and schema-prefix stripping
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains(&canonical_table_name(name))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registered names in lexicographic order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = SchemaRegistry::new();
        for name in iter {
            registry.register(name.as_ref());
        }
        registry
    }
}
