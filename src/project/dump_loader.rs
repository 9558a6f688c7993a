//! Loader for schema dump directories
//!
//! A dump directory holds one `table__<name>.sql` file per table (the
//! `SHOW CREATE TABLE` output, or a `-- No DDL for <name>` placeholder), one
//! `<routine>.sql` file per stored routine and an optional `dump_meta.json`
//! describing what was saved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::LineageError;
use crate::model::{ProcedureSource, SkippedInput, TableSource};
use crate::parser::{parse_routine_header, RoutineKind};

/// Default file pattern for table definitions
pub const TABLE_FILE_PATTERN: &str = "table__*.sql";

/// Default file pattern for routine definitions
pub const PROCEDURE_FILE_PATTERN: &str = "*.sql";

/// Prefix the extractor puts on table definition files
const TABLE_FILE_PREFIX: &str = "table__";

/// Name of the metadata file written next to the dump
pub const DUMP_META_FILE: &str = "dump_meta.json";

/// Marker the extractor writes when `SHOW CREATE` was unavailable
const ROUTINE_TYPE_MARKER: &str = "-- routine_type:";

/// File name patterns used to classify dump files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPatterns {
    pub table_pattern: String,
    pub procedure_pattern: String,
}

impl Default for DumpPatterns {
    fn default() -> Self {
        Self {
            table_pattern: TABLE_FILE_PATTERN.to_string(),
            procedure_pattern: PROCEDURE_FILE_PATTERN.to_string(),
        }
    }
}

/// Table and procedure sources found in a dump directory
#[derive(Debug, Clone, Default)]
pub struct DumpContents {
    pub tables: Vec<TableSource>,
    pub procedures: Vec<ProcedureSource>,
    /// Files that were matched but not used (functions, unknown routines)
    pub skipped: Vec<SkippedInput>,
}

/// `dump_meta.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DumpMeta {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub tables: Vec<DumpMetaTable>,
    #[serde(default)]
    pub routines: Vec<DumpMetaRoutine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DumpMetaTable {
    pub table: String,
    #[serde(default)]
    pub ddl_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DumpMetaRoutine {
    pub name: String,
    #[serde(rename = "type")]
    pub routine_type: String,
    #[serde(default)]
    pub file: Option<String>,
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback.
///
/// A leading byte order mark is removed.
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ));
            }
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn read_sql_file(path: &Path) -> Result<String> {
    Ok(
        read_file_with_encoding_fallback(path).map_err(|e| LineageError::SqlFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?,
    )
}

/// Read `dump_meta.json` from a dump directory, if present.
pub fn read_dump_meta(dump_dir: &Path) -> Result<Option<DumpMeta>> {
    let path = dump_dir.join(DUMP_META_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = read_sql_file(&path)?;
    let meta = serde_json::from_str(&content).map_err(|e| LineageError::ArtifactParseError {
        path: path.clone(),
        source: e,
    })?;
    Ok(Some(meta))
}

/// Collect files under `dump_dir` whose name matches one of the patterns,
/// sorted by path.
fn find_dump_files(dump_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dump_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| LineageError::DumpDirectoryError {
            path: dump_dir.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Routine type from the `-- routine_type: X` marker line, if present.
fn routine_type_marker(sql: &str) -> Option<&str> {
    sql.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(ROUTINE_TYPE_MARKER))
        .map(str::trim)
}

/// Load table and procedure sources from a dump directory.
pub fn load_dump(dump_dir: &Path, patterns: &DumpPatterns) -> Result<DumpContents> {
    let table_pattern = glob::Pattern::new(&patterns.table_pattern)
        .with_context(|| format!("Invalid table file pattern: {}", patterns.table_pattern))?;
    let procedure_pattern = glob::Pattern::new(&patterns.procedure_pattern).with_context(|| {
        format!(
            "Invalid procedure file pattern: {}",
            patterns.procedure_pattern
        )
    })?;

    let meta = read_dump_meta(dump_dir)?.unwrap_or_default();
    let routine_types: HashMap<String, String> = meta
        .routines
        .iter()
        .map(|r| {
            let file = r.file.clone().unwrap_or_else(|| format!("{}.sql", r.name));
            (file, r.routine_type.to_uppercase())
        })
        .collect();

    let mut contents = DumpContents::default();

    for path in find_dump_files(dump_dir)? {
        let name = file_name(&path);
        let origin = path.display().to_string();

        if table_pattern.matches(name) {
            let sql = read_sql_file(&path)?;
            let stem = file_stem(&path);
            let fallback = stem.strip_prefix(TABLE_FILE_PREFIX).unwrap_or(stem);
            debug!(file = %origin, "found table definition");
            contents
                .tables
                .push(TableSource::new(origin, sql).with_fallback_name(fallback));
            continue;
        }

        if !procedure_pattern.matches(name) {
            continue;
        }

        let sql = read_sql_file(&path)?;
        let stem = file_stem(&path).to_string();
        let kind = match parse_routine_header(&sql) {
            Some(header) => Some(header.kind),
            None => routine_type_marker(&sql)
                .or_else(|| routine_types.get(name).map(String::as_str))
                .and_then(|t| {
                    if t.eq_ignore_ascii_case("PROCEDURE") {
                        Some(RoutineKind::Procedure)
                    } else if t.eq_ignore_ascii_case("FUNCTION") {
                        Some(RoutineKind::Function)
                    } else {
                        None
                    }
                }),
        };

        match kind {
            Some(RoutineKind::Procedure) => {
                debug!(file = %origin, "found procedure definition");
                contents
                    .procedures
                    .push(ProcedureSource::new(origin, sql).with_name_hint(stem));
            }
            Some(RoutineKind::Function) => {
                debug!(file = %origin, "skipping function definition");
                contents.skipped.push(SkippedInput {
                    origin,
                    reason: "function definition".to_string(),
                });
            }
            None => {
                warn!(file = %origin, "no CREATE PROCEDURE header; file skipped");
                contents.skipped.push(SkippedInput {
                    origin,
                    reason: "no CREATE PROCEDURE header".to_string(),
                });
            }
        }
    }

    // Tables listed in the metadata but without a definition file
    for table in &meta.tables {
        let known = contents.tables.iter().any(|source| {
            source
                .fallback_name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(&table.table))
        });
        if !known {
            debug!(table = %table.table, "registering table from dump metadata");
            contents.tables.push(
                TableSource::new(dump_dir.join(DUMP_META_FILE).display().to_string(), "")
                    .with_fallback_name(table.table.clone()),
            );
        }
    }

    Ok(contents)
}
