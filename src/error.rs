//! Error types for rust-sqllineage

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling or querying lineage
#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Procedure already added: {name}")]
    DuplicateProcedure { name: String },

    #[error("Unknown procedure: {name}")]
    UnknownProcedure { name: String },

    #[error("Unknown table: {name}")]
    UnknownTable { name: String },

    #[error("No {kind} definitions supplied")]
    EmptyInput { kind: &'static str },

    #[error("Procedure definition has no CREATE PROCEDURE header and no fallback name: {origin}")]
    UnnamedProcedure { origin: String },

    #[error("Lineage document is inconsistent: {message}")]
    InconsistentDocument { message: String },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read dump directory: {path}")]
    DumpDirectoryError {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read lineage artifact: {path}")]
    ArtifactReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write lineage artifact to {path}")]
    ArtifactWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid lineage document in {path}")]
    ArtifactParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
