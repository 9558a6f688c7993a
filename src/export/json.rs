//! Lineage document as pretty-printed JSON

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::error::LineageError;
use crate::model::{LineageDocument, LineageGraph};

/// Serialize the graph's document form.
pub fn to_json_string(graph: &LineageGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&graph.to_serializable())?)
}

/// Write the lineage document, creating parent directories as needed.
pub fn write_lineage_json(graph: &LineageGraph, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| LineageError::ArtifactWriteError {
            path: output_path.to_path_buf(),
            source: e,
        })?;
    }

    let mut json = to_json_string(graph)?;
    json.push('\n');
    fs::write(output_path, json).map_err(|e| LineageError::ArtifactWriteError {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Read a lineage document and rebuild the graph from it.
pub fn read_lineage_json(path: &Path) -> Result<LineageGraph> {
    let content = fs::read_to_string(path).map_err(|e| LineageError::ArtifactReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let document: LineageDocument =
        serde_json::from_str(&content).map_err(|e| LineageError::ArtifactParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(LineageGraph::from_serializable(&document)?)
}
