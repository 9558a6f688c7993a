//! Graphviz DOT rendering of the lineage graph
//!
//! Procedures and tables are drawn in two clusters laid out left to right.
//! Write edges run procedure → table in red, read edges run table →
//! procedure in blue. Node ids carry a `proc:`/`table:` prefix so a table and
//! a procedure sharing a name stay distinct nodes.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::error::LineageError;
use crate::model::{Direction, LineageGraph};

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn procedure_id(name: &str) -> String {
    quote(&format!("proc:{name}"))
}

fn table_id(name: &str) -> String {
    quote(&format!("table:{name}"))
}

fn render(graph: &LineageGraph, out: &mut String) -> fmt::Result {
    writeln!(out, "// Data Lineage")?;
    writeln!(out, "digraph lineage {{")?;
    writeln!(out, "    rankdir=LR;")?;
    writeln!(out, "    bgcolor=white;")?;
    writeln!(out, "    node [fontname=Arial, fontsize=10];")?;
    writeln!(out, "    edge [fontname=Arial, fontsize=8];")?;

    writeln!(out, "    subgraph cluster_procedures {{")?;
    writeln!(out, "        label=\"Stored Procedures\"; style=filled; color=lightgray;")?;
    for name in graph.procedure_names() {
        writeln!(
            out,
            "        {} [label={}, shape=box, style=\"filled,rounded\", fillcolor=lightblue, color=blue];",
            procedure_id(name),
            quote(name)
        )?;
    }
    writeln!(out, "    }}")?;

    writeln!(out, "    subgraph cluster_tables {{")?;
    writeln!(out, "        label=\"Tables\"; style=filled; color=lightgray;")?;
    for name in graph.table_names() {
        writeln!(
            out,
            "        {} [label={}, shape=ellipse, style=filled, fillcolor=orange, color=darkorange];",
            table_id(name),
            quote(name)
        )?;
    }
    writeln!(out, "    }}")?;

    for edge in graph.edges() {
        match edge.direction {
            Direction::Write => writeln!(
                out,
                "    {} -> {} [color=red, label=\"writes\"];",
                procedure_id(&edge.from),
                table_id(&edge.to)
            )?,
            Direction::Read => writeln!(
                out,
                "    {} -> {} [color=blue, label=\"read by\"];",
                table_id(&edge.from),
                procedure_id(&edge.to)
            )?,
        }
    }

    writeln!(out, "}}")
}

/// Render the graph as Graphviz DOT source.
pub fn to_dot(graph: &LineageGraph) -> String {
    let mut out = String::new();
    match render(graph, &mut out) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}

/// Write DOT source to a file, creating parent directories as needed.
pub fn write_dot(graph: &LineageGraph, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| LineageError::ArtifactWriteError {
            path: output_path.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(output_path, to_dot(graph)).map_err(|e| LineageError::ArtifactWriteError {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
