//! Lineage model building

mod aggregator;
mod builder;
mod document;
mod elements;
mod lineage_graph;
mod schema_registry;

pub use aggregator::aggregate;
pub use builder::{
    build_lineage, build_registry, parse_procedure, LineageReport, ParseOptions, ProcedureSource,
    SkippedInput, TableSource, PARALLEL_THRESHOLD,
};
pub use document::{LineageDocument, ProcedureView, TableView};
pub use elements::*;
pub use lineage_graph::LineageGraph;
pub use schema_registry::SchemaRegistry;
