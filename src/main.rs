use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_sqllineage::export::read_lineage_json;
use rust_sqllineage::{analyze_dump, AnalyzeOptions, GRAPH_FILE_NAME, LINEAGE_FILE_NAME};

#[derive(Parser)]
#[command(name = "rust-sqllineage")]
#[command(author, version, about = "Table-level data lineage for MySQL stored procedures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema dump into a lineage document
    Parse {
        /// Directory holding table__*.sql and routine .sql files
        #[arg(short, long, env = "SQL_DUMPS_DIR")]
        dump_dir: PathBuf,

        /// Directory for the lineage document (parsed_lineage.json)
        #[arg(short, long, env = "OUTPUT_PARSED_DIR")]
        output_dir: Option<PathBuf>,

        /// Directory for the Graphviz export (lineage_graph.dot)
        #[arg(short, long, env = "OUTPUT_GRAPH_DIR")]
        graph_dir: Option<PathBuf>,

        /// Glob for table definition files
        #[arg(long, default_value = rust_sqllineage::project::TABLE_FILE_PATTERN)]
        table_pattern: String,

        /// Glob for routine definition files
        #[arg(long, default_value = rust_sqllineage::project::PROCEDURE_FILE_PATTERN)]
        procedure_pattern: String,

        /// Drop tables a procedure writes from its read set
        #[arg(long)]
        exclude_self_references: bool,

        /// Leave out tables no procedure touches
        #[arg(long)]
        skip_unreferenced_tables: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Query a lineage document
    #[command(group(ArgGroup::new("target").required(true).args(["procedure", "table"])))]
    Query {
        /// Path to parsed_lineage.json
        #[arg(short, long)]
        lineage: PathBuf,

        /// Show the tables a procedure reads and writes
        #[arg(short, long)]
        procedure: Option<String>,

        /// Show the procedures that read and write a table
        #[arg(short, long)]
        table: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_list(label: &str, items: impl IntoIterator<Item = impl AsRef<str>>) {
    let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    if items.is_empty() {
        println!("{label}: (none)");
    } else {
        println!("{label}: {}", items.join(", "));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            dump_dir,
            output_dir,
            graph_dir,
            table_pattern,
            procedure_pattern,
            exclude_self_references,
            skip_unreferenced_tables,
            verbose,
        } => {
            init_tracing(verbose);

            let mut options = AnalyzeOptions::new(dump_dir);
            options.output_path = output_dir.map(|dir| dir.join(LINEAGE_FILE_NAME));
            options.dot_path = graph_dir.map(|dir| dir.join(GRAPH_FILE_NAME));
            options.patterns.table_pattern = table_pattern;
            options.patterns.procedure_pattern = procedure_pattern;
            options.parse.exclude_self_references = exclude_self_references;
            options.parse.include_unreferenced_tables = !skip_unreferenced_tables;

            let (report, output_path) = analyze_dump(&options)?;
            println!(
                "Parsed {} procedures over {} tables ({} warnings)",
                report.graph.len(),
                report.graph.table_count(),
                report.warning_count()
            );
            println!("Lineage written to {}", output_path.display());
        }
        Commands::Query {
            lineage,
            procedure,
            table,
        } => {
            init_tracing(false);
            let graph = read_lineage_json(&lineage)?;

            if let Some(procedure) = procedure {
                print_list("reads", graph.tables_read_by(&procedure)?);
                print_list("writes", graph.tables_written_by(&procedure)?);
            } else if let Some(table) = table {
                let table = graph.table(&table)?;
                print_list("read by", &table.read_by);
                print_list("written by", &table.written_by);
            }
        }
    }

    Ok(())
}
