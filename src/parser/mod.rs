//! Stored procedure parsing

mod identifier_utils;
mod preprocess;
mod procedure_parser;
mod reference_extractor;
mod statement_splitter;
mod table_parser;
mod token_parser_base;
mod warning;

pub use identifier_utils::{canonical_table_name, normalize_identifier};
pub use preprocess::preprocess_routine_sql;
pub use procedure_parser::{parse_routine_header, RoutineHeader, RoutineKind};
pub use reference_extractor::{
    extract_references, extract_sql_references, recognize_clause, ClauseMatch, ClauseRule,
    Connector, StatementReferences, CLAUSE_RULES,
};
pub use statement_splitter::{split_procedure, split_statements, NormalizedStatement, SplitResult};
pub use table_parser::{parse_create_table_name, parse_create_table_names};
pub use warning::ParseWarning;
