//! Non-fatal parse warnings

use thiserror::Error;

/// A problem found while parsing one procedure.
///
/// Warnings never stop extraction; they are collected per procedure and
/// surfaced next to its lineage. Statement numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseWarning {
    #[error("unterminated {quote} quote at line {line}; rest of statement {statement} left unparsed")]
    UnterminatedQuote {
        quote: char,
        line: usize,
        statement: usize,
    },

    #[error("unterminated block comment at line {line}; rest of statement {statement} left unparsed")]
    UnterminatedComment { line: usize, statement: usize },

    #[error("tokenizer failed, no statements recovered: {message}")]
    TokenizerFailure { message: String },

    #[error("`{name}` in statement {statement} is not a registered table; reference dropped")]
    UnregisteredTable { name: String, statement: usize },

    #[error("dynamic SQL in statement {statement} (line {line}) was not analysed")]
    DynamicSql { statement: usize, line: usize },

    #[error("no CREATE PROCEDURE header found; text parsed as a bare body")]
    MissingProcedureHeader,
}
