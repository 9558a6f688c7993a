//! Routine body splitting and statement normalization
//!
//! A routine definition is preprocessed, tokenized with the MySQL dialect,
//! stripped of its `CREATE PROCEDURE ... BEGIN`/`END` wrapper and split on
//! `;` tokens. Because splitting happens on tokens, a `;` inside a string,
//! quoted identifier or comment never ends a statement.
//!
//! Each resulting [`NormalizedStatement`] keeps its significant tokens
//! (comments and whitespace removed) for reference extraction, plus a
//! normalized text rendering: whitespace collapsed to single spaces,
//! unquoted keywords upper-cased, identifiers and literals unchanged.

use sqlparser::tokenizer::{Token, TokenWithSpan};

use super::identifier_utils::format_token_normalized;
use super::preprocess::preprocess_routine_sql;
use super::procedure_parser::{ProcedureTokenParser, RoutineHeader};
use super::token_parser_base::{tokenize_best_effort, UnterminatedKind};
use super::warning::ParseWarning;

/// One statement of a routine body
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStatement {
    /// 1-based position within the body
    pub index: usize,
    /// 1-based source line of the first token
    pub start_line: usize,
    /// Normalized statement text
    pub sql: String,
    /// True when the statement ends in unparsed text after an unterminated
    /// quote or comment
    pub truncated: bool,
    tokens: Vec<TokenWithSpan>,
}

impl NormalizedStatement {
    /// Significant tokens (no whitespace or comments) of the statement
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }
}

/// Result of splitting one routine definition
#[derive(Debug, Clone, Default)]
pub struct SplitResult {
    /// Parsed header, when the text starts with `CREATE ... PROCEDURE`
    pub header: Option<RoutineHeader>,
    pub statements: Vec<NormalizedStatement>,
    pub warnings: Vec<ParseWarning>,
}

/// Split a full routine definition (`CREATE PROCEDURE ... BEGIN ... END`).
///
/// Text without a recognizable header is split as a bare body and a
/// `MissingProcedureHeader` warning is recorded.
pub fn split_procedure(sql: &str) -> SplitResult {
    split(sql, true)
}

/// Split a bare statement sequence (no routine header expected).
pub fn split_statements(sql: &str) -> SplitResult {
    split(sql, false)
}

fn split(sql: &str, expect_header: bool) -> SplitResult {
    let cleaned = preprocess_routine_sql(sql);
    let outcome = tokenize_best_effort(&cleaned);

    if let Some(message) = outcome.failure {
        return SplitResult {
            warnings: vec![ParseWarning::TokenizerFailure { message }],
            ..Default::default()
        };
    }

    // Drop whitespace and comments, remembering where a gap existed so the
    // normalized text keeps word boundaries.
    let mut significant = Vec::with_capacity(outcome.tokens.len());
    let mut spaced_before = Vec::with_capacity(outcome.tokens.len());
    let mut gap = false;
    for token in outcome.tokens {
        if matches!(token.token, Token::Whitespace(_)) {
            gap = true;
        } else {
            spaced_before.push(gap);
            significant.push(token);
            gap = false;
        }
    }

    let mut warnings = Vec::new();
    let (header, significant) = if expect_header {
        let mut parser = ProcedureTokenParser::from_tokens(significant);
        let header = parser.parse_header();
        if header.is_none() {
            warnings.push(ParseWarning::MissingProcedureHeader);
        }
        (header, parser.into_tokens())
    } else {
        (None, significant)
    };

    let (body_start, body_end) = header
        .as_ref()
        .map(|h| (h.body_start, h.body_end))
        .unwrap_or((0, significant.len()));

    let mut statements = Vec::new();
    let mut current_start = body_start;
    let mut open_group = false;
    for i in body_start..body_end {
        if matches!(significant[i].token, Token::SemiColon) {
            push_statement(
                &mut statements,
                &significant[current_start..i],
                &spaced_before[current_start..i],
            );
            current_start = i + 1;
            open_group = false;
        } else {
            open_group = true;
        }
    }
    if open_group {
        push_statement(
            &mut statements,
            &significant[current_start..body_end],
            &spaced_before[current_start..body_end],
        );
    }

    if let (Some(unterminated), Some(tail)) = (outcome.unterminated, outcome.tail) {
        let tail = tail.trim_end();
        // The tail continues the last statement unless that one was closed
        // by a `;` before the unterminated construct began.
        match statements.last_mut() {
            Some(last) if open_group => {
                last.sql.push(' ');
                last.sql.push_str(tail);
                last.truncated = true;
            }
            _ => statements.push(NormalizedStatement {
                index: statements.len() + 1,
                start_line: unterminated.line,
                sql: tail.to_string(),
                truncated: true,
                tokens: Vec::new(),
            }),
        }

        let statement = statements.len();
        warnings.push(match unterminated.kind {
            UnterminatedKind::Quote(quote) => ParseWarning::UnterminatedQuote {
                quote,
                line: unterminated.line,
                statement,
            },
            UnterminatedKind::Comment => ParseWarning::UnterminatedComment {
                line: unterminated.line,
                statement,
            },
        });
    }

    SplitResult {
        header,
        statements,
        warnings,
    }
}

fn push_statement(
    statements: &mut Vec<NormalizedStatement>,
    tokens: &[TokenWithSpan],
    spaced_before: &[bool],
) {
    let Some(first) = tokens.first() else {
        return;
    };

    let mut sql = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && spaced_before[i] {
            sql.push(' ');
        }
        sql.push_str(&format_token_normalized(&token.token));
    }

    statements.push(NormalizedStatement {
        index: statements.len() + 1,
        start_line: first.span.start.line as usize,
        sql,
        truncated: false,
        tokens: tokens.to_vec(),
    });
}
