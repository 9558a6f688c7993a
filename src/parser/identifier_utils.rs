//! Centralized identifier handling utilities.
//!
//! Table identity in the lineage model is the bare, lowercased table name:
//! quoting (backticks, brackets, double quotes) and schema/database
//! qualification are stripped before any comparison.
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(normalize_identifier("`fact_revenue`"), "fact_revenue");
//! assert_eq!(canonical_table_name("`cruise`.`Dim_Port`"), "dim_port");
//! ```

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Word};

/// Strips brackets `[]`, backticks and double quotes from an identifier.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_identifier("[dim_ship]"), "dim_ship");
/// assert_eq!(normalize_identifier("`dim_ship`"), "dim_ship");
/// assert_eq!(normalize_identifier("  \"dim_ship\"  "), "dim_ship");
/// ```
pub fn normalize_identifier(ident: &str) -> String {
    ident
        .trim()
        .trim_matches(|c| c == '[' || c == ']' || c == '"' || c == '`')
        .to_string()
}

/// Splits a possibly qualified name on dots that are not inside quotes.
///
/// ```ignore
/// assert_eq!(split_qualified_name("`my.db`.t"), vec!["`my.db`", "t"]);
/// ```
pub fn split_qualified_name(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut closing: Option<char> = None;
    let mut start = 0;

    for (i, c) in name.char_indices() {
        match closing {
            Some(end) if c == end => closing = None,
            Some(_) => {}
            None => match c {
                '`' => closing = Some('`'),
                '"' => closing = Some('"'),
                '[' => closing = Some(']'),
                '.' => {
                    parts.push(&name[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Canonical table identity: last name part, unquoted, lowercased.
///
/// ```ignore
/// assert_eq!(canonical_table_name("cruise.fact_bookings"), "fact_bookings");
/// assert_eq!(canonical_table_name("[dbo].[Fact_Bookings]"), "fact_bookings");
/// ```
pub fn canonical_table_name(name: &str) -> String {
    let parts = split_qualified_name(name.trim());
    let last = parts.last().copied().unwrap_or_default();
    normalize_identifier(last).to_lowercase()
}

/// Canonical table identity from already-unquoted name parts.
pub fn canonical_from_parts(parts: &[String]) -> String {
    parts
        .last()
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_default()
}

/// Converts a Word token to its SQL text, preserving the original quote style.
pub fn format_word(word: &Word) -> String {
    match word.quote_style {
        Some('[') => format!("[{}]", word.value),
        Some(q) => format!("{q}{}{q}", word.value),
        None => word.value.clone(),
    }
}

/// Converts a token to its SQL text, preserving quoting.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::Word(w) => format_word(w),
        Token::SingleQuotedString(s) => format!("'{}'", s.replace('\'', "''")),
        _ => token.to_string(),
    }
}

/// Converts a token for normalized statement text: unquoted keywords are
/// upper-cased, identifiers and literals keep their original text.
pub fn format_token_normalized(token: &Token) -> String {
    match token {
        Token::Word(w) if w.quote_style.is_none() && w.keyword != Keyword::NoKeyword => {
            w.value.to_uppercase()
        }
        _ => format_token(token),
    }
}
