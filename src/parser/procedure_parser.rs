//! Token-based routine header parsing
//!
//! Locates the routine name and the token range of the body inside a
//! `SHOW CREATE PROCEDURE` style definition.
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE PROCEDURE name(...) BEGIN ... END
//! CREATE DEFINER=`root`@`localhost` PROCEDURE `db`.`name`(IN p INT) BEGIN ... END
//! CREATE OR REPLACE PROCEDURE IF NOT EXISTS name() COMMENT 'x' READS SQL DATA BEGIN ... END
//! CREATE PROCEDURE name() main: BEGIN ... END main
//! CREATE PROCEDURE name() DELETE FROM t        -- single-statement body
//! CREATE PROCEDURE [dbo].[name] AS BEGIN ... END
//! CREATE FUNCTION name(...) RETURNS INT ...    -- recognised, reported as Function
//! ```

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan};

use super::preprocess::preprocess_routine_sql;
use super::token_parser_base::{tokenize_best_effort, TokenParser};

/// Kind of stored routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function,
}

/// Result of parsing a routine header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineHeader {
    pub kind: RoutineKind,
    /// Database qualifier, if the name was qualified
    pub schema: Option<String>,
    /// Routine name without quotes
    pub name: String,
    /// Index of the first body token
    pub body_start: usize,
    /// Index one past the last body token (the wrapping `END` is excluded)
    pub body_end: usize,
}

/// Words that may appear between the parameter list and the body
const CHARACTERISTIC_WORDS: &[&str] = &[
    "LANGUAGE",
    "SQL",
    "NOT",
    "DETERMINISTIC",
    "CONTAINS",
    "NO",
    "READS",
    "MODIFIES",
    "DATA",
    "SECURITY",
    "DEFINER",
    "INVOKER",
    "AS",
];

/// Token-based routine header parser
pub struct ProcedureTokenParser {
    base: TokenParser,
}

impl ProcedureTokenParser {
    /// Create a new parser from pre-tokenized tokens
    pub fn from_tokens(tokens: Vec<TokenWithSpan>) -> Self {
        Self {
            base: TokenParser::from_tokens(tokens),
        }
    }

    /// Consume the parser, returning its tokens.
    pub fn into_tokens(self) -> Vec<TokenWithSpan> {
        self.base.into_tokens()
    }

    /// Parse `CREATE ... PROCEDURE|FUNCTION name ...` and locate the body.
    pub fn parse_header(&mut self) -> Option<RoutineHeader> {
        self.base.skip_whitespace();
        self.base.expect_keyword(Keyword::CREATE)?;

        // OR REPLACE, DEFINER = user@host, AGGREGATE, ...
        let kind = loop {
            self.base.skip_whitespace();
            if self.base.is_at_end()
                || self.base.check_token(&Token::SemiColon)
                || self.base.check_keyword(Keyword::TABLE)
                || self.base.check_keyword(Keyword::VIEW)
                || self.base.check_keyword(Keyword::TRIGGER)
                || self.base.check_keyword(Keyword::BEGIN)
            {
                return None;
            }
            if self.base.check_keyword(Keyword::PROCEDURE) || self.base.check_word_ci("PROC") {
                break RoutineKind::Procedure;
            }
            if self.base.check_keyword(Keyword::FUNCTION) {
                break RoutineKind::Function;
            }
            self.base.advance();
        };
        self.base.advance();
        self.base.skip_whitespace();

        self.skip_if_not_exists();

        let mut parts = self.base.parse_qualified_name()?;
        let name = parts.pop()?;
        let schema = parts.pop();
        self.base.skip_whitespace();

        if self.base.check_token(&Token::LParen) {
            self.base.skip_parenthesized();
        }

        if kind == RoutineKind::Function {
            self.skip_returns_clause();
        }
        self.skip_characteristics();

        let wrapped = self.consume_begin();
        let body_start = self.base.pos();
        let body_end = if wrapped {
            self.trailing_end_position(body_start)
        } else {
            self.base.tokens().len()
        };

        Some(RoutineHeader {
            kind,
            schema,
            name,
            body_start,
            body_end,
        })
    }

    fn skip_if_not_exists(&mut self) {
        let checkpoint = self.base.pos();
        if self.base.expect_keyword(Keyword::IF).is_some() {
            self.base.skip_whitespace();
            if self.base.expect_keyword(Keyword::NOT).is_some() {
                self.base.skip_whitespace();
                if self.base.expect_keyword(Keyword::EXISTS).is_some() {
                    self.base.skip_whitespace();
                    return;
                }
            }
        }
        self.base.set_pos(checkpoint);
    }

    /// `RETURNS type[(n)] [CHARSET x] [COLLATE y]`
    fn skip_returns_clause(&mut self) {
        self.base.skip_whitespace();
        if self.base.expect_word_ci("RETURNS").is_none() {
            return;
        }
        self.base.skip_whitespace();
        self.base.parse_identifier();
        self.base.skip_whitespace();
        if self.base.check_token(&Token::LParen) {
            self.base.skip_parenthesized();
        }
        loop {
            self.base.skip_whitespace();
            if self.base.check_word_ci("CHARSET") || self.base.check_word_ci("COLLATE") {
                self.base.advance();
                self.base.skip_whitespace();
                self.base.parse_identifier();
            } else {
                break;
            }
        }
    }

    fn skip_characteristics(&mut self) {
        loop {
            self.base.skip_whitespace();
            if self.base.check_word_ci("COMMENT") {
                self.base.advance();
                self.base.skip_whitespace();
                self.base.advance();
                continue;
            }
            if CHARACTERISTIC_WORDS
                .iter()
                .any(|word| self.base.check_word_ci(word))
            {
                self.base.advance();
                continue;
            }
            break;
        }
    }

    /// Consume `BEGIN` or `label: BEGIN`. Returns whether the body is wrapped.
    fn consume_begin(&mut self) -> bool {
        if self.base.expect_keyword(Keyword::BEGIN).is_some() {
            return true;
        }

        let checkpoint = self.base.pos();
        if self.base.parse_identifier().is_some() {
            self.base.skip_whitespace();
            if self.base.expect_token(&Token::Colon).is_some() {
                self.base.skip_whitespace();
                if self.base.expect_keyword(Keyword::BEGIN).is_some() {
                    return true;
                }
            }
        }
        self.base.set_pos(checkpoint);
        false
    }

    /// Position of the closing `END` (optionally followed by a label and `;`).
    fn trailing_end_position(&self, body_start: usize) -> usize {
        let tokens = self.base.tokens();
        let mut end = tokens.len();

        let Some(mut last) = last_significant(tokens, body_start, end) else {
            return end;
        };
        if matches!(tokens[last].token, Token::SemiColon) {
            end = last;
            match last_significant(tokens, body_start, end) {
                Some(idx) => last = idx,
                None => return end,
            }
        }
        if is_end_keyword(&tokens[last].token) {
            return last;
        }
        // END label
        if let Some(before) = last_significant(tokens, body_start, last) {
            if is_end_keyword(&tokens[before].token) && matches!(tokens[last].token, Token::Word(_))
            {
                return before;
            }
        }
        end
    }
}

fn is_end_keyword(token: &Token) -> bool {
    matches!(token, Token::Word(w) if w.keyword == Keyword::END && w.quote_style.is_none())
}

/// Index of the last non-whitespace token in `tokens[start..end]`.
fn last_significant(tokens: &[TokenWithSpan], start: usize, end: usize) -> Option<usize> {
    (start..end)
        .rev()
        .find(|&i| !matches!(tokens[i].token, Token::Whitespace(_)))
}

/// Parse a routine header from SQL text.
///
/// Tolerates unterminated quotes or comments in the body.
pub fn parse_routine_header(sql: &str) -> Option<RoutineHeader> {
    let sql = preprocess_routine_sql(sql);
    let outcome = tokenize_best_effort(&sql);
    let mut parser = ProcedureTokenParser::from_tokens(outcome.tokens);
    parser.parse_header()
}
