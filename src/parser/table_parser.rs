//! Token-based CREATE TABLE name extraction
//!
//! Only the table identity is needed to seed the schema registry; column
//! definitions, keys and table options are skipped.
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE TABLE `fact_bookings` (...) ENGINE=InnoDB;
//! CREATE TEMPORARY TABLE IF NOT EXISTS `cruise`.`tmp_load` (...);
//! CREATE TABLE dim_port LIKE dim_port_template;
//! ```

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;

use super::identifier_utils::canonical_from_parts;
use super::token_parser_base::{tokenize_best_effort, TokenParser};

/// Token-based parser for CREATE TABLE statements
pub struct TableTokenParser {
    base: TokenParser,
}

impl TableTokenParser {
    /// Create a new parser for a DDL string.
    ///
    /// Unterminated quotes in trailing table options do not prevent the
    /// header from being read.
    pub fn new(sql: &str) -> Self {
        Self {
            base: TokenParser::from_tokens(tokenize_best_effort(sql).tokens),
        }
    }

    /// Canonical names of every table created in the text, in order.
    pub fn parse_table_names(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        while !self.base.is_at_end() {
            if self.base.check_keyword(Keyword::CREATE) {
                self.base.advance();
                if let Some(name) = self.parse_after_create() {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            } else {
                self.base.advance();
            }
        }
        names
    }

    fn parse_after_create(&mut self) -> Option<String> {
        self.base.skip_whitespace();
        if self.base.check_keyword(Keyword::TEMPORARY) {
            self.base.advance();
            self.base.skip_whitespace();
        }
        self.base.expect_keyword(Keyword::TABLE)?;
        self.base.skip_whitespace();

        let checkpoint = self.base.pos();
        if self.base.expect_keyword(Keyword::IF).is_some() {
            self.base.skip_whitespace();
            if self.base.expect_keyword(Keyword::NOT).is_some() {
                self.base.skip_whitespace();
                if self.base.expect_keyword(Keyword::EXISTS).is_some() {
                    self.base.skip_whitespace();
                } else {
                    self.base.set_pos(checkpoint);
                }
            } else {
                self.base.set_pos(checkpoint);
            }
        }

        if self.base.check_token(&Token::LParen) {
            return None;
        }
        let parts = self.base.parse_qualified_name()?;
        let name = canonical_from_parts(&parts);
        (!name.is_empty()).then_some(name)
    }
}

/// Canonical name of the first table created in a DDL text.
pub fn parse_create_table_name(sql: &str) -> Option<String> {
    TableTokenParser::new(sql).parse_table_names().into_iter().next()
}

/// Canonical names of all tables created in a DDL text.
pub fn parse_create_table_names(sql: &str) -> Vec<String> {
    TableTokenParser::new(sql).parse_table_names()
}
