//! Base token parser providing common helper methods for procedure parsing.
//!
//! This module provides a shared `TokenParser` struct that the header,
//! table-definition and statement parsers build on, plus the best-effort
//! tokenizer entry point used for procedure bodies.
//!
//! ## Usage
//!
//! ```ignore
//! let mut parser = TokenParser::new("CREATE TABLE `dim_port` (id INT)")?;
//! parser.skip_whitespace();
//! if parser.check_keyword(Keyword::CREATE) {
//!     parser.advance();
//! }
//! ```
//!
//! ## Best-effort tokenization
//!
//! `tokenize_best_effort` never fails. When the sqlparser tokenizer rejects the
//! input because a quote or block comment is never closed, the text up to the
//! start of that construct is tokenized and the remainder is returned as an
//! opaque tail.

use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};

/// Kind of construct left open at the end of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnterminatedKind {
    /// A quote character (`'`, `"` or `` ` ``) with no closing partner
    Quote(char),
    /// A `/* ... ` block comment with no closing `*/`
    Comment,
}

/// Location of the first unterminated construct in a SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated {
    pub kind: UnterminatedKind,
    /// Byte offset where the construct starts
    pub offset: usize,
    /// 1-based line where the construct starts
    pub line: usize,
}

/// Result of best-effort tokenization
#[derive(Debug, Clone, Default)]
pub struct TokenizeOutcome {
    /// Tokens for the well-formed part of the input (whitespace included)
    pub tokens: Vec<TokenWithSpan>,
    /// The unterminated construct, if the input had one
    pub unterminated: Option<Unterminated>,
    /// Text from the unterminated construct to the end of input
    pub tail: Option<String>,
    /// Tokenizer error message when no usable prefix could be recovered
    pub failure: Option<String>,
}

/// Tokenize SQL text using the MySQL dialect, recovering from unterminated
/// quotes and comments.
pub fn tokenize_best_effort(sql: &str) -> TokenizeOutcome {
    let dialect = MySqlDialect {};
    let err = match Tokenizer::new(&dialect, sql).tokenize_with_location() {
        Ok(tokens) => {
            return TokenizeOutcome {
                tokens,
                ..Default::default()
            }
        }
        Err(err) => err,
    };

    let Some(unterminated) = find_unterminated(sql) else {
        return TokenizeOutcome {
            failure: Some(err.to_string()),
            ..Default::default()
        };
    };

    let prefix = &sql[..unterminated.offset];
    match Tokenizer::new(&dialect, prefix).tokenize_with_location() {
        Ok(tokens) => TokenizeOutcome {
            tokens,
            unterminated: Some(unterminated),
            tail: Some(sql[unterminated.offset..].to_string()),
            failure: None,
        },
        Err(prefix_err) => TokenizeOutcome {
            failure: Some(prefix_err.to_string()),
            ..Default::default()
        },
    }
}

/// Find the first quote or block comment that is never closed.
///
/// Follows the MySQL lexical rules the tokenizer applies: `--` and `#` line
/// comments, nestable `/* */` comments, doubled quotes and backslash escapes
/// inside `'` and `"` strings.
pub fn find_unterminated(sql: &str) -> Option<Unterminated> {
    let mut chars = sql.char_indices().peekable();
    let mut line = 1;

    while let Some((offset, c)) = chars.next() {
        match c {
            '\n' => line += 1,
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                while let Some((_, ch)) = chars.next() {
                    if ch == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '#' => {
                while let Some((_, ch)) = chars.next() {
                    if ch == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                let start_line = line;
                chars.next();
                let mut depth = 1;
                let mut last = ' ';
                while depth > 0 {
                    let Some((_, ch)) = chars.next() else {
                        return Some(Unterminated {
                            kind: UnterminatedKind::Comment,
                            offset,
                            line: start_line,
                        });
                    };
                    if ch == '\n' {
                        line += 1;
                    }
                    if last == '/' && ch == '*' {
                        depth += 1;
                        last = ' ';
                    } else if last == '*' && ch == '/' {
                        depth -= 1;
                        last = ' ';
                    } else {
                        last = ch;
                    }
                }
            }
            '\'' | '"' | '`' => {
                let start_line = line;
                let backslash_escapes = c != '`';
                loop {
                    let Some((_, ch)) = chars.next() else {
                        return Some(Unterminated {
                            kind: UnterminatedKind::Quote(c),
                            offset,
                            line: start_line,
                        });
                    };
                    if ch == '\n' {
                        line += 1;
                    }
                    if backslash_escapes && ch == '\\' {
                        chars.next();
                    } else if ch == c {
                        if matches!(chars.peek(), Some((_, next)) if *next == c) {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    None
}

/// Base token parser with common navigation helpers.
///
/// This struct encapsulates the token stream and position, providing
/// the standard navigation and checking methods needed by specialized
/// parsers.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Create a new TokenParser from a SQL string.
    ///
    /// Uses MySqlDialect for tokenization. Returns `None` if tokenization fails.
    pub fn new(sql: &str) -> Option<Self> {
        let dialect = MySqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize_with_location()
            .ok()?;

        Some(Self { tokens, pos: 0 })
    }

    /// Create a new TokenParser with pre-tokenized tokens.
    pub fn from_tokens(tokens: Vec<TokenWithSpan>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    /// Check if at end of tokens.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get current position in token stream.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set current position in token stream.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Get the underlying tokens slice.
    #[inline]
    pub fn tokens(&self) -> &[TokenWithSpan] {
        &self.tokens
    }

    /// Consume the parser, returning its tokens.
    pub fn into_tokens(self) -> Vec<TokenWithSpan> {
        self.tokens
    }

    // ========================================================================
    // Token access
    // ========================================================================

    /// Get current token without consuming.
    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    /// Peek at a token at an offset from current position.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos + offset)
    }

    /// Advance to next token.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    // ========================================================================
    // Whitespace handling
    // ========================================================================

    /// Skip whitespace tokens (comments are whitespace to the tokenizer).
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.current_token() {
            match &token.token {
                Token::Whitespace(_) => self.advance(),
                _ => break,
            }
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    /// Check if current token is a specific keyword.
    ///
    /// Quoted identifiers never match, so `` `from` `` is a name, not a clause.
    #[inline]
    pub fn check_keyword(&self, keyword: Keyword) -> bool {
        if let Some(token) = self.current_token() {
            matches!(&token.token, Token::Word(w) if w.keyword == keyword && w.quote_style.is_none())
        } else {
            false
        }
    }

    /// Check if current token is an unquoted word matching (case-insensitive).
    ///
    /// Useful for MySQL words sqlparser doesn't classify as keywords
    /// (e.g., "STRAIGHT_JOIN", "QUICK").
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        if let Some(token) = self.current_token() {
            is_word_ci(&token.token, word)
        } else {
            false
        }
    }

    /// Check if current token matches a specific token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(&token.token) == std::mem::discriminant(expected)
        } else {
            false
        }
    }

    // ========================================================================
    // Expect methods (check and advance)
    // ========================================================================

    /// Expect a specific keyword, advancing if found.
    pub fn expect_keyword(&mut self, keyword: Keyword) -> Option<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a specific word (case-insensitive), advancing if found.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Expect a specific token type, advancing if found.
    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse a single identifier part: a word (quoted or not) or a
    /// bracket-quoted name, which the MySQL tokenizer splits into
    /// `[`, word, `]`.
    ///
    /// Returns the identifier value without quotes. Advances position if successful.
    pub fn parse_identifier(&mut self) -> Option<String> {
        match &self.current_token()?.token {
            Token::Word(w) => {
                let name = w.value.clone();
                self.advance();
                Some(name)
            }
            Token::LBracket => {
                let name = match &self.peek(1)?.token {
                    Token::Word(w) => w.value.clone(),
                    _ => return None,
                };
                if !matches!(self.peek(2).map(|t| &t.token), Some(Token::RBracket)) {
                    return None;
                }
                self.advance_by(3);
                Some(name)
            }
            _ => None,
        }
    }

    /// Parse a dot-qualified name: `name`, `db.name`, `` `db`.`name` ``,
    /// `[dbo].[name]`.
    ///
    /// Returns every part in order, unquoted. Whitespace between parts is
    /// skipped.
    pub fn parse_qualified_name(&mut self) -> Option<Vec<String>> {
        let mut parts = vec![self.parse_identifier()?];

        loop {
            let checkpoint = self.pos;
            self.skip_whitespace();
            if !self.check_token(&Token::Period) {
                self.pos = checkpoint;
                break;
            }
            self.advance();
            self.skip_whitespace();
            match self.parse_identifier() {
                Some(part) => parts.push(part),
                None => {
                    self.pos = checkpoint;
                    break;
                }
            }
        }

        Some(parts)
    }

    /// Advance by multiple positions.
    #[inline]
    pub fn advance_by(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.tokens.len());
    }

    // ========================================================================
    // Token string conversion
    // ========================================================================

    /// Convert a range of tokens to a string.
    ///
    /// Concatenates tokens from `start_pos` to `end_pos` (exclusive).
    #[cfg(test)]
    pub fn tokens_to_string(&self, start_pos: usize, end_pos: usize) -> String {
        self.tokens[start_pos..end_pos]
            .iter()
            .map(|t| super::identifier_utils::format_token(&t.token))
            .collect()
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Skip a parenthesized group, handling nested parentheses.
    ///
    /// Position should be at the opening parenthesis. After this call,
    /// position will be after the closing parenthesis (or at end).
    pub fn skip_parenthesized(&mut self) {
        if !self.check_token(&Token::LParen) {
            return;
        }
        self.pos = matching_paren(&self.tokens, self.pos, self.tokens.len())
            .map(|close| close + 1)
            .unwrap_or(self.tokens.len());
    }
}

/// Check whether a token is an unquoted word equal to `word` (case-insensitive).
#[inline]
pub fn is_word_ci(token: &Token, word: &str) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word))
}

/// Find the closing parenthesis matching the `(` at `open`, searching no
/// further than `end` (exclusive).
pub fn matching_paren(tokens: &[TokenWithSpan], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().take(end).skip(open) {
        match token.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
