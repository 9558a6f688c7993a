//! Table reference extraction for a single statement
//!
//! Walks the significant tokens of a [`NormalizedStatement`] and classifies
//! every table identifier by the clause that introduces it. All clause
//! matching goes through [`recognize_clause`] and its rule table, so a new
//! join form or dialect keyword is one more row rather than another special
//! case in the walker.
//!
//! ## Scopes
//!
//! Parenthesized groups open a new scope. A group starting with `SELECT` or
//! `WITH` is a query scope where clause keywords apply; any other group
//! (function arguments, column lists, `IN` lists) is an expression scope
//! where they do not, so `EXTRACT(YEAR FROM d)` yields nothing. Subqueries
//! nested inside an expression scope are still visited.
//!
//! ```sql
//! INSERT INTO fact_bookings (id)            -- WRITE fact_bookings
//! SELECT p.id FROM dim_passenger p          -- READ dim_passenger
//! JOIN dim_segment s ON s.id = p.segment_id -- READ dim_segment
//! WHERE p.port IN (SELECT id FROM dim_port) -- READ dim_port
//! ```

use std::collections::BTreeSet;

use sqlparser::tokenizer::{Token, TokenWithSpan};

use crate::model::{Direction, SchemaRegistry, TableReference};

use super::identifier_utils::canonical_from_parts;
use super::statement_splitter::{split_statements, NormalizedStatement};
use super::token_parser_base::{is_word_ci, matching_paren, TokenParser};
use super::warning::ParseWarning;

/// Word that may or must follow a clause keyword and its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    None,
    Optional(&'static str),
    Required(&'static str),
}

/// One row of the clause table
#[derive(Debug, Clone, Copy)]
pub struct ClauseRule {
    pub keyword: &'static str,
    /// Words allowed between the keyword and the connector
    pub modifiers: &'static [&'static str],
    pub connector: Connector,
    pub direction: Direction,
    /// Whether a comma-separated list of tables follows
    pub list: bool,
    /// The keyword is not a clause when directly preceded by one of these
    pub not_after: &'static [&'static str],
}

/// Clause-introducing keywords and the direction of the tables they name.
///
/// `JOIN` covers `INNER`/`LEFT`/`RIGHT`/`FULL`/`CROSS`/`NATURAL` joins since
/// those words simply precede it.
pub const CLAUSE_RULES: &[ClauseRule] = &[
    ClauseRule {
        keyword: "INSERT",
        modifiers: &["LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY", "IGNORE"],
        connector: Connector::Optional("INTO"),
        direction: Direction::Write,
        list: false,
        not_after: &[],
    },
    ClauseRule {
        keyword: "REPLACE",
        modifiers: &["LOW_PRIORITY", "DELAYED"],
        connector: Connector::Optional("INTO"),
        direction: Direction::Write,
        list: false,
        // CREATE OR REPLACE VIEW
        not_after: &["OR"],
    },
    ClauseRule {
        keyword: "UPDATE",
        modifiers: &["LOW_PRIORITY", "IGNORE"],
        connector: Connector::None,
        direction: Direction::Write,
        list: true,
        // ON DUPLICATE KEY UPDATE, SELECT ... FOR UPDATE, ON UPDATE CASCADE
        not_after: &["KEY", "FOR", "ON"],
    },
    ClauseRule {
        keyword: "DELETE",
        modifiers: &["LOW_PRIORITY", "QUICK", "IGNORE"],
        connector: Connector::Required("FROM"),
        direction: Direction::Write,
        list: false,
        not_after: &["ON"],
    },
    ClauseRule {
        keyword: "TRUNCATE",
        modifiers: &[],
        connector: Connector::Optional("TABLE"),
        direction: Direction::Write,
        list: false,
        not_after: &[],
    },
    ClauseRule {
        keyword: "FROM",
        modifiers: &[],
        connector: Connector::None,
        direction: Direction::Read,
        list: true,
        // IS DISTINCT FROM, FETCH [NEXT] FROM cursor
        not_after: &["DISTINCT", "FETCH", "NEXT"],
    },
    ClauseRule {
        keyword: "JOIN",
        modifiers: &[],
        connector: Connector::None,
        direction: Direction::Read,
        list: false,
        not_after: &[],
    },
    ClauseRule {
        keyword: "STRAIGHT_JOIN",
        modifiers: &[],
        connector: Connector::None,
        direction: Direction::Read,
        list: false,
        // SELECT STRAIGHT_JOIN is a join-order hint
        not_after: &["SELECT"],
    },
];

/// A recognized clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClauseMatch {
    pub direction: Direction,
    pub list: bool,
    /// Index of the first token after the keyword, modifiers and connector
    pub target: usize,
}

/// Match the clause keyword at `pos` against [`CLAUSE_RULES`].
///
/// A write keyword directly followed by `(` is a function call
/// (`REPLACE(s, 'a', 'b')`, `TRUNCATE(x, 2)`), not a clause.
pub fn recognize_clause(tokens: &[TokenWithSpan], pos: usize, end: usize) -> Option<ClauseMatch> {
    let token = &tokens.get(pos)?.token;
    let rule = CLAUSE_RULES.iter().find(|r| is_word_ci(token, r.keyword))?;

    if let Some(prev) = pos.checked_sub(1).and_then(|p| tokens.get(p)) {
        if rule.not_after.iter().any(|w| is_word_ci(&prev.token, w)) {
            return None;
        }
    }

    let mut next = pos + 1;
    if rule.direction == Direction::Write
        && matches!(tokens.get(next).map(|t| &t.token), Some(Token::LParen))
    {
        return None;
    }

    while next < end && rule.modifiers.iter().any(|m| is_word_ci(&tokens[next].token, m)) {
        next += 1;
    }

    let has_connector = |word: &str| next < end && is_word_ci(&tokens[next].token, word);
    match rule.connector {
        Connector::None => {}
        Connector::Optional(word) => {
            if has_connector(word) {
                next += 1;
            }
        }
        Connector::Required(word) => {
            if !has_connector(word) {
                return None;
            }
            next += 1;
        }
    }

    Some(ClauseMatch {
        direction: rule.direction,
        list: rule.list,
        target: next,
    })
}

/// Words that end a table factor instead of naming its alias
const STOP_WORDS: &[&str] = &[
    "ON",
    "USING",
    "WHERE",
    "SET",
    "JOIN",
    "INNER",
    "LEFT",
    "RIGHT",
    "FULL",
    "CROSS",
    "NATURAL",
    "OUTER",
    "STRAIGHT_JOIN",
    "GROUP",
    "ORDER",
    "HAVING",
    "LIMIT",
    "OFFSET",
    "UNION",
    "EXCEPT",
    "INTERSECT",
    "MINUS",
    "WINDOW",
    "FOR",
    "LOCK",
    "INTO",
    "IN",
    "VALUES",
    "VALUE",
    "SELECT",
    "WITH",
    "TABLE",
    "PARTITION",
    "USE",
    "FORCE",
    "IGNORE",
    "RETURNING",
    "WHEN",
    "THEN",
    "ELSE",
    "END",
    "DO",
    "AND",
    "OR",
    "NOT",
    "AS",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|s| word.eq_ignore_ascii_case(s))
}

/// A table named in the reference list of a multi-table `DELETE`
#[derive(Debug, Clone)]
struct DeclaredTable {
    /// Position of the name's first token
    pos: usize,
    name: String,
    alias: Option<String>,
}

/// Match a multi-table `DELETE` target (alias, or table name) to its
/// declaration.
fn resolve_delete_target<'d>(target: &[String], declared: &'d [DeclaredTable]) -> Option<&'d DeclaredTable> {
    let key = canonical_from_parts(target);
    if target.len() == 1 {
        if let Some(table) = declared.iter().find(|d| d.alias.as_deref() == Some(key.as_str())) {
            return Some(table);
        }
    }
    declared
        .iter()
        .find(|d| d.alias.is_none() && d.name == key)
        .or_else(|| declared.iter().find(|d| d.name == key))
}

/// Scope kind of a token range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Clause keywords are recognized
    Query,
    /// Clause keywords are ordinary words; nested subqueries are still visited
    Expression,
}

/// References and warnings extracted from one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementReferences {
    pub references: BTreeSet<TableReference>,
    pub warnings: Vec<ParseWarning>,
}

impl StatementReferences {
    /// Tables with the given direction
    pub fn tables(&self, direction: Direction) -> BTreeSet<String> {
        self.references
            .iter()
            .filter(|r| r.direction == direction)
            .map(|r| r.table.clone())
            .collect()
    }

    pub fn reads(&self) -> BTreeSet<String> {
        self.tables(Direction::Read)
    }

    pub fn writes(&self) -> BTreeSet<String> {
        self.tables(Direction::Write)
    }
}

/// Token-based reference extractor for one statement
pub struct ReferenceExtractor<'a> {
    base: TokenParser,
    registry: &'a SchemaRegistry,
    statement: usize,
    /// CTE names visible at the current point, one frame per `WITH`
    cte_scopes: Vec<BTreeSet<String>>,
    /// Declarations in a multi-table `DELETE` that are delete targets
    delete_sources: BTreeSet<usize>,
    unregistered: BTreeSet<String>,
    references: BTreeSet<TableReference>,
    warnings: Vec<ParseWarning>,
}

impl<'a> ReferenceExtractor<'a> {
    pub fn new(statement: &NormalizedStatement, registry: &'a SchemaRegistry) -> Self {
        Self {
            base: TokenParser::from_tokens(statement.tokens().to_vec()),
            registry,
            statement: statement.index,
            cte_scopes: Vec::new(),
            delete_sources: BTreeSet::new(),
            unregistered: BTreeSet::new(),
            references: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Run extraction over the whole statement.
    pub fn extract(mut self) -> StatementReferences {
        let mut end = self.base.tokens().len();

        if let Some(cut) = self.dynamic_sql_position() {
            let line = self.base.tokens()[cut].span.start.line as usize;
            self.warnings.push(ParseWarning::DynamicSql {
                statement: self.statement,
                line,
            });
            end = cut;
        }

        self.scan_scope(0, end, ScopeKind::Query);

        StatementReferences {
            references: self.references,
            warnings: self.warnings,
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn token(&self, pos: usize, end: usize) -> Option<&Token> {
        if pos < end {
            self.base.tokens().get(pos).map(|t| &t.token)
        } else {
            None
        }
    }

    fn is_word(&self, pos: usize, end: usize, word: &str) -> bool {
        self.token(pos, end).is_some_and(|t| is_word_ci(t, word))
    }

    fn close_of(&self, open: usize, end: usize) -> usize {
        matching_paren(self.base.tokens(), open, end).unwrap_or(end)
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// CTEs declared by a `WITH` in this scope are visible until it ends.
    fn scan_scope(&mut self, start: usize, end: usize, kind: ScopeKind) {
        let depth = self.cte_scopes.len();
        let mut pos = start;
        while pos < end {
            if matches!(self.token(pos, end), Some(Token::LParen)) {
                let close = self.close_of(pos, end);
                let inner = self.classify_group(pos + 1, close);
                self.scan_scope(pos + 1, close, inner);
                pos = close + 1;
                continue;
            }

            if kind == ScopeKind::Query {
                if self.is_word(pos, end, "WITH") {
                    pos = self.read_cte_list(pos + 1, end);
                    continue;
                }
                if let Some(next) = self.read_multi_table_delete(pos, end) {
                    pos = next;
                    continue;
                }
                if let Some(clause) = recognize_clause(self.base.tokens(), pos, end) {
                    pos = self.read_targets(clause.target, end, clause.direction, clause.list);
                    continue;
                }
            }
            pos += 1;
        }
        self.cte_scopes.truncate(depth);
    }

    /// A group is a query scope when it starts with `SELECT`/`WITH`, or
    /// wraps another query group.
    fn classify_group(&self, start: usize, end: usize) -> ScopeKind {
        match self.token(start, end) {
            Some(t) if is_word_ci(t, "SELECT") || is_word_ci(t, "WITH") => ScopeKind::Query,
            Some(Token::LParen) => {
                let close = self.close_of(start, end);
                self.classify_group(start + 1, close)
            }
            _ => ScopeKind::Expression,
        }
    }

    // ========================================================================
    // Table factors
    // ========================================================================

    /// Read one table factor, or a comma-separated list when `list` is set.
    /// Returns the position after the last factor.
    fn read_targets(&mut self, start: usize, end: usize, direction: Direction, list: bool) -> usize {
        let mut pos = self.read_table_factor(start, end, direction);
        while list && matches!(self.token(pos, end), Some(Token::Comma)) {
            pos = self.read_table_factor(pos + 1, end, direction);
        }
        pos
    }

    fn read_table_factor(&mut self, start: usize, end: usize, direction: Direction) -> usize {
        let mut pos = start;
        if self.is_word(pos, end, "LATERAL") {
            pos += 1;
        }

        match self.token(pos, end) {
            Some(Token::LParen) => {
                let close = self.close_of(pos, end);
                if self.classify_group(pos + 1, close) == ScopeKind::Query {
                    self.scan_scope(pos + 1, close, ScopeKind::Query);
                } else {
                    // Parenthesized join: (a JOIN b ON ...)
                    let rest = self.read_targets(pos + 1, close, direction, true);
                    self.scan_scope(rest, close, ScopeKind::Query);
                }
                self.skip_alias_and_hints((close + 1).min(end), end)
            }
            Some(Token::Word(w)) => {
                if w.quote_style.is_none() {
                    if w.value.eq_ignore_ascii_case("DUAL") {
                        return pos + 1;
                    }
                    if w.value.starts_with('@') || is_stop_word(&w.value) {
                        return pos;
                    }
                }

                self.base.set_pos(pos);
                let Some(parts) = self.base.parse_qualified_name() else {
                    return pos + 1;
                };
                let after = self.base.pos().min(end);

                // Table function such as JSON_TABLE(...); the arguments are
                // visited by the enclosing scope.
                if direction == Direction::Read
                    && matches!(self.token(after, end), Some(Token::LParen))
                {
                    return after;
                }
                if direction == Direction::Read && self.delete_sources.contains(&pos) {
                    return self.skip_alias_and_hints(after, end);
                }

                self.record(&parts, direction);
                self.skip_alias_and_hints(after, end)
            }
            Some(Token::LBracket) => {
                self.base.set_pos(pos);
                match self.base.parse_qualified_name() {
                    Some(parts) => {
                        let after = self.base.pos().min(end);
                        self.record(&parts, direction);
                        self.skip_alias_and_hints(after, end)
                    }
                    None => pos + 1,
                }
            }
            _ => pos,
        }
    }

    /// Skip `PARTITION (...)`, `[AS] alias` and index hints after a table.
    fn skip_alias_and_hints(&self, start: usize, end: usize) -> usize {
        let mut pos = start;
        let mut alias_seen = false;

        loop {
            if self.is_word(pos, end, "PARTITION")
                && matches!(self.token(pos + 1, end), Some(Token::LParen))
            {
                pos = self.close_of(pos + 1, end) + 1;
                continue;
            }

            if (self.is_word(pos, end, "USE")
                || self.is_word(pos, end, "FORCE")
                || self.is_word(pos, end, "IGNORE"))
                && (self.is_word(pos + 1, end, "INDEX") || self.is_word(pos + 1, end, "KEY"))
            {
                pos += 2;
                if self.is_word(pos, end, "FOR") {
                    pos += 1;
                    if self.is_word(pos, end, "ORDER") || self.is_word(pos, end, "GROUP") {
                        pos += 2;
                    } else {
                        pos += 1;
                    }
                }
                if matches!(self.token(pos, end), Some(Token::LParen)) {
                    pos = self.close_of(pos, end) + 1;
                }
                continue;
            }

            if alias_seen {
                break;
            }

            if self.is_word(pos, end, "AS") {
                pos += 1;
                if matches!(
                    self.token(pos, end),
                    Some(Token::Word(_) | Token::SingleQuotedString(_) | Token::DoubleQuotedString(_))
                ) {
                    pos += 1;
                }
                alias_seen = true;
                continue;
            }

            match self.token(pos, end) {
                Some(Token::Word(w))
                    if w.quote_style.is_some() || !is_stop_word(&w.value) =>
                {
                    pos += 1;
                    alias_seen = true;
                }
                _ => break,
            }
        }

        pos.min(end)
    }

    /// Alias after a table name: `[PARTITION (...)] [AS] alias`
    fn alias_at(&self, start: usize, end: usize) -> Option<String> {
        let mut pos = start;
        if self.is_word(pos, end, "PARTITION") && matches!(self.token(pos + 1, end), Some(Token::LParen)) {
            pos = self.close_of(pos + 1, end) + 1;
        }
        if self.is_word(pos, end, "AS") {
            pos += 1;
        }
        match self.token(pos, end) {
            Some(Token::Word(w)) if w.quote_style.is_some() || !is_stop_word(&w.value) => {
                Some(w.value.to_lowercase())
            }
            _ => None,
        }
    }

    fn record(&mut self, parts: &[String], direction: Direction) {
        self.record_name(canonical_from_parts(parts), direction);
    }

    fn record_name(&mut self, name: String, direction: Direction) {
        if name.is_empty() || self.cte_scopes.iter().any(|frame| frame.contains(&name)) {
            return;
        }

        if self.registry.contains(&name) {
            self.references.insert(TableReference {
                table: name,
                direction,
            });
        } else if self.unregistered.insert(name.clone()) {
            self.warnings.push(ParseWarning::UnregisteredTable {
                name,
                statement: self.statement,
            });
        }
    }

    // ========================================================================
    // Statement-level analysis
    // ========================================================================

    /// Read `[RECURSIVE] name [(cols)] AS (...) [, ...]` after `WITH`.
    ///
    /// Each body is scanned before its own name is declared, so a CTE named
    /// after a real table still reads that table inside its body. Under
    /// `RECURSIVE` the name is visible in its own body. Returns where
    /// scanning resumes.
    fn read_cte_list(&mut self, start: usize, end: usize) -> usize {
        let mut pos = start;
        let recursive = self.is_word(pos, end, "RECURSIVE");
        if recursive {
            pos += 1;
        }
        self.cte_scopes.push(BTreeSet::new());

        loop {
            let name = match self.token(pos, end) {
                Some(Token::Word(w))
                    if w.quote_style.is_some() || !is_reserved_after_with(&w.value) =>
                {
                    w.value.to_lowercase()
                }
                _ => return pos,
            };
            let mut body = pos + 1;
            if matches!(self.token(body, end), Some(Token::LParen)) {
                body = self.close_of(body, end) + 1;
            }
            if !self.is_word(body, end, "AS") {
                return pos;
            }
            body += 1;
            if self.is_word(body, end, "NOT") {
                body += 1;
            }
            if self.is_word(body, end, "MATERIALIZED") {
                body += 1;
            }
            if !matches!(self.token(body, end), Some(Token::LParen)) {
                return pos;
            }

            let close = self.close_of(body, end);
            if recursive {
                self.declare_cte(name.clone());
            }
            let inner = self.classify_group(body + 1, close);
            self.scan_scope(body + 1, close, inner);
            self.declare_cte(name);

            if matches!(self.token(close + 1, end), Some(Token::Comma)) {
                pos = close + 2;
            } else {
                return (close + 1).min(end);
            }
        }
    }

    fn declare_cte(&mut self, name: String) {
        if let Some(frame) = self.cte_scopes.last_mut() {
            frame.insert(name);
        }
    }

    /// Multi-table `DELETE`: `DELETE t1[.*], ... FROM refs` or
    /// `DELETE FROM t1[.*], ... USING refs`.
    ///
    /// The targets are aliases or names declared in `refs`. They are
    /// recorded as writes and their declarations are not read; every other
    /// table in `refs` is read as usual. Returns where scanning resumes, or
    /// `None` for a single-table delete.
    fn read_multi_table_delete(&mut self, pos: usize, end: usize) -> Option<usize> {
        if !self.is_word(pos, end, "DELETE") || (pos > 0 && self.is_word(pos - 1, end, "ON")) {
            return None;
        }
        let mut next = pos + 1;
        while ["LOW_PRIORITY", "QUICK", "IGNORE"]
            .iter()
            .any(|m| self.is_word(next, end, m))
        {
            next += 1;
        }

        let using_form = self.is_word(next, end, "FROM");
        if using_form {
            next += 1;
        }
        let (targets, after) = self.delete_target_list(next, end)?;
        if !self.is_word(after, end, if using_form { "USING" } else { "FROM" }) {
            return None;
        }

        let declared = self.declared_tables(after + 1, end);
        for target in &targets {
            match resolve_delete_target(target, &declared) {
                Some(table) => {
                    self.delete_sources.insert(table.pos);
                    self.record_name(table.name.clone(), Direction::Write);
                }
                None => self.record(target, Direction::Write),
            }
        }

        if using_form {
            Some(self.read_targets(after + 1, end, Direction::Read, true))
        } else {
            // The FROM list is read by the regular clause rule
            Some(after)
        }
    }

    /// `name[.*] [, name[.*] ...]`; returns the names and the position after
    /// the list.
    fn delete_target_list(&mut self, start: usize, end: usize) -> Option<(Vec<Vec<String>>, usize)> {
        let mut targets = Vec::new();
        let mut pos = start;
        loop {
            match self.token(pos, end) {
                Some(Token::Word(w)) if w.quote_style.is_some() || !is_stop_word(&w.value) => {}
                _ => return None,
            }
            self.base.set_pos(pos);
            let parts = self.base.parse_qualified_name()?;
            pos = self.base.pos().min(end);
            if matches!(self.token(pos, end), Some(Token::Period))
                && matches!(self.token(pos + 1, end), Some(Token::Mul))
            {
                pos += 2;
            }
            targets.push(parts);

            if matches!(self.token(pos, end), Some(Token::Comma)) {
                pos += 1;
            } else {
                return Some((targets, pos));
            }
        }
    }

    /// Tables declared in a `FROM`/`USING` reference list, up to `WHERE`,
    /// `ORDER BY` or `LIMIT`.
    fn declared_tables(&mut self, start: usize, end: usize) -> Vec<DeclaredTable> {
        let mut declared = Vec::new();
        let mut pos = start;
        let mut expect_factor = true;

        while pos < end {
            match self.token(pos, end) {
                Some(Token::LParen) => {
                    pos = self.close_of(pos, end) + 1;
                    expect_factor = false;
                    continue;
                }
                Some(Token::Comma) => {
                    expect_factor = true;
                    pos += 1;
                    continue;
                }
                Some(t) if ["WHERE", "ORDER", "LIMIT"].iter().any(|w| is_word_ci(t, w)) => break,
                Some(t) if is_word_ci(t, "JOIN") || is_word_ci(t, "STRAIGHT_JOIN") => {
                    expect_factor = true;
                    pos += 1;
                    continue;
                }
                _ => {}
            }

            if expect_factor {
                expect_factor = false;
                let mut at = pos;
                if self.is_word(at, end, "LATERAL") {
                    at += 1;
                }
                let named = matches!(
                    self.token(at, end),
                    Some(Token::Word(w)) if w.quote_style.is_some() || !is_stop_word(&w.value)
                );
                if named {
                    self.base.set_pos(at);
                    if let Some(parts) = self.base.parse_qualified_name() {
                        let after = self.base.pos().min(end);
                        declared.push(DeclaredTable {
                            pos: at,
                            name: canonical_from_parts(&parts),
                            alias: self.alias_at(after, end),
                        });
                        pos = after;
                        continue;
                    }
                }
            }
            pos += 1;
        }

        declared
    }

    /// Position of a top-level `PREPARE` or `EXECUTE`, if any.
    fn dynamic_sql_position(&self) -> Option<usize> {
        let tokens = self.base.tokens();
        let mut depth = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            match &token.token {
                Token::LParen => depth += 1,
                Token::RParen => depth = depth.saturating_sub(1),
                t if depth == 0 && (is_word_ci(t, "PREPARE") || is_word_ci(t, "EXECUTE")) => {
                    let dealloc = i
                        .checked_sub(1)
                        .and_then(|p| tokens.get(p))
                        .is_some_and(|p| is_word_ci(&p.token, "DEALLOCATE") || is_word_ci(&p.token, "DROP"));
                    if !dealloc {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn is_reserved_after_with(word: &str) -> bool {
    ["ROLLUP", "CHECK", "CONSISTENT", "RECURSIVE", "SELECT"]
        .iter()
        .any(|w| word.eq_ignore_ascii_case(w))
}

/// Extract the table references of one normalized statement.
pub fn extract_references(
    statement: &NormalizedStatement,
    registry: &SchemaRegistry,
) -> StatementReferences {
    ReferenceExtractor::new(statement, registry).extract()
}

/// Extract references from raw SQL text holding one or more statements.
///
/// Statements are split the same way a procedure body is; their references
/// and warnings are merged.
pub fn extract_sql_references(sql: &str, registry: &SchemaRegistry) -> StatementReferences {
    let split = split_statements(sql);
    let mut merged = StatementReferences {
        warnings: split.warnings,
        ..Default::default()
    };
    for statement in &split.statements {
        let refs = extract_references(statement, registry);
        merged.references.extend(refs.references);
        merged.warnings.extend(refs.warnings);
    }
    merged
}
