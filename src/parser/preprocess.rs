//! Text-level cleanup applied to routine source before tokenization
//!
//! ## Preprocessing Operations
//!
//! 1. **Byte order mark** - a leading `U+FEFF` is dropped.
//!
//! 2. **DELIMITER directives** - dump files wrap routine bodies in client
//!    directives:
//!
//!    ```sql
//!    DELIMITER $$
//!    CREATE PROCEDURE load_bookings() BEGIN ... END$$
//!    DELIMITER ;
//!    ```
//!
//!    The directive lines are not SQL. They are removed and every custom
//!    delimiter is rewritten to `;` so the statement splitter sees ordinary
//!    terminators.
//!
//! 3. **DEFINER clause** - `DEFINER=`root`@`%`` in a routine header is
//!    removed. The `@` host part is not valid input for the tokenizer.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// `DELIMITER <token>` on a line of its own
static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*DELIMITER[ \t]+(\S+)[ \t]*\r?$").unwrap());

/// `DEFINER = user[@host]` right after `CREATE [OR REPLACE]`, with any of
/// the MySQL quoting styles
static DEFINER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\bCREATE\s+(?:OR\s+REPLACE\s+)?(DEFINER\s*=\s*(?:`[^`]*`|'[^']*'|"[^"]*"|[^\s@(;]+)(?:\s*@\s*(?:`[^`]*`|'[^']*'|"[^"]*"|[^\s(;]+))?)"#,
    )
    .unwrap()
});

/// Apply every preprocessing step to routine source.
pub fn preprocess_routine_sql(sql: &str) -> Cow<'_, str> {
    let sql = sql.strip_prefix('\u{feff}').unwrap_or(sql);
    match strip_delimiter_directives(sql) {
        Cow::Borrowed(text) => strip_definer_clause(text),
        Cow::Owned(text) => Cow::Owned(strip_definer_clause(&text).into_owned()),
    }
}

/// Remove `DELIMITER` directives and replace custom delimiters with `;`.
///
/// Returns the input unchanged (borrowed) when there are no directives.
pub fn strip_delimiter_directives(sql: &str) -> Cow<'_, str> {
    if !DELIMITER_RE.is_match(sql) {
        return Cow::Borrowed(sql);
    }

    let mut delimiters: Vec<String> = DELIMITER_RE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|d| d != ";")
        .collect();
    delimiters.sort();
    delimiters.dedup();
    // Longest first so `$$$` is not half-replaced by `$$`
    delimiters.sort_by_key(|d| std::cmp::Reverse(d.len()));

    let mut cleaned = DELIMITER_RE.replace_all(sql, "").into_owned();
    for delimiter in &delimiters {
        cleaned = cleaned.replace(delimiter.as_str(), ";");
    }

    Cow::Owned(cleaned)
}

/// Remove the `DEFINER=...` clause of the first `CREATE` header.
///
/// A `definer` column or variable in a routine body is left alone.
pub fn strip_definer_clause(sql: &str) -> Cow<'_, str> {
    let Some(clause) = DEFINER_RE.captures(sql).and_then(|caps| caps.get(1)) else {
        return Cow::Borrowed(sql);
    };
    let mut cleaned = String::with_capacity(sql.len());
    cleaned.push_str(&sql[..clause.start()]);
    cleaned.push_str(&sql[clause.end()..]);
    Cow::Owned(cleaned)
}
