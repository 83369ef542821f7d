//! Per-dialect identifier and query syntax (Strategy pattern).
//!
//! [`QuerySyntax`] covers everything about *spelling* SQL for one engine:
//! identifier quoting, qualified names, parameter syntax, aliases, row
//! limiting and the handful of scalar functions generated DDL needs.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::identifier::{
    make_header_name_sensible, quote_with, validate_identifier, validate_name, ObjectKind,
};
use crate::error::{DialectError, Result};

use super::DatabaseType;

static SIMPLE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());
static AT_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s=<>!+\-*/%,(])(@[A-Za-z0-9_]+)\b").unwrap());
static COLON_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s=<>!+\-*/%,(])(:[A-Za-z0-9_]+)\b").unwrap());

/// Where a row-limiting clause goes in a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopNPlacement {
    /// Immediately after `SELECT`, before the select list (`SELECT TOP 5 ...`).
    PrefixSelectList,
    /// After the whole query (`... LIMIT 5`).
    PostfixQuery,
}

/// Row-limiting SQL fragment plus where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopN {
    pub sql: String,
    pub placement: TopNPlacement,
}

/// Scalar functions generated SQL may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarFunction {
    /// Current date and time.
    Now,
    /// A freshly generated GUID.
    NewGuid,
    /// Length of a string (name only, caller supplies the argument).
    Len,
}

/// Identifier quoting, naming and small query fragments for one dialect.
pub trait QuerySyntax: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    fn open_quote(&self) -> char;

    fn close_quote(&self) -> char;

    /// Token between database, schema and table names.
    fn separator(&self) -> &str {
        "."
    }

    /// Prefix of named parameters (`@` or `:`).
    fn parameter_symbol(&self) -> char {
        '@'
    }

    /// Text placed between an expression and its alias.
    fn alias_prefix(&self) -> &str {
        " AS "
    }

    /// The alias of an `expr AS name` expression, still quoted, if `s` has one.
    ///
    /// Only an `AS` outside quotes counts, and the alias must be a single
    /// quoted or simple identifier.
    fn find_alias<'a>(&self, s: &'a str) -> Option<&'a str> {
        trailing_alias(s.trim(), self.open_quote(), self.close_quote())
    }

    fn max_database_name_length(&self) -> usize;

    fn max_table_name_length(&self) -> usize;

    fn max_column_name_length(&self) -> usize;

    fn validate_database_name(&self, name: &str) -> Result<()> {
        validate_name(ObjectKind::Database, name, self.max_database_name_length())
    }

    fn validate_table_name(&self, name: &str) -> Result<()> {
        validate_name(ObjectKind::Table, name, self.max_table_name_length())
    }

    fn validate_column_name(&self, name: &str) -> Result<()> {
        validate_name(ObjectKind::Column, name, self.max_column_name_length())
    }

    /// Schema used when a caller supplies none; `None` if the dialect has no schemas.
    fn default_schema(&self) -> Option<&str> {
        None
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Quote and escape a simple name.
    ///
    /// Names containing the separator are rejected; the closing quote
    /// character is doubled.
    fn wrap(&self, name: &str) -> Result<String> {
        validate_identifier(name)?;
        if name.contains(self.separator()) {
            return Err(DialectError::naming(format!(
                "Name {:?} contains the separator '{}' and cannot be wrapped",
                name,
                self.separator()
            )));
        }
        Ok(quote_with(name, self.open_quote(), self.close_quote()))
    }

    /// Wrap unless the text is already wrapped.
    fn ensure_wrapped(&self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.len() >= 2
            && trimmed.starts_with(self.open_quote())
            && trimmed.ends_with(self.close_quote())
        {
            Ok(trimmed.to_string())
        } else {
            self.wrap(trimmed)
        }
    }

    /// Recover the original unescaped name from a wrapped, qualified or aliased expression.
    fn unwrap(&self, wrapped: &str) -> String {
        self.get_runtime_name(wrapped)
    }

    /// The simple name an expression would have in a result set.
    ///
    /// Aliased expressions yield the alias; otherwise qualifiers and quotes are
    /// stripped and the trailing simple name is returned.
    fn get_runtime_name(&self, s: &str) -> String {
        if let Some(alias) = self.find_alias(s) {
            return self.strip_quotes(alias);
        }
        let last = last_segment(s.trim(), self.open_quote(), self.close_quote(), self.separator());
        self.strip_quotes(last)
    }

    /// Remove surrounding quotes and undo doubled closing quotes.
    fn strip_quotes(&self, s: &str) -> String {
        let (open, close) = (self.open_quote(), self.close_quote());
        let t = s.trim();
        if t.len() >= 2 && t.starts_with(open) && t.ends_with(close) {
            let inner = &t[open.len_utf8()..t.len() - close.len_utf8()];
            inner.replace(&format!("{}{}", close, close), &close.to_string())
        } else {
            t.to_string()
        }
    }

    /// Fully qualified table reference.
    fn fully_qualify(&self, database: &str, schema: Option<&str>, table: &str) -> Result<String>;

    /// Fully qualified column reference.
    fn fully_qualify_column(
        &self,
        database: &str,
        schema: Option<&str>,
        table: &str,
        column: &str,
    ) -> Result<String> {
        Ok(format!(
            "{}{}{}",
            self.fully_qualify(database, schema, table)?,
            self.separator(),
            self.ensure_wrapped(column)?
        ))
    }

    /// Column of a table-valued function: `function.column`, never database-qualified.
    fn fully_qualify_function_column(&self, function: &str, column: &str) -> Result<String> {
        Ok(format!(
            "{}{}{}",
            self.ensure_wrapped(function)?,
            self.separator(),
            self.ensure_wrapped(column)?
        ))
    }

    // =========================================================================
    // Parameters and aliases
    // =========================================================================

    /// Pattern capturing named parameters in group 1.
    fn parameter_regex(&self) -> &Regex {
        if self.parameter_symbol() == ':' {
            &*COLON_PARAMETER
        } else {
            &*AT_PARAMETER
        }
    }

    /// Named parameters referenced by `query`.
    fn parameter_names(&self, query: &str) -> BTreeSet<String> {
        self.parameter_regex()
            .captures_iter(query)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    /// Parameter name for a column, e.g. `@dateOfBirth`.
    fn parameter_name_for(&self, column: &str) -> String {
        format!("{}{}", self.parameter_symbol(), make_header_name_sensible(column))
    }

    /// `expr AS wrapped(alias)`.
    fn alias(&self, expression: &str, alias: &str) -> Result<String> {
        Ok(format!("{}{}{}", expression, self.alias_prefix(), self.wrap(alias)?))
    }

    // =========================================================================
    // Query fragments
    // =========================================================================

    /// Row-limiting clause for `n` rows.
    fn top_n(&self, n: u64) -> TopN {
        TopN {
            sql: format!("LIMIT {}", n),
            placement: TopNPlacement::PostfixQuery,
        }
    }

    /// `SELECT` of at most `n` rows from `table_fqn`.
    fn build_top_n_select(&self, table_fqn: &str, select_list: &str, n: u64) -> String {
        let top = self.top_n(n);
        match top.placement {
            TopNPlacement::PrefixSelectList => {
                format!("SELECT {} {} FROM {}", top.sql, select_list, table_fqn)
            }
            TopNPlacement::PostfixQuery => {
                format!("SELECT {} FROM {} {}", select_list, table_fqn, top.sql)
            }
        }
    }

    fn scalar_function_sql(&self, function: ScalarFunction) -> String;

    /// Keyword(s) appended to an auto-increment column definition.
    fn auto_increment_keyword(&self) -> &str;
}

/// Text after the last separator that is not inside quotes.
fn last_segment<'a>(s: &'a str, open: char, close: char, separator: &str) -> &'a str {
    let mut start = 0;
    let mut in_quote = false;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if in_quote {
            if c == close {
                if chars.peek().map(|(_, n)| *n) == Some(close) {
                    chars.next();
                } else {
                    in_quote = false;
                }
            }
        } else if c == open {
            in_quote = true;
        } else if s[i..].starts_with(separator) {
            start = i + separator.len();
        }
    }
    &s[start..]
}

/// Start of the text after a closing quote, or `None` if the quote never closes.
fn skip_quoted(s: &str, from: usize, close: char) -> Option<usize> {
    let mut chars = s[from..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == close {
            if chars.peek().map(|(_, n)| *n) == Some(close) {
                chars.next();
            } else {
                return Some(from + i + c.len_utf8());
            }
        }
    }
    None
}

/// Alias following the last unquoted ` AS ` in `s`.
fn trailing_alias(s: &str, open: char, close: char) -> Option<&str> {
    let mut alias_at = None;
    let mut i = 0;
    while let Some(c) = s[i..].chars().next() {
        if c == open {
            i = skip_quoted(s, i + c.len_utf8(), close)?;
            continue;
        }
        if c.is_whitespace() && i > 0 {
            let rest = s[i..].trim_start();
            let is_as = rest.get(..2).is_some_and(|k| k.eq_ignore_ascii_case("as"));
            if is_as && rest[2..].starts_with(char::is_whitespace) {
                alias_at = Some(s.len() - rest[2..].trim_start().len());
            }
        }
        i += c.len_utf8();
    }

    let alias = &s[alias_at?..];
    let single = match alias.chars().next() {
        Some(c) if c == open => skip_quoted(alias, c.len_utf8(), close) == Some(alias.len()),
        Some(_) => SIMPLE_IDENTIFIER.is_match(alias),
        None => false,
    };
    single.then_some(alias)
}

/// Check that a dialect's alias generation and alias detection agree.
///
/// Generates an alias for a set of awkward names and parses each back with
/// [`QuerySyntax::get_runtime_name`]. Any mismatch is a defect in the dialect.
pub fn verify_alias_contract(syntax: &dyn QuerySyntax) -> Result<()> {
    let close = syntax.close_quote().to_string();
    let names = [
        "bob".to_string(),
        "Bob Smith".to_string(),
        "col_1".to_string(),
        "as".to_string(),
        "Bob as Smith".to_string(),
        "x AS y".to_string(),
        format!("odd{}name", close),
        close,
    ];
    for name in &names {
        let aliased = syntax.alias("MAX(x)", name)?;
        let recovered = syntax.get_runtime_name(&aliased);
        if &recovered != name {
            return Err(DialectError::Config(format!(
                "{} alias contract violated: alias {:?} generated {:?} which parsed back as {:?}",
                syntax.database_type(),
                name,
                aliased,
                recovered
            )));
        }
    }
    Ok(())
}

/// Prefixed parameter names for `columns`, in order and unique.
///
/// A column whose name sanitizes to nothing, or to a name an earlier column
/// already took, gets a positional `p{i}` name instead.
pub fn parameter_names_for(syntax: &dyn QuerySyntax, columns: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let sensible = make_header_name_sensible(column);
            let mut name = if sensible.is_empty() || used.contains(&sensible.to_lowercase()) {
                format!("p{}", i)
            } else {
                sensible
            };
            while !used.insert(name.to_lowercase()) {
                name.push('_');
            }
            format!("{}{}", syntax.parameter_symbol(), name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Brackets;

    impl QuerySyntax for Brackets {
        fn database_type(&self) -> DatabaseType {
            DatabaseType::Mssql
        }
        fn open_quote(&self) -> char {
            '['
        }
        fn close_quote(&self) -> char {
            ']'
        }
        fn max_database_name_length(&self) -> usize {
            128
        }
        fn max_table_name_length(&self) -> usize {
            128
        }
        fn max_column_name_length(&self) -> usize {
            128
        }
        fn fully_qualify(&self, database: &str, _schema: Option<&str>, table: &str) -> Result<String> {
            Ok(format!("{}.{}", self.ensure_wrapped(database)?, self.ensure_wrapped(table)?))
        }
        fn scalar_function_sql(&self, _function: ScalarFunction) -> String {
            String::new()
        }
        fn auto_increment_keyword(&self) -> &str {
            ""
        }
    }

    #[test]
    fn test_wrap_rejects_separator() {
        let err = Brackets.wrap("db.table").unwrap_err();
        assert!(matches!(err, DialectError::Naming(_)));
    }

    #[test]
    fn test_wrap_closing_bracket_name() {
        assert_eq!(Brackets.wrap("]").unwrap(), "[]]]");
        assert_eq!(Brackets.unwrap("[]]]"), "]");
    }

    #[test]
    fn test_runtime_name_from_qualified() {
        assert_eq!(Brackets.get_runtime_name("[db]..[my table]"), "my table");
        assert_eq!(Brackets.get_runtime_name("[db].[dbo].[a.b]"), "a.b");
        assert_eq!(Brackets.get_runtime_name("plain"), "plain");
    }

    #[test]
    fn test_runtime_name_from_alias() {
        assert_eq!(Brackets.get_runtime_name("count(*) AS [total]"), "total");
        assert_eq!(Brackets.get_runtime_name("t.x as y"), "y");
    }

    #[test]
    fn test_runtime_name_ignores_as_inside_quotes() {
        assert_eq!(Brackets.get_runtime_name("MAX(x) AS [Bob as Smith]"), "Bob as Smith");
        assert_eq!(Brackets.get_runtime_name("[a as b]"), "a as b");
        assert_eq!(Brackets.get_runtime_name("[db]..[a as b]"), "a as b");
        assert_eq!(Brackets.get_runtime_name("[x] AS [y] AS [z]"), "z");
    }

    #[test]
    fn test_runtime_name_rejects_non_identifier_alias() {
        assert_eq!(Brackets.find_alias("a as b c"), None);
        assert_eq!(Brackets.find_alias("MAX(x) AS [open"), None);
        assert_eq!(Brackets.find_alias("as"), None);
    }

    #[test]
    fn test_fully_qualify_column_keeps_as_in_name() {
        assert_eq!(
            Brackets.fully_qualify_column("db", None, "t", "a as b").unwrap(),
            "[db].[t].[a as b]"
        );
        assert_eq!(Brackets.ensure_wrapped("[already]").unwrap(), "[already]");
    }

    #[test]
    fn test_parameter_names() {
        let names = Brackets.parameter_names("SELECT * FROM t WHERE a=@a AND (b >@b2) OR c = 'x@y'");
        let expected: BTreeSet<String> = ["@a", "@b2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_parameter_at_start_and_after_comma() {
        let names = Brackets.parameter_names("@first,@second");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_default_top_n_is_postfix() {
        assert_eq!(
            Brackets.build_top_n_select("[t]", "*", 5),
            "SELECT * FROM [t] LIMIT 5"
        );
    }

    #[test]
    fn test_name_validators_use_their_limits() {
        let long = "x".repeat(129);
        assert!(Brackets.validate_table_name("people").is_ok());
        assert!(Brackets.validate_column_name(&long).is_err());
        assert!(Brackets.validate_database_name("").is_err());
    }

    #[test]
    fn test_alias_contract_holds_for_defaults() {
        verify_alias_contract(&Brackets).unwrap();
    }

    #[test]
    fn test_parameter_names_for_unique_and_safe() {
        let columns = vec![
            "first name".to_string(),
            "%%".to_string(),
            "Bob".to_string(),
            "bob".to_string(),
        ];
        let names = parameter_names_for(&Brackets, &columns);
        assert_eq!(names, ["@firstName", "@p1", "@Bob", "@p3"]);
    }
}
