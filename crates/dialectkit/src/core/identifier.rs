//! Centralized identifier validation and naming helpers.
//!
//! Identifiers (table, column, database names) cannot be passed as parameters
//! in prepared statements, so every name that ends up in generated SQL goes
//! through here first:
//!
//! 1. Validate it for suspicious patterns (null bytes, blank names)
//! 2. Enforce the dialect's length ceiling and illegal characters
//! 3. Quote/escape it through the dialect's `wrap`
//!
//! The module also derives identifier-safe names from arbitrary text, used for
//! constraint names and parameter names.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::{DialectError, Result};

/// Characters no dialect accepts inside a portable object name.
pub const ILLEGAL_NAME_CHARACTERS: &[char] = &['.', '(', ')'];

static NON_IDENTIFIER_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_ ]").unwrap());

/// What kind of object a name belongs to (used in error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Database,
    Table,
    Column,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ObjectKind::Database => "Database",
            ObjectKind::Table => "Table",
            ObjectKind::Column => "Column",
        })
    }
}

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Blank identifiers
/// - Identifiers containing null bytes (injection vector)
///
/// # Errors
///
/// Returns `DialectError::Naming` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DialectError::naming("Identifier cannot be blank"));
    }

    if name.contains('\0') {
        return Err(DialectError::naming(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    Ok(())
}

/// Validate an object name against a dialect's naming rules.
///
/// `max_length` is measured in characters.
pub fn validate_name(kind: ObjectKind, name: &str, max_length: usize) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| DialectError::naming(format!("{} name is invalid: {}", kind, e)))?;

    let len = name.chars().count();
    if len > max_length {
        return Err(DialectError::naming(format!(
            "{} name {:?} is {} characters long, the maximum is {}",
            kind, name, len, max_length
        )));
    }

    if let Some(c) = name.chars().find(|c| ILLEGAL_NAME_CHARACTERS.contains(c)) {
        return Err(DialectError::naming(format!(
            "{} name {:?} contains illegal character '{}'",
            kind, name, c
        )));
    }

    Ok(())
}

/// Quote an identifier between `open` and `close`, doubling any `close`
/// character that occurs inside the name.
///
/// ```ignore
/// assert_eq!(quote_with("table]name", '[', ']'), "[table]]name]");
/// ```
pub fn quote_with(name: &str, open: char, close: char) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push(open);
    for c in name.chars() {
        if c == close {
            escaped.push(close);
        }
        escaped.push(c);
    }
    escaped.push(close);
    escaped
}

/// Inverse of [`quote_with`]. Text that is not quoted is returned unchanged.
pub fn unquote_with(wrapped: &str, open: char, close: char) -> String {
    let trimmed = wrapped.trim();
    if trimmed.len() >= 2 && trimmed.starts_with(open) && trimmed.ends_with(close) {
        let inner = &trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()];
        let doubled: String = [close, close].iter().collect();
        inner.replace(&doubled, &close.to_string())
    } else {
        trimmed.to_string()
    }
}

/// Turn arbitrary header text into an identifier-safe name.
///
/// Drops anything outside `[A-Za-z0-9_ ]`, upper-cases the letter following
/// each space, removes the spaces and prefixes `_` if the result starts with
/// a digit.
///
/// ```ignore
/// assert_eq!(make_header_name_sensible("date of birth"), "dateOfBirth");
/// assert_eq!(make_header_name_sensible("2nd (pct)"), "_2ndPct");
/// ```
pub fn make_header_name_sensible(header: &str) -> String {
    let cleaned = NON_IDENTIFIER_CHARS.replace_all(header, "");

    let mut out = String::with_capacity(cleaned.len());
    let mut upper_next = false;
    for c in cleaned.trim().chars() {
        if c == ' ' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Sensible name, or a random `Constraint{hex}` token if nothing survives.
fn sensible_or_random(name: &str) -> String {
    let sensible = make_header_name_sensible(name);
    if sensible.is_empty() {
        let id = Uuid::new_v4().simple().to_string();
        format!("Constraint{}", &id[..8])
    } else {
        sensible
    }
}

/// Name of the primary-key constraint for `table`.
pub fn primary_key_constraint_name(table: &str) -> String {
    format!("PK_{}", sensible_or_random(table))
}

/// Name of the foreign-key constraint from `foreign_table` to `primary_table`.
pub fn foreign_key_constraint_name(foreign_table: &str, primary_table: &str) -> String {
    format!(
        "FK_{}_{}",
        sensible_or_random(foreign_table),
        sensible_or_random(primary_table)
    )
}
