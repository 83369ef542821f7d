//! Reference type guesser.
//!
//! [`BasicGuesser`] implements the [`TypeGuesser`] contract well enough for
//! the table creation pipeline to work without an external guesser:
//!
//! - text is tried as bool, integer, decimal, date, time and finally string
//! - integers remember their digit count so a later decimal sample produces
//!   a size wide enough for both (`15`, `29.9`, `200` → `decimal(4,1)`)
//! - strings are as wide as the longest sample, plus the dialect's extra
//!   allowance per non-ASCII character
//!
//! Callers with richer inference rules plug in their own [`TypeGuesser`].

mod dates;

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::core::decimal_size::DecimalSize;
use crate::core::traits::{GuessSettings, TypeGuesser};
use crate::core::type_request::{TypeKind, TypeRequest};
use crate::core::value::SqlValue;

pub use dates::{guess_date_format, Culture, DateOrder, DateTimeDecider};

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d*)\.(\d+)$|^[+-]?(\d+)\.$").unwrap());

/// Digits before/after the point of a decimal literal, ignoring sign,
/// leading zeros and trailing fractional zeros.
fn literal_size(integer_part: &str, fraction_part: &str) -> DecimalSize {
    let before = integer_part.trim_start_matches('0').len();
    let after = fraction_part.trim_end_matches('0').len();
    DecimalSize::new(before as i64, after as i64)
}

fn decimal_value_size(d: &Decimal) -> DecimalSize {
    let text = d.normalize().abs().to_string();
    match text.split_once('.') {
        Some((i, f)) => literal_size(i, f),
        None => literal_size(&text, ""),
    }
}

fn integer_request(kind: TypeKind, digits: usize) -> TypeRequest {
    TypeRequest {
        decimal_size: Some(DecimalSize::new(digits as i64, 0)),
        ..TypeRequest::new(kind)
    }
}

/// Minimal text-and-value type guesser.
#[derive(Debug, Clone, Default)]
pub struct BasicGuesser;

impl BasicGuesser {
    pub fn new() -> Self {
        Self
    }

    fn guess_text(&self, text: &str, settings: &GuessSettings) -> Option<TypeRequest> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }

        if t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("false") {
            return Some(TypeRequest::new(TypeKind::Bool));
        }

        // Leading zeros are identifiers (zip codes, account numbers), not numbers
        let unsigned = t.trim_start_matches(['+', '-']);
        let leading_zero = unsigned.len() > 1 && unsigned.starts_with('0') && !unsigned.starts_with("0.");

        if INTEGER.is_match(t) && !leading_zero {
            let digits = unsigned.trim_start_matches('0').len().max(1);
            return Some(match t.parse::<i64>() {
                Ok(v) if i32::try_from(v).is_ok() => integer_request(TypeKind::Int32, digits),
                Ok(_) => integer_request(TypeKind::Int64, digits),
                Err(_) => TypeRequest::decimal(DecimalSize::new(digits as i64, 0)),
            });
        }

        if !leading_zero {
            if let Some(caps) = DECIMAL.captures(t) {
                let integer_part = caps.get(1).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                let fraction_part = caps.get(2).map_or("", |m| m.as_str());
                return Some(TypeRequest::decimal(literal_size(integer_part, fraction_part)));
            }
        }

        let decider = DateTimeDecider::new(settings.culture);
        if decider.is_date(t) {
            return Some(TypeRequest::new(TypeKind::DateTime));
        }
        if decider.is_time(t) {
            return Some(TypeRequest::new(TypeKind::TimeSpan));
        }

        Some(string_request(text, settings))
    }
}

/// String request wide enough for `text`.
fn string_request(text: &str, settings: &GuessSettings) -> TypeRequest {
    let chars = text.chars().count() as u32;
    let non_ascii = text.chars().filter(|c| !c.is_ascii()).count() as u32;
    TypeRequest::string(chars + non_ascii * settings.extra_length_per_non_ascii)
        .with_unicode(non_ascii > 0)
}

impl TypeGuesser for BasicGuesser {
    fn guess_value(&self, value: &SqlValue, settings: &GuessSettings) -> Option<TypeRequest> {
        match value {
            SqlValue::Null => None,
            SqlValue::Text(s) => self.guess_text(s, settings),
            SqlValue::Bool(_) => Some(TypeRequest::new(TypeKind::Bool)),
            SqlValue::U8(v) => Some(integer_request(TypeKind::Byte, v.to_string().len())),
            SqlValue::I16(v) => Some(integer_request(TypeKind::Int16, v.unsigned_abs().to_string().len())),
            SqlValue::I32(v) => Some(integer_request(TypeKind::Int32, v.unsigned_abs().to_string().len())),
            SqlValue::I64(v) => Some(integer_request(TypeKind::Int64, v.unsigned_abs().to_string().len())),
            SqlValue::F64(f) => Some(match Decimal::try_from(*f) {
                Ok(d) => TypeRequest::decimal(decimal_value_size(&d)),
                Err(_) => TypeRequest::new(TypeKind::Decimal),
            }),
            SqlValue::Decimal(d) => Some(TypeRequest::decimal(decimal_value_size(d))),
            SqlValue::Bytes(b) => Some(TypeRequest::byte_array(Some(b.len() as u32))),
            SqlValue::Uuid(_) => Some(TypeRequest::new(TypeKind::Guid)),
            SqlValue::DateTime(_) | SqlValue::Date(_) => Some(TypeRequest::new(TypeKind::DateTime)),
            SqlValue::Time(_) => Some(TypeRequest::new(TypeKind::TimeSpan)),
        }
    }

    /// Like the default, except that text booleans never widen into a
    /// number: `true` cannot be stored in an integer column.
    fn widen(
        &self,
        current: Option<TypeRequest>,
        value: &SqlValue,
        settings: &GuessSettings,
    ) -> Option<TypeRequest> {
        match (current, self.guess_value(value, settings)) {
            (Some(c), Some(v)) => {
                let mixes_bool = c.kind != v.kind
                    && (c.kind == TypeKind::Bool || v.kind == TypeKind::Bool)
                    && value.as_text().is_some();
                if mixes_bool {
                    let width = c.text_width().zip(v.text_width()).map(|(a, b)| a.max(b));
                    Some(TypeRequest::new(TypeKind::String).with_width(width))
                } else {
                    Some(TypeRequest::widen(&c, &v))
                }
            }
            (c, v) => c.or(v),
        }
    }
}
