//! Portable type descriptor shared by every dialect.
//!
//! A [`TypeRequest`] says "give me a column type able to hold values like
//! these". Dialect translaters turn it into a proprietary type string and back.

use super::decimal_size::DecimalSize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base kind of a portable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    String,
    Int16,
    Int32,
    Int64,
    Decimal,
    DateTime,
    TimeSpan,
    Bool,
    Byte,
    ByteArray,
    Guid,
}

impl TypeKind {
    /// Position in the numeric widening chain, if this kind is numeric.
    fn numeric_rank(self) -> Option<u8> {
        match self {
            TypeKind::Bool => Some(0),
            TypeKind::Byte => Some(1),
            TypeKind::Int16 => Some(2),
            TypeKind::Int32 => Some(3),
            TypeKind::Int64 => Some(4),
            TypeKind::Decimal => Some(5),
            _ => None,
        }
    }

    /// Integer and decimal kinds. Bool is excluded.
    pub fn is_numeric(self) -> bool {
        matches!(self.numeric_rank(), Some(rank) if rank > 0)
    }

    /// Inclusive value range of an integer kind; `None` for other kinds.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            TypeKind::Byte => Some((0, i64::from(u8::MAX))),
            TypeKind::Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            TypeKind::Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            TypeKind::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Whether width is significant for this kind.
    pub fn has_width(self) -> bool {
        matches!(self, TypeKind::String | TypeKind::ByteArray)
    }

    /// True for date/time and time-of-day kinds.
    pub fn is_date_like(self) -> bool {
        matches!(self, TypeKind::DateTime | TypeKind::TimeSpan)
    }

    /// Longest text rendering of a value of this kind, used when a column
    /// has to fall back to a string type.
    pub fn max_text_width(self) -> u32 {
        match self {
            TypeKind::Bool => 5,
            TypeKind::Byte => 3,
            TypeKind::Int16 => 6,
            TypeKind::Int32 => 11,
            TypeKind::Int64 => 20,
            TypeKind::DateTime => 27,
            TypeKind::TimeSpan => 16,
            TypeKind::Guid => 36,
            TypeKind::Decimal | TypeKind::String | TypeKind::ByteArray => 0,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::String => "string",
            TypeKind::Int16 => "int16",
            TypeKind::Int32 => "int32",
            TypeKind::Int64 => "int64",
            TypeKind::Decimal => "decimal",
            TypeKind::DateTime => "datetime",
            TypeKind::TimeSpan => "timespan",
            TypeKind::Bool => "bool",
            TypeKind::Byte => "byte",
            TypeKind::ByteArray => "byte_array",
            TypeKind::Guid => "guid",
        };
        f.write_str(s)
    }
}

/// Portable descriptor of a type wide/precise enough to hold some values.
///
/// `width` is the string or byte length; `None` means unconstrained
/// (the dialect's unlimited type). `decimal_size` is only meaningful for
/// [`TypeKind::Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRequest {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_size: Option<DecimalSize>,
    #[serde(default)]
    pub unicode: bool,
}

impl TypeRequest {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            width: None,
            decimal_size: None,
            unicode: false,
        }
    }

    /// Non-unicode string of the given width.
    pub fn string(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::new(TypeKind::String)
        }
    }

    /// String of unlimited width.
    pub fn unlimited_string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn decimal(size: DecimalSize) -> Self {
        Self {
            decimal_size: Some(size),
            ..Self::new(TypeKind::Decimal)
        }
    }

    pub fn byte_array(width: Option<u32>) -> Self {
        Self {
            width,
            ..Self::new(TypeKind::ByteArray)
        }
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    pub fn with_width(mut self, width: Option<u32>) -> Self {
        self.width = width;
        self
    }

    /// Widen two requests into one that admits values of both.
    ///
    /// Same kinds keep the kind and take the larger width / decimal size.
    /// Numeric kinds widen along bool < byte < int16 < int32 < int64 < decimal.
    /// Anything else falls back to a string wide enough for either side.
    pub fn widen(a: &TypeRequest, b: &TypeRequest) -> TypeRequest {
        if a.kind == b.kind {
            return TypeRequest {
                kind: a.kind,
                width: match (a.width, b.width) {
                    (Some(x), Some(y)) => Some(x.max(y)),
                    _ => None,
                },
                decimal_size: DecimalSize::combine(a.decimal_size.as_ref(), b.decimal_size.as_ref()),
                unicode: a.unicode || b.unicode,
            };
        }

        // Integer requests may carry observed digit counts in `decimal_size`;
        // they are kept so a later decimal sample still sees them.
        if let (Some(ra), Some(rb)) = (a.kind.numeric_rank(), b.kind.numeric_rank()) {
            return TypeRequest {
                kind: if ra >= rb { a.kind } else { b.kind },
                width: None,
                decimal_size: DecimalSize::combine(a.decimal_size.as_ref(), b.decimal_size.as_ref()),
                unicode: false,
            };
        }

        let width = match (a.text_width(), b.text_width()) {
            (Some(x), Some(y)) => Some(x.max(y)),
            _ => None,
        };
        TypeRequest {
            kind: TypeKind::String,
            width,
            decimal_size: None,
            unicode: a.unicode || b.unicode,
        }
    }

    /// Width this request would need if rendered as text. `None` = unlimited.
    pub fn text_width(&self) -> Option<u32> {
        match self.kind {
            TypeKind::String | TypeKind::ByteArray => self.width,
            TypeKind::Decimal => Some(
                self.decimal_size
                    .map(|d| d.to_string_length())
                    .unwrap_or(0)
                    .max(1),
            ),
            other => Some(
                self.decimal_size
                    .filter(|d| !d.is_empty())
                    .map(|d| d.to_string_length() + 1)
                    .unwrap_or_else(|| other.max_text_width()),
            ),
        }
    }
}

impl fmt::Display for TypeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(w) = self.width {
            write!(f, "({})", w)?;
        }
        if let Some(d) = &self.decimal_size {
            write!(f, "{}", d)?;
        }
        if self.unicode {
            write!(f, " unicode")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_same_kind_takes_max_width() {
        let w = TypeRequest::widen(&TypeRequest::string(5), &TypeRequest::string(12).with_unicode(true));
        assert_eq!(w.kind, TypeKind::String);
        assert_eq!(w.width, Some(12));
        assert!(w.unicode);
    }

    #[test]
    fn test_widen_unlimited_string_stays_unlimited() {
        let w = TypeRequest::widen(&TypeRequest::string(5), &TypeRequest::unlimited_string());
        assert_eq!(w.width, None);
    }

    #[test]
    fn test_widen_int_into_decimal() {
        let int = TypeRequest::new(TypeKind::Int32);
        let dec = TypeRequest::decimal(DecimalSize::new(2, 1));
        let w = TypeRequest::widen(&int, &dec);
        assert_eq!(w.kind, TypeKind::Decimal);
        assert_eq!(w.decimal_size, Some(DecimalSize::new(2, 1)));
    }

    #[test]
    fn test_widen_keeps_integer_digits_for_later_decimals() {
        let fifteen = TypeRequest {
            decimal_size: Some(DecimalSize::new(2, 0)),
            ..TypeRequest::new(TypeKind::Int32)
        };
        let two_hundred = TypeRequest {
            decimal_size: Some(DecimalSize::new(3, 0)),
            ..TypeRequest::new(TypeKind::Int32)
        };
        let w = TypeRequest::widen(&fifteen, &TypeRequest::decimal(DecimalSize::new(2, 1)));
        let w = TypeRequest::widen(&w, &two_hundred);
        assert_eq!(w.kind, TypeKind::Decimal);
        assert_eq!(w.decimal_size, Some(DecimalSize::new(3, 1)));
        assert_eq!(w.to_string(), "decimal(4,1)");
    }

    #[test]
    fn test_widen_date_and_int_falls_back_to_string() {
        let w = TypeRequest::widen(
            &TypeRequest::new(TypeKind::DateTime),
            &TypeRequest::new(TypeKind::Int16),
        );
        assert_eq!(w.kind, TypeKind::String);
        assert_eq!(w.width, Some(27));
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeRequest::string(10).with_unicode(true).to_string(), "string(10) unicode");
        assert_eq!(TypeRequest::decimal(DecimalSize::new(3, 1)).to_string(), "decimal(4,1)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = TypeRequest::decimal(DecimalSize::new(3, 1));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"kind\":\"decimal\""));
        let back: TypeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
