//! SQL value types used for datasets, parameters and query results.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::type_request::TypeKind;

/// Owned SQL value.
///
/// Datasets, command parameters and adapter results all carry values of this
/// type. Text is the loosely typed representation; everything else is a
/// strongly typed value the adapter can bind directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL / missing value.
    Null,

    /// Boolean value.
    Bool(bool),

    /// Unsigned 8-bit integer (tinyint).
    U8(u8),

    /// 16-bit signed integer (smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// Double precision floating point.
    F64(f64),

    /// Fixed-point decimal.
    Decimal(Decimal),

    /// Text data.
    Text(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// UUID/GUID value.
    Uuid(Uuid),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),

    /// Date without time component.
    Date(NaiveDate),

    /// Time without date component.
    Time(NaiveTime),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Borrow the text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view, if the value is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Bool(b) => Some(*b as i64),
            SqlValue::U8(v) => Some(*v as i64),
            SqlValue::I16(v) => Some(*v as i64),
            SqlValue::I32(v) => Some(*v as i64),
            SqlValue::I64(v) => Some(*v),
            SqlValue::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Portable kind of a non-null, non-text value.
    ///
    /// Text returns `None` because its real type is only known after guessing.
    #[must_use]
    pub fn type_kind(&self) -> Option<TypeKind> {
        match self {
            SqlValue::Null | SqlValue::Text(_) => None,
            SqlValue::Bool(_) => Some(TypeKind::Bool),
            SqlValue::U8(_) => Some(TypeKind::Byte),
            SqlValue::I16(_) => Some(TypeKind::Int16),
            SqlValue::I32(_) => Some(TypeKind::Int32),
            SqlValue::I64(_) => Some(TypeKind::Int64),
            SqlValue::F64(_) | SqlValue::Decimal(_) => Some(TypeKind::Decimal),
            SqlValue::Bytes(_) => Some(TypeKind::ByteArray),
            SqlValue::Uuid(_) => Some(TypeKind::Guid),
            SqlValue::DateTime(_) | SqlValue::Date(_) => Some(TypeKind::DateTime),
            SqlValue::Time(_) => Some(TypeKind::TimeSpan),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<u8> for SqlValue {
    fn from(v: u8) -> Self {
        SqlValue::U8(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::I16(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_is_null() {
        assert!(SqlValue::Null.is_null());
        assert!(!SqlValue::I32(42).is_null());
    }

    #[test]
    fn test_from_implementations() {
        let v: SqlValue = 42i32.into();
        assert_eq!(v, SqlValue::I32(42));

        let v: SqlValue = "hello".into();
        assert_eq!(v, SqlValue::Text("hello".to_string()));

        let v: SqlValue = Option::<i64>::None.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_type_kind() {
        assert_eq!(SqlValue::Text("1".into()).type_kind(), None);
        assert_eq!(SqlValue::U8(1).type_kind(), Some(TypeKind::Byte));
        assert_eq!(
            SqlValue::Date(NaiveDate::from_ymd_opt(2007, 1, 1).unwrap()).type_kind(),
            Some(TypeKind::DateTime)
        );
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(SqlValue::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(SqlValue::Decimal(Decimal::new(50, 1)).as_i64(), Some(5));
        assert_eq!(SqlValue::Decimal(Decimal::new(55, 1)).as_i64(), None);
    }
}
