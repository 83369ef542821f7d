//! Date and time coercion of textual input columns.
//!
//! Text headed for a date/time or time-of-day destination column is parsed
//! into real values before upload. The date order is settled once per column
//! from a sample of its values, so a column of `01/02/2007`-style text is read
//! consistently as either month-first or day-first.

use tracing::{debug, warn};

use crate::core::dataset::{DataColumn, DataSet};
use crate::core::type_request::TypeKind;
use crate::core::value::SqlValue;
use crate::error::Result;
use crate::guess::{Culture, DateTimeDecider};

/// Non-null values sampled per column to settle its date order.
pub const DEFAULT_DATE_SAMPLE_SIZE: usize = 500;

/// Replace every textual column in `targets` with a parsed date/time column.
///
/// `targets` pairs a dataset column index with the kind of its destination
/// column; only date-like kinds are touched. The replacement keeps the
/// original name and position. Text that does not parse becomes NULL; the
/// row itself is kept. Returns the number of values nulled that way.
pub fn coerce_date_like_columns(
    data: &mut DataSet,
    targets: &[(usize, TypeKind)],
    culture: Culture,
    sample_size: usize,
) -> Result<usize> {
    let mut nulled = 0;
    for &(index, kind) in targets {
        if !kind.is_date_like() {
            continue;
        }
        match data.columns().get(index) {
            Some(column) if column.is_textual() => {}
            _ => continue,
        }

        let decider = DateTimeDecider::from_samples(
            culture,
            data.column_values(index)
                .filter_map(SqlValue::as_text)
                .filter(|t| !t.trim().is_empty())
                .take(sample_size),
        );

        let (old, values) = data.remove_column(index);
        let mut parsed = Vec::with_capacity(values.len());
        for value in values {
            parsed.push(match value {
                SqlValue::Text(text) if text.trim().is_empty() => SqlValue::Null,
                SqlValue::Text(text) => {
                    let value = if kind == TypeKind::TimeSpan {
                        decider.parse_time(&text).map(SqlValue::Time)
                    } else {
                        decider.parse(&text).map(SqlValue::DateTime)
                    };
                    value.unwrap_or_else(|| {
                        warn!(
                            "Could not parse '{}' in column {} as {}, loading NULL",
                            text, old.name, kind
                        );
                        nulled += 1;
                        SqlValue::Null
                    })
                }
                other => other,
            });
        }

        debug!(
            "Coerced column {} to {} ({:?} order)",
            old.name,
            kind,
            decider.order()
        );
        let mut replacement = DataColumn::typed(old.name, kind);
        replacement.allow_nulls = old.allow_nulls;
        data.insert_column(index, replacement, parsed)?;
    }
    Ok(nulled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dates() -> DataSet {
        let mut ds = DataSet::new("d")
            .with_column(DataColumn::text("name"))
            .with_column(DataColumn::text("dob"));
        ds.push_row(["dave", "01/01/2007 00:00:00"]).unwrap();
        ds.push_row(["frank", "2007-01-01 00:00:00"]).unwrap();
        ds.push_row(["ann", "not a date"]).unwrap();
        ds.push_row(["bob", ""]).unwrap();
        ds
    }

    #[test]
    fn test_mixed_formats_resolve_to_same_date() {
        let mut ds = dates();
        let nulled =
            coerce_date_like_columns(&mut ds, &[(1, TypeKind::DateTime)], Culture::EnUs, 500).unwrap();
        assert_eq!(nulled, 1);

        let expected = NaiveDate::from_ymd_opt(2007, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let values: Vec<&SqlValue> = ds.column_values(1).collect();
        assert_eq!(values[0], &SqlValue::DateTime(expected));
        assert_eq!(values[1], &SqlValue::DateTime(expected));
        assert_eq!(values[2], &SqlValue::Null);
        assert_eq!(values[3], &SqlValue::Null);
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_replacement_keeps_name_and_position() {
        let mut ds = dates();
        coerce_date_like_columns(&mut ds, &[(1, TypeKind::DateTime)], Culture::EnUs, 500).unwrap();
        assert_eq!(ds.columns()[0].name, "name");
        assert_eq!(ds.columns()[1].name, "dob");
        assert!(!ds.columns()[1].is_textual());
    }

    #[test]
    fn test_day_first_settled_from_samples() {
        let mut ds = DataSet::new("d").with_column(DataColumn::text("when"));
        ds.push_row(["25/12/2020"]).unwrap();
        ds.push_row(["03/04/2020"]).unwrap();
        coerce_date_like_columns(&mut ds, &[(0, TypeKind::DateTime)], Culture::EnUs, 500).unwrap();
        let april = NaiveDate::from_ymd_opt(2020, 4, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(ds.rows()[1][0], SqlValue::DateTime(april));
    }

    #[test]
    fn test_non_date_destinations_untouched() {
        let mut ds = dates();
        let before = ds.clone();
        coerce_date_like_columns(&mut ds, &[(1, TypeKind::String)], Culture::EnUs, 500).unwrap();
        assert_eq!(ds, before);
    }

    #[test]
    fn test_time_of_day_column() {
        let mut ds = DataSet::new("t").with_column(DataColumn::text("at"));
        ds.push_row(["13:45:10"]).unwrap();
        coerce_date_like_columns(&mut ds, &[(0, TypeKind::TimeSpan)], Culture::Invariant, 500).unwrap();
        assert_eq!(
            ds.rows()[0][0],
            SqlValue::Time(chrono::NaiveTime::from_hms_opt(13, 45, 10).unwrap())
        );
    }
}
