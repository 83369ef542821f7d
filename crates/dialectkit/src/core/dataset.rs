//! In-memory, loosely typed record set.
//!
//! A [`DataSet`] is what callers hand to table creation and bulk load: named
//! columns, a row-major value matrix, and an optional in-memory primary key.

use crate::error::{DialectError, Result};

use super::type_request::TypeKind;
use super::value::SqlValue;

/// How a dataset column represents its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Untyped text; the real type is guessed.
    Text,
    /// Values already carry a concrete portable type.
    Typed(TypeKind),
    /// Host objects with no SQL interpretation. Never guessed.
    Opaque,
}

/// Column metadata of a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub allow_nulls: bool,
    pub kind: ValueKind,
    /// Treat the column as already typed even if it holds text.
    pub do_not_retype: bool,
}

impl DataColumn {
    /// A nullable text column.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_nulls: true,
            kind: ValueKind::Text,
            do_not_retype: false,
        }
    }

    /// A nullable column holding values of a known kind.
    pub fn typed(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            kind: ValueKind::Typed(kind),
            ..Self::text(name)
        }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Opaque,
            ..Self::text(name)
        }
    }

    pub fn not_null(mut self) -> Self {
        self.allow_nulls = false;
        self
    }

    pub fn with_do_not_retype(mut self, flag: bool) -> Self {
        self.do_not_retype = flag;
        self
    }

    /// Whether values in this column are text that has to be interpreted.
    pub fn is_textual(&self) -> bool {
        self.kind == ValueKind::Text
    }
}

/// Named columns plus row-major values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    pub name: String,
    columns: Vec<DataColumn>,
    rows: Vec<Vec<SqlValue>>,
    primary_key: Vec<String>,
}

impl DataSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a column. Existing rows receive NULL for it.
    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        for row in &mut self.rows {
            row.push(SqlValue::Null);
        }
        self
    }

    /// Builder form of [`add_column`](Self::add_column).
    pub fn with_column(mut self, column: DataColumn) -> Self {
        self.add_column(column);
        self
    }

    /// Append a row. The value count must match the column count.
    pub fn push_row<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let row: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(DialectError::InvalidArgument(format!(
                "Row has {} values but dataset '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut DataColumn> {
        self.columns.get_mut(index)
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &SqlValue> + '_ {
        self.rows.iter().map(move |r| &r[index])
    }

    /// Remove a column and return its metadata and values.
    pub fn remove_column(&mut self, index: usize) -> (DataColumn, Vec<SqlValue>) {
        let column = self.columns.remove(index);
        let values = self.rows.iter_mut().map(|r| r.remove(index)).collect();
        self.primary_key.retain(|k| !k.eq_ignore_ascii_case(&column.name));
        (column, values)
    }

    /// Insert a column at `index` with one value per existing row.
    pub fn insert_column(
        &mut self,
        index: usize,
        column: DataColumn,
        values: Vec<SqlValue>,
    ) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(DialectError::InvalidArgument(format!(
                "Column '{}' has {} values but dataset '{}' has {} rows",
                column.name,
                values.len(),
                self.name,
                self.rows.len()
            )));
        }
        self.columns.insert(index, column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
        Ok(())
    }

    /// Column names making up the in-memory primary key.
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn set_primary_key<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|k| k.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> DataSet {
        let mut ds = DataSet::new("people")
            .with_column(DataColumn::text("Name"))
            .with_column(DataColumn::typed("Age", TypeKind::Int32));
        ds.push_row([SqlValue::from("dave"), SqlValue::I32(18)]).unwrap();
        ds.push_row([SqlValue::from("frank"), SqlValue::Null]).unwrap();
        ds
    }

    #[test]
    fn test_push_row_rejects_wrong_arity() {
        let mut ds = people();
        let err = ds.push_row(["only one"]).unwrap_err();
        assert!(matches!(err, DialectError::InvalidArgument(_)));
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let ds = people();
        assert_eq!(ds.column_index("name"), Some(0));
        assert_eq!(ds.column_index("AGE"), Some(1));
        assert_eq!(ds.column_index("missing"), None);
    }

    #[test]
    fn test_remove_and_reinsert_keeps_order() {
        let mut ds = people();
        ds.set_primary_key(["Name"]);
        let (col, values) = ds.remove_column(0);
        assert!(ds.primary_key().is_empty());
        assert_eq!(ds.columns().len(), 1);

        ds.insert_column(0, col, values).unwrap();
        assert_eq!(ds.columns()[0].name, "Name");
        assert_eq!(ds.rows()[1][0], SqlValue::from("frank"));
    }

    #[test]
    fn test_add_column_pads_existing_rows() {
        let mut ds = people();
        ds.add_column(DataColumn::text("Notes"));
        assert!(ds.rows().iter().all(|r| r.len() == 3 && r[2].is_null()));
    }
}
