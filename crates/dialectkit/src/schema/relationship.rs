//! Foreign-key relationships between discovered tables.

use serde::{Deserialize, Serialize};

/// What happens to dependent rows when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeRule {
    Delete,
    NoAction,
    SetNull,
    SetDefault,
    #[default]
    Unknown,
}

impl CascadeRule {
    /// Interpret a catalog `ON DELETE` action (`CASCADE`, `NO ACTION`, ...).
    pub fn from_sql(action: &str) -> Self {
        match action.trim().to_uppercase().as_str() {
            "CASCADE" => CascadeRule::Delete,
            "NO ACTION" | "RESTRICT" => CascadeRule::NoAction,
            "SET NULL" => CascadeRule::SetNull,
            "SET DEFAULT" => CascadeRule::SetDefault,
            _ => CascadeRule::Unknown,
        }
    }

    pub fn from_cascade_delete(cascade_delete: bool) -> Self {
        if cascade_delete {
            CascadeRule::Delete
        } else {
            CascadeRule::NoAction
        }
    }
}

/// A named foreign key from `foreign_table` to `primary_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    pub primary_table: String,
    pub foreign_table: String,
    /// `(primary column, foreign column)` pairs in key order.
    pub keys: Vec<(String, String)>,
    pub cascade_delete: CascadeRule,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        primary_table: impl Into<String>,
        foreign_table: impl Into<String>,
        cascade_delete: CascadeRule,
    ) -> Self {
        Self {
            name: name.into(),
            primary_table: primary_table.into(),
            foreign_table: foreign_table.into(),
            keys: Vec::new(),
            cascade_delete,
        }
    }

    pub fn add_key(&mut self, primary_column: impl Into<String>, foreign_column: impl Into<String>) {
        self.keys.push((primary_column.into(), foreign_column.into()));
    }

    pub fn primary_columns(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(p, _)| p.as_str())
    }

    pub fn foreign_columns(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(_, f)| f.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_rule_from_sql() {
        assert_eq!(CascadeRule::from_sql("CASCADE"), CascadeRule::Delete);
        assert_eq!(CascadeRule::from_sql("no action"), CascadeRule::NoAction);
        assert_eq!(CascadeRule::from_sql("RESTRICT"), CascadeRule::NoAction);
        assert_eq!(CascadeRule::from_sql(" SET NULL "), CascadeRule::SetNull);
        assert_eq!(CascadeRule::from_sql("SET DEFAULT"), CascadeRule::SetDefault);
        assert_eq!(CascadeRule::from_sql("whatever"), CascadeRule::Unknown);
    }

    #[test]
    fn test_keys_keep_order() {
        let mut r = Relationship::new("FK_c_p", "p", "c", CascadeRule::Delete);
        r.add_key("id", "parent_id");
        r.add_key("region", "parent_region");
        assert_eq!(r.primary_columns().collect::<Vec<_>>(), ["id", "region"]);
        assert_eq!(r.foreign_columns().collect::<Vec<_>>(), ["parent_id", "parent_region"]);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&CascadeRule::SetNull).unwrap();
        assert_eq!(json, "\"set_null\"");
    }
}
