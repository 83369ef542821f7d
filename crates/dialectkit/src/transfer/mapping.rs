//! Case-insensitive mapping of input columns onto destination columns.

use serde::Serialize;

use crate::error::{DialectError, Result};

/// Result of [`map_columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    /// `(input index, destination index)` for every matched input column,
    /// in input order.
    pub pairs: Vec<(usize, usize)>,
    /// Input columns skipped because unmatched input was allowed.
    pub unmatched_input: Vec<String>,
    /// Destination columns no input column maps to. They receive defaults.
    pub unmatched_destination: Vec<String>,
}

impl ColumnMapping {
    pub fn destination_for(&self, input_index: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|(i, _)| *i == input_index)
            .map(|(_, d)| *d)
    }
}

/// Map `input` column names onto `destination` column names.
///
/// Matching ignores ASCII case. An exact-case match wins when several
/// destination columns differ only by case. An input column with no match
/// is a [`DialectError::ColumnMapping`] unless `allow_unmatched_input` is set;
/// destination columns without input are never an error.
pub fn map_columns<I, D>(
    input: &[I],
    destination: &[D],
    table: &str,
    allow_unmatched_input: bool,
) -> Result<ColumnMapping>
where
    I: AsRef<str>,
    D: AsRef<str>,
{
    let mut mapping = ColumnMapping::default();
    let mut taken = vec![false; destination.len()];

    for (input_index, name) in input.iter().map(AsRef::as_ref).enumerate() {
        let candidates: Vec<usize> = destination
            .iter()
            .enumerate()
            .filter(|(_, d)| d.as_ref().eq_ignore_ascii_case(name))
            .map(|(i, _)| i)
            .collect();

        let chosen = match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            several => match several.iter().find(|&&i| destination[i].as_ref() == name) {
                Some(exact) => Some(*exact),
                None => {
                    return Err(DialectError::InvalidArgument(format!(
                        "Column '{}' matches several columns of {} that differ only by case",
                        name, table
                    )))
                }
            },
        };

        match chosen {
            Some(dest) if taken[dest] => {
                return Err(DialectError::InvalidArgument(format!(
                    "More than one input column maps to column '{}' of {}",
                    destination[dest].as_ref(),
                    table
                )));
            }
            Some(dest) => {
                taken[dest] = true;
                mapping.pairs.push((input_index, dest));
            }
            None if allow_unmatched_input => mapping.unmatched_input.push(name.to_string()),
            None => return Err(DialectError::column_mapping(name, table)),
        }
    }

    mapping.unmatched_destination = destination
        .iter()
        .zip(&taken)
        .filter(|(_, taken)| !**taken)
        .map(|(d, _)| d.as_ref().to_string())
        .collect();
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match() {
        let m = map_columns(&["BoB"], &["id", "bob"], "people", false).unwrap();
        assert_eq!(m.pairs, vec![(0, 1)]);
        assert_eq!(m.unmatched_destination, vec!["id".to_string()]);
    }

    #[test]
    fn test_unmatched_input_is_error_by_default() {
        let err = map_columns(&["name", "shoe_size"], &["name"], "people", false).unwrap_err();
        assert!(matches!(
            err,
            DialectError::ColumnMapping { ref column, ref table } if column == "shoe_size" && table == "people"
        ));
    }

    #[test]
    fn test_unmatched_input_allowed() {
        let m = map_columns(&["name", "shoe_size"], &["name"], "people", true).unwrap();
        assert_eq!(m.pairs, vec![(0, 0)]);
        assert_eq!(m.unmatched_input, vec!["shoe_size".to_string()]);
        assert!(m.unmatched_destination.is_empty());
    }

    #[test]
    fn test_exact_case_wins_between_case_variants() {
        let m = map_columns(&["Name"], &["name", "Name"], "t", false).unwrap();
        assert_eq!(m.destination_for(0), Some(1));
    }

    #[test]
    fn test_ambiguous_match_is_rejected() {
        let err = map_columns(&["NAME"], &["name", "Name"], "t", false).unwrap_err();
        assert!(matches!(err, DialectError::InvalidArgument(_)));
    }

    #[test]
    fn test_two_inputs_for_one_destination_rejected() {
        let err = map_columns(&["name", "NAME"], &["name"], "t", false).unwrap_err();
        assert!(err.to_string().contains("More than one input column"));
    }
}
