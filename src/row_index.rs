//! Normalized key value → row position lookup, built once per upsert.

use std::collections::HashMap;

use crate::{grid::Row, key_spec::normalize};

#[derive(Debug, Clone, Default)]
pub struct RowKeyIndex {
    positions: HashMap<String, usize>,
    case_sensitive: bool,
}

impl RowKeyIndex {
    /// Maps every row's key cell to its position in one pass. Duplicate keys
    /// resolve to the last row scanned. A missing key column yields an empty
    /// index.
    pub fn build(rows: &[Row], key_position: Option<usize>, case_sensitive: bool) -> Self {
        let mut index = RowKeyIndex {
            positions: HashMap::with_capacity(rows.len()),
            case_sensitive,
        };
        if let Some(column) = key_position {
            for (row_pos, row) in rows.iter().enumerate() {
                if let Some(value) = row.get(column) {
                    index.register(value, row_pos);
                }
            }
        }
        index
    }

    pub fn lookup(&self, value: &str) -> Option<usize> {
        self.positions
            .get(normalize(value, self.case_sensitive).as_ref())
            .copied()
    }

    pub fn register(&mut self, value: &str, row: usize) {
        self.positions
            .insert(normalize(value, self.case_sensitive).into_owned(), row);
    }

    /// Drops the mapping for `value` if it still points at `row`.
    pub fn unregister(&mut self, value: &str, row: usize) {
        let key = normalize(value, self.case_sensitive);
        if self.positions.get(key.as_ref()) == Some(&row) {
            self.positions.remove(key.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> Vec<Row> {
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn build_maps_key_cells_to_positions() {
        let data = rows(&[&["1", "a"], &["2", "b"]]);
        let index = RowKeyIndex::build(&data, Some(0), false);
        assert_eq!(index.lookup("1"), Some(0));
        assert_eq!(index.lookup("2"), Some(1));
        assert_eq!(index.lookup("3"), None);
    }

    #[test]
    fn duplicate_keys_resolve_to_last_row() {
        let data = rows(&[&["7", "first"], &["7", "second"]]);
        let index = RowKeyIndex::build(&data, Some(0), true);
        assert_eq!(index.lookup("7"), Some(1));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn case_insensitive_lookup_matches_any_casing() {
        let data = rows(&[&["ID"], &["Other"]]);
        let index = RowKeyIndex::build(&data, Some(0), false);
        assert_eq!(index.lookup("id"), Some(0));
        assert_eq!(index.lookup("Id"), Some(0));
        assert_eq!(index.lookup("OTHER"), Some(1));

        let strict = RowKeyIndex::build(&data, Some(0), true);
        assert_eq!(strict.lookup("id"), None);
    }

    #[test]
    fn missing_key_column_builds_empty_index() {
        let data = rows(&[&["1"]]);
        let index = RowKeyIndex::build(&data, None, false);
        assert!(index.is_empty());
    }

    #[test]
    fn unregister_ignores_entries_owned_by_other_rows() {
        let mut index = RowKeyIndex::default();
        index.register("k", 3);
        index.unregister("k", 1);
        assert_eq!(index.lookup("k"), Some(3));
        index.unregister("k", 3);
        assert_eq!(index.lookup("k"), None);
    }
}
