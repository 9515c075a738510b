//! Column name ↔ position index with growth logic.
//!
//! The index owns the header for the duration of an upsert. Lookups fold names
//! with the configured case policy, and the first-seen casing of a column is the
//! one kept in the header. When a record introduces a new field the index places
//! it according to [`ColumnGrowth`] and pads every row at once, so rows never
//! fall out of alignment with the header.

use std::collections::{HashMap, hash_map::Entry};

use log::{debug, warn};

use crate::{
    error::{Result, UpsertError},
    grid::{Row, insert_blank_column},
    key_spec::{ColumnGrowth, normalize},
};

#[derive(Debug, Clone)]
enum Placement {
    Append,
    /// Position the next adjacent column will take.
    After { next: usize },
}

#[derive(Debug, Clone)]
pub struct SchemaIndex {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    case_sensitive: bool,
    placement: Placement,
    added: Vec<String>,
}

impl SchemaIndex {
    /// Indexes `header`. Names that fold together resolve to the first of them.
    /// Fails with [`UpsertError::ColumnNotFound`] when adjacent growth names an
    /// anchor the header does not contain.
    pub fn new(header: &[String], case_sensitive: bool, growth: &ColumnGrowth) -> Result<Self> {
        let mut positions = HashMap::with_capacity(header.len());
        for (idx, name) in header.iter().enumerate() {
            match positions.entry(normalize(name, case_sensitive).into_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
                Entry::Occupied(slot) => {
                    let kept = &header[*slot.get()];
                    warn!("Column '{name}' folds onto '{kept}'; only '{kept}' receives upserts");
                }
            }
        }
        let placement = match growth {
            ColumnGrowth::Append => Placement::Append,
            ColumnGrowth::Adjacent { anchor } => {
                let anchor_pos = positions
                    .get(normalize(anchor, case_sensitive).as_ref())
                    .copied()
                    .ok_or_else(|| UpsertError::ColumnNotFound {
                        column: anchor.clone(),
                    })?;
                Placement::After {
                    next: anchor_pos + 1,
                }
            }
        };
        Ok(SchemaIndex {
            columns: header.to_vec(),
            positions,
            case_sensitive,
            placement,
            added: Vec::new(),
        })
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.positions
            .get(normalize(name, self.case_sensitive).as_ref())
            .copied()
    }

    /// Returns the position of `name`, creating the column and padding `rows`
    /// when it does not exist yet.
    pub fn resolve_or_create(&mut self, name: &str, rows: &mut [Row]) -> usize {
        if let Some(position) = self.resolve(name) {
            return position;
        }
        let position = match &mut self.placement {
            Placement::Append => self.columns.len(),
            Placement::After { next } => {
                let position = *next;
                *next += 1;
                position
            }
        };
        if position < self.columns.len() {
            for existing in self.positions.values_mut() {
                if *existing >= position {
                    *existing += 1;
                }
            }
        }
        self.columns.insert(position, name.to_string());
        self.positions
            .insert(normalize(name, self.case_sensitive).into_owned(), position);
        insert_blank_column(rows, position);
        self.added.push(name.to_string());
        debug!("Added column '{name}' at position {position}");
        position
    }

    pub fn header(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns created since the index was built, in creation order.
    pub fn added_columns(&self) -> &[String] {
        &self.added
    }

    pub fn into_header(self) -> Vec<String> {
        self.columns
    }
}
