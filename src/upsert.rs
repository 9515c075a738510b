//! Keyed merge of record batches into a [`Grid`].
//!
//! The engine takes the grid apart for one batch: a [`SchemaIndex`] owns the
//! header, a [`RowKeyIndex`] maps key values to rows, and the rows themselves
//! are mutated in place. Records are applied strictly in order, so a later
//! record overrides an earlier one on the fields they share, and a record can
//! match a row created earlier in the same batch.
//!
//! For each record the comparison field is looked up in the key index. A hit
//! overwrites the named cells of that row; a miss appends a blank row and fills
//! it. Unknown fields grow the schema before the write, and every row is padded
//! at that moment so positions stay valid.

use std::mem;

use log::{info, warn};

use crate::{
    error::{Result, UpsertError},
    grid::{Grid, Row, blank_row},
    key_spec::{KeySpec, MissingKeyPolicy},
    records::Record,
    row_index::RowKeyIndex,
    schema_index::SchemaIndex,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub updated: usize,
    pub inserted: usize,
    /// Positions in the batch of records left out under [`MissingKeyPolicy::Skip`].
    pub skipped: Vec<usize>,
    pub columns_added: Vec<String>,
}

#[derive(Debug)]
pub struct UpsertEngine {
    spec: KeySpec,
    schema: SchemaIndex,
    keys: RowKeyIndex,
    rows: Vec<Row>,
}

impl UpsertEngine {
    /// Indexes `grid` for upserts under `spec`.
    ///
    /// Fails with [`UpsertError::ColumnNotFound`] if adjacent growth names an
    /// anchor the header lacks.
    pub fn new(grid: Grid, spec: KeySpec) -> Result<Self> {
        let schema = SchemaIndex::new(grid.header(), spec.case_sensitive, &spec.growth)?;
        Ok(Self::assemble(grid, schema, spec))
    }

    fn assemble(grid: Grid, schema: SchemaIndex, spec: KeySpec) -> Self {
        let (_, rows) = grid.into_parts();
        let keys = RowKeyIndex::build(
            &rows,
            schema.resolve(&spec.key_column),
            spec.case_sensitive,
        );
        UpsertEngine {
            spec,
            schema,
            keys,
            rows,
        }
    }

    pub fn header(&self) -> &[String] {
        self.schema.header()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Applies `records` in order.
    ///
    /// Under [`MissingKeyPolicy::Abort`] the first record without a comparison
    /// value stops the batch; records before it stay applied in memory.
    pub fn apply(&mut self, records: &[Record]) -> Result<UpsertSummary> {
        let mut summary = UpsertSummary::default();
        let added_before = self.schema.added_columns().len();
        let case_sensitive = self.spec.case_sensitive;

        for (idx, record) in records.iter().enumerate() {
            let Some(comparison) = record.find(&self.spec.comparison_field, case_sensitive) else {
                match self.spec.on_missing_key {
                    MissingKeyPolicy::Abort => {
                        return Err(UpsertError::MissingKeyValue {
                            record: idx,
                            field: self.spec.comparison_field.clone(),
                        });
                    }
                    MissingKeyPolicy::Skip => {
                        warn!(
                            "Skipping record {idx}: missing key field '{}'",
                            self.spec.comparison_field
                        );
                        summary.skipped.push(idx);
                        continue;
                    }
                }
            };
            match self.keys.lookup(comparison) {
                Some(row) => {
                    self.update_row(row, record);
                    summary.updated += 1;
                }
                None => {
                    self.insert_row(record, comparison);
                    summary.inserted += 1;
                }
            }
        }

        summary.columns_added = self.schema.added_columns()[added_before..].to_vec();
        info!(
            "Upserted {} record(s): {} updated, {} inserted, {} skipped, {} column(s) added",
            records.len(),
            summary.updated,
            summary.inserted,
            summary.skipped.len(),
            summary.columns_added.len()
        );
        Ok(summary)
    }

    /// Writes the grown header back and hands the grid to the caller.
    pub fn finish(self) -> Grid {
        Grid::from_aligned_parts(self.schema.into_header(), self.rows)
    }

    fn update_row(&mut self, row: usize, record: &Record) {
        let previous_key = self.key_cell(row).map(str::to_owned);
        self.write_fields(row, record);
        let current_key = self.key_cell(row).map(str::to_owned);
        if current_key != previous_key {
            if let Some(previous) = &previous_key {
                self.keys.unregister(previous, row);
            }
            if let Some(current) = &current_key {
                self.keys.register(current, row);
            }
        }
    }

    fn insert_row(&mut self, record: &Record, comparison: &str) {
        let row = self.rows.len();
        self.rows.push(blank_row(self.schema.len()));
        self.write_fields(row, record);
        let key = match record.find(&self.spec.key_column, self.spec.case_sensitive) {
            Some(value) => value,
            None => {
                // Seed the key cell so the stored row matches on the next run.
                let col = self
                    .schema
                    .resolve_or_create(&self.spec.key_column, &mut self.rows);
                comparison.clone_into(&mut self.rows[row][col]);
                comparison
            }
        };
        self.keys.register(key, row);
    }

    fn write_fields(&mut self, row: usize, record: &Record) {
        for (field, value) in record.iter() {
            let col = self.schema.resolve_or_create(field, &mut self.rows);
            value.clone_into(&mut self.rows[row][col]);
        }
    }

    fn key_cell(&self, row: usize) -> Option<&str> {
        let col = self.schema.resolve(&self.spec.key_column)?;
        self.rows.get(row).map(|cells| cells[col].as_str())
    }
}

/// Upserts `records` into `grid` in place.
///
/// A missing adjacent anchor is reported before anything is touched. When a
/// record aborts the batch, `grid` holds every change made before that record.
pub fn upsert(grid: &mut Grid, spec: &KeySpec, records: &[Record]) -> Result<UpsertSummary> {
    let schema = SchemaIndex::new(grid.header(), spec.case_sensitive, &spec.growth)?;
    let mut engine = UpsertEngine::assemble(mem::take(grid), schema, spec.clone());
    let outcome = engine.apply(records);
    *grid = engine.finish();
    outcome
}
