//! The `upsert` subcommand: load the target, merge the records, save.
//!
//! Nothing is written when the merge fails, so an aborted batch never reaches
//! the target file.

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::info;

use crate::{
    cli::{GrowthMode, UpsertArgs},
    io_utils,
    key_spec::{ColumnGrowth, KeySpec},
    records::{self, RecordReadOptions},
    store::{CsvStore, GridStore},
    table,
    upsert::upsert,
};

pub fn execute(args: &UpsertArgs) -> Result<()> {
    let spec = resolve_key_spec(args)?;
    let input_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let delimiter = io_utils::resolve_delimiter(&args.target, args.delimiter);
    info!(
        "Upserting {:?} into '{}' on key '{}' (delimiter '{}')",
        args.records,
        args.target.display(),
        spec.key_column,
        crate::printable_delimiter(delimiter)
    );

    let store = CsvStore::new(&args.target)
        .with_delimiter(delimiter)
        .with_input_encoding(input_encoding)
        .with_output_encoding(output_encoding);
    let mut grid = store.load()?;

    let options = RecordReadOptions {
        format: args.records_format,
        delimiter: args.records_delimiter,
        encoding: input_encoding,
        ignore_empty_fields: args.ignore_empty_fields,
    };
    let batch = records::read_records(&args.records, &options)?;

    let summary = upsert(&mut grid, &spec, &batch).with_context(|| {
        format!(
            "Upserting records from {:?} into {:?}",
            args.records, args.target
        )
    })?;

    if !summary.columns_added.is_empty() {
        info!(
            "New column(s): {}",
            summary.columns_added.iter().join(", ")
        );
    }

    if args.dry_run {
        table::print_grid(&grid, args.rows);
        info!("Dry run: {:?} left unchanged", args.target);
        return Ok(());
    }

    let destination = match &args.output {
        Some(path) => store
            .at(path)
            .with_delimiter(io_utils::resolve_output_delimiter(path, args.delimiter, delimiter)),
        None => store,
    };
    destination.save(&grid)?;
    info!(
        "{} updated, {} inserted, {} skipped; {} row(s) x {} column(s) written to {:?}",
        summary.updated,
        summary.inserted,
        summary.skipped.len(),
        grid.row_count(),
        grid.column_count(),
        destination.path()
    );
    Ok(())
}

/// Combines the optional YAML config with command-line overrides.
pub fn resolve_key_spec(args: &UpsertArgs) -> Result<KeySpec> {
    let base = match &args.config {
        Some(path) => Some(KeySpec::load(path)?),
        None => None,
    };

    let key_column = match (&args.key, &base) {
        (Some(key), _) => key.clone(),
        (None, Some(base)) => base.key_column.clone(),
        (None, None) => return Err(anyhow!("Provide --key or a --config key spec")),
    };
    let comparison_field = match (&args.compare_field, &base) {
        (Some(field), _) => field.clone(),
        (None, Some(base)) if args.key.is_none() => base.comparison_field.clone(),
        _ => key_column.clone(),
    };
    let configured_anchor = match base.as_ref().map(|b| &b.growth) {
        Some(ColumnGrowth::Adjacent { anchor }) => Some(anchor.clone()),
        _ => None,
    };
    let growth = match (args.growth, &args.anchor) {
        (Some(GrowthMode::Append), _) => ColumnGrowth::Append,
        (Some(GrowthMode::Adjacent), anchor) => {
            let anchor = anchor
                .clone()
                .or(configured_anchor)
                .ok_or_else(|| anyhow!("Adjacent growth requires --anchor"))?;
            ColumnGrowth::Adjacent { anchor }
        }
        (None, Some(anchor)) => ColumnGrowth::Adjacent {
            anchor: anchor.clone(),
        },
        (None, None) => base.as_ref().map(|b| b.growth.clone()).unwrap_or_default(),
    };

    let case_sensitive = match (args.case_sensitive, args.case_insensitive) {
        (true, _) => true,
        (_, true) => false,
        _ => base.as_ref().is_some_and(|b| b.case_sensitive),
    };

    let mut spec = KeySpec::new(key_column)
        .with_comparison_field(comparison_field)
        .case_sensitive(case_sensitive)
        .with_growth(growth);
    spec.on_missing_key = args
        .on_missing_key
        .or(base.as_ref().map(|b| b.on_missing_key))
        .unwrap_or_default();
    spec.validate()?;
    Ok(spec)
}
