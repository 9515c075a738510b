use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{key_spec::MissingKeyPolicy, records::RecordFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Merge keyed records into CSV datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Update matching rows and append new ones, growing columns as needed
    Upsert(UpsertArgs),
    /// Preview the first few rows of a dataset in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum GrowthMode {
    Append,
    Adjacent,
}

#[derive(Debug, Args)]
pub struct UpsertArgs {
    /// Dataset to merge into (created when missing)
    #[arg(short = 't', long = "target")]
    pub target: PathBuf,
    /// Records to merge (CSV, JSON array, or JSON Lines; '-' for stdin)
    #[arg(short = 'r', long = "records")]
    pub records: PathBuf,
    /// Write the merged dataset here instead of replacing the target ('-' for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// YAML file describing the key spec; flags below override its values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Dataset column used to locate matching rows
    #[arg(short = 'k', long = "key")]
    pub key: Option<String>,
    /// Record field compared against the key column (defaults to the key column)
    #[arg(long = "compare-field")]
    pub compare_field: Option<String>,
    /// Match keys and column names case-sensitively
    #[arg(long = "case-sensitive", conflicts_with = "case_insensitive")]
    pub case_sensitive: bool,
    /// Fold case when matching, overriding a config file's case_sensitive: true
    #[arg(long = "case-insensitive")]
    pub case_insensitive: bool,
    /// Where new columns are placed
    #[arg(long = "growth", value_enum)]
    pub growth: Option<GrowthMode>,
    /// Column after which new columns are inserted (implies adjacent growth)
    #[arg(long = "anchor")]
    pub anchor: Option<String>,
    /// What to do with records lacking the comparison field
    #[arg(long = "on-missing-key", value_enum)]
    pub on_missing_key: Option<MissingKeyPolicy>,
    /// Record input format (detected from the extension when omitted)
    #[arg(long = "records-format", value_enum)]
    pub records_format: Option<RecordFormat>,
    /// Leave empty CSV record cells out instead of blanking target cells
    #[arg(long = "ignore-empty-fields")]
    pub ignore_empty_fields: bool,
    /// Delimiter of the target dataset (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter of CSV record input (defaults by extension)
    #[arg(long = "records-delimiter", value_parser = parse_delimiter)]
    pub records_delimiter: Option<u8>,
    /// Character encoding of the target and CSV records (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the saved dataset (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Print the merged dataset as a table instead of saving it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Rows shown by --dry-run (0 shows all)
    #[arg(long = "rows", default_value_t = 20)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Dataset to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display (0 shows all)
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
