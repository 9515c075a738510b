//! Incoming records and the readers that produce them.
//!
//! A [`Record`] keeps its fields in source order; that order decides where new
//! columns land when several are introduced by one record. Records can be read
//! from CSV/TSV (header row gives field names), from a JSON array of objects, or
//! from JSON Lines.

use std::{
    fmt,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::debug;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};
use serde_json::Value as JsonValue;

use crate::{io_utils, key_spec::normalize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field`, replacing an earlier value under the exact same name.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    /// Looks `field` up under the given case policy. When several fields fold
    /// to the same name the last one wins, matching write order.
    pub fn find(&self, field: &str, case_sensitive: bool) -> Option<&str> {
        let wanted = normalize(field, case_sensitive);
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| normalize(name, case_sensitive) == wanted)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of field names to scalar values")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Record, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record = Record::new();
        while let Some((field, value)) = map.next_entry::<String, JsonValue>()? {
            let text = match value {
                JsonValue::Null => continue,
                JsonValue::String(text) => text,
                JsonValue::Bool(flag) => flag.to_string(),
                JsonValue::Number(number) => number.to_string(),
                JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(de::Error::custom(format!(
                        "field '{field}' must be a scalar value"
                    )));
                }
            };
            record.insert(field, text);
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum RecordFormat {
    Csv,
    Json,
    Jsonl,
}

impl RecordFormat {
    /// Picks a format from the file extension, defaulting to CSV.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RecordFormat::Json,
            Some(ext)
                if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") =>
            {
                RecordFormat::Jsonl
            }
            _ => RecordFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecordReadOptions {
    pub format: Option<RecordFormat>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub ignore_empty_fields: bool,
}

impl Default for RecordReadOptions {
    fn default() -> Self {
        RecordReadOptions {
            format: None,
            delimiter: None,
            encoding: encoding_rs::UTF_8,
            ignore_empty_fields: false,
        }
    }
}

pub fn read_records(path: &Path, options: &RecordReadOptions) -> Result<Vec<Record>> {
    let format = options.format.unwrap_or_else(|| RecordFormat::detect(path));
    debug!("Reading records from {path:?} as {format:?}");
    let input = io_utils::open_input(path)?;
    let records = match format {
        RecordFormat::Csv => records_from_csv(
            input,
            io_utils::resolve_delimiter(path, options.delimiter),
            options.encoding,
            options.ignore_empty_fields,
        ),
        RecordFormat::Json => records_from_json(input),
        RecordFormat::Jsonl => records_from_json_lines(BufReader::new(input)),
    };
    records.with_context(|| format!("Reading records from {path:?}"))
}

pub fn records_from_csv<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
    ignore_empty_fields: bool,
) -> Result<Vec<Record>> {
    let mut reader = io_utils::open_csv_reader(reader, delimiter, false);
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut records = Vec::new();
    for (row_idx, raw) in reader.byte_records().enumerate() {
        let raw = raw.with_context(|| format!("Reading record row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&raw, encoding)?;
        let record = headers
            .iter()
            .zip(decoded)
            .filter(|(_, value)| !(ignore_empty_fields && value.is_empty()))
            .map(|(field, value)| (field.clone(), value))
            .collect();
        records.push(record);
    }
    Ok(records)
}

pub fn records_from_json<R: Read>(reader: R) -> Result<Vec<Record>> {
    serde_json::from_reader::<_, Vec<Record>>(reader).context("Parsing JSON array of records")
}

pub fn records_from_json_lines<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Reading line {}", line_idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .map_err(|err| anyhow!("Line {}: {err}", line_idx + 1))?;
        records.push(record);
    }
    Ok(records)
}
