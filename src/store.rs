//! Persistence for grids.
//!
//! [`GridStore`] is the seam between the upsert engine and wherever the dataset
//! lives. [`CsvStore`] keeps it in a delimited text file: loading pads short
//! rows, and saving writes a sibling temporary file that is renamed over the
//! destination so readers never observe a half-written dataset.

use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{grid::Grid, io_utils};

pub trait GridStore {
    /// Loads the whole dataset. An empty or absent backing store yields
    /// [`Grid::empty`].
    fn load(&self) -> Result<Grid>;

    /// Replaces the backing store's contents with `grid`.
    fn save(&self, grid: &Grid) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    delimiter: u8,
    input_encoding: &'static Encoding,
    output_encoding: &'static Encoding,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = io_utils::resolve_delimiter(&path, None);
        CsvStore {
            path,
            delimiter,
            input_encoding: UTF_8,
            output_encoding: UTF_8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_input_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.input_encoding = encoding;
        self
    }

    pub fn with_output_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    /// Same settings, different file. Used to write results somewhere other
    /// than the source.
    pub fn at(&self, path: impl Into<PathBuf>) -> Self {
        CsvStore {
            path: path.into(),
            ..self.clone()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, grid: &Grid) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .double_quote(true)
            .from_writer(Vec::new());
        if grid.column_count() > 0 {
            writer
                .write_record(grid.header())
                .context("Writing header")?;
        }
        for (idx, row) in grid.rows().iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("Writing row {}", idx + 2))?;
        }
        let buffer = writer
            .into_inner()
            .map_err(|err| io::Error::other(err.to_string()))
            .context("Flushing CSV buffer")?;
        io_utils::encode_output(buffer, self.output_encoding)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("grid"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl GridStore for CsvStore {
    fn load(&self) -> Result<Grid> {
        if !io_utils::is_dash(&self.path) && !self.path.exists() {
            info!("{:?} does not exist yet; starting from an empty dataset", self.path);
            return Ok(Grid::empty());
        }
        let input = io_utils::open_input(&self.path)?;
        let mut reader = io_utils::open_csv_reader(input, self.delimiter, true);
        let header = io_utils::reader_headers(&mut reader, self.input_encoding)
            .with_context(|| format!("Reading header from {:?}", self.path))?;
        let mut rows = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record
                .with_context(|| format!("Reading row {} in {:?}", idx + 2, self.path))?;
            rows.push(io_utils::decode_record(&record, self.input_encoding)?);
        }
        let grid = Grid::new(header, rows)
            .with_context(|| format!("Loading dataset from {:?}", self.path))?;
        debug!(
            "Loaded {} row(s) x {} column(s) from {:?}",
            grid.row_count(),
            grid.column_count(),
            self.path
        );
        Ok(grid)
    }

    fn save(&self, grid: &Grid) -> Result<()> {
        let bytes = self.render(grid)?;
        if io_utils::is_dash(&self.path) {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("Writing dataset to stdout")?;
            return stdout.flush().context("Flushing stdout");
        }
        let temp = self.temp_path();
        fs::write(&temp, &bytes).with_context(|| format!("Writing temporary file {temp:?}"))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Replacing {:?} with {temp:?}", self.path))?;
        debug!("Saved {} byte(s) to {:?}", bytes.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_sibling_of_the_destination() {
        let store = CsvStore::new("/data/people.csv");
        assert_eq!(store.temp_path(), PathBuf::from("/data/people.csv.tmp"));
    }

    #[test]
    fn tsv_extension_selects_tab_delimiter() {
        let grid = Grid::new(
            vec!["id".to_string(), "name".to_string()],
            vec![vec!["1".to_string(), "a b".to_string()]],
        )
        .unwrap();
        let rendered = CsvStore::new("out.tsv").render(&grid).unwrap();
        assert_eq!(String::from_utf8(rendered).unwrap(), "id\tname\n1\ta b\n");
    }

    #[test]
    fn empty_grid_renders_nothing() {
        let rendered = CsvStore::new("out.csv").render(&Grid::empty()).unwrap();
        assert!(rendered.is_empty());
    }
}
