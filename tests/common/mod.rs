#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_upsert::{Grid, Record};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(name)).expect("read temp file")
    }
}

pub fn grid(header: &[&str], rows: &[&[&str]]) -> Grid {
    Grid::new(
        header.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
    .expect("valid grid")
}

pub fn record(fields: &[(&str, &str)]) -> Record {
    fields.iter().copied().collect()
}

/// Header `[id, name, email]` with John and Jane.
pub fn people() -> Grid {
    grid(
        &["id", "name", "email"],
        &[
            &["1", "John Doe", "john@x.com"],
            &["2", "Jane", "jane@x.com"],
        ],
    )
}
