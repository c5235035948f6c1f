use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use inventory_table::RawTable;

use crate::error::{LoaderError, Result};

/// Where raw exports come from.
///
/// Implementations only fetch and parse; normalization happens in the
/// cache so every source gets the same fail-closed treatment.
pub trait TableSource: Send + Sync {
    /// Human-readable label for logs and stats
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<RawTable>;
}

impl<T: TableSource + ?Sized> TableSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<RawTable> {
        (**self).fetch()
    }
}

/// A CSV export on local disk, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<RawTable> {
        let file = File::open(&self.path).map_err(|source| LoaderError::Io {
            path: self.path.clone(),
            source,
        })?;
        let raw = parse_csv(file, self.delimiter)?;
        if raw.headers.is_empty() {
            return Err(LoaderError::MissingHeader(self.describe()));
        }
        log::debug!("read {} rows from {}", raw.row_count(), self.describe());
        Ok(raw)
    }
}

/// A table that was fetched once (e.g. from stdin) and is served as-is.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    label: String,
    table: RawTable,
}

impl InMemorySource {
    pub fn new(label: impl Into<String>, table: RawTable) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}

impl TableSource for InMemorySource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }
}

/// Parse CSV text into a raw table. Rows may have differing lengths.
pub fn parse_csv<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut raw = RawTable::new(headers);
    for record in rdr.records() {
        let record = record?;
        raw.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(raw)
}
