//! Cell-level ground truth: expected tabular content per table.
//!
//! Expected data is stored in a compact CSV string form and materialized
//! into a [`CellTable`] through an explicit parse step — there is no hidden
//! cached state that silently re-parses on access.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Parsed tabular form of a ground-truth entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTable {
    /// Header cells, when the entry declares `has_header`.
    pub header: Option<Vec<String>>,
    /// Data rows, header excluded.
    pub rows: Vec<Vec<String>>,
}

impl CellTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count: header width when present, otherwise the widest row.
    pub fn col_count(&self) -> usize {
        match &self.header {
            Some(header) => header.len(),
            None => self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Cell at `(row, col)`, empty string for positions outside a ragged row.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Expected content of one table, keyed by `(file_name, table_id)`.
///
/// `rows` and `cols` describe the data grid and exclude the header row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellGroundTruth {
    pub table_id: u32,
    pub file_name: String,
    #[serde(default)]
    pub csv_data: String,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub cols: usize,
    #[serde(default = "default_true")]
    pub has_header: bool,
    #[serde(default)]
    pub notes: String,
}

impl CellGroundTruth {
    /// Parse the CSV string form into its tabular form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] when the stored string is not valid CSV.
    pub fn parse_table(&self) -> Result<CellTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(self.csv_data.as_bytes());

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }

        let header = if self.has_header && !records.is_empty() {
            Some(records.remove(0))
        } else {
            None
        };

        Ok(CellTable {
            header,
            rows: records,
        })
    }

    /// Build an entry from in-memory rows, encoding the CSV string form.
    pub fn from_rows(
        table_id: u32,
        file_name: impl Into<String>,
        header: Option<Vec<String>>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let cols = match &header {
            Some(h) => h.len(),
            None => rows.iter().map(Vec::len).max().unwrap_or(0),
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        if let Some(header) = &header {
            writer.write_record(header)?;
        }
        for row in &rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Benchmark(format!("failed to encode csv data: {e}")))?;
        let csv_data = String::from_utf8(bytes)
            .map_err(|e| Error::Benchmark(format!("csv data is not valid UTF-8: {e}")))?;

        Ok(Self {
            table_id,
            file_name: file_name.into(),
            csv_data,
            rows: rows.len(),
            cols,
            has_header: header.is_some(),
            notes: String::new(),
        })
    }

    /// Build an entry from a CSV file on disk. The first record is treated
    /// as the header.
    pub fn from_csv_file(
        path: impl AsRef<Path>,
        table_id: u32,
        file_name: impl Into<String>,
    ) -> Result<Self> {
        let csv_data = std::fs::read_to_string(path)?;
        let mut entry = Self {
            table_id,
            file_name: file_name.into(),
            csv_data,
            rows: 0,
            cols: 0,
            has_header: true,
            notes: String::new(),
        };
        let table = entry.parse_table()?;
        entry.rows = table.row_count();
        entry.cols = table.col_count();
        Ok(entry)
    }

    /// Total expected data cells (`rows × cols`).
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Collection of cell ground-truth entries, keyed by `(file_name, table_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellManifest {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub tables: Vec<CellGroundTruth>,
}

impl Default for CellManifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            tables: Vec::new(),
        }
    }
}

impl CellManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            tables = manifest.tables.len(),
            "loaded cell ground truth"
        );
        Ok(manifest)
    }

    /// Save the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Look up the entry for a specific table of a document.
    pub fn get(&self, file_name: &str, table_id: u32) -> Option<&CellGroundTruth> {
        self.tables
            .iter()
            .find(|t| t.file_name == file_name && t.table_id == table_id)
    }

    /// All entries for one document, in manifest order.
    pub fn tables_for_file(&self, file_name: &str) -> Vec<&CellGroundTruth> {
        self.tables
            .iter()
            .filter(|t| t.file_name == file_name)
            .collect()
    }

    /// Add an entry, replacing any existing entry with the same key.
    pub fn add(&mut self, table: CellGroundTruth) {
        self.tables
            .retain(|t| !(t.file_name == table.file_name && t.table_id == table.table_id));
        self.tables.push(table);
    }

    /// Remove an entry. Returns whether anything was removed.
    pub fn remove(&mut self, file_name: &str, table_id: u32) -> bool {
        let before = self.tables.len();
        self.tables
            .retain(|t| !(t.file_name == file_name && t.table_id == table_id));
        self.tables.len() != before
    }

    /// Sorted, de-duplicated list of document file names.
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.tables.iter().map(|t| t.file_name.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files
    }

    pub fn total_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn total_cells(&self) -> usize {
        self.tables.iter().map(CellGroundTruth::cell_count).sum()
    }

    /// Export every entry as `<document>_table_<id>.csv` into a directory.
    pub fn export_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        for table in &self.tables {
            let stem = table
                .file_name
                .strip_suffix(".pdf")
                .unwrap_or(&table.file_name);
            let file = dir.join(format!("{stem}_table_{}.csv", table.table_id));
            std::fs::write(file, &table.csv_data)?;
        }
        Ok(())
    }

    /// Import entries from a directory of `<document>_table_<id>.csv` files.
    /// Files not matching the naming convention are skipped.
    pub fn import_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut manifest = Self::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((document, id)) = stem.rsplit_once("_table_") else {
                continue;
            };
            let Ok(table_id) = id.parse::<u32>() else {
                continue;
            };

            let file_name = format!("{document}.pdf");
            manifest.add(CellGroundTruth::from_csv_file(&path, table_id, file_name)?);
        }

        Ok(manifest)
    }
}
