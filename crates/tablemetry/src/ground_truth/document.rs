//! Document-level ground truth: expected table counts and page ranges.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Expected location of one table inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableDefinitionRaw")]
pub struct TableDefinition {
    pub table_id: u32,
    pub start_page: u32,
    pub end_page: u32,
    #[serde(default)]
    pub description: String,
}

/// Wire form of [`TableDefinition`]; an omitted `end_page` defaults to
/// `start_page` on load.
#[derive(Deserialize)]
struct TableDefinitionRaw {
    table_id: u32,
    start_page: u32,
    end_page: Option<u32>,
    #[serde(default)]
    description: String,
}

impl From<TableDefinitionRaw> for TableDefinition {
    fn from(raw: TableDefinitionRaw) -> Self {
        Self {
            table_id: raw.table_id,
            start_page: raw.start_page,
            end_page: raw.end_page.unwrap_or(raw.start_page),
            description: raw.description,
        }
    }
}

impl TableDefinition {
    pub fn page_range(&self) -> (u32, u32) {
        (self.start_page, self.end_page)
    }

    pub fn is_spanning(&self) -> bool {
        self.end_page > self.start_page
    }

    pub fn page_range_str(&self) -> String {
        if self.is_spanning() {
            format!("p.{}-{}", self.start_page, self.end_page)
        } else {
            format!("p.{}", self.start_page)
        }
    }
}

fn default_category() -> String {
    "general".to_string()
}

fn default_difficulty() -> u8 {
    1
}

/// Ground truth for one document. Created and edited by an operator,
/// looked up by file name during benchmarking, never mutated by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthDocument {
    pub file_name: String,
    pub table_count: usize,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default)]
    pub image_count: usize,
    #[serde(default)]
    pub pages: u32,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub notes: String,
}

impl GroundTruthDocument {
    /// Number of expected tables covering more than one page.
    pub fn spanning_table_count(&self) -> usize {
        self.tables.iter().filter(|t| t.is_spanning()).count()
    }

    fn validate(&self, manifest_path: &Path) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(Error::InvalidManifest {
                path: manifest_path.to_path_buf(),
                reason: "file_name cannot be empty".to_string(),
            });
        }

        if !(1..=5).contains(&self.difficulty) {
            return Err(Error::InvalidManifest {
                path: manifest_path.to_path_buf(),
                reason: format!(
                    "difficulty must be 1-5, got {} for '{}'",
                    self.difficulty, self.file_name
                ),
            });
        }

        for table in &self.tables {
            if table.end_page < table.start_page {
                return Err(Error::InvalidManifest {
                    path: manifest_path.to_path_buf(),
                    reason: format!(
                        "table {} of '{}' has end_page {} before start_page {}",
                        table.table_id, self.file_name, table.end_page, table.start_page
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Collection of document ground-truth entries, keyed by file name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentManifest {
    #[serde(default)]
    pub documents: Vec<GroundTruthDocument>,
}

impl DocumentManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest from a JSON file. Parse or validation failures
    /// propagate; the file is never modified.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&contents)?;
        for document in &manifest.documents {
            document.validate(path)?;
        }

        info!(
            path = %path.display(),
            documents = manifest.documents.len(),
            "loaded document ground truth"
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

    /// Look up ground truth by document file name.
    pub fn get(&self, file_name: &str) -> Option<&GroundTruthDocument> {
        self.documents.iter().find(|d| d.file_name == file_name)
    }

    /// Add an entry, replacing any existing entry for the same file.
    pub fn add(&mut self, document: GroundTruthDocument) {
        self.documents.retain(|d| d.file_name != document.file_name);
        self.documents.push(document);
    }

    /// Remove the entry for a file. Returns whether anything was removed.
    pub fn remove(&mut self, file_name: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.file_name != file_name);
        self.documents.len() != before
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// File names of all documents in the manifest.
    pub fn files(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.file_name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(file_name: &str) -> GroundTruthDocument {
        GroundTruthDocument {
            file_name: file_name.to_string(),
            table_count: 2,
            tables: vec![
                TableDefinition {
                    table_id: 1,
                    start_page: 1,
                    end_page: 4,
                    description: "revenue by quarter".to_string(),
                },
                TableDefinition {
                    table_id: 2,
                    start_page: 5,
                    end_page: 5,
                    description: String::new(),
                },
            ],
            image_count: 0,
            pages: 6,
            category: "general".to_string(),
            difficulty: 2,
            notes: String::new(),
        }
    }

    #[test]
    fn manifest_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ground_truth.json");

        let mut manifest = DocumentManifest::new();
        manifest.add(document("report.pdf"));
        manifest.save(&path).unwrap();

        let loaded = DocumentManifest::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let doc = loaded.get("report.pdf").unwrap();
        assert_eq!(doc.table_count, 2);
        assert_eq!(doc.tables[0].page_range(), (1, 4));
        assert_eq!(doc.spanning_table_count(), 1);
    }

    #[test]
    fn omitted_fields_get_defaults_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ground_truth.json");
        std::fs::write(
            &path,
            r#"{
                "documents": [{
                    "file_name": "minimal.pdf",
                    "table_count": 1,
                    "tables": [{"table_id": 1, "start_page": 3}]
                }]
            }"#,
        )
        .unwrap();

        let manifest = DocumentManifest::load(&path).unwrap();
        let doc = manifest.get("minimal.pdf").unwrap();
        assert_eq!(doc.category, "general");
        assert_eq!(doc.difficulty, 1);
        assert_eq!(doc.tables[0].end_page, 3);
        assert!(!doc.tables[0].is_spanning());
    }

    #[test]
    fn add_replaces_existing_entry() {
        let mut manifest = DocumentManifest::new();
        manifest.add(document("report.pdf"));
        let mut updated = document("report.pdf");
        updated.table_count = 7;
        manifest.add(updated);

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("report.pdf").unwrap().table_count, 7);
    }

    #[test]
    fn remove_reports_whether_entry_existed() {
        let mut manifest = DocumentManifest::new();
        manifest.add(document("report.pdf"));
        assert!(manifest.remove("report.pdf"));
        assert!(!manifest.remove("report.pdf"));
    }

    #[test]
    fn invalid_difficulty_is_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ground_truth.json");
        std::fs::write(
            &path,
            r#"{"documents": [{"file_name": "bad.pdf", "table_count": 0, "difficulty": 9}]}"#,
        )
        .unwrap();

        assert!(matches!(
            DocumentManifest::load(&path),
            Err(Error::InvalidManifest { .. })
        ));
    }

    #[test]
    fn corrupt_manifest_propagates_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ground_truth.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(DocumentManifest::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn missing_manifest_is_a_distinct_error() {
        assert!(matches!(
            DocumentManifest::load("/nonexistent/manifest.json"),
            Err(Error::ManifestNotFound(_))
        ));
    }
}
