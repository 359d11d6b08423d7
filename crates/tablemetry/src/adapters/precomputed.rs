//! Adapter replaying extraction results produced elsewhere.
//!
//! Expects one `<file_name>.json` per document in the results directory,
//! containing a serialized [`ExtractionResult`]. Useful for scoring runs of
//! tools that cannot be invoked from this process.

use std::path::PathBuf;

use crate::adapter::ExtractionAdapter;
use crate::types::ExtractionResult;

pub struct PrecomputedAdapter {
    name: String,
    results_dir: PathBuf,
    detects_continuations: bool,
    supports_cells: bool,
}

impl PrecomputedAdapter {
    pub fn new(name: impl Into<String>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            results_dir: results_dir.into(),
            detects_continuations: false,
            supports_cells: false,
        }
    }

    pub fn with_continuation_support(mut self) -> Self {
        self.detects_continuations = true;
        self
    }

    pub fn with_cell_support(mut self) -> Self {
        self.supports_cells = true;
        self
    }
}

impl ExtractionAdapter for PrecomputedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.results_dir.is_dir()
    }

    fn detects_continuations(&self) -> bool {
        self.detects_continuations
    }

    fn supports_cell_extraction(&self) -> bool {
        self.supports_cells
    }

    fn extract(&self, _bytes: &[u8], file_name: &str) -> ExtractionResult {
        let path = self.results_dir.join(format!("{file_name}.json"));

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                return ExtractionResult::failed(
                    &self.name,
                    file_name,
                    format!("no stored result at {}: {e}", path.display()),
                );
            }
        };

        match serde_json::from_str::<ExtractionResult>(&contents) {
            Ok(mut result) => {
                result.tool_name = self.name.clone();
                result.file_name = file_name.to_string();
                result
            }
            Err(e) => ExtractionResult::failed(
                &self.name,
                file_name,
                format!("stored result is not valid JSON: {e}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replays_stored_result() {
        let temp_dir = TempDir::new().unwrap();
        let stored = ExtractionResult {
            pages: 4,
            ..ExtractionResult::new("original-tool", "doc.pdf")
        };
        std::fs::write(
            temp_dir.path().join("doc.pdf.json"),
            serde_json::to_string(&stored).unwrap(),
        )
        .unwrap();

        let adapter = PrecomputedAdapter::new("replay", temp_dir.path());
        assert!(adapter.is_available());

        let result = adapter.extract(b"", "doc.pdf");
        assert!(result.success());
        assert_eq!(result.pages, 4);
        // The replay adapter owns the tool name.
        assert_eq!(result.tool_name, "replay");
    }

    #[test]
    fn missing_stored_result_is_an_adapter_failure() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = PrecomputedAdapter::new("replay", temp_dir.path());
        let result = adapter.extract(b"", "doc.pdf");
        assert!(!result.success());
    }

    #[test]
    fn missing_directory_makes_adapter_unavailable() {
        let adapter = PrecomputedAdapter::new("replay", "/nonexistent/results");
        assert!(!adapter.is_available());
    }
}
