//! Adapter wrapping an external extraction command.
//!
//! The command receives the document bytes on stdin and the file name as its
//! last argument, and prints a JSON payload on stdout: either logical tables
//! (continuations already folded) or raw per-page `fragment_pages`, which
//! this adapter folds through the continuation detector when the capability
//! is enabled.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::Deserialize;
use tracing::warn;

use crate::adapter::ExtractionAdapter;
use crate::continuation::{ContinuationDetector, PageFragments};
use crate::types::{ExtractionResult, LogicalTable};

/// Wire payload expected on the subprocess's stdout.
#[derive(Debug, Deserialize)]
struct SubprocessPayload {
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    tables: Vec<LogicalTable>,
    #[serde(default)]
    fragment_pages: Vec<PageFragments>,
    #[serde(default)]
    error: Option<String>,
}

/// Runs an external command per document and parses its JSON output.
pub struct SubprocessAdapter {
    name: String,
    command: PathBuf,
    args: Vec<String>,
    detects_continuations: bool,
    supports_cells: bool,
}

impl SubprocessAdapter {
    pub fn new(name: impl Into<String>, command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            detects_continuations: false,
            supports_cells: false,
        }
    }

    /// Declare that the wrapped tool handles (or wants folding of)
    /// multi-page tables.
    pub fn with_continuation_support(mut self) -> Self {
        self.detects_continuations = true;
        self
    }

    /// Declare that the wrapped tool emits per-table cell data.
    pub fn with_cell_support(mut self) -> Self {
        self.supports_cells = true;
        self
    }

    fn run(&self, bytes: &[u8], file_name: &str) -> std::io::Result<std::process::Output> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(file_name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(stdin) = child.stdin.as_mut() {
            // A tool that exits before draining stdin closes the pipe; that
            // is its failure to report, not ours.
            match stdin.write_all(bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
        }
        child.wait_with_output()
    }

    fn into_tables(&self, payload: SubprocessPayload) -> (Vec<LogicalTable>, u32) {
        if payload.fragment_pages.is_empty() {
            let count = if self.detects_continuations {
                payload
                    .tables
                    .iter()
                    .map(|t| t.page_count().saturating_sub(1))
                    .sum()
            } else {
                0
            };
            return (payload.tables, count);
        }

        if self.detects_continuations {
            let outcome = ContinuationDetector::default().fold(&payload.fragment_pages);
            (outcome.tables, outcome.continuations)
        } else {
            // Without continuation support every fragment is its own table.
            let tables = payload
                .fragment_pages
                .iter()
                .flat_map(|p| p.fragments.iter())
                .enumerate()
                .map(|(idx, fragment)| LogicalTable {
                    table_id: idx as u32 + 1,
                    start_page: fragment.page,
                    end_page: fragment.page,
                    row_count: fragment.row_count,
                    col_count: fragment.col_count,
                    bounding_box: fragment.bounding_box,
                    cell_data: if fragment.rows.is_empty() {
                        None
                    } else {
                        Some(fragment.rows.clone())
                    },
                    header_row_index: fragment.has_header_row.then_some(0),
                })
                .collect();
            (tables, 0)
        }
    }
}

impl ExtractionAdapter for SubprocessAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    fn detects_continuations(&self) -> bool {
        self.detects_continuations
    }

    fn supports_cell_extraction(&self) -> bool {
        self.supports_cells
    }

    fn extract(&self, bytes: &[u8], file_name: &str) -> ExtractionResult {
        let start = Instant::now();

        let output = match self.run(bytes, file_name) {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = %self.name, file = file_name, error = %e, "subprocess failed to run");
                return ExtractionResult::failed(&self.name, file_name, e.to_string());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return ExtractionResult::failed(
                &self.name,
                file_name,
                format!("exit status {}: {}", output.status, stderr.trim()),
            );
        }

        let payload: SubprocessPayload = match serde_json::from_slice(&output.stdout) {
            Ok(payload) => payload,
            Err(e) => {
                return ExtractionResult::failed(
                    &self.name,
                    file_name,
                    format!("invalid output: {e}"),
                );
            }
        };

        if let Some(error) = payload.error {
            return ExtractionResult::failed(&self.name, file_name, error);
        }

        let pages = payload.pages;
        let (tables, continuations) = self.into_tables(payload);

        ExtractionResult {
            tool_name: self.name.clone(),
            file_name: file_name.to_string(),
            pages,
            tables,
            continuations_detected: continuations,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TableFragment;

    fn fragment(page: u32, top: f64, bottom: f64, cols: usize) -> TableFragment {
        TableFragment {
            page,
            top,
            bottom,
            col_count: cols,
            row_count: 2,
            rows: Vec::new(),
            has_header_row: false,
            bounding_box: None,
        }
    }

    fn payload_with_fragments() -> SubprocessPayload {
        SubprocessPayload {
            pages: 2,
            tables: Vec::new(),
            fragment_pages: vec![
                PageFragments {
                    page: 1,
                    page_height: 800.0,
                    fragments: vec![fragment(1, 100.0, 700.0, 3)],
                },
                PageFragments {
                    page: 2,
                    page_height: 800.0,
                    fragments: vec![fragment(2, 50.0, 300.0, 3)],
                },
            ],
            error: None,
        }
    }

    #[test]
    fn fragments_are_folded_when_continuations_enabled() {
        let adapter = SubprocessAdapter::new("tool", "true", vec![]).with_continuation_support();
        let (tables, continuations) = adapter.into_tables(payload_with_fragments());
        assert_eq!(tables.len(), 1);
        assert_eq!(continuations, 1);
        assert_eq!(tables[0].page_range(), (1, 2));
    }

    #[test]
    fn fragments_stay_single_page_without_continuation_support() {
        let adapter = SubprocessAdapter::new("tool", "true", vec![]);
        let (tables, continuations) = adapter.into_tables(payload_with_fragments());
        assert_eq!(tables.len(), 2);
        assert_eq!(continuations, 0);
        assert!(tables.iter().all(|t| !t.is_spanning()));
    }

    #[test]
    fn missing_command_is_unavailable() {
        let adapter = SubprocessAdapter::new("tool", "definitely-not-a-command-xyz", vec![]);
        assert!(!adapter.is_available());
    }

    #[test]
    fn failed_spawn_produces_error_result() {
        let adapter = SubprocessAdapter::new("tool", "/nonexistent/binary", vec![]);
        let result = adapter.extract(b"bytes", "doc.pdf");
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn parses_json_from_stdout() {
        // The file name lands in $0; the script drains stdin and answers
        // with a fixed payload.
        let script = r#"cat > /dev/null; echo '{
            "pages": 3,
            "tables": [{
                "table_id": 1, "start_page": 1, "end_page": 1,
                "row_count": 2, "col_count": 2
            }]
        }'"#;
        let adapter = SubprocessAdapter::new("stub", "sh", vec!["-c".to_string(), script.to_string()]);

        let result = adapter.extract(b"raw document bytes", "doc.pdf");
        assert!(result.success());
        assert_eq!(result.pages, 3);
        assert_eq!(result.table_count(), 1);
        assert!(result.elapsed_ms > 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_produces_error_result() {
        let adapter = SubprocessAdapter::new(
            "stub",
            "sh",
            vec!["-c".to_string(), "echo corrupt >&2; exit 3".to_string()],
        );
        let result = adapter.extract(b"bytes", "doc.pdf");
        assert!(!result.success());
        assert!(result.error.as_deref().unwrap_or("").contains("corrupt"));
    }
}
