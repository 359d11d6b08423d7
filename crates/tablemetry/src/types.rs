//! Common data model shared by every extraction adapter.
//!
//! Adapters produce an [`ExtractionResult`] containing [`LogicalTable`]s with
//! continuations already folded: a table that physically spans pages 3-5
//! appears once, with `start_page = 3` and `end_page = 5`. The raw per-page
//! detections ([`TableFragment`]) only exist transiently on the way into the
//! continuation detector.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// One conceptual table, possibly spanning multiple physical pages.
///
/// `table_id` is unique per document, 1-based, assigned in first-seen order.
/// Pages are 1-based and inclusive; `end_page >= start_page` always holds.
/// If `cell_data` is present for a spanning table it is the concatenation of
/// all page fragments in page order, with repeated header rows of
/// continuation fragments excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalTable {
    pub table_id: u32,
    pub start_page: u32,
    pub end_page: u32,
    pub row_count: usize,
    pub col_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_data: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row_index: Option<usize>,
}

impl LogicalTable {
    /// A table is spanning iff it ends on a later page than it starts.
    pub fn is_spanning(&self) -> bool {
        self.end_page > self.start_page
    }

    /// Number of physical pages the table covers.
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }

    /// Inclusive page range as a `(start, end)` pair.
    pub fn page_range(&self) -> (u32, u32) {
        (self.start_page, self.end_page)
    }

    /// Display form of the page range, e.g. `p.3` or `p.3-5`.
    pub fn page_range_str(&self) -> String {
        if self.is_spanning() {
            format!("p.{}-{}", self.start_page, self.end_page)
        } else {
            format!("p.{}", self.start_page)
        }
    }

    /// Whether the table carries non-empty cell content.
    pub fn has_data(&self) -> bool {
        self.cell_data.as_ref().is_some_and(|rows| !rows.is_empty())
    }

    /// Data rows with the header row (if any) removed.
    pub fn data_rows(&self) -> &[Vec<String>] {
        let Some(rows) = self.cell_data.as_deref() else {
            return &[];
        };
        match self.header_row_index {
            Some(idx) if idx == 0 && !rows.is_empty() => &rows[1..],
            _ => rows,
        }
    }

    /// The header row, when the table declares one.
    pub fn header_row(&self) -> Option<&[String]> {
        let rows = self.cell_data.as_deref()?;
        let idx = self.header_row_index?;
        rows.get(idx).map(|r| r.as_slice())
    }
}

/// A single page's raw table detection, before continuation folding.
///
/// `top` and `bottom` are y-coordinates of the fragment edges on its page;
/// `has_header_row` marks the first row of `rows` as a (possibly repeated)
/// header. Fragments are consumed by the continuation detector and not
/// retained afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFragment {
    pub page: u32,
    pub top: f64,
    pub bottom: f64,
    pub col_count: usize,
    pub row_count: usize,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    #[serde(default)]
    pub has_header_row: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// The common result shape every adapter must produce for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub tool_name: String,
    pub file_name: String,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub tables: Vec<LogicalTable>,
    #[serde(default)]
    pub continuations_detected: u32,
    #[serde(default)]
    pub elapsed_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// An empty, successful result for the given tool and document.
    pub fn new(tool_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            file_name: file_name.into(),
            pages: 0,
            tables: Vec::new(),
            continuations_detected: 0,
            elapsed_ms: 0.0,
            error: None,
        }
    }

    /// A failed result carrying the adapter's error message.
    pub fn failed(
        tool_name: impl Into<String>,
        file_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(tool_name, file_name)
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Number of logical tables (continuations folded).
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of logical tables covering more than one page.
    pub fn spanning_table_count(&self) -> usize {
        self.tables.iter().filter(|t| t.is_spanning()).count()
    }

    /// Look up a logical table by its 1-based id.
    pub fn table_by_id(&self, table_id: u32) -> Option<&LogicalTable> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }

    /// Compact summary like `T1(p.1-4), T2(p.5)`.
    pub fn table_summary(&self) -> String {
        self.tables
            .iter()
            .map(|t| format!("T{}({})", t.table_id, t.page_range_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
