//! Cell-level content comparison between expected and extracted tables.
//!
//! Cells are compared positionally by row/column index. A single cell pair
//! runs through a fixed ladder — empty, exact, normalized, numeric — and the
//! first step that succeeds decides the match type. Numeric parsing is
//! locale-aware: both `1,234.56` and `1.234,56` resolve to `1234.56`.

use serde::{Deserialize, Serialize};

use crate::config::BenchmarkConfig;
use crate::ground_truth::CellGroundTruth;
use crate::types::LogicalTable;

/// Classification of one cell pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellMatch {
    /// Verbatim string equality.
    Exact,
    /// Equal after whitespace/case normalization.
    Normalized,
    /// Numerically equal within the configured tolerance.
    Numeric,
    /// Both sides empty.
    Empty,
    /// No step matched.
    Mismatch,
}

/// Comparison record for one cell position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellComparison {
    pub row: usize,
    pub col: usize,
    pub expected: String,
    pub actual: String,
    pub matched: bool,
    pub match_type: CellMatch,
}

/// Detailed comparison of one table against its ground truth.
///
/// Produced fresh per adapter run and never persisted; `total_cells` is
/// always `expected_rows × expected_cols`, so structural under-extraction is
/// penalized even when every compared cell matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableComparison {
    pub table_id: u32,
    pub tool_name: String,
    pub file_name: String,

    pub expected_rows: usize,
    pub expected_cols: usize,
    pub actual_rows: usize,
    pub actual_cols: usize,

    pub total_cells: usize,
    pub matched_cells: usize,
    pub exact_matches: usize,
    pub normalized_matches: usize,
    pub numeric_matches: usize,
    pub empty_matches: usize,
    pub mismatches: usize,

    /// Mismatching cell positions, for diagnostics.
    #[serde(default)]
    pub mismatched_cells: Vec<CellComparison>,

    pub header_match: bool,
    pub elapsed_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableComparison {
    /// A comparison that never ran, carrying the failure reason.
    pub fn failed(
        table_id: u32,
        tool_name: impl Into<String>,
        file_name: impl Into<String>,
        expected_rows: usize,
        expected_cols: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            table_id,
            tool_name: tool_name.into(),
            file_name: file_name.into(),
            expected_rows,
            expected_cols,
            actual_rows: 0,
            actual_cols: 0,
            total_cells: 0,
            matched_cells: 0,
            exact_matches: 0,
            normalized_matches: 0,
            numeric_matches: 0,
            empty_matches: 0,
            mismatches: 0,
            mismatched_cells: Vec::new(),
            header_match: false,
            elapsed_ms: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether extracted dimensions equal the expected dimensions.
    pub fn structure_match(&self) -> bool {
        self.expected_rows == self.actual_rows && self.expected_cols == self.actual_cols
    }

    /// Share of expected cells matched by any step of the ladder.
    pub fn cell_accuracy(&self) -> f64 {
        ratio(self.matched_cells, self.total_cells)
    }

    /// Share of expected cells matched verbatim.
    pub fn exact_accuracy(&self) -> f64 {
        ratio(self.exact_matches, self.total_cells)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Compare two cell values. Returns whether they match and the match type.
pub fn compare_cells(expected: &str, actual: &str, config: &BenchmarkConfig) -> (bool, CellMatch) {
    let expected_empty = expected.trim().is_empty();
    let actual_empty = actual.trim().is_empty();

    if expected_empty && actual_empty {
        return (true, CellMatch::Empty);
    }
    if expected_empty != actual_empty {
        return (false, CellMatch::Mismatch);
    }

    if expected == actual {
        return (true, CellMatch::Exact);
    }

    if normalize(expected, config) == normalize(actual, config) {
        return (true, CellMatch::Normalized);
    }

    if let (Some(exp), Some(act)) = (parse_number(expected), parse_number(actual)) {
        let diff = (exp - act).abs();
        if diff <= config.numeric_tolerance
            || (exp != 0.0 && (diff / exp.abs()) <= config.numeric_tolerance)
        {
            return (true, CellMatch::Numeric);
        }
    }

    (false, CellMatch::Mismatch)
}

/// Normalize a cell value for comparison: collapse whitespace runs when
/// configured, lower-case when configured, always trim.
pub fn normalize(value: &str, config: &BenchmarkConfig) -> String {
    let mut result = if config.normalize_whitespace {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        value.to_string()
    };

    if config.case_insensitive {
        result = result.to_lowercase();
    }

    result.trim().to_string()
}

/// Parse a cell value as a number, tolerating currency symbols and both
/// decimal-separator conventions. When `,` and `.` are both present, the
/// right-most one is the decimal separator; a lone `,` is a decimal
/// separator.
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£' | '¥') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let cleaned = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    cleaned.parse::<f64>().ok()
}

/// Compare an extracted table against its cell ground truth.
///
/// Comparison runs over `min(rows) × min(cols)` positions; every expected
/// cell outside that intersection counts as a mismatch. A malformed CSV
/// string form yields a failed comparison instead of an error.
pub fn compare_table(
    gt: &CellGroundTruth,
    table: &LogicalTable,
    tool_name: &str,
    file_name: &str,
    config: &BenchmarkConfig,
) -> TableComparison {
    let expected = match gt.parse_table() {
        Ok(expected) => expected,
        Err(e) => {
            return TableComparison::failed(
                gt.table_id,
                tool_name,
                file_name,
                gt.rows,
                gt.cols,
                format!("failed to parse expected cell data: {e}"),
            );
        }
    };

    let expected_rows = expected.row_count();
    let expected_cols = expected.col_count();
    let actual_rows = table.data_rows().len();
    let actual_cols = table.col_count;

    let mut result = TableComparison {
        table_id: gt.table_id,
        tool_name: tool_name.to_string(),
        file_name: file_name.to_string(),
        expected_rows,
        expected_cols,
        actual_rows,
        actual_cols,
        total_cells: expected_rows * expected_cols,
        matched_cells: 0,
        exact_matches: 0,
        normalized_matches: 0,
        numeric_matches: 0,
        empty_matches: 0,
        mismatches: 0,
        mismatched_cells: Vec::new(),
        header_match: false,
        elapsed_ms: 0.0,
        error: None,
    };

    if gt.has_header {
        if let (Some(expected_header), Some(actual_header)) =
            (expected.header.as_deref(), table.header_row())
        {
            let exp: Vec<String> = expected_header.iter().map(|c| normalize(c, config)).collect();
            let act: Vec<String> = actual_header.iter().map(|c| normalize(c, config)).collect();
            result.header_match = exp == act;
        }
    }

    let rows_to_compare = expected_rows.min(actual_rows);
    let cols_to_compare = expected_cols.min(actual_cols);
    let actual_data = table.data_rows();

    for row in 0..rows_to_compare {
        for col in 0..cols_to_compare {
            let expected_value = expected.cell(row, col);
            let actual_value = actual_data
                .get(row)
                .and_then(|r| r.get(col))
                .map(String::as_str)
                .unwrap_or("");

            let (matched, match_type) = compare_cells(expected_value, actual_value, config);

            if matched {
                result.matched_cells += 1;
                match match_type {
                    CellMatch::Exact => result.exact_matches += 1,
                    CellMatch::Normalized => result.normalized_matches += 1,
                    CellMatch::Numeric => result.numeric_matches += 1,
                    CellMatch::Empty => result.empty_matches += 1,
                    CellMatch::Mismatch => {}
                }
            } else {
                result.mismatches += 1;
                result.mismatched_cells.push(CellComparison {
                    row,
                    col,
                    expected: expected_value.to_string(),
                    actual: actual_value.to_string(),
                    matched,
                    match_type,
                });
            }
        }
    }

    // Expected cells outside the compared intersection are mismatches.
    let uncompared = result.total_cells - rows_to_compare * cols_to_compare;
    result.mismatches += uncompared;

    result
}
