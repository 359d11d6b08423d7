//! Human-readable rendering of benchmark results.

use std::fmt::Write;

use crate::compare::TableComparison;
use crate::runner::{BenchmarkReport, Metric, ToolMetrics};

/// How many mismatched cells a comparison report lists before truncating.
const MISMATCH_PREVIEW_LIMIT: usize = 10;

/// Render one table comparison as a diagnostic block, listing up to ten
/// mismatched cells.
pub fn comparison_report(comparison: &TableComparison) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "=== {} / {} table {} ===",
        comparison.tool_name, comparison.file_name, comparison.table_id
    );

    if let Some(error) = &comparison.error {
        let _ = writeln!(out, "FAILED: {error}");
        return out;
    }

    let _ = writeln!(
        out,
        "structure: expected {}x{}, got {}x{} ({})",
        comparison.expected_rows,
        comparison.expected_cols,
        comparison.actual_rows,
        comparison.actual_cols,
        if comparison.structure_match() {
            "match"
        } else {
            "mismatch"
        }
    );
    let _ = writeln!(
        out,
        "cells: {}/{} matched ({:.1}%), {} exact, {} normalized, {} numeric, {} empty, {} mismatched",
        comparison.matched_cells,
        comparison.total_cells,
        comparison.cell_accuracy() * 100.0,
        comparison.exact_matches,
        comparison.normalized_matches,
        comparison.numeric_matches,
        comparison.empty_matches,
        comparison.mismatches,
    );
    let _ = writeln!(
        out,
        "header: {}",
        if comparison.header_match { "match" } else { "mismatch" }
    );
    let _ = writeln!(out, "time: {:.1}ms", comparison.elapsed_ms);

    if !comparison.mismatched_cells.is_empty() {
        let _ = writeln!(out, "mismatched cells:");
        for cell in comparison.mismatched_cells.iter().take(MISMATCH_PREVIEW_LIMIT) {
            let _ = writeln!(
                out,
                "  [{},{}] expected {:?}, got {:?}",
                cell.row, cell.col, cell.expected, cell.actual
            );
        }
        let hidden = comparison
            .mismatched_cells
            .len()
            .saturating_sub(MISMATCH_PREVIEW_LIMIT);
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {hidden} more");
        }
    }

    out
}

fn metric_line(metrics: &ToolMetrics) -> String {
    format!(
        "{:<20} {:>8.1}% {:>8.1}% {:>8.1}% {:>8.1}% {:>8.1}% {:>9.1}ms",
        metrics.tool_name,
        metrics.success_rate() * 100.0,
        metrics.table_count_accuracy() * 100.0,
        metrics.page_accuracy() * 100.0,
        metrics.spanning_recall() * 100.0,
        metrics.cell_accuracy() * 100.0,
        metrics.avg_time_ms(),
    )
}

/// Render the per-tool summary table for a run.
pub fn summary_report(report: &BenchmarkReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9} {:>11}",
        "tool", "success", "count", "pages", "spanning", "cells", "avg time"
    );
    for metrics in &report.tool_metrics {
        let _ = writeln!(out, "{}", metric_line(metrics));
    }

    out
}

/// Render a ranking by one metric, best tool first.
pub fn ranking_report(report: &BenchmarkReport, metric: Metric) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "ranking by {metric:?}:");
    for (position, (tool, value)) in report.ranking(metric).iter().enumerate() {
        let formatted = if metric == Metric::AvgTimeMs {
            format!("{value:.1}ms")
        } else {
            format!("{:.1}%", value * 100.0)
        };
        let _ = writeln!(out, "  {}. {tool:<20} {formatted}", position + 1);
    }

    out
}
