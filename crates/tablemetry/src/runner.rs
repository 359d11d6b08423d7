//! Benchmark orchestration and metrics aggregation.
//!
//! The engine is single-threaded and synchronous by design: documents and
//! adapters are iterated in nested loops with no overlap, because adapters
//! wrap heavyweight external processes whose resource usage must not be
//! multiplied by concurrency. Per-item failures are captured as data on the
//! result objects; nothing thrown by one (document, adapter) cell ever
//! aborts the rest of the run.

use std::cmp::Ordering;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapter::AdapterRegistry;
use crate::compare::{TableComparison, compare_table};
use crate::config::BenchmarkConfig;
use crate::ground_truth::{CellManifest, DocumentManifest};
use crate::reconcile::{MatchStatus, RangeComparison, reconcile};
use crate::types::LogicalTable;

/// Metric selector for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SuccessRate,
    TableCountAccuracy,
    PageAccuracy,
    SpanningRecall,
    StructureAccuracy,
    CellAccuracy,
    ExactAccuracy,
    HeaderAccuracy,
    AvgTimeMs,
}

impl Metric {
    /// Lower is better only for the timing metric.
    pub fn ascending(self) -> bool {
        matches!(self, Metric::AvgTimeMs)
    }
}

/// Accumulated counters for one adapter over one run.
///
/// Counters only ever increase within a run; every ratio is derived on read
/// and reports `0.0` when its denominator is zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMetrics {
    pub tool_name: String,

    /// Documents attempted / extracted without error.
    pub total_documents: usize,
    pub successful: usize,

    /// Documents where the extracted table count was exact / too high / too low.
    pub table_count_exact: usize,
    pub table_count_over: usize,
    pub table_count_under: usize,

    /// Page-range reconciliation outcomes, summed over all documents.
    pub page_exact: usize,
    pub page_partial: usize,
    pub page_missing: usize,
    pub page_extra: usize,

    /// Spanning tables detected vs. expected by ground truth.
    pub spanning_detected: usize,
    pub spanning_expected: usize,

    /// Cell-level counters (tables attempted, comparisons that ran, and
    /// the cell tallies beneath them).
    pub total_tables: usize,
    pub compared_tables: usize,
    pub structure_matches: usize,
    pub header_matches: usize,
    pub total_cells: usize,
    pub matched_cells: usize,
    pub exact_cells: usize,
    pub total_mismatches: usize,

    pub total_time_ms: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ToolMetrics {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            ..Self::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.successful, self.total_documents)
    }

    pub fn table_count_accuracy(&self) -> f64 {
        ratio(self.table_count_exact, self.total_documents)
    }

    /// Share of ground-truth tables placed on the right pages.
    ///
    /// The denominator is the original's rough estimate
    /// (`table_count_exact × total_documents`), which can over- or
    /// under-count when documents have varying table counts. Best-effort
    /// diagnostic, not a strict invariant.
    pub fn page_accuracy(&self) -> f64 {
        let matched = self.page_exact + self.page_partial;
        let expected = self.table_count_exact * self.total_documents;
        ratio(matched, expected.max(1)).min(1.0)
    }

    pub fn spanning_recall(&self) -> f64 {
        ratio(self.spanning_detected, self.spanning_expected)
    }

    pub fn structure_accuracy(&self) -> f64 {
        ratio(self.structure_matches, self.compared_tables)
    }

    pub fn header_accuracy(&self) -> f64 {
        ratio(self.header_matches, self.compared_tables)
    }

    pub fn cell_accuracy(&self) -> f64 {
        ratio(self.matched_cells, self.total_cells)
    }

    pub fn exact_accuracy(&self) -> f64 {
        ratio(self.exact_cells, self.total_cells)
    }

    pub fn avg_time_ms(&self) -> f64 {
        if self.successful == 0 {
            0.0
        } else {
            self.total_time_ms / self.successful as f64
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SuccessRate => self.success_rate(),
            Metric::TableCountAccuracy => self.table_count_accuracy(),
            Metric::PageAccuracy => self.page_accuracy(),
            Metric::SpanningRecall => self.spanning_recall(),
            Metric::StructureAccuracy => self.structure_accuracy(),
            Metric::CellAccuracy => self.cell_accuracy(),
            Metric::ExactAccuracy => self.exact_accuracy(),
            Metric::HeaderAccuracy => self.header_accuracy(),
            Metric::AvgTimeMs => self.avg_time_ms(),
        }
    }
}

/// Per-(document, adapter) detail row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub file_name: String,
    pub tool_name: String,
    pub gt_table_count: usize,
    pub extracted_count: usize,
    pub elapsed_ms: f64,
    #[serde(default)]
    pub range_comparisons: Vec<RangeComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything one benchmark run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// One entry per adapter, in registration order.
    pub tool_metrics: Vec<ToolMetrics>,
    pub document_reports: Vec<DocumentReport>,
    pub table_comparisons: Vec<TableComparison>,
}

impl BenchmarkReport {
    pub fn metrics_for(&self, tool_name: &str) -> Option<&ToolMetrics> {
        self.tool_metrics.iter().find(|m| m.tool_name == tool_name)
    }

    /// Adapters ranked by a metric. Descending except for the timing metric
    /// (ascending); ties keep first-seen adapter order (stable sort).
    pub fn ranking(&self, metric: Metric) -> Vec<(String, f64)> {
        let mut ranking: Vec<(String, f64)> = self
            .tool_metrics
            .iter()
            .map(|m| (m.tool_name.clone(), m.metric(metric)))
            .collect();

        if metric.ascending() {
            ranking.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        } else {
            ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        }
        ranking
    }

    pub fn comparisons_for_file(&self, file_name: &str) -> Vec<&TableComparison> {
        self.table_comparisons
            .iter()
            .filter(|c| c.file_name == file_name)
            .collect()
    }

    pub fn comparisons_for_tool(&self, tool_name: &str) -> Vec<&TableComparison> {
        self.table_comparisons
            .iter()
            .filter(|c| c.tool_name == tool_name)
            .collect()
    }

    /// The tool with the highest cell accuracy on a specific table.
    pub fn best_tool_for_table(&self, file_name: &str, table_id: u32) -> Option<&str> {
        self.table_comparisons
            .iter()
            .filter(|c| c.file_name == file_name && c.table_id == table_id && c.success())
            .max_by(|a, b| {
                a.cell_accuracy()
                    .partial_cmp(&b.cell_accuracy())
                    .unwrap_or(Ordering::Equal)
            })
            .map(|c| c.tool_name.as_str())
    }
}

/// Drives all available adapters over a set of documents and aggregates
/// per-adapter metrics.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    registry: AdapterRegistry,
    documents: DocumentManifest,
    cells: CellManifest,
}

impl BenchmarkRunner {
    pub fn new(
        config: BenchmarkConfig,
        registry: AdapterRegistry,
        documents: DocumentManifest,
        cells: CellManifest,
    ) -> Self {
        Self {
            config,
            registry,
            documents,
            cells,
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the benchmark over `(file_name, bytes)` pairs.
    ///
    /// Files without ground truth are skipped silently; adapter failures are
    /// isolated per (document, adapter) cell.
    pub fn run(&self, files: &[(String, Vec<u8>)]) -> BenchmarkReport {
        let adapters = self.registry.available();
        info!(
            adapters = adapters.len(),
            files = files.len(),
            "starting benchmark run"
        );

        let mut report = BenchmarkReport {
            tool_metrics: adapters
                .iter()
                .map(|a| ToolMetrics::new(a.name()))
                .collect(),
            ..Default::default()
        };

        for (file_name, bytes) in files {
            let Some(gt) = self.documents.get(file_name) else {
                debug!(file = %file_name, "no ground truth, skipping");
                continue;
            };
            let gt_cells = self.cells.tables_for_file(file_name);

            for (adapter, metrics) in adapters.iter().zip(report.tool_metrics.iter_mut()) {
                metrics.total_documents += 1;

                let start = Instant::now();
                let extraction = adapter.extract(bytes, file_name);
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                if let Some(error) = &extraction.error {
                    warn!(tool = adapter.name(), file = %file_name, error = %error, "extraction failed");
                    for gt_cell in &gt_cells {
                        metrics.total_tables += 1;
                        report.table_comparisons.push(TableComparison::failed(
                            gt_cell.table_id,
                            adapter.name(),
                            file_name.clone(),
                            gt_cell.rows,
                            gt_cell.cols,
                            error.clone(),
                        ));
                    }
                    report.document_reports.push(DocumentReport {
                        file_name: file_name.clone(),
                        tool_name: adapter.name().to_string(),
                        gt_table_count: gt.table_count,
                        extracted_count: 0,
                        elapsed_ms,
                        range_comparisons: Vec::new(),
                        error: Some(error.clone()),
                    });
                    continue;
                }

                metrics.successful += 1;
                metrics.total_time_ms += elapsed_ms;

                // Tools without continuation support never produce spanning
                // ranges; do not assume any they might claim.
                let tables: Vec<LogicalTable> = if adapter.detects_continuations() {
                    extraction.tables.clone()
                } else {
                    extraction
                        .tables
                        .iter()
                        .cloned()
                        .map(|mut t| {
                            t.end_page = t.start_page;
                            t
                        })
                        .collect()
                };

                match tables.len().cmp(&gt.table_count) {
                    Ordering::Equal => metrics.table_count_exact += 1,
                    Ordering::Greater => metrics.table_count_over += 1,
                    Ordering::Less => metrics.table_count_under += 1,
                }

                metrics.spanning_expected += gt.spanning_table_count();
                metrics.spanning_detected += tables.iter().filter(|t| t.is_spanning()).count();

                let range_comparisons = reconcile(&gt.tables, &tables);
                for comparison in &range_comparisons {
                    match comparison.status {
                        MatchStatus::Exact => metrics.page_exact += 1,
                        MatchStatus::Partial => metrics.page_partial += 1,
                        MatchStatus::Missing => metrics.page_missing += 1,
                        MatchStatus::Extra => metrics.page_extra += 1,
                    }
                }

                if adapter.supports_cell_extraction() {
                    for gt_cell in &gt_cells {
                        metrics.total_tables += 1;

                        let table = tables
                            .iter()
                            .find(|t| t.table_id == gt_cell.table_id && t.has_data());
                        let Some(table) = table else {
                            report.table_comparisons.push(TableComparison::failed(
                                gt_cell.table_id,
                                adapter.name(),
                                file_name.clone(),
                                gt_cell.rows,
                                gt_cell.cols,
                                format!("table {} not found or has no cell data", gt_cell.table_id),
                            ));
                            continue;
                        };

                        let mut comparison = compare_table(
                            gt_cell,
                            table,
                            adapter.name(),
                            file_name,
                            &self.config,
                        );
                        comparison.elapsed_ms = elapsed_ms;

                        if comparison.success() {
                            metrics.compared_tables += 1;
                            if comparison.structure_match() {
                                metrics.structure_matches += 1;
                            }
                            if comparison.header_match {
                                metrics.header_matches += 1;
                            }
                            metrics.total_cells += comparison.total_cells;
                            metrics.matched_cells += comparison.matched_cells;
                            metrics.exact_cells += comparison.exact_matches;
                            metrics.total_mismatches += comparison.mismatches;
                        }

                        report.table_comparisons.push(comparison);
                    }
                }

                report.document_reports.push(DocumentReport {
                    file_name: file_name.clone(),
                    tool_name: adapter.name().to_string(),
                    gt_table_count: gt.table_count,
                    extracted_count: tables.len(),
                    elapsed_ms,
                    range_comparisons,
                    error: None,
                });
            }
        }

        report
    }
}
