//! End-to-end benchmark run: manifests on disk, replayed extraction
//! results, aggregated metrics and persisted report.

use std::sync::Arc;

use tempfile::TempDir;

use tablemetry::{
    AdapterRegistry, BenchmarkConfig, BenchmarkRunner, CellGroundTruth, CellManifest,
    DocumentManifest, ExtractionResult, GroundTruthDocument, LogicalTable, MatchStatus, Metric,
    PrecomputedAdapter, TableDefinition, read_json, write_json,
};

fn ground_truth() -> DocumentManifest {
    let mut manifest = DocumentManifest::new();
    manifest.add(GroundTruthDocument {
        file_name: "annual_report.pdf".to_string(),
        table_count: 2,
        tables: vec![
            TableDefinition {
                table_id: 1,
                start_page: 3,
                end_page: 5,
                description: "revenue by quarter".to_string(),
            },
            TableDefinition {
                table_id: 2,
                start_page: 7,
                end_page: 7,
                description: String::new(),
            },
        ],
        image_count: 0,
        pages: 10,
        category: "financial".to_string(),
        difficulty: 3,
        notes: String::new(),
    });
    manifest.add(GroundTruthDocument {
        file_name: "invoice.pdf".to_string(),
        table_count: 1,
        tables: vec![TableDefinition {
            table_id: 1,
            start_page: 1,
            end_page: 1,
            description: String::new(),
        }],
        image_count: 0,
        pages: 1,
        category: "general".to_string(),
        difficulty: 1,
        notes: String::new(),
    });
    manifest
}

fn cell_truth() -> CellManifest {
    let mut manifest = CellManifest::new();
    manifest.add(
        CellGroundTruth::from_rows(
            1,
            "invoice.pdf",
            Some(vec!["item".to_string(), "price".to_string()]),
            vec![
                vec!["widget".to_string(), "1.234,50".to_string()],
                vec!["gadget".to_string(), "99".to_string()],
            ],
        )
        .unwrap(),
    );
    manifest
}

fn logical_table(
    id: u32,
    start: u32,
    end: u32,
    header: Option<Vec<&str>>,
    rows: Vec<Vec<&str>>,
) -> LogicalTable {
    let mut cell_data: Vec<Vec<String>> = Vec::new();
    let header_row_index = header.as_ref().map(|_| 0);
    if let Some(header) = header {
        cell_data.push(header.into_iter().map(str::to_string).collect());
    }
    for row in rows {
        cell_data.push(row.into_iter().map(str::to_string).collect());
    }
    let cols = cell_data.first().map(Vec::len).unwrap_or(0);
    LogicalTable {
        table_id: id,
        start_page: start,
        end_page: end,
        row_count: cell_data.len(),
        col_count: cols,
        bounding_box: None,
        cell_data: if cell_data.is_empty() {
            None
        } else {
            Some(cell_data)
        },
        header_row_index,
    }
}

/// Write one replayed extraction result per document into `dir`.
fn write_replay_results(dir: &std::path::Path) {
    let mut report = ExtractionResult::new("replay", "annual_report.pdf");
    report.pages = 10;
    report.tables = vec![
        // Spanning table found, but one page short.
        logical_table(1, 3, 4, None, vec![]),
        logical_table(2, 7, 7, None, vec![]),
        // Spurious extra table.
        logical_table(3, 9, 9, None, vec![]),
    ];
    let json = serde_json::to_string_pretty(&report).unwrap();
    std::fs::write(dir.join("annual_report.pdf.json"), json).unwrap();

    let mut invoice = ExtractionResult::new("replay", "invoice.pdf");
    invoice.pages = 1;
    invoice.tables = vec![logical_table(
        1,
        1,
        1,
        Some(vec!["item", "price"]),
        vec![vec!["widget", "1234.50"], vec!["gadget", "98"]],
    )];
    let json = serde_json::to_string_pretty(&invoice).unwrap();
    std::fs::write(dir.join("invoice.pdf.json"), json).unwrap();
}

fn documents() -> Vec<(String, Vec<u8>)> {
    vec![
        ("annual_report.pdf".to_string(), b"%PDF-1.7".to_vec()),
        ("invoice.pdf".to_string(), b"%PDF-1.7".to_vec()),
        // No ground truth for this one; it must be skipped.
        ("unrelated.pdf".to_string(), b"%PDF-1.7".to_vec()),
    ]
}

#[test]
fn full_run_over_replayed_results() {
    let temp_dir = TempDir::new().unwrap();
    write_replay_results(temp_dir.path());

    let mut registry = AdapterRegistry::new();
    registry
        .register(Arc::new(
            PrecomputedAdapter::new("replay", temp_dir.path())
                .with_continuation_support()
                .with_cell_support(),
        ))
        .unwrap();

    let runner = BenchmarkRunner::new(
        BenchmarkConfig::default(),
        registry,
        ground_truth(),
        cell_truth(),
    );
    let report = runner.run(&documents());

    let metrics = report.metrics_for("replay").unwrap();

    // Two documents with ground truth; the third is skipped.
    assert_eq!(metrics.total_documents, 2);
    assert_eq!(metrics.successful, 2);

    // annual_report has one extra table; invoice is exact.
    assert_eq!(metrics.table_count_exact, 1);
    assert_eq!(metrics.table_count_over, 1);

    // Page ranges: table 1 of annual_report overlaps (3-4 vs 3-5), table 2
    // and the invoice table are exact, table 3 is extra.
    assert_eq!(metrics.page_exact, 2);
    assert_eq!(metrics.page_partial, 1);
    assert_eq!(metrics.page_missing, 0);
    assert_eq!(metrics.page_extra, 1);

    // The truncated 3-4 range still spans pages.
    assert_eq!(metrics.spanning_expected, 1);
    assert_eq!(metrics.spanning_detected, 1);
    assert_eq!(metrics.spanning_recall(), 1.0);

    // Cell comparison: invoice only. "1234.50" matches "1.234,50"
    // numerically; "98" vs "99" is a mismatch.
    assert_eq!(metrics.total_tables, 1);
    assert_eq!(metrics.compared_tables, 1);
    assert_eq!(metrics.header_matches, 1);
    assert_eq!(metrics.total_cells, 4);
    assert_eq!(metrics.matched_cells, 3);
    assert_eq!(metrics.total_mismatches, 1);
    assert_eq!(metrics.cell_accuracy(), 0.75);

    let invoice_cmp = &report.comparisons_for_file("invoice.pdf")[0];
    assert!(invoice_cmp.structure_match());
    assert_eq!(invoice_cmp.numeric_matches, 1);
    assert_eq!(invoice_cmp.mismatched_cells.len(), 1);
    assert_eq!(invoice_cmp.mismatched_cells[0].expected, "99");

    // Reconciliation detail is carried on the document report.
    let annual = report
        .document_reports
        .iter()
        .find(|d| d.file_name == "annual_report.pdf")
        .unwrap();
    assert_eq!(annual.extracted_count, 3);
    let statuses: Vec<MatchStatus> = annual
        .range_comparisons
        .iter()
        .map(|c| c.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            MatchStatus::Partial,
            MatchStatus::Exact,
            MatchStatus::Extra
        ]
    );
}

#[test]
fn manifests_round_trip_through_disk_before_a_run() {
    let temp_dir = TempDir::new().unwrap();
    let gt_path = temp_dir.path().join("ground_truth.json");
    let cells_path = temp_dir.path().join("cells.json");

    ground_truth().save(&gt_path).unwrap();
    cell_truth().save(&cells_path).unwrap();

    let documents = DocumentManifest::load(&gt_path).unwrap();
    let cells = CellManifest::load(&cells_path).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(cells.total_tables(), 1);
    assert_eq!(cells.get("invoice.pdf", 1).unwrap().cols, 2);
}

#[test]
fn report_round_trips_through_json() {
    let temp_dir = TempDir::new().unwrap();
    let results_dir = temp_dir.path().join("extractions");
    std::fs::create_dir_all(&results_dir).unwrap();
    write_replay_results(&results_dir);

    let mut registry = AdapterRegistry::new();
    registry
        .register(Arc::new(
            PrecomputedAdapter::new("replay", &results_dir)
                .with_continuation_support()
                .with_cell_support(),
        ))
        .unwrap();

    let runner = BenchmarkRunner::new(
        BenchmarkConfig::default(),
        registry,
        ground_truth(),
        cell_truth(),
    );
    let report = runner.run(&documents());

    let path = temp_dir.path().join("out/results.json");
    write_json(&report, &path).unwrap();
    let loaded = read_json(&path).unwrap();

    assert_eq!(loaded.tool_metrics.len(), report.tool_metrics.len());
    assert_eq!(
        loaded.metrics_for("replay").unwrap().cell_accuracy(),
        report.metrics_for("replay").unwrap().cell_accuracy()
    );

    // Rankings survive the round trip.
    let ranking = loaded.ranking(Metric::CellAccuracy);
    assert_eq!(ranking[0].0, "replay");
    assert_eq!(ranking[0].1, 0.75);
}

#[test]
fn unavailable_adapter_is_excluded_from_the_run() {
    let mut registry = AdapterRegistry::new();
    registry
        .register(Arc::new(PrecomputedAdapter::new(
            "ghost",
            "/nonexistent/results",
        )))
        .unwrap();

    let runner = BenchmarkRunner::new(
        BenchmarkConfig::default(),
        registry,
        ground_truth(),
        cell_truth(),
    );
    let report = runner.run(&documents());

    assert!(report.tool_metrics.is_empty());
    assert!(report.document_reports.is_empty());
}
