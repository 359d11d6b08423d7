//! Benchmark engine for comparing document table-extraction tools
//!
//! This crate provides infrastructure for benchmarking table extraction
//! tools against curated ground truth, measuring table detection (counts,
//! page ranges, multi-page continuations) and cell-level content accuracy.

pub mod adapter;
pub mod adapters;
pub mod compare;
pub mod config;
pub mod continuation;
pub mod error;
pub mod ground_truth;
pub mod output;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod types;

pub use adapter::{AdapterRegistry, ExtractionAdapter};
pub use adapters::{PrecomputedAdapter, SubprocessAdapter};
pub use compare::{CellComparison, CellMatch, TableComparison, compare_cells, compare_table};
pub use config::BenchmarkConfig;
pub use continuation::{ContinuationDetector, FoldOutcome, PageFragments};
pub use error::{Error, Result};
pub use ground_truth::{
    CellGroundTruth, CellManifest, CellTable, DocumentManifest, GroundTruthDocument,
    TableDefinition,
};
pub use output::{read_json, write_json};
pub use reconcile::{MatchStatus, RangeComparison, reconcile};
pub use report::{comparison_report, ranking_report, summary_report};
pub use runner::{BenchmarkReport, BenchmarkRunner, DocumentReport, Metric, ToolMetrics};
pub use types::{BoundingBox, ExtractionResult, LogicalTable, TableFragment};
