//! Output writers for benchmark results
//!
//! This module provides functionality for persisting benchmark reports to
//! disk in JSON format.

use crate::runner::BenchmarkReport;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Write a benchmark report to a JSON file
///
/// # Arguments
/// * `report` - The report to write
/// * `output_path` - Path to output JSON file
pub fn write_json(report: &BenchmarkReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(Error::Io)?;
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Error::Benchmark(format!("Failed to serialize report: {}", e)))?;

    fs::write(output_path, json).map_err(Error::Io)?;

    Ok(())
}

/// Read a previously written benchmark report back from disk.
pub fn read_json(path: &Path) -> Result<BenchmarkReport> {
    let contents = fs::read_to_string(path)?;
    let report = serde_json::from_str(&contents)?;
    Ok(report)
}
