//! Page-range reconciliation between ground-truth table definitions and
//! extracted logical tables.
//!
//! The matching is a deliberate greedy, order-dependent scan: ground-truth
//! entries are processed in input order, an exact page range wins
//! immediately, and the first overlapping range is kept as a tentative
//! partial match while the scan continues looking for an exact one. This is
//! not optimal bipartite matching — the greedy behavior is part of the
//! observable benchmark output and must not be "improved".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ground_truth::TableDefinition;
use crate::types::LogicalTable;

/// Outcome of matching one ground-truth table (or one unmatched extracted
/// table) against the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Page ranges are identical.
    Exact,
    /// Page ranges overlap but differ.
    Partial,
    /// No extracted table overlaps the ground-truth range.
    Missing,
    /// Extracted table not consumed by any ground-truth entry.
    Extra,
}

/// One row of the reconciliation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeComparison {
    pub table_id: u32,
    /// Ground-truth page range; `None` for `extra` rows.
    pub gt_range: Option<(u32, u32)>,
    /// Extracted page range; `None` for `missing` rows.
    pub extracted_range: Option<(u32, u32)>,
    pub status: MatchStatus,
}

impl RangeComparison {
    pub fn gt_range_str(&self) -> String {
        range_str(self.gt_range)
    }

    pub fn extracted_range_str(&self) -> String {
        range_str(self.extracted_range)
    }
}

fn range_str(range: Option<(u32, u32)>) -> String {
    match range {
        None => "-".to_string(),
        Some((start, end)) if start == end => format!("p.{start}"),
        Some((start, end)) => format!("p.{start}-{end}"),
    }
}

fn ranges_overlap(a: (u32, u32), b: (u32, u32)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Match ground-truth table definitions against extracted logical tables.
///
/// Produces one [`RangeComparison`] per ground-truth entry (in input order)
/// followed by one `extra` row per unconsumed extracted table. Each
/// extracted table is consumed by at most one ground-truth entry.
pub fn reconcile(gt_tables: &[TableDefinition], extracted: &[LogicalTable]) -> Vec<RangeComparison> {
    let mut used: HashSet<u32> = HashSet::new();
    let mut comparisons = Vec::with_capacity(gt_tables.len());

    for gt in gt_tables {
        let gt_range = gt.page_range();
        let mut best: Option<&LogicalTable> = None;
        let mut status = MatchStatus::Missing;

        for table in extracted {
            if used.contains(&table.table_id) {
                continue;
            }

            let ext_range = table.page_range();
            if ext_range == gt_range {
                best = Some(table);
                status = MatchStatus::Exact;
                break;
            }

            // First overlap only; an exact match later may still displace it.
            if best.is_none() && ranges_overlap(gt_range, ext_range) {
                best = Some(table);
                status = MatchStatus::Partial;
            }
        }

        if let Some(matched) = best {
            used.insert(matched.table_id);
        }

        comparisons.push(RangeComparison {
            table_id: gt.table_id,
            gt_range: Some(gt_range),
            extracted_range: best.map(LogicalTable::page_range),
            status,
        });
    }

    for table in extracted {
        if !used.contains(&table.table_id) {
            comparisons.push(RangeComparison {
                table_id: table.table_id,
                gt_range: None,
                extracted_range: Some(table.page_range()),
                status: MatchStatus::Extra,
            });
        }
    }

    comparisons
}
