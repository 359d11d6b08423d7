//! Continuation detection: folding per-page table fragments into logical tables.
//!
//! A table that runs to the bottom of page N and resumes at the top of page
//! N+1 with the same column count is one logical table, not two. The detector
//! walks pages in order and decides, for the *first* fragment of each page
//! only, whether it continues the last fragment seen on the previous page.
//! Later fragments on the same page always start new tables — a page can
//! begin at most one continuation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{LogicalTable, TableFragment};

/// All fragments detected on one physical page, in detection order.
///
/// Pages without fragments must still be present in the fold input: a gap
/// page resets continuation tracking even if tables with matching column
/// counts reappear later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFragments {
    pub page: u32,
    pub page_height: f64,
    #[serde(default)]
    pub fragments: Vec<TableFragment>,
}

/// Result of folding a fragment sequence.
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    /// Logical tables in first-seen order, ids assigned from 1 upward.
    pub tables: Vec<LogicalTable>,
    /// How many fragments were folded into a preceding table.
    pub continuations: u32,
}

/// Retained state of the last fragment on the previous page.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    col_count: usize,
    bottom: f64,
    page_height: f64,
}

/// Per-page-pair continuation heuristic.
#[derive(Debug, Clone, Copy)]
pub struct ContinuationDetector {
    /// The previous fragment must end below this share of its page height.
    pub bottom_threshold: f64,
    /// The current fragment must start above this share of its page height.
    pub top_threshold: f64,
}

impl Default for ContinuationDetector {
    fn default() -> Self {
        Self {
            bottom_threshold: 0.80,
            top_threshold: 0.20,
        }
    }
}

impl ContinuationDetector {
    /// Fold per-page fragments into logical tables.
    ///
    /// Pages must be supplied in ascending page order and include empty
    /// pages. The last fragment of a page always becomes the new tracking
    /// anchor, whether or not it was itself a continuation.
    pub fn fold(&self, pages: &[PageFragments]) -> FoldOutcome {
        let mut tables: Vec<LogicalTable> = Vec::new();
        let mut continuations = 0u32;
        let mut anchor: Option<Anchor> = None;
        let mut next_id = 1u32;

        for page in pages {
            if page.fragments.is_empty() {
                // Gap page: breaks any possible continuation.
                anchor = None;
                continue;
            }

            for (idx, fragment) in page.fragments.iter().enumerate() {
                let continues = idx == 0
                    && anchor
                        .as_ref()
                        .is_some_and(|a| self.is_continuation(fragment, a, page.page_height));

                match (continues, tables.last_mut()) {
                    (true, Some(open)) => {
                        continuations += 1;
                        debug!(
                            page = page.page,
                            table_id = open.table_id,
                            "folding fragment into open table"
                        );
                        append_fragment(open, fragment);
                    }
                    _ => {
                        tables.push(new_table(next_id, fragment));
                        next_id += 1;
                    }
                }
            }

            if let Some(last) = page.fragments.last() {
                anchor = Some(Anchor {
                    col_count: last.col_count,
                    bottom: last.bottom,
                    page_height: page.page_height,
                });
            }
        }

        FoldOutcome {
            tables,
            continuations,
        }
    }

    /// All three conditions must hold: matching column count, previous
    /// fragment ran to the page bottom, current fragment starts near the top.
    fn is_continuation(&self, fragment: &TableFragment, anchor: &Anchor, page_height: f64) -> bool {
        fragment.col_count == anchor.col_count
            && anchor.bottom > anchor.page_height * self.bottom_threshold
            && fragment.top < page_height * self.top_threshold
    }
}

fn new_table(table_id: u32, fragment: &TableFragment) -> LogicalTable {
    LogicalTable {
        table_id,
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
    }
}

/// Append a continuation fragment to its owning logical table. A repeated
/// header row at the top of the fragment is dropped.
fn append_fragment(table: &mut LogicalTable, fragment: &TableFragment) {
    table.end_page = fragment.page;

    let skip = usize::from(fragment.has_header_row);
    table.row_count += fragment.row_count.saturating_sub(skip);

    if fragment.rows.len() > skip {
        table
            .cell_data
            .get_or_insert_with(Vec::new)
            .extend(fragment.rows.iter().skip(skip).cloned());
    }
}
