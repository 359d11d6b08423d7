//! Operator-curated ground truth used as the comparison baseline.
//!
//! Two independent manifests exist: [`DocumentManifest`] holds expected
//! table counts and page ranges per document, keyed by file name;
//! [`CellManifest`] holds expected tabular content per table, keyed by
//! `(file_name, table_id)`. Both round-trip losslessly through JSON.

mod cells;
mod document;

pub use cells::{CellGroundTruth, CellManifest, CellTable};
pub use document::{DocumentManifest, GroundTruthDocument, TableDefinition};
