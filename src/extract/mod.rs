//! Feature extraction - flatten nested JSON records into CSV rows
//!
//! Each input document is searched for a fixed list of feature names. Plain
//! names are looked up anywhere in the document; the nine `sections_*` names
//! are aggregated (mean/min/max) over the document's `sections` list.

pub mod aggregate;
pub mod converter;
pub mod resolver;
pub mod row;
pub mod types;
pub mod writer;

pub use aggregate::{derived_feature, AggregateFeatureComputer, SECTIONS_FIELD};
pub use converter::{output_path_for, Extractor, OutputMode, RunSummary};
pub use resolver::{FieldResolver, DEFAULT_MAX_DEPTH};
pub use row::RowBuilder;
pub use types::{AggregateOp, DerivedFeature, FeatureRow, FeatureSet, Scalar, DEFAULT_TARGET};
pub use writer::{CsvWriter, LineEnding};
