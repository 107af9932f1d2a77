//! # ember-csv - EMBER feature records to CSV
//!
//! Flattens EMBER-style JSON Lines feature records into a CSV table with a
//! stable column order.
//!
//! ## Modules
//!
//! - **extract**: field lookup, `sections` aggregates, row building and CSV output
//! - **config**: feature list and output options
//!
//! ## Quick Start
//!
//! ```rust
//! use ember_csv::{ExtractConfig, Extractor};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ExtractConfig {
//!     features: vec!["md5".into(), "sections_mean_entropy".into()],
//!     ..ExtractConfig::default()
//! };
//! let extractor = Extractor::new(&config);
//!
//! let record = json!({
//!     "md5": "abc",
//!     "section": {"sections": [{"entropy": 1.0}, {"entropy": 3.0}]},
//!     "label": 0
//! });
//! let row = extractor.build_row(&record)?;
//!
//! // columns: md5, sections_mean_entropy, label
//! assert_eq!(row.get("sections_mean_entropy").unwrap().to_string(), "2.0");
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use std::io::{BufRead, Write};

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;

// Re-export commonly used types for convenience
pub use config::{ExtractConfig, LogConfig, DEFAULT_FEATURES};
pub use error::ExtractError;
pub use extract::{
    AggregateFeatureComputer, Extractor, FeatureRow, FeatureSet, FieldResolver, OutputMode,
    RunSummary, Scalar,
};

/// Convert a JSON Lines stream into CSV with the given configuration
pub fn convert_jsonl<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    config: &ExtractConfig,
) -> Result<usize> {
    Extractor::new(config).convert_reader(reader, writer)
}
