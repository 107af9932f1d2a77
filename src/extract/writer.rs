use crate::extract::types::{FeatureRow, FeatureSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Record terminator used between CSV rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Writes a header and feature rows as comma-separated values
pub struct CsvWriter<W: Write> {
    writer: W,
    line_ending: LineEnding,
    rows: usize,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W, line_ending: LineEnding) -> Self {
        CsvWriter {
            writer,
            line_ending,
            rows: 0,
        }
    }

    pub fn write_header(&mut self, features: &FeatureSet) -> Result<()> {
        self.write_record(features.iter())
            .context("Failed to write CSV header")
    }

    pub fn write_row(&mut self, row: &FeatureRow) -> Result<()> {
        let cells: Vec<String> = row.values().map(|v| v.to_string()).collect();
        self.write_record(cells.iter().map(String::as_str))
            .context("Failed to write CSV row")?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record<'a>(&mut self, fields: impl Iterator<Item = &'a str>) -> std::io::Result<()> {
        let mut line = String::new();
        for (idx, field) in fields.enumerate() {
            if idx > 0 {
                line.push(',');
            }
            push_field(&mut line, field);
        }
        line.push_str(self.line_ending.as_str());
        self.writer.write_all(line.as_bytes())
    }
}

/// Append `field`, quoting it only when it contains a separator, quote or newline
fn push_field(line: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        line.push('"');
        line.push_str(&field.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(field);
    }
}
