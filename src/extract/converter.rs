use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extract::resolver::FieldResolver;
use crate::extract::row::RowBuilder;
use crate::extract::types::{FeatureRow, FeatureSet};
use crate::extract::writer::{CsvWriter, LineEnding};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a failed run leaves behind at the output path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Delete any previous output and write in place. A failure leaves the
    /// header and every row written before it on disk.
    #[default]
    Truncate,
    /// Write to a `.partial` sibling and rename it over the output only once
    /// every record converted. A failure removes the partial file and keeps
    /// any previous output untouched.
    Atomic,
}

/// Outcome of a successful file conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub output: PathBuf,
}

/// Output path for `input`: same location, extension replaced
pub fn output_path_for(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// Whether `output` names the same file as `input`, however either is spelled
fn same_file(input: &Path, output: &Path) -> Result<bool> {
    if output == input {
        return Ok(true);
    }
    if !output.exists() {
        return Ok(false);
    }

    let input = std::fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output = std::fs::canonicalize(output)
        .with_context(|| format!("Failed to resolve output path: {}", output.display()))?;
    Ok(input == output)
}

fn partial_path_for(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Converts JSON Lines feature records into CSV
#[derive(Debug, Clone)]
pub struct Extractor {
    rows: RowBuilder,
    line_ending: LineEnding,
    output_mode: OutputMode,
    output_extension: String,
}

impl Extractor {
    pub fn new(config: &ExtractConfig) -> Self {
        let features = FeatureSet::new(config.features.iter().cloned(), config.target.clone());

        Extractor {
            rows: RowBuilder::new(features, FieldResolver::new(config.max_depth)),
            line_ending: config.line_ending,
            output_mode: config.output_mode,
            output_extension: config.output_extension.clone(),
        }
    }

    pub fn feature_set(&self) -> &FeatureSet {
        self.rows.feature_set()
    }

    pub fn build_row(&self, document: &Value) -> Result<FeatureRow, ExtractError> {
        self.rows.build_row(document)
    }

    /// Convert every line of `reader`, writing a header then one row per record.
    ///
    /// Stops at the first bad record. Whatever was written before it is
    /// flushed to `writer`. Returns the number of rows written.
    pub fn convert_reader<R: BufRead, W: Write>(&self, reader: R, writer: W) -> Result<usize> {
        let mut csv = CsvWriter::new(writer, self.line_ending);
        csv.write_header(self.feature_set())?;

        let result = self.write_records(reader, &mut csv);
        csv.flush()?;
        result?;

        Ok(csv.rows())
    }

    fn write_records<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        csv: &mut CsvWriter<W>,
    ) -> Result<()> {
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(ExtractError::from)
                .with_context(|| format!("Failed to read line {}", line_no + 1))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            // Raw bytes, so invalid UTF-8 surfaces as a parse error for this line
            let document: Value = serde_json::from_slice(&buf)
                .map_err(|source| ExtractError::Parse { line: line_no, source })?;

            let row = self
                .build_row(&document)
                .with_context(|| format!("Failed to extract features from line {}", line_no))?;

            csv.write_row(&row)?;
            debug!(line = line_no, "wrote row");
        }

        Ok(())
    }

    /// Convert the JSON Lines file at `input`.
    ///
    /// The output defaults to the input path with the configured extension.
    /// An existing file there is regenerated from scratch, never appended to.
    pub fn convert_file(&self, input: &Path, output: Option<&Path>) -> Result<RunSummary> {
        if !input.exists() {
            return Err(ExtractError::InputNotFound {
                path: input.to_path_buf(),
            }
            .into());
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_path_for(input, &self.output_extension));
        if same_file(input, &output)? {
            bail!("Output path {} would overwrite the input", output.display());
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            features = self.feature_set().len(),
            "CSV file will be generated"
        );

        let reader = BufReader::new(
            File::open(input).with_context(|| format!("Failed to open input: {}", input.display()))?,
        );

        let rows = match self.output_mode {
            OutputMode::Truncate => {
                if output.exists() {
                    warn!(output = %output.display(), "removing previous output");
                    std::fs::remove_file(&output).with_context(|| {
                        format!("Failed to remove previous output: {}", output.display())
                    })?;
                }
                let file = File::create(&output)
                    .with_context(|| format!("Failed to create output: {}", output.display()))?;
                self.convert_reader(reader, BufWriter::new(file))?
            }
            OutputMode::Atomic => {
                let partial = partial_path_for(&output);
                let file = File::create(&partial)
                    .with_context(|| format!("Failed to create output: {}", partial.display()))?;

                match self.convert_reader(reader, BufWriter::new(file)) {
                    Ok(rows) => {
                        std::fs::rename(&partial, &output).with_context(|| {
                            format!("Failed to move {} into place", partial.display())
                        })?;
                        rows
                    }
                    Err(err) => {
                        if let Err(remove_err) = std::fs::remove_file(&partial) {
                            warn!(error = %remove_err, "failed to remove partial output");
                        }
                        return Err(err);
                    }
                }
            }
        };

        info!(rows, output = %output.display(), "conversion finished");
        Ok(RunSummary { rows, output })
    }
}
