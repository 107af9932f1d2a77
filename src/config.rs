//! Run configuration: which features to extract and how to write them.

use crate::extract::{LineEnding, OutputMode, DEFAULT_MAX_DEPTH, DEFAULT_TARGET};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Header fields of the EMBER 2018 feature files extracted by default
pub const DEFAULT_FEATURES: &[&str] = &[
    "md5",
    "machine",
    "sizeof_code",
    "major_linker_version",
    "minor_linker_version",
    "major_operating_system_version",
    "minor_operating_system_version",
    "major_image_version",
    "minor_image_version",
    "major_subsystem_version",
    "minor_subsystem_version",
    "sizeof_headers",
    "subsystem",
    "sizeof_heap_commit",
    "sections_mean_entropy",
    "sections_min_entropy",
    "sections_max_entropy",
    "sections_mean_rawsize",
    "sections_min_rawsize",
    "sections_max_rawsize",
    "sections_mean_virtualsize",
    "sections_min_virtualsize",
    "sections_max_virtualsize",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Feature names in output order (the target is moved to the end)
    pub features: Vec<String>,
    /// Target column, always written last
    pub target: String,
    /// Maximum nesting depth searched for a feature
    pub max_depth: usize,
    /// Extension given to the derived output path
    pub output_extension: String,
    pub line_ending: LineEnding,
    /// What happens to the output file when a run fails
    pub output_mode: OutputMode,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            features: DEFAULT_FEATURES.iter().map(|s| s.to_string()).collect(),
            target: DEFAULT_TARGET.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            output_extension: String::from("csv"),
            line_ending: LineEnding::default(),
            output_mode: OutputMode::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ExtractConfig {
    /// Load from a JSON file; missing keys take their default
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse a comma-separated feature list, ignoring blank entries
    pub fn parse_feature_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}
