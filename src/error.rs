use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a conversion run.
///
/// None of these are recovered from: the run loop propagates the first one
/// it sees and the caller decides what to do with the output written so far.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("line {line}: invalid JSON document")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("feature `{feature}` not found in the document")]
    FieldNotFound { feature: String },

    #[error("feature `{feature}`: `{field}` not found in section {index}")]
    SectionFieldNotFound {
        feature: String,
        field: String,
        index: usize,
    },

    #[error("feature `{feature}`: no `sections` list in the document")]
    MissingSections { feature: String },

    #[error("feature `{feature}`: `sections` is not a list of objects")]
    MalformedSections { feature: String },

    #[error("feature `{feature}` is a complex object")]
    ComplexValue { feature: String },

    #[error("feature `{feature}`: `sections` is empty, nothing to aggregate")]
    EmptyAggregation { feature: String },

    #[error("feature `{feature}`: `{field}` in section {index} is not a number")]
    NonNumericValue {
        feature: String,
        field: String,
        index: usize,
    },

    #[error("feature `{feature}`: aggregate is not a finite number")]
    NonFinite { feature: String },

    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Name of the feature that triggered the failure, if any.
    pub fn feature(&self) -> Option<&str> {
        match self {
            ExtractError::FieldNotFound { feature }
            | ExtractError::SectionFieldNotFound { feature, .. }
            | ExtractError::MissingSections { feature }
            | ExtractError::MalformedSections { feature }
            | ExtractError::ComplexValue { feature }
            | ExtractError::EmptyAggregation { feature }
            | ExtractError::NonNumericValue { feature, .. }
            | ExtractError::NonFinite { feature } => Some(feature),
            ExtractError::Parse { .. } | ExtractError::InputNotFound { .. } | ExtractError::Io(_) => {
                None
            }
        }
    }
}
