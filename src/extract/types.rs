use serde_json::{Number, Value};
use std::fmt;

/// Default name of the target column
pub const DEFAULT_TARGET: &str = "label";

/// Ordered, de-duplicated list of feature names defining the output columns.
///
/// The target name is always the last column, wherever (or whether) the
/// caller listed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    names: Vec<String>,
    target: String,
}

impl FeatureSet {
    pub fn new<I, S>(names: I, target: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = target.into();
        let mut ordered: Vec<String> = Vec::new();

        for name in names {
            let name = name.into();
            if name == target || ordered.contains(&name) {
                continue;
            }
            ordered.push(name);
        }
        ordered.push(target.clone());

        FeatureSet {
            names: ordered,
            target,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A single output cell
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(Number),
    String(String),
    Bool(bool),
}

impl Scalar {
    /// Convert a resolved JSON value, `None` for null and structured values
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // serde_json keeps the JSON spelling: `0`, `1.0`, `2.5`
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One output record: a value per feature, in feature-set order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRow {
    cells: Vec<(String, Scalar)>,
}

impl FeatureRow {
    pub fn with_capacity(capacity: usize) -> Self {
        FeatureRow {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, feature: impl Into<String>, value: Scalar) {
        self.cells.push((feature.into(), value));
    }

    pub fn get(&self, feature: &str) -> Option<&Scalar> {
        self.cells
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.cells.iter().map(|(_, value)| value)
    }
}

/// Fold applied to a sub-field across all sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Mean,
    Min,
    Max,
}

/// A derived feature: which section field to aggregate, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedFeature {
    pub field: &'static str,
    pub op: AggregateOp,
}
