use crate::error::ExtractError;
use crate::extract::resolver::FieldResolver;
use crate::extract::types::{AggregateOp, DerivedFeature};
use once_cell::sync::Lazy;
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Name of the repeated sub-structure the derived features aggregate over
pub const SECTIONS_FIELD: &str = "sections";

static DERIVED_FEATURES: Lazy<HashMap<&'static str, DerivedFeature>> = Lazy::new(|| {
    use AggregateOp::{Max, Mean, Min};

    let table: [(&'static str, &'static str, AggregateOp); 9] = [
        ("sections_mean_entropy", "entropy", Mean),
        ("sections_min_entropy", "entropy", Min),
        ("sections_max_entropy", "entropy", Max),
        ("sections_mean_rawsize", "size", Mean),
        ("sections_min_rawsize", "size", Min),
        ("sections_max_rawsize", "size", Max),
        ("sections_mean_virtualsize", "vsize", Mean),
        ("sections_min_virtualsize", "vsize", Min),
        ("sections_max_virtualsize", "vsize", Max),
    ];

    table
        .into_iter()
        .map(|(name, field, op)| (name, DerivedFeature { field, op }))
        .collect()
});

/// Look up a derived feature by name
pub fn derived_feature(name: &str) -> Option<DerivedFeature> {
    DERIVED_FEATURES.get(name).copied()
}

/// Computes mean/min/max statistics over the document's `sections` list
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateFeatureComputer {
    resolver: FieldResolver,
}

impl AggregateFeatureComputer {
    pub fn new(resolver: FieldResolver) -> Self {
        AggregateFeatureComputer { resolver }
    }

    /// Compute the derived feature `name` for `document`.
    ///
    /// Returns `Ok(None)` when `name` is not a derived feature.
    pub fn compute(&self, document: &Value, name: &str) -> Result<Option<Number>, ExtractError> {
        match derived_feature(name) {
            Some(derived) => self.aggregate(document, name, derived).map(Some),
            None => Ok(None),
        }
    }

    fn aggregate(
        &self,
        document: &Value,
        feature: &str,
        derived: DerivedFeature,
    ) -> Result<Number, ExtractError> {
        let sections = self
            .resolver
            .resolve(document, SECTIONS_FIELD)
            .ok_or_else(|| ExtractError::MissingSections {
                feature: feature.to_string(),
            })?;

        let sections = sections
            .as_array()
            .ok_or_else(|| ExtractError::MalformedSections {
                feature: feature.to_string(),
            })?;

        if sections.is_empty() {
            return Err(ExtractError::EmptyAggregation {
                feature: feature.to_string(),
            });
        }

        let mut fold = Fold::new(derived.op);
        for (index, section) in sections.iter().enumerate() {
            if !section.is_object() {
                return Err(ExtractError::MalformedSections {
                    feature: feature.to_string(),
                });
            }

            let value = self.resolver.resolve(section, derived.field).ok_or_else(|| {
                ExtractError::SectionFieldNotFound {
                    feature: feature.to_string(),
                    field: derived.field.to_string(),
                    index,
                }
            })?;

            let number = match value {
                Value::Number(number) => number,
                _ => {
                    return Err(ExtractError::NonNumericValue {
                        feature: feature.to_string(),
                        field: derived.field.to_string(),
                        index,
                    })
                }
            };

            fold.push(number);
        }

        fold.finish().ok_or_else(|| ExtractError::NonFinite {
            feature: feature.to_string(),
        })
    }
}

/// Running state of one aggregation
struct Fold<'a> {
    op: AggregateOp,
    sum: f64,
    count: usize,
    best: Option<(f64, &'a Number)>,
}

impl<'a> Fold<'a> {
    fn new(op: AggregateOp) -> Self {
        Fold {
            op,
            sum: 0.0,
            count: 0,
            best: None,
        }
    }

    fn push(&mut self, number: &'a Number) {
        // Every serde_json number converts to f64
        let value = number.as_f64().unwrap_or(f64::NAN);
        self.count += 1;

        match self.op {
            AggregateOp::Mean => self.sum += value,
            AggregateOp::Min => {
                if self.best.map_or(true, |(best, _)| value < best) {
                    self.best = Some((value, number));
                }
            }
            AggregateOp::Max => {
                if self.best.map_or(true, |(best, _)| value > best) {
                    self.best = Some((value, number));
                }
            }
        }
    }

    /// `None` when nothing was folded or the mean is not finite
    fn finish(self) -> Option<Number> {
        if self.count == 0 {
            return None;
        }

        match self.op {
            AggregateOp::Mean => Number::from_f64(self.sum / self.count as f64),
            // Min/max keep the winning element's own spelling
            AggregateOp::Min | AggregateOp::Max => self.best.map(|(_, number)| number.clone()),
        }
    }
}
