use crate::error::ExtractError;
use crate::extract::aggregate::AggregateFeatureComputer;
use crate::extract::resolver::FieldResolver;
use crate::extract::types::{FeatureRow, FeatureSet, Scalar};
use serde_json::Value;

/// Builds one output row per document
#[derive(Debug, Clone)]
pub struct RowBuilder {
    features: FeatureSet,
    resolver: FieldResolver,
    aggregates: AggregateFeatureComputer,
}

impl RowBuilder {
    pub fn new(features: FeatureSet, resolver: FieldResolver) -> Self {
        RowBuilder {
            features,
            resolver,
            aggregates: AggregateFeatureComputer::new(resolver),
        }
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.features
    }

    /// Resolve every feature of the set against `document`.
    ///
    /// Fails on the first feature that is missing or not a scalar.
    pub fn build_row(&self, document: &Value) -> Result<FeatureRow, ExtractError> {
        let mut row = FeatureRow::with_capacity(self.features.len());

        for feature in self.features.iter() {
            let value = self.resolve_feature(document, feature)?;
            row.push(feature, value);
        }

        Ok(row)
    }

    fn resolve_feature(&self, document: &Value, feature: &str) -> Result<Scalar, ExtractError> {
        if let Some(number) = self.aggregates.compute(document, feature)? {
            return Ok(Scalar::Number(number));
        }

        let value = self
            .resolver
            .resolve(document, feature)
            .ok_or_else(|| ExtractError::FieldNotFound {
                feature: feature.to_string(),
            })?;

        Scalar::from_value(value).ok_or_else(|| ExtractError::ComplexValue {
            feature: feature.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder(names: &[&str]) -> RowBuilder {
        RowBuilder::new(
            FeatureSet::new(names.iter().copied(), "label"),
            FieldResolver::default(),
        )
    }

    #[test]
    fn test_row_in_feature_order() {
        let doc = json!({
            "label": 0,
            "md5": "abc",
            "sections": [{"entropy": 1.0, "size": 10, "vsize": 100}]
        });

        let row = builder(&["md5", "sections_mean_entropy", "label"])
            .build_row(&doc)
            .unwrap();

        assert_eq!(
            row.names().collect::<Vec<_>>(),
            vec!["md5", "sections_mean_entropy", "label"]
        );
        let cells: Vec<String> = row.values().map(|v| v.to_string()).collect();
        assert_eq!(cells, vec!["abc", "1.0", "0"]);
    }

    #[test]
    fn test_nested_header_fields() {
        let doc = json!({
            "md5": "abc",
            "header": {
                "coff": {"machine": "I386", "timestamp": 1124149349},
                "optional": {"subsystem": "WINDOWS_GUI", "sizeof_code": 4096}
            },
            "label": 1
        });

        let row = builder(&["machine", "sizeof_code", "subsystem"])
            .build_row(&doc)
            .unwrap();

        assert_eq!(row.get("machine"), Some(&Scalar::String("I386".into())));
        assert_eq!(row.get("sizeof_code").unwrap().to_string(), "4096");
        assert_eq!(row.get("label").unwrap().to_string(), "1");
    }

    #[test]
    fn test_missing_feature() {
        let doc = json!({"md5": "abc", "label": 0});
        let err = builder(&["md5", "machine"]).build_row(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::FieldNotFound { ref feature } if feature == "machine"));
    }

    #[test]
    fn test_missing_label() {
        let doc = json!({"md5": "abc"});
        let err = builder(&["md5"]).build_row(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::FieldNotFound { ref feature } if feature == "label"));
    }

    #[test]
    fn test_null_label_is_not_found_even_with_nested_label() {
        let doc = json!({"x": 1, "label": null, "meta": {"label": 7}});
        let err = builder(&["x"]).build_row(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::FieldNotFound { ref feature } if feature == "label"));
    }

    #[test]
    fn test_complex_values_rejected() {
        let doc = json!({"header": {"coff": {"machine": "I386"}}, "imports": ["a"], "label": 0});

        let err = builder(&["coff"]).build_row(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::ComplexValue { ref feature } if feature == "coff"));

        let err = builder(&["imports"]).build_row(&doc).unwrap_err();
        assert!(matches!(err, ExtractError::ComplexValue { ref feature } if feature == "imports"));
    }

    #[test]
    fn test_empty_sections_fails_row() {
        let doc = json!({"md5": "abc", "sections": [], "label": 0});
        let err = builder(&["md5", "sections_max_rawsize"])
            .build_row(&doc)
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyAggregation { .. }));
    }
}
