//! Linear decision function over font size and boldness.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::HeadingClassifier;
use crate::error::{Error, Result};
use crate::model::LineFeatures;

/// A linear heading classifier.
///
/// A line is a heading when
/// `font_size_weight * font_size + bold_weight * bold + bias > 0`.
/// Weights can be exported from any trained linear model and loaded from a
/// JSON file such as:
///
/// ```json
/// { "font_size_weight": 0.9, "bold_weight": 2.5, "bias": -12.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub font_size_weight: f32,
    pub bold_weight: f32,
    pub bias: f32,
}

impl LinearClassifier {
    /// Create a classifier from explicit weights.
    pub fn new(font_size_weight: f32, bold_weight: f32, bias: f32) -> Result<Self> {
        let classifier = Self {
            font_size_weight,
            bold_weight,
            bias,
        };
        classifier.validate()?;
        Ok(classifier)
    }

    /// Load weights from a JSON model file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let classifier: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::InvalidModel(format!("{}: {}", path.display(), e)))?;
        classifier.validate()?;
        log::info!("loaded heading classifier from {}", path.display());
        Ok(classifier)
    }

    /// Parse weights from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let classifier: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidModel(e.to_string()))?;
        classifier.validate()?;
        Ok(classifier)
    }

    /// Raw decision value; positive means heading.
    pub fn decision(&self, features: &LineFeatures) -> f32 {
        let bold = if features.bold { 1.0 } else { 0.0 };
        self.font_size_weight * features.font_size + self.bold_weight * bold + self.bias
    }

    fn validate(&self) -> Result<()> {
        if [self.font_size_weight, self.bold_weight, self.bias]
            .iter()
            .all(|w| w.is_finite())
        {
            Ok(())
        } else {
            Err(Error::InvalidModel("weights must be finite".to_string()))
        }
    }
}

impl Default for LinearClassifier {
    /// Bold text from 12pt up, or any text from 14pt up.
    fn default() -> Self {
        Self {
            font_size_weight: 1.0,
            bold_weight: 2.0,
            bias: -13.0,
        }
    }
}

impl HeadingClassifier for LinearClassifier {
    fn is_heading(&self, features: &LineFeatures) -> Result<bool> {
        if !features.font_size.is_finite() {
            return Err(Error::Classifier(format!(
                "font size {} is not a number",
                features.font_size
            )));
        }
        Ok(self.decision(features) > 0.0)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let c = LinearClassifier::default();
        assert!(c.is_heading(&LineFeatures::new(12.0, true)).unwrap());
        assert!(!c.is_heading(&LineFeatures::new(12.0, false)).unwrap());
        assert!(c.is_heading(&LineFeatures::new(14.0, false)).unwrap());
        assert!(!c.is_heading(&LineFeatures::new(10.0, true)).unwrap());
    }

    #[test]
    fn test_from_json_str() {
        let c = LinearClassifier::from_json_str(
            r#"{"font_size_weight": 0.5, "bold_weight": 4.0, "bias": -8.0}"#,
        )
        .unwrap();
        assert!(c.is_heading(&LineFeatures::new(10.0, true)).unwrap());
        assert!(!c.is_heading(&LineFeatures::new(10.0, false)).unwrap());
    }

    #[test]
    fn test_invalid_model_json() {
        let err = LinearClassifier::from_json_str(r#"{"bias": 1.0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
    }

    #[test]
    fn test_non_finite_weights_rejected() {
        assert!(LinearClassifier::new(f32::NAN, 1.0, 0.0).is_err());
        assert!(LinearClassifier::new(1.0, f32::INFINITY, 0.0).is_err());
        assert!(LinearClassifier::new(1.0, 1.0, -10.0).is_ok());
    }

    #[test]
    fn test_nan_font_size_is_error() {
        let c = LinearClassifier::default();
        let err = c.is_heading(&LineFeatures::new(f32::NAN, false)).unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"font_size_weight": 1.0, "bold_weight": 0.0, "bias": -16.0}"#,
        )
        .unwrap();

        let c = LinearClassifier::load(&path).unwrap();
        assert!(c.is_heading(&LineFeatures::new(18.0, false)).unwrap());
        assert!(!c.is_heading(&LineFeatures::new(16.0, true)).unwrap());
    }
}
