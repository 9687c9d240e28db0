//! Heading classification.
//!
//! A classifier sees only a line's font size and bold flag and answers
//! whether the line is a heading. The pipeline treats it as a black box:
//! any backend implementing [`HeadingClassifier`] can be plugged in.

mod linear;

pub use linear::LinearClassifier;

use crate::error::Result;
use crate::model::{Line, LineFeatures};

/// Trait for heading classifiers.
///
/// Implementations must be pure per call: the same features always give the
/// same answer. A classifier is built once and shared by reference across
/// documents, possibly from several threads.
pub trait HeadingClassifier: Send + Sync {
    /// Decide whether a line with these features is a heading.
    fn is_heading(&self, features: &LineFeatures) -> Result<bool>;

    /// Get the name of this classifier.
    fn name(&self) -> &str;
}

/// Flag every line with the classifier's prediction.
///
/// The first classifier error aborts the whole document.
pub fn classify_lines(classifier: &dyn HeadingClassifier, lines: Vec<Line>) -> Result<Vec<Line>> {
    lines
        .into_iter()
        .map(|line| {
            let is_heading = classifier.is_heading(&line.features())?;
            Ok(line.with_heading(is_heading))
        })
        .collect()
}
