//! Line-level types produced by a line source.

use serde::{Deserialize, Serialize};

/// A single text line with the features heading detection works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Text content of the line
    pub text: String,

    /// Largest font size among the line's spans, in points
    pub font_size: f32,

    /// Whether any span of the line uses a bold font
    pub bold: bool,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Set once a classifier has looked at the line
    #[serde(default)]
    pub is_heading: bool,
}

impl Line {
    /// Create a new unclassified line.
    pub fn new(text: impl Into<String>, font_size: f32, bold: bool, page_number: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold,
            page_number,
            is_heading: false,
        }
    }

    /// Set the heading flag.
    pub fn with_heading(mut self, is_heading: bool) -> Self {
        self.is_heading = is_heading;
        self
    }

    /// The features a heading classifier is allowed to see.
    pub fn features(&self) -> LineFeatures {
        LineFeatures {
            font_size: self.font_size,
            bold: self.bold,
        }
    }

    /// Check if the line sits on the first page.
    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }
}

/// Classifier input: font size and boldness only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFeatures {
    /// Font size in points
    pub font_size: f32,
    /// Bold flag
    pub bold: bool,
}

impl LineFeatures {
    /// Create a feature pair.
    pub fn new(font_size: f32, bold: bool) -> Self {
        Self { font_size, bold }
    }
}
