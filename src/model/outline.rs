//! Outline types: heading levels, entries and per-document outlines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// Hierarchy level of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Most frequent heading size
    H1,
    /// Second most frequent heading size
    H2,
    /// Third most frequent heading size
    H3,
}

impl HeadingLevel {
    /// Map a zero-based frequency rank to a level. Ranks past the third get none.
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(HeadingLevel::H1),
            1 => Some(HeadingLevel::H2),
            2 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    /// Level label as written to JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }

    /// Numeric depth (1-3).
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leveled heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page the heading appears on (1-indexed)
    pub page_number: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page_number: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page_number,
        }
    }
}

/// Title plus heading outline of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Document title (empty when page 1 has no text)
    #[serde(default)]
    pub title: String,

    /// Headings in reading order
    #[serde(default)]
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    /// Create an outline from its parts.
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    /// Load an outline previously written as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let outline = serde_json::from_reader(BufReader::new(file))?;
        Ok(outline)
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Iterate over headings of one level.
    pub fn at_level(&self, level: HeadingLevel) -> impl Iterator<Item = &OutlineEntry> {
        self.outline.iter().filter(move |e| e.level == level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_rank() {
        assert_eq!(HeadingLevel::from_rank(0), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::from_rank(2), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::from_rank(3), None);
    }

    #[test]
    fn test_outline_json_shape() {
        let outline = DocumentOutline::new(
            "Annual Report",
            vec![OutlineEntry::new(HeadingLevel::H1, "1. Introduction", 1)],
        );
        let json = serde_json::to_value(&outline).unwrap();
        assert_eq!(json["title"], "Annual Report");
        assert_eq!(json["outline"][0]["level"], "H1");
        assert_eq!(json["outline"][0]["text"], "1. Introduction");
        assert_eq!(json["outline"][0]["page_number"], 1);
    }

    #[test]
    fn test_missing_fields_default() {
        let outline: DocumentOutline = serde_json::from_str("{}").unwrap();
        assert!(outline.title.is_empty());
        assert!(outline.is_empty());
    }

    #[test]
    fn test_at_level() {
        let outline = DocumentOutline::new(
            "",
            vec![
                OutlineEntry::new(HeadingLevel::H1, "A", 1),
                OutlineEntry::new(HeadingLevel::H2, "B", 1),
                OutlineEntry::new(HeadingLevel::H1, "C", 2),
            ],
        );
        let h1: Vec<_> = outline.at_level(HeadingLevel::H1).map(|e| &e.text).collect();
        assert_eq!(h1, ["A", "C"]);
    }
}
