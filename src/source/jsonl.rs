//! Precomputed line features stored as JSON Lines.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::LineSource;
use crate::error::{Error, Result};
use crate::model::Line;

/// Reads one [`Line`] per non-blank input line:
///
/// ```text
/// {"text": "1.", "font_size": 14.0, "bold": true, "page_number": 1}
/// {"text": "Introduction", "font_size": 14.0, "bold": true, "page_number": 1}
/// ```
///
/// Any `is_heading` field is discarded; classification happens later.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesSource;

impl JsonLinesSource {
    /// Create a new JSON Lines source.
    pub fn new() -> Self {
        Self
    }

    /// Parse lines from any buffered reader.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Vec<Line>> {
        let mut lines = Vec::new();
        for (idx, raw) in reader.lines().enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            let line: Line = serde_json::from_str(&raw)
                .map_err(|e| Error::Other(format!("line {}: {}", idx + 1, e)))?;
            if line.page_number == 0 {
                return Err(Error::Other(format!(
                    "line {}: page numbers start at 1",
                    idx + 1
                )));
            }
            lines.push(line.with_heading(false));
        }
        Ok(lines)
    }
}

impl LineSource for JsonLinesSource {
    fn lines(&self, path: &Path) -> Result<Vec<Line>> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["jsonl"]
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
