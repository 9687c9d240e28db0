//! Line feature sources.
//!
//! A line source turns a document into an ordered stream of [`Line`]s in
//! page and reading order. Two sources ship with the crate:
//!
//! - [`PdfLineSource`] reads PDF content streams with lopdf.
//! - [`JsonLinesSource`] reads precomputed line features, one JSON object
//!   per line, from `.jsonl` files.
//!
//! [`SourceRegistry`] dispatches on file extension between registered
//! sources and is itself a [`LineSource`].

mod jsonl;
mod pdf;

pub use jsonl::JsonLinesSource;
pub use pdf::{PdfLineSource, TextSpan};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::Line;
use crate::options::ErrorMode;

/// Trait for line feature sources.
pub trait LineSource: Send + Sync {
    /// Read all lines of the document at `path`, preserving page and reading order.
    fn lines(&self, path: &Path) -> Result<Vec<Line>>;

    /// Get the supported file extensions for this source.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&'static str];

    /// Get the name of this source.
    fn name(&self) -> &str;

    /// Check if this source supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }

    /// Check if this source can read the file at `path`.
    fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.supports_extension(ext))
    }
}

/// Registry mapping file extensions to line sources.
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn LineSource>>,
    extensions: Vec<&'static str>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Create a registry with the PDF and JSON Lines sources.
    pub fn with_defaults() -> Self {
        Self::with_error_mode(ErrorMode::Strict)
    }

    /// Create a registry with the default sources using the given error mode.
    pub fn with_error_mode(mode: ErrorMode) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfLineSource::new().with_error_mode(mode)));
        registry.register(Arc::new(JsonLinesSource::new()));
        registry
    }

    /// Register a source for all of its supported extensions.
    ///
    /// A later registration wins for an extension claimed twice.
    pub fn register(&mut self, source: Arc<dyn LineSource>) {
        for &ext in source.supported_extensions() {
            if !self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                self.extensions.push(ext);
            }
            self.sources.insert(ext.to_lowercase(), source.clone());
        }
    }

    /// Get a source by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LineSource>> {
        self.sources.get(&ext.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.sources.contains_key(&ext.to_lowercase())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LineSource for SourceRegistry {
    fn lines(&self, path: &Path) -> Result<Vec<Line>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Other(format!("{} has no extension", path.display())))?;

        let source = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No line source for extension: {}", ext)))?;

        source.lines(path)
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        "registry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Fixed;

    impl LineSource for Fixed {
        fn lines(&self, _path: &Path) -> Result<Vec<Line>> {
            Ok(vec![Line::new("fixed", 12.0, false, 1)])
        }

        fn supported_extensions(&self) -> &[&'static str] {
            &["txt", "pdf"]
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = SourceRegistry::with_defaults();
        assert!(registry.supports("pdf"));
        assert!(registry.supports("PDF"));
        assert!(registry.supports("jsonl"));
        assert!(!registry.supports("docx"));
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = SourceRegistry::new();
        assert!(!registry.supports("pdf"));
        assert!(registry.supported_extensions().is_empty());
    }

    #[test]
    fn test_later_registration_wins() {
        let mut registry = SourceRegistry::with_defaults();
        registry.register(Arc::new(Fixed));

        assert_eq!(registry.get_by_extension("pdf").unwrap().name(), "fixed");
        assert_eq!(registry.get_by_extension("jsonl").unwrap().name(), "jsonl");

        let lines = registry.lines(Path::new("whatever.pdf")).unwrap();
        assert_eq!(lines[0].text, "fixed");

        let mut exts = registry.supported_extensions().to_vec();
        exts.sort_unstable();
        assert_eq!(exts, ["jsonl", "pdf", "txt"]);
    }

    #[test]
    fn test_supports_path() {
        let registry = SourceRegistry::with_defaults();
        assert!(registry.supports_path(&PathBuf::from("a/b/Report.PDF")));
        assert!(!registry.supports_path(&PathBuf::from("a/b/notes")));
        assert!(!registry.supports_path(&PathBuf::from("a/b/outline.json")));
    }

    #[test]
    fn test_unknown_extension_is_error() {
        let registry = SourceRegistry::with_defaults();
        assert!(registry.lines(Path::new("file.docx")).is_err());
        assert!(registry.lines(Path::new("no_extension")).is_err());
    }
}
