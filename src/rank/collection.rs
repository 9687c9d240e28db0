//! Loading per-document outlines into a pool of candidate headings.

use std::path::PathBuf;

use crate::model::{CandidateHeading, DocumentOutline};
use crate::options::{RankOptions, DEFAULT_OUTLINE_SUBDIR};
use crate::outline::outline_file_name;

/// Candidate headings of a collection, plus which documents contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePool {
    /// Flattened headings, in request order then outline order
    pub candidates: Vec<CandidateHeading>,
    /// Documents whose outline was loaded
    pub resolved: Vec<String>,
    /// Documents without a usable outline
    pub skipped: Vec<String>,
}

impl CandidatePool {
    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Finds outline files across collection directories.
///
/// The outline for `report.pdf` is looked up as
/// `<dir>/<outline_subdir>/report.json` in each directory in turn; the first
/// hit wins.
#[derive(Debug, Clone)]
pub struct CollectionAggregator {
    collection_dirs: Vec<PathBuf>,
    outline_subdir: String,
}

impl CollectionAggregator {
    /// Create an aggregator over the given directories, in priority order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            collection_dirs: dirs.into_iter().map(Into::into).collect(),
            outline_subdir: DEFAULT_OUTLINE_SUBDIR.to_string(),
        }
    }

    /// Create an aggregator from rank options.
    pub fn from_options(options: &RankOptions) -> Self {
        Self::new(options.collection_dirs.iter().cloned())
            .with_outline_subdir(options.outline_subdir.clone())
    }

    /// Set the subdirectory holding outline files.
    pub fn with_outline_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.outline_subdir = subdir.into();
        self
    }

    /// Get the collection directories.
    pub fn collection_dirs(&self) -> &[PathBuf] {
        &self.collection_dirs
    }

    /// Find the outline file for a document.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let name = outline_file_name(filename);
        self.collection_dirs
            .iter()
            .map(|dir| dir.join(&self.outline_subdir).join(&name))
            .find(|path| path.is_file())
    }

    /// Load the outline for a document, warning when there is none.
    pub fn load(&self, filename: &str) -> Option<DocumentOutline> {
        let Some(path) = self.resolve(filename) else {
            log::warn!("outline for {} not found in any collection, skipping", filename);
            return None;
        };

        match DocumentOutline::load(&path) {
            Ok(outline) => {
                log::debug!("loaded {} headings from {}", outline.len(), path.display());
                Some(outline)
            }
            Err(e) => {
                log::warn!("unreadable outline {}: {}, skipping", path.display(), e);
                None
            }
        }
    }

    /// Load every requested document and flatten the outlines.
    pub fn aggregate<S: AsRef<str>>(&self, filenames: &[S]) -> CandidatePool {
        let mut pool = CandidatePool::default();

        for filename in filenames {
            let filename = filename.as_ref();
            match self.load(filename) {
                Some(outline) => {
                    pool.candidates.extend(flatten_outline(filename, &outline));
                    pool.resolved.push(filename.to_string());
                }
                None => pool.skipped.push(filename.to_string()),
            }
        }

        log::info!(
            "collected {} candidate headings from {} documents ({} skipped)",
            pool.candidates.len(),
            pool.resolved.len(),
            pool.skipped.len()
        );
        pool
    }
}

/// Turn a document outline into unscored candidates.
pub fn flatten_outline(document: &str, outline: &DocumentOutline) -> Vec<CandidateHeading> {
    outline
        .outline
        .iter()
        .map(|entry| {
            CandidateHeading::new(document, &outline.title, &entry.text, entry.page_number)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};
    use crate::render::{write_json, JsonFormat};
    use std::path::Path;

    fn write_outline(dir: &Path, stem: &str, outline: &DocumentOutline) {
        let path = dir.join("extracted").join(format!("{}.json", stem));
        write_json(&path, outline, JsonFormat::Compact).unwrap();
    }

    fn outline(title: &str, headings: &[&str]) -> DocumentOutline {
        DocumentOutline::new(
            title,
            headings
                .iter()
                .enumerate()
                .map(|(i, h)| OutlineEntry::new(HeadingLevel::H1, *h, i as u32 + 1))
                .collect(),
        )
    }

    #[test]
    fn test_flatten_outline() {
        let candidates = flatten_outline("a.pdf", &outline("Guide", &["Intro", "Usage"]));
        assert_eq!(
            candidates,
            vec![
                CandidateHeading::new("a.pdf", "Guide", "Intro", 1),
                CandidateHeading::new("a.pdf", "Guide", "Usage", 2),
            ]
        );
    }

    #[test]
    fn test_resolve_priority_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_outline(first.path(), "shared", &outline("First", &["One"]));
        write_outline(second.path(), "shared", &outline("Second", &["Two"]));
        write_outline(second.path(), "only", &outline("Only", &["Three"]));

        let aggregator = CollectionAggregator::new([first.path(), second.path()]);
        assert_eq!(
            aggregator.resolve("shared.pdf"),
            Some(first.path().join("extracted").join("shared.json"))
        );
        assert_eq!(
            aggregator.resolve("only.pdf"),
            Some(second.path().join("extracted").join("only.json"))
        );
        assert_eq!(aggregator.resolve("missing.pdf"), None);
    }

    #[test]
    fn test_aggregate_skips_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_outline(dir.path(), "a", &outline("A", &["A1", "A2"]));
        write_outline(dir.path(), "c", &outline("C", &["C1"]));
        std::fs::write(dir.path().join("extracted").join("b.json"), "{ broken").unwrap();

        let aggregator = CollectionAggregator::new([dir.path()]);
        let pool = aggregator.aggregate(&["c.pdf", "b.pdf", "a.pdf", "missing.pdf"]);

        let headings: Vec<&str> = pool.candidates.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(headings, ["C1", "A1", "A2"]);
        assert_eq!(pool.resolved, ["c.pdf", "a.pdf"]);
        assert_eq!(pool.skipped, ["b.pdf", "missing.pdf"]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_custom_outline_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outlines").join("x.json");
        write_json(&path, &outline("X", &["Heading"]), JsonFormat::Pretty).unwrap();

        let options = RankOptions::new()
            .with_collection(dir.path())
            .with_outline_subdir("outlines");
        let aggregator = CollectionAggregator::from_options(&options);
        assert_eq!(aggregator.resolve("x.pdf"), Some(path));
    }

    #[test]
    fn test_no_collections() {
        let aggregator = CollectionAggregator::new(Vec::<PathBuf>::new());
        let pool = aggregator.aggregate(&["a.pdf"]);
        assert!(pool.is_empty());
        assert_eq!(pool.skipped, ["a.pdf"]);
    }
}
