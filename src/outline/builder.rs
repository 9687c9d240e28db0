//! Outline building for single documents and directories.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use super::{determine_heading_levels, extract_title, merge_fragmented_headings};
use crate::classify::{classify_lines, HeadingClassifier};
use crate::error::Result;
use crate::model::{DocumentOutline, Line};
use crate::options::ExtractOptions;
use crate::render::write_json;
use crate::source::LineSource;

/// Build the outline of one document from its raw lines.
///
/// The title is computed before classification so that it sees the
/// unmerged, unfiltered first page. A classifier error aborts the document.
pub fn build_outline(
    lines: Vec<Line>,
    classifier: &dyn HeadingClassifier,
) -> Result<DocumentOutline> {
    let title = extract_title(&lines);
    let classified = classify_lines(classifier, lines)?;
    let merged = merge_fragmented_headings(classified);
    let outline = determine_heading_levels(&merged);
    Ok(DocumentOutline::new(title, outline))
}

/// Name of the outline file for a document: its extension replaced by `.json`.
pub fn outline_file_name(document: &str) -> PathBuf {
    Path::new(document).with_extension("json")
}

/// Summary of one document processed by [`OutlineExtractor::extract_directory`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    /// Input document
    pub source: PathBuf,
    /// Written outline file
    pub output: PathBuf,
    /// Extracted title
    pub title: String,
    /// Number of outline entries
    pub headings: usize,
}

/// Runs the outline pipeline with a given line source and classifier.
///
/// # Example
///
/// ```no_run
/// use outliner::classify::LinearClassifier;
/// use outliner::outline::OutlineExtractor;
/// use outliner::source::SourceRegistry;
///
/// let source = SourceRegistry::with_defaults();
/// let classifier = LinearClassifier::default();
/// let extractor = OutlineExtractor::new(&source, &classifier);
/// let outline = extractor.extract("report.pdf".as_ref())?;
/// println!("{}: {} headings", outline.title, outline.len());
/// # Ok::<(), outliner::Error>(())
/// ```
pub struct OutlineExtractor<'a> {
    source: &'a dyn LineSource,
    classifier: &'a dyn HeadingClassifier,
    options: ExtractOptions,
}

impl<'a> OutlineExtractor<'a> {
    /// Create an extractor with default options.
    pub fn new(source: &'a dyn LineSource, classifier: &'a dyn HeadingClassifier) -> Self {
        Self {
            source,
            classifier,
            options: ExtractOptions::default(),
        }
    }

    /// Set extract options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the extract options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the outline of one document.
    pub fn extract(&self, path: &Path) -> Result<DocumentOutline> {
        let lines = self.source.lines(path)?;
        let outline = build_outline(lines, self.classifier)?;
        log::info!(
            "{}: title {:?}, {} headings",
            path.display(),
            outline.title,
            outline.len()
        );
        Ok(outline)
    }

    /// Extract the outline of one document and write it as JSON.
    pub fn extract_to_file(&self, path: &Path, output: &Path) -> Result<DocumentOutline> {
        let outline = self.extract(path)?;
        write_json(output, &outline, self.options.format)?;
        Ok(outline)
    }

    /// List the documents in `dir` the line source can read, sorted by path.
    pub fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.source.supports_path(&path) {
                documents.push(path);
            }
        }
        documents.sort();
        Ok(documents)
    }

    /// Extract every readable document in `input_dir` into `output_dir`.
    ///
    /// Each document gets `<output_dir>/<stem>.json`. The first failing
    /// document aborts the run.
    pub fn extract_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ExtractedDocument>> {
        self.extract_directory_with(input_dir, output_dir, |_| {})
    }

    /// Like [`extract_directory`](Self::extract_directory), calling
    /// `on_done` after each document is written.
    ///
    /// With parallel processing `on_done` runs on worker threads in no
    /// particular order; the returned report is in path order either way.
    pub fn extract_directory_with<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        on_done: F,
    ) -> Result<Vec<ExtractedDocument>>
    where
        F: Fn(&ExtractedDocument) + Sync,
    {
        let documents = self.list_documents(input_dir)?;
        fs::create_dir_all(output_dir)?;
        log::info!(
            "extracting {} documents from {} to {}",
            documents.len(),
            input_dir.display(),
            output_dir.display()
        );

        let process = |path: &PathBuf| -> Result<ExtractedDocument> {
            let report = self.extract_one(path, output_dir).map_err(|e| {
                log::error!("{}: {}", path.display(), e);
                e
            })?;
            on_done(&report);
            Ok(report)
        };

        if self.options.parallel {
            documents.par_iter().map(process).collect()
        } else {
            documents.iter().map(process).collect()
        }
    }

    fn extract_one(&self, path: &Path, output_dir: &Path) -> Result<ExtractedDocument> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let output = output_dir.join(outline_file_name(&file_name));
        let outline = self.extract_to_file(path, &output)?;

        Ok(ExtractedDocument {
            source: path.to_path_buf(),
            output,
            title: outline.title,
            headings: outline.outline.len(),
        })
    }
}
