//! # outliner
//!
//! Heading outline extraction from PDFs and persona-driven section ranking.
//!
//! Each document is read as a stream of lines with font features, a
//! classifier flags the headings, and the headings are leveled H1 to H3 by
//! font-size frequency. Outlines of a whole collection can then be ranked
//! against a `"{persona}: {task}"` query by embedding similarity.
//!
//! ## Quick Start
//!
//! ```no_run
//! use outliner::{extract_outline, render, JsonFormat};
//!
//! fn main() -> outliner::Result<()> {
//!     let outline = extract_outline("report.pdf")?;
//!     println!("{}", render::to_json(&outline, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Ranking
//!
//! ```no_run
//! use outliner::{rank_collection, RankOptions};
//!
//! let options = RankOptions::new().with_collection("collections/travel");
//! let ranked = rank_collection("collections/travel/input.json", &options)?;
//! for section in &ranked.extracted_sections {
//!     println!("{} {}", section.importance_rank, section.section_title);
//! }
//! # Ok::<(), outliner::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Pluggable capabilities**: line sources, heading classifiers and text
//!   embedders are traits
//! - **Fragment repair**: split list markers such as `"1."` are fused with
//!   their heading text
//! - **Parallel processing**: Uses Rayon for directories of documents
//! - **Sentence embeddings** (`bert` feature): rank with a MiniLM/BERT
//!   model through candle instead of the offline hash embedder

pub mod classify;
pub mod error;
pub mod model;
pub mod options;
pub mod outline;
pub mod rank;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use classify::{HeadingClassifier, LinearClassifier};
pub use error::{Error, Result};
pub use model::{
    CandidateHeading, DocumentOutline, HeadingLevel, Line, LineFeatures, OutlineEntry,
    RankRequest, RankedOutput,
};
pub use options::{ErrorMode, ExtractOptions, RankOptions};
pub use outline::{ExtractedDocument, OutlineExtractor};
pub use rank::{HashEmbedder, HashEmbedderConfig, SemanticRanker, TextEmbedder};
#[cfg(feature = "bert")]
pub use rank::BertEmbedder;
pub use render::JsonFormat;
pub use source::{JsonLinesSource, LineSource, PdfLineSource, SourceRegistry};

use std::path::Path;

/// Extract the heading outline of a PDF (or `.jsonl` line dump) with the
/// default classifier.
///
/// # Example
///
/// ```no_run
/// use outliner::extract_outline;
///
/// let outline = extract_outline("report.pdf").unwrap();
/// println!("{}", outline.title);
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<DocumentOutline> {
    Outliner::new().extract(path)
}

/// Extract an outline with custom options.
///
/// # Example
///
/// ```no_run
/// use outliner::{extract_outline_with_options, ExtractOptions};
///
/// let outline = extract_outline_with_options("scan.pdf", ExtractOptions::new().lenient()).unwrap();
/// ```
pub fn extract_outline_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<DocumentOutline> {
    Outliner::new().with_options(options).extract(path)
}

/// Rank the documents of a request file with the default hash embedder.
pub fn rank_collection<P: AsRef<Path>>(
    request_path: P,
    options: &RankOptions,
) -> Result<RankedOutput> {
    let request = RankRequest::load(request_path)?;
    rank::rank_request(&request, options, &HashEmbedder::default())
}

/// Owning builder for outline extraction.
///
/// # Example
///
/// ```no_run
/// use outliner::Outliner;
///
/// let report = Outliner::new()
///     .with_model("heading_model.json")?
///     .lenient()
///     .extract_directory("pdfs", "extracted")?;
/// println!("{} documents", report.len());
/// # Ok::<(), outliner::Error>(())
/// ```
pub struct Outliner {
    classifier: Box<dyn HeadingClassifier>,
    options: ExtractOptions,
}

impl Outliner {
    /// Create a builder using [`LinearClassifier::default`].
    pub fn new() -> Self {
        Self {
            classifier: Box::new(LinearClassifier::default()),
            options: ExtractOptions::default(),
        }
    }

    /// Load linear classifier weights from a JSON model file.
    pub fn with_model<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        Ok(self.with_classifier(LinearClassifier::load(path)?))
    }

    /// Use a custom classifier.
    pub fn with_classifier<C: HeadingClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Set extract options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Skip unreadable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Process directories one document at a time.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set output JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.options = self.options.with_format(format);
        self
    }

    /// Get the classifier.
    pub fn classifier(&self) -> &dyn HeadingClassifier {
        self.classifier.as_ref()
    }

    /// Get the extract options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract one document's outline.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<DocumentOutline> {
        let source = SourceRegistry::with_error_mode(self.options.error_mode);
        self.extractor(&source).extract(path.as_ref())
    }

    /// Extract every supported document in `input_dir` into `output_dir`.
    pub fn extract_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<Vec<ExtractedDocument>> {
        let source = SourceRegistry::with_error_mode(self.options.error_mode);
        self.extractor(&source)
            .extract_directory(input_dir.as_ref(), output_dir.as_ref())
    }

    /// Borrow an [`OutlineExtractor`] over `source` with this builder's
    /// classifier and options.
    pub fn extractor<'a>(&'a self, source: &'a dyn LineSource) -> OutlineExtractor<'a> {
        OutlineExtractor::new(source, self.classifier.as_ref()).with_options(self.options.clone())
    }
}

impl Default for Outliner {
    fn default() -> Self {
        Self::new()
    }
}
