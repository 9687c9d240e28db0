//! Extraction and ranking options.

use std::path::PathBuf;

use crate::render::JsonFormat;

/// Default number of sections kept by the ranker.
pub const DEFAULT_TOP_K: usize = 5;

/// Default name of the per-collection directory holding outline JSON files.
pub const DEFAULT_OUTLINE_SUBDIR: &str = "extracted";

/// Options for extracting outlines.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode for page-level failures
    pub error_mode: ErrorMode,

    /// Whether to process the documents of a directory in parallel
    pub parallel: bool,

    /// JSON layout of the written outline files
    pub format: JsonFormat,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages whose content cannot be read).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set output JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            format: JsonFormat::Pretty,
        }
    }
}

/// Error handling mode during line extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip unreadable pages and continue
    Lenient,
}

/// Options for aggregating outlines and ranking their headings.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// How many sections to keep
    pub top_k: usize,

    /// Collection directories, searched in order
    pub collection_dirs: Vec<PathBuf>,

    /// Subdirectory of each collection that holds outline files
    pub outline_subdir: String,

    /// JSON layout of the ranked output
    pub format: JsonFormat,
}

impl RankOptions {
    /// Create new rank options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of sections to keep.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Append a collection directory (lower priority than those already added).
    pub fn with_collection(mut self, dir: impl Into<PathBuf>) -> Self {
        self.collection_dirs.push(dir.into());
        self
    }

    /// Replace the collection directories.
    pub fn with_collections<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.collection_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the outline subdirectory name.
    pub fn with_outline_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.outline_subdir = subdir.into();
        self
    }

    /// Set output JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            collection_dirs: Vec::new(),
            outline_subdir: DEFAULT_OUTLINE_SUBDIR.to_string(),
            format: JsonFormat::Pretty,
        }
    }
}
