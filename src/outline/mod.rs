//! Per-document outline extraction.
//!
//! The pipeline for one document is:
//!
//! 1. the title is taken from the raw first-page lines ([`extract_title`]),
//! 2. every line is classified ([`crate::classify::classify_lines`]),
//! 3. split list markers are fused with their heading text
//!    ([`merge_fragmented_headings`]),
//! 4. headings are leveled by font-size frequency and date stamps dropped
//!    ([`determine_heading_levels`]).
//!
//! [`OutlineExtractor`] wires a [`crate::source::LineSource`] and a
//! [`crate::classify::HeadingClassifier`] into this pipeline for files and
//! whole directories.

mod builder;
mod level;
mod merge;
mod title;

pub use builder::{build_outline, outline_file_name, ExtractedDocument, OutlineExtractor};
pub use level::{determine_heading_levels, is_date_heading, size_frequencies, LevelMap, DATE_KEYWORDS};
pub use merge::{is_list_marker, is_title_case, merge_fragmented_headings};
pub use title::{extract_title, TITLE_SIZE_TOLERANCE};
