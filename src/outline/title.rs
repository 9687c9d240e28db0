//! Document title detection from first-page font sizes.

use crate::model::Line;

/// Lines within this many points of the largest first-page size join the title.
pub const TITLE_SIZE_TOLERANCE: f32 = 0.5;

/// Extract the document title from the raw (unmerged) line sequence.
///
/// The title is every page-1 line set at (nearly) the largest page-1 font
/// size, joined in reading order with whitespace collapsed. Titles broken
/// over several text runs are therefore recovered as one string. Returns an
/// empty string when page 1 has no lines.
///
/// No date/time filtering is applied here, unlike the outline.
pub fn extract_title(lines: &[Line]) -> String {
    let first_page: Vec<&Line> = lines.iter().filter(|l| l.is_first_page()).collect();

    let Some(max_font) = first_page
        .iter()
        .map(|l| l.font_size)
        .filter(|s| !s.is_nan())
        .reduce(f32::max)
    else {
        return String::new();
    };

    let title = first_page
        .iter()
        .filter(|l| (l.font_size - max_font).abs() < TITLE_SIZE_TOLERANCE)
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
