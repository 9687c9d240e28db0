//! Heading level assignment by font-size frequency.
//!
//! The most common heading font size becomes H1, the next H2 and the third
//! H3. Frequency rather than raw size is used because large type is often
//! used sparingly (a cover banner, a pull quote) and should not own the top
//! level. Sizes with equal counts keep the order in which they were first
//! seen, so the mapping is deterministic for a given line sequence.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{HeadingLevel, Line, OutlineEntry};

/// Words that mark a heading as a date or time stamp.
///
/// Matching is by substring of the lowercased text.
pub const DATE_KEYWORDS: [&str; 23] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "noon",
    "midnight",
    "am",
    "pm",
];

fn year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{4}\b").expect("year pattern is valid"))
}

/// Check if a heading looks like a date or time stamp rather than a section.
///
/// Substring matching means words such as "Program" (via "am") are caught as
/// well; this mirrors the established behavior of the filter.
pub fn is_date_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    DATE_KEYWORDS.iter().any(|word| lower.contains(word)) || year_pattern().is_match(&lower)
}

/// Font size to heading level mapping for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelMap {
    levels: Vec<(f32, HeadingLevel)>,
}

impl LevelMap {
    /// Build the mapping from every heading-flagged line.
    pub fn from_lines(lines: &[Line]) -> Self {
        let levels = size_frequencies(lines)
            .into_iter()
            .enumerate()
            .filter_map(|(rank, (size, _))| HeadingLevel::from_rank(rank).map(|l| (size, l)))
            .collect();
        Self { levels }
    }

    /// Level assigned to a font size, if any.
    pub fn level_for(&self, font_size: f32) -> Option<HeadingLevel> {
        self.levels
            .iter()
            .find(|(size, _)| *size == font_size)
            .map(|(_, level)| *level)
    }

    /// Check if no size received a level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The (size, level) pairs, H1 first.
    pub fn entries(&self) -> &[(f32, HeadingLevel)] {
        &self.levels
    }
}

/// Count heading font sizes, most frequent first.
///
/// Sizes are compared exactly. Ties keep first-encountered order.
pub fn size_frequencies(lines: &[Line]) -> Vec<(f32, usize)> {
    let mut counts: Vec<(f32, usize)> = Vec::new();

    for line in lines.iter().filter(|l| l.is_heading) {
        match counts.iter_mut().find(|(size, _)| *size == line.font_size) {
            Some((_, count)) => *count += 1,
            None => counts.push((line.font_size, 1)),
        }
    }

    // sort_by is stable, which is what keeps the tie-break deterministic
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Turn classified, merged lines into a leveled outline.
///
/// Heading lines whose size ranks past the third most common, and heading
/// lines that look like dates or times, are left out. Entries keep the input
/// order.
pub fn determine_heading_levels(lines: &[Line]) -> Vec<OutlineEntry> {
    let levels = LevelMap::from_lines(lines);
    if levels.is_empty() {
        return Vec::new();
    }
    log::debug!("heading size levels: {:?}", levels.entries());

    lines
        .iter()
        .filter(|l| l.is_heading)
        .filter(|l| {
            let date = is_date_heading(&l.text);
            if date {
                log::debug!("dropping date-like heading {:?}", l.text);
            }
            !date
        })
        .filter_map(|l| {
            levels
                .level_for(l.font_size)
                .map(|level| OutlineEntry::new(level, l.text.clone(), l.page_number))
        })
        .collect()
}
