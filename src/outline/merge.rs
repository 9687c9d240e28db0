//! Repair of headings split by the classifier into a number and a title.
//!
//! Numbered section headings are often laid out as two text runs: a bare
//! marker (`"3."`) and the heading text (`"Methodology"`). The extractor
//! sees them as two lines, and the classifier frequently only flags one of
//! them. The merger fuses such pairs back into a single heading line.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::Line;

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)]?$").expect("list marker pattern is valid"))
}

/// Check if `text` is a bare numbered-list marker such as `1`, `2.` or `3)`.
pub fn is_list_marker(text: &str) -> bool {
    list_marker().is_match(text.trim())
}

/// Check if every word of `text` is capitalized.
///
/// Uppercase letters may only follow uncased characters and lowercase
/// letters may only follow cased ones; at least one cased letter is
/// required. `"Data And Methods"` and `"U.S. Policy"` pass, while
/// `"Data and Methods"`, `"API Design"` and `"2024"` do not.
pub fn is_title_case(text: &str) -> bool {
    let mut any_cased = false;
    let mut prev_cased = false;

    for c in text.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else {
            prev_cased = false;
        }
    }

    any_cased
}

/// Fuse each bare list marker with a following title-cased line.
///
/// The fused line keeps the font and page of the marker and is always a
/// heading. Lines that do not take part in a merge pass through untouched.
/// Only one line of lookahead is used and a consumed line is never
/// reconsidered.
pub fn merge_fragmented_headings(lines: Vec<Line>) -> Vec<Line> {
    let mut merged = Vec::with_capacity(lines.len());
    let mut iter = lines.into_iter().peekable();

    while let Some(line) = iter.next() {
        let fuse = iter
            .peek()
            .is_some_and(|next| is_list_marker(&line.text) && is_title_case(next.text.trim()));

        if fuse {
            if let Some(next) = iter.next() {
                let text = format!("{} {}", line.text.trim(), next.text.trim());
                log::debug!("merged fragmented heading {:?} on page {}", text, line.page_number);
                merged.push(Line {
                    text,
                    is_heading: true,
                    ..line
                });
                continue;
            }
        }

        merged.push(line);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, is_heading: bool) -> Line {
        Line::new(text, 14.0, true, 1).with_heading(is_heading)
    }

    #[test]
    fn test_list_marker() {
        assert!(is_list_marker("1"));
        assert!(is_list_marker("12."));
        assert!(is_list_marker(" 3) "));
        assert!(!is_list_marker("1.2"));
        assert!(!is_list_marker("1. Intro"));
        assert!(!is_list_marker("a."));
        assert!(!is_list_marker(""));
    }

    #[test]
    fn test_title_case() {
        assert!(is_title_case("Introduction"));
        assert!(is_title_case("Data And Methods"));
        assert!(is_title_case("U.S. Policy"));
        assert!(is_title_case("Results (Part Two)"));
        assert!(!is_title_case("Data and Methods"));
        assert!(!is_title_case("API Design"));
        assert!(!is_title_case("introduction"));
        assert!(!is_title_case("2024"));
        assert!(!is_title_case(""));
    }

    #[test]
    fn test_merge_marker_with_title() {
        let lines = vec![line("1.", false), line("Introduction", false)];
        let merged = merge_fragmented_headings(lines);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "1. Introduction");
        assert!(merged[0].is_heading);
    }

    #[test]
    fn test_merge_trims_both_parts() {
        let lines = vec![line(" 2) ", false), line("  Background  ", false)];
        let merged = merge_fragmented_headings(lines);
        assert_eq!(merged[0].text, "2) Background");
    }

    #[test]
    fn test_merged_line_inherits_first_attributes() {
        let lines = vec![
            Line::new("4", 16.0, false, 3),
            Line::new("Summary", 12.0, true, 4),
        ];
        let merged = merge_fragmented_headings(lines);
        assert_eq!(merged[0].font_size, 16.0);
        assert!(!merged[0].bold);
        assert_eq!(merged[0].page_number, 3);
    }

    #[test]
    fn test_no_merge_when_next_not_title_case() {
        let lines = vec![line("1.", true), line("the beginning", false)];
        let merged = merge_fragmented_headings(lines.clone());
        assert_eq!(merged, lines);
    }

    #[test]
    fn test_passthrough_preserves_heading_flag() {
        let lines = vec![line("Overview", true), line("Body text here.", false)];
        let merged = merge_fragmented_headings(lines);
        assert!(merged[0].is_heading);
        assert!(!merged[1].is_heading);
    }

    #[test]
    fn test_consumed_line_not_reconsidered() {
        // "2" has no cased letters, so "1" stays alone.
        let lines = vec![line("1", false), line("2", false), line("Scope", false)];
        let merged = merge_fragmented_headings(lines);
        let texts: Vec<_> = merged.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["1", "2 Scope"]);

        // A title-cased marker target is consumed and never starts a new pair.
        let lines = vec![line("1", false), line("Goals", false), line("Plan", false)];
        let merged = merge_fragmented_headings(lines);
        let texts: Vec<_> = merged.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["1 Goals", "Plan"]);
    }

    #[test]
    fn test_trailing_marker_kept() {
        let lines = vec![line("Body", false), line("7.", false)];
        let merged = merge_fragmented_headings(lines);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].text, "7.");
    }

    #[test]
    fn test_output_never_longer() {
        let lines: Vec<Line> = ["1", "One", "2", "Two", "x", "3", "three", "4."]
            .iter()
            .map(|t| line(t, false))
            .collect();
        let input_len = lines.len();
        let merged = merge_fragmented_headings(lines);
        assert!(merged.len() <= input_len);
        assert_eq!(merged.len(), 6);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_fragmented_headings(Vec::new()).is_empty());
    }
}
