//! Candidate headings and the ranked output document.

use serde::{Deserialize, Serialize};

/// A heading from some document in the collection, competing for a top slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateHeading {
    /// Source file name
    pub document: String,
    /// Title of the source document
    pub title: String,
    /// Heading text
    pub heading: String,
    /// Page the heading appears on
    pub page_number: u32,
    /// Cosine similarity to the query, filled in by the ranker
    #[serde(default)]
    pub score: f32,
}

impl CandidateHeading {
    /// Create an unscored candidate.
    pub fn new(
        document: impl Into<String>,
        title: impl Into<String>,
        heading: impl Into<String>,
        page_number: u32,
    ) -> Self {
        Self {
            document: document.into(),
            title: title.into(),
            heading: heading.into(),
            page_number,
            score: 0.0,
        }
    }
}

/// Run metadata echoed back in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

/// One ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: u32,
    pub page_number: u32,
}

/// Text chosen for a ranked section, index-aligned with `extracted_sections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

/// Final output of a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOutput {
    pub metadata: RankMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankedOutput {
    /// Build the output from candidates already sorted best-first.
    ///
    /// Ranks are assigned by position, starting at 1.
    pub fn from_sorted(metadata: RankMetadata, top: &[CandidateHeading]) -> Self {
        let extracted_sections = top
            .iter()
            .enumerate()
            .map(|(i, c)| ExtractedSection {
                document: c.document.clone(),
                section_title: c.heading.clone(),
                importance_rank: i as u32 + 1,
                page_number: c.page_number,
            })
            .collect();
        let subsection_analysis = top
            .iter()
            .map(|c| SubsectionAnalysis {
                document: c.document.clone(),
                refined_text: c.heading.clone(),
                page_number: c.page_number,
            })
            .collect();

        Self {
            metadata,
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Number of ranked sections.
    pub fn len(&self) -> usize {
        self.extracted_sections.len()
    }

    /// Check if nothing was ranked.
    pub fn is_empty(&self) -> bool {
        self.extracted_sections.is_empty()
    }
}
