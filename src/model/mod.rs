//! Data model shared by the extraction and ranking stages.
//!
//! Lines flow in from a line source, outlines are written once per document,
//! and ranking reads those outlines back as candidate headings.

mod line;
mod outline;
mod ranked;
mod request;

pub use line::{Line, LineFeatures};
pub use outline::{DocumentOutline, HeadingLevel, OutlineEntry};
pub use ranked::{
    CandidateHeading, ExtractedSection, RankMetadata, RankedOutput, SubsectionAnalysis,
};
pub use request::{ChallengeInfo, DocumentRef, JobToBeDone, Persona, RankRequest};
