//! Cross-document heading ranking.
//!
//! Outlines written by the extraction step are gathered from one or more
//! collection directories ([`CollectionAggregator`]), every heading is
//! embedded with a [`TextEmbedder`] and compared to a `"{persona}: {task}"`
//! query, and the most similar headings become the [`RankedOutput`].

#[cfg(feature = "bert")]
mod bert;
mod collection;
mod embed;
mod ranker;

#[cfg(feature = "bert")]
pub use bert::{BertEmbedder, DEFAULT_SENTENCE_MODEL};
pub use collection::{flatten_outline, CandidatePool, CollectionAggregator};
pub use embed::{cosine_similarity, HashEmbedder, HashEmbedderConfig, TextEmbedder};
pub use ranker::{processing_timestamp, SemanticRanker, TIMESTAMP_FORMAT};

use crate::error::Result;
use crate::model::{RankRequest, RankedOutput};
use crate::options::RankOptions;

/// Aggregate the request's documents and rank their headings.
pub fn rank_request(
    request: &RankRequest,
    options: &RankOptions,
    embedder: &dyn TextEmbedder,
) -> Result<RankedOutput> {
    request.validate()?;
    let pool = CollectionAggregator::from_options(options).aggregate(&request.filenames());
    SemanticRanker::new(embedder)
        .with_top_k(options.top_k)
        .rank_request(request, pool)
}
