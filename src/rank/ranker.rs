//! Persona-driven ranking of candidate headings.

use chrono::Local;

use super::collection::CandidatePool;
use super::embed::{cosine_similarity, TextEmbedder};
use crate::error::{Error, Result};
use crate::model::{CandidateHeading, RankMetadata, RankRequest, RankedOutput};
use crate::options::DEFAULT_TOP_K;

/// Timestamp format of `processing_timestamp`: local time, microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time formatted for output metadata.
pub fn processing_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Scores candidate headings against a query and keeps the best.
pub struct SemanticRanker<'a> {
    embedder: &'a dyn TextEmbedder,
    top_k: usize,
}

impl<'a> SemanticRanker<'a> {
    /// Create a ranker keeping the default number of sections.
    pub fn new(embedder: &'a dyn TextEmbedder) -> Self {
        Self {
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many sections to keep.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Get how many sections are kept.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Fill in each candidate's cosine similarity to `query`, keeping order.
    pub fn score(
        &self,
        query: &str,
        mut candidates: Vec<CandidateHeading>,
    ) -> Result<Vec<CandidateHeading>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let query_vec = self.embedder.embed(query)?;
        let texts: Vec<&str> = candidates.iter().map(|c| c.heading.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != candidates.len() {
            return Err(Error::Embedding(format!(
                "{} returned {} vectors for {} headings",
                self.embedder.name(),
                vectors.len(),
                candidates.len()
            )));
        }

        for (candidate, vector) in candidates.iter_mut().zip(&vectors) {
            candidate.score = cosine_similarity(&query_vec, vector);
        }
        Ok(candidates)
    }

    /// Score, sort best-first and keep the top `top_k`.
    ///
    /// The sort is stable: equal scores keep their input order.
    pub fn rank(
        &self,
        query: &str,
        candidates: Vec<CandidateHeading>,
    ) -> Result<Vec<CandidateHeading>> {
        let mut scored = self.score(query, candidates)?;
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);

        for c in &scored {
            log::debug!("{:.4} {} p{} {:?}", c.score, c.document, c.page_number, c.heading);
        }
        Ok(scored)
    }

    /// Rank a request's candidate pool and build the final output.
    ///
    /// `input_documents` lists every requested document, including ones
    /// that were skipped during aggregation.
    pub fn rank_request(&self, request: &RankRequest, pool: CandidatePool) -> Result<RankedOutput> {
        let query = request.query();
        log::info!(
            "ranking {} headings for {:?} with {}",
            pool.candidates.len(),
            query,
            self.embedder.name()
        );
        let top = self.rank(&query, pool.candidates)?;

        let metadata = RankMetadata {
            input_documents: request.filenames(),
            persona: request.persona.role.clone(),
            job_to_be_done: request.job_to_be_done.task.clone(),
            processing_timestamp: processing_timestamp(),
        };
        Ok(RankedOutput::from_sorted(metadata, &top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds the query as [1, 0] and each heading at the angle whose
    /// cosine is the number in its text.
    struct Scripted;

    impl TextEmbedder for Scripted {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains(':') {
                return Ok(vec![1.0, 0.0]);
            }
            let cos: f32 = text
                .parse()
                .map_err(|_| Error::Embedding(format!("not a score: {}", text)))?;
            Ok(vec![cos, (1.0 - cos * cos).sqrt()])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn candidates(scores: &[&str]) -> Vec<CandidateHeading> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| CandidateHeading::new(format!("d{}.pdf", i), "T", *s, i as u32 + 1))
            .collect()
    }

    #[test]
    fn test_rank_orders_by_score() {
        let ranker = SemanticRanker::new(&Scripted);
        let ranked = ranker.rank("r: t", candidates(&["0.9", "0.3", "0.6"])).unwrap();
        let headings: Vec<&str> = ranked.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(headings, ["0.9", "0.6", "0.3"]);
        assert!((ranked[0].score - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranker = SemanticRanker::new(&Scripted);
        let ranked = ranker.rank("r: t", candidates(&["0.5", "0.5", "0.7"])).unwrap();
        let docs: Vec<&str> = ranked.iter().map(|c| c.document.as_str()).collect();
        assert_eq!(docs, ["d2.pdf", "d0.pdf", "d1.pdf"]);
    }

    /// Vectors whose dot products with the query are -0.0 and 0.0.
    struct Fixed;

    impl TextEmbedder for Fixed {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            match text {
                "neg" => Ok(vec![-0.0, 1.0]),
                "pos" => Ok(vec![0.0, 1.0]),
                _ => Ok(vec![1.0, -0.0]),
            }
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_rank_zero_scores_keep_input_order() {
        let candidates = vec![
            CandidateHeading::new("a.pdf", "A", "neg", 1),
            CandidateHeading::new("b.pdf", "B", "pos", 1),
        ];
        let ranked = SemanticRanker::new(&Fixed).rank("r: t", candidates).unwrap();
        let headings: Vec<&str> = ranked.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(headings, ["neg", "pos"]);
    }

    /// Drops the last vector of every batch.
    struct Short;

    impl TextEmbedder for Short {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]; texts.len().saturating_sub(1)])
        }
    }

    #[test]
    fn test_short_batch_is_an_error() {
        let err = SemanticRanker::new(&Short)
            .score("r: t", candidates(&["0.1", "0.2"]))
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_rank_truncates_to_top_k() {
        let ranker = SemanticRanker::new(&Scripted).with_top_k(2);
        let ranked = ranker
            .rank("r: t", candidates(&["0.1", "0.2", "0.3", "0.4"]))
            .unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].heading, "0.4");
    }

    #[test]
    fn test_embedder_error_propagates() {
        let ranker = SemanticRanker::new(&Scripted);
        let err = ranker.rank("r: t", candidates(&["oops"])).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_rank_request_metadata() {
        let request = RankRequest::new("Analyst", "Find revenue")
            .with_document("d0.pdf")
            .with_document("gone.pdf");
        let pool = CandidatePool {
            candidates: candidates(&["0.2"]),
            resolved: vec!["d0.pdf".into()],
            skipped: vec!["gone.pdf".into()],
        };

        let output = SemanticRanker::new(&Scripted)
            .rank_request(&request, pool)
            .unwrap();
        assert_eq!(output.metadata.input_documents, ["d0.pdf", "gone.pdf"]);
        assert_eq!(output.metadata.persona, "Analyst");
        assert_eq!(output.metadata.job_to_be_done, "Find revenue");
        assert_eq!(output.len(), 1);
        assert_eq!(output.extracted_sections[0].importance_rank, 1);
    }

    #[test]
    fn test_empty_pool() {
        let request = RankRequest::new("a", "b");
        let output = SemanticRanker::new(&Scripted)
            .rank_request(&request, CandidatePool::default())
            .unwrap();
        assert!(output.is_empty());
        assert!(output.subsection_analysis.is_empty());
    }

    #[test]
    fn test_processing_timestamp_format() {
        let ts = processing_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
        let fraction = ts.rsplit('.').next().unwrap();
        assert_eq!(fraction.len(), 6);
    }
}
