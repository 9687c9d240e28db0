//! Text embedding backends and vector similarity.

use crate::error::{Error, Result};

/// Trait for text embedding backends.
///
/// Implementations must return vectors of [`dimensions`](Self::dimensions)
/// length and must be deterministic for a given text.
pub trait TextEmbedder: Send + Sync {
    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of the vectors returned by [`embed`](Self::embed).
    fn dimensions(&self) -> usize;

    /// Get the name of this backend.
    fn name(&self) -> &str {
        "embedder"
    }

    /// Embed several texts.
    ///
    /// Default implementation calls `embed` in a loop.
    /// Override for backends with native batch support.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Settings for [`HashEmbedder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedderConfig {
    /// Vector length
    pub dimensions: usize,
    /// Hash seed; different seeds give unrelated vector spaces
    pub seed: u64,
}

impl HashEmbedderConfig {
    pub const DEFAULT_DIMENSIONS: usize = 384;
}

impl Default for HashEmbedderConfig {
    fn default() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
            seed: 0,
        }
    }
}

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
///
/// Lowercased word unigrams and their character trigrams are hashed into a
/// fixed number of signed buckets and the result is L2-normalized. Texts
/// sharing words or word fragments land close together, which is enough to
/// rank short headings against a query without a neural model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    config: HashEmbedderConfig,
}

impl HashEmbedder {
    /// Create an embedder; zero dimensions is rejected.
    pub fn new(config: HashEmbedderConfig) -> Result<Self> {
        if config.dimensions == 0 {
            return Err(Error::Embedding(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> HashEmbedderConfig {
        self.config
    }

    /// Embed a text. Text without any word characters gives the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.config.dimensions];
        let lower = text.to_lowercase();

        for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            self.add_feature(&mut vector, word.as_bytes(), WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, gram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }

        normalize_vector(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(self.config.seed, feature);
        let bucket = (hash % vector.len() as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            config: HashEmbedderConfig::default(),
        }
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// 64-bit FNV-1a with the seed folded into the offset basis.
fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET ^ seed.wrapping_mul(PRIME);
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn normalize_vector(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec.iter_mut() {
        *value /= norm;
    }
}

/// Cosine similarity in `[-1, 1]`.
///
/// Vectors of different length, empty vectors and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        let sim = dot / (norm_a * norm_b);
        if sim.is_nan() {
            0.0
        } else {
            // + 0.0 folds -0.0 into 0.0 so equal scores compare equal
            sim.clamp(-1.0, 1.0) + 0.0
        }
    } else {
        0.0
    }
}
