//! Offline embedder based on feature hashing.
//!
//! Each lower-cased word token is hashed with SHA-256; the digest picks a
//! bucket and a sign. The accumulated vector is L2-normalized. Texts that
//! share words land close together, which is enough for local use and for
//! reproducible fixtures, without any model download.

use async_trait::async_trait;
use ragvec_common::{RagVecError, Result};
use sha2::{Digest, Sha256};

use crate::embedder::Embedder;

/// Output size of the MiniLM model the service defaults to
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Deterministic feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RagVecError::InvalidDimension(dimension));
        }
        Ok(Self { dimension })
    }

    /// Synchronous form of [`Embedder::embed`]
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(RagVecError::embedding("text contains no tokens to embed"));
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        // opposite-signed collisions can cancel out completely
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model(&self) -> &str {
        "feature-hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}
