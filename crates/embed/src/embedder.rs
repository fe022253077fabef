use async_trait::async_trait;
use ragvec_common::Result;

/// Text → fixed-length vector collaborator
///
/// Implementations must be deterministic for identical input and report
/// failures as `RagVecError::Embedding`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier
    fn model(&self) -> &str;

    /// Length of every vector returned by `embed`
    fn dimension(&self) -> usize;

    /// Generate embedding for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
