//! ragvec embedding collaborators
//!
//! Ollama API client and an offline hashing embedder behind one trait

mod embedder;
mod hashing;
mod ollama;
mod types;

use ragvec_common::{AppConfig, EmbeddingBackend, Result};
use std::sync::Arc;

pub use embedder::Embedder;
pub use hashing::{HashingEmbedder, DEFAULT_HASHING_DIMENSION};
pub use ollama::OllamaEmbedder;
pub use types::{EmbedRequest, EmbedResponse};

/// Build the embedder selected by the configuration
pub async fn from_config(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedding_backend {
        EmbeddingBackend::Ollama => {
            let embedder = OllamaEmbedder::connect(
                config.ollama_base_url.clone(),
                config.embedding_model.clone(),
                config.embedding_dimension,
                config.embed_max_attempts,
            )
            .await?;
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Hashing => {
            let dimension = config
                .embedding_dimension
                .unwrap_or(DEFAULT_HASHING_DIMENSION);
            Ok(Arc::new(HashingEmbedder::new(dimension)?))
        }
    }
}
