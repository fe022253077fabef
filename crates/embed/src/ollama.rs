use async_trait::async_trait;
use ragvec_common::{RagVecError, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::embedder::Embedder;
use crate::types::{EmbedRequest, EmbedResponse};

/// Text sent once at startup to discover the model's output size
const PROBE_TEXT: &str = "dimension probe";

/// Ollama embedding client
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimension: usize,
    max_attempts: u32,
    client: Client,
}

impl OllamaEmbedder {
    /// Create new Ollama embedder.
    ///
    /// When `dimension` is `None` the model is asked for one embedding and
    /// its length becomes the fixed dimension.
    pub async fn connect(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: Option<usize>,
        max_attempts: u32,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let mut embedder = Self {
            base_url,
            model: model.into(),
            dimension: dimension.unwrap_or(0),
            max_attempts: max_attempts.max(1),
            client,
        };

        if embedder.dimension == 0 {
            let probe = embedder.request_with_retry(PROBE_TEXT).await?;
            embedder.dimension = probe.len();
        }

        info!(
            "Ollama embedder initialized: {} (model={}, dimension={})",
            embedder.base_url, embedder.model, embedder.dimension
        );
        Ok(embedder)
    }

    /// Request an embedding, retrying up to `max_attempts` times
    async fn request_with_retry(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        debug!("Generating embedding - Model: {}, Text length: {}", self.model, text.len());

        let request = EmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.try_embed(&url, &request).await {
                Ok(embedding) => {
                    debug!("Received embedding - Dimension: {}", embedding.len());
                    return Ok(embedding);
                }
                Err(e) => {
                    if attempt < self.max_attempts {
                        let delay = std::time::Duration::from_secs(2u64.pow(attempt - 1));
                        warn!(
                            "Embedding request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt, self.max_attempts, e, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RagVecError::embedding("no embedding attempts made")))
    }

    /// Single attempt to generate embedding
    async fn try_embed(&self, url: &str, request: &EmbedRequest) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| RagVecError::embedding(format!("Failed to send embedding request: {}", e)))?
            .error_for_status()
            .map_err(|e| RagVecError::embedding(format!("Ollama embedding API error: {}", e)))?;

        let result: EmbedResponse = response.json().await.map_err(|e| {
            RagVecError::embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        if result.embedding.is_empty() {
            return Err(RagVecError::embedding("Empty embedding from Ollama"));
        }

        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.request_with_retry(text).await?;
        if embedding.len() != self.dimension {
            return Err(RagVecError::embedding(format!(
                "model {} returned {} values, expected {}",
                self.model,
                embedding.len(),
                self.dimension
            )));
        }
        Ok(embedding)
    }
}
