use chrono::{DateTime, Utc};
use ragvec_common::{AppConfig, Result};
use ragvec_embed::Embedder;
use ragvec_vector::IndexService;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Persistent vector index
    pub index: IndexService,

    /// Embedding collaborator
    pub embedder: Arc<dyn Embedder>,

    /// Server start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state with the embedder selected by `config`
    pub async fn new(config: AppConfig) -> Result<Self> {
        let embedder = ragvec_embed::from_config(&config).await?;
        Self::with_embedder(config, embedder).await
    }

    /// Create application state around an existing embedder.
    ///
    /// The index is opened with the embedder's dimension; a corrupt image
    /// fails here and the server must not start.
    pub async fn with_embedder(config: AppConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.ensure_directories()?;
        let index = IndexService::open(&config.index_path, embedder.dimension()).await?;

        Ok(Self {
            config,
            index,
            embedder,
            started_at: Utc::now(),
        })
    }
}
