use crate::error::RagVecError;
use crate::logger::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which embedding collaborator the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama `/api/embeddings`
    Ollama,
    /// Local deterministic feature hashing
    Hashing,
}

impl std::str::FromStr for EmbeddingBackend {
    type Err = RagVecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" | "hash" => Ok(Self::Hashing),
            other => Err(RagVecError::config(format!(
                "Unknown embedding backend '{}' (expected 'ollama' or 'hashing')",
                other
            ))),
        }
    }
}

/// ragvec application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Index image file path
    pub index_path: PathBuf,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Embedding backend
    pub embedding_backend: EmbeddingBackend,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Embedding dimension (probed from the backend when unset)
    pub embedding_dimension: Option<usize>,

    /// Attempts per embedding request
    pub embed_max_attempts: u32,

    /// k used by `/search` when the request omits it
    pub default_top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./.rag/index.rvx"),
            server_host: "127.0.0.1".to_string(),
            server_port: 5050,
            log_dir: PathBuf::from("./.rag/log"),
            log_level: "info".to_string(),
            embedding_backend: EmbeddingBackend::Ollama,
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dimension: None,
            embed_max_attempts: 1,
            default_top_k: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, RagVecError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            index_path: Self::get_env_path("INDEX_PATH").unwrap_or(defaults.index_path),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            embedding_backend: Self::get_env_parsed("EMBEDDING_BACKEND")?
                .unwrap_or(defaults.embedding_backend),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimension: Self::get_env_parsed("EMBEDDING_DIMENSION")?,
            embed_max_attempts: Self::get_env_parsed("EMBED_MAX_ATTEMPTS")?
                .unwrap_or(defaults.embed_max_attempts),
            default_top_k: Self::get_env_parsed("DEFAULT_TOP_K")?
                .unwrap_or(defaults.default_top_k),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Parse an optional environment variable, rejecting unparsable values
    fn get_env_parsed<T>(key: &str) -> Result<Option<T>, RagVecError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match std::env::var(key) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| RagVecError::config(format!("Invalid {}='{}': {}", key, raw, e))),
            _ => Ok(None),
        }
    }

    /// Ensure the index directory and log directory exist
    pub fn ensure_directories(&self) -> Result<(), RagVecError> {
        let index_dir = self
            .index_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        for dir in [&index_dir, &self.log_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    RagVecError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), RagVecError> {
        if self.index_path.as_os_str().is_empty() {
            return Err(RagVecError::config("Index path cannot be empty"));
        }

        if self.embedding_backend == EmbeddingBackend::Ollama
            && !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://")
        {
            return Err(RagVecError::config(
                "Ollama base URL must start with http:// or https://",
            ));
        }

        if self.embedding_model.is_empty() {
            return Err(RagVecError::config("Embedding model name cannot be empty"));
        }

        if self.embedding_dimension == Some(0) {
            return Err(RagVecError::config("Embedding dimension must be positive"));
        }

        if self.embed_max_attempts == 0 {
            return Err(RagVecError::config("EMBED_MAX_ATTEMPTS must be at least 1"));
        }

        if self.default_top_k == 0 {
            return Err(RagVecError::config("DEFAULT_TOP_K must be at least 1"));
        }

        if self.server_port == 0 {
            return Err(RagVecError::config("Server port cannot be 0"));
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }
}
